//! Fatal schema errors.
//!
//! Everything here aborts before any resolution is attempted: a schema that
//! fails to load or whose constraint graph fails to build is an authoring
//! defect and is surfaced to the operator verbatim. Recoverable per-request
//! findings live in [`crate::diagnostics`] instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unsupported document schema_version '{version}', expected {expected}")]
    UnsupportedSchemaVersion { version: String, expected: String },

    #[error("'{name}' is not a valid identifier (expected ^[A-Za-z0-9_.-]+$)")]
    InvalidName { name: String },

    #[error("category '{name}' is declared more than once")]
    DuplicateCategory { name: String },

    /// Duplicate declarations of one option name are only legal when every
    /// declaration carries a chip list and the lists are pairwise disjoint.
    /// Also raised when an option name collides with a category name, since
    /// requirement targets share one namespace.
    #[error("option '{name}' is declared ambiguously (overlapping or missing chip lists)")]
    AmbiguousDuplicateOption { name: String },

    #[error("'{referrer}' requires unknown option or category '{target}'")]
    UnknownOptionReferenced { referrer: String, target: String },

    #[error("requirement cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },
}
