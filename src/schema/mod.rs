//! Option schema wiring.
//!
//! This module owns the declarative schema of generation options: the raw
//! document types, the JSON Schema contract for their serialized form, and
//! the loader that turns a document into the immutable [`SchemaModel`] the
//! resolver works against. A bundled document for the ESP32 family ships
//! with the crate and is embedded at compile time.

pub mod contract;
pub mod loader;
pub mod model;

pub use contract::{OPTION_SCHEMA_CONTRACT, validate_document};
pub use loader::{SUPPORTED_SCHEMA_VERSION, load_model_from_path, load_model_from_str};
pub use model::{
    CategoryDecl, CategoryDef, ChipId, OptionDecl, OptionDef, OptionEntry, Polarity, Requirement,
    SchemaDocument, SchemaModel, SchemaNode,
};

use std::sync::LazyLock;

/// Bundled option document for the ESP32 chip family.
pub const DEFAULT_DOCUMENT_JSON: &str = include_str!("../../schemas/options_esp_v1.json");

static DEFAULT_DOCUMENT: LazyLock<SchemaDocument> = LazyLock::new(|| {
    serde_json::from_str(DEFAULT_DOCUMENT_JSON).expect("bundled option document parses")
});

/// The parsed bundled document. Parsed once per process; a malformed bundled
/// asset is a packaging defect and panics at first use.
pub fn default_document() -> &'static SchemaDocument {
    &DEFAULT_DOCUMENT
}
