//! Structured resolution diagnostics.
//!
//! Diagnostics never abort a resolution: the resolver reports every conflict
//! it finds and still returns a best-effort selection, so a caller can show
//! the user exactly what is wrong. Fatal schema defects are a different
//! animal and live in [`crate::error`].

use crate::list_as_sentence;
use crate::schema::ChipId;
use serde::Serialize;
use std::fmt;

/// A single finding from one resolution request, in production order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A requested name does not exist in the schema.
    UnknownOptionRequested { option: String },

    /// An option was requested, or forced by a requirement, on a chip none
    /// of its variants cover.
    ChipIncompatibleSelection {
        option: String,
        chip: ChipId,
        #[serde(skip_serializing_if = "Option::is_none")]
        forced_by: Option<String>,
    },

    /// An active option (or category) declares `!conflicting`, yet
    /// `conflicting` is active too.
    NegativeRequirementViolated { option: String, conflicting: String },

    /// More than one member of a selection group is active. The resolver
    /// never deselects one on its own.
    GroupConflict { group: String, members: Vec<String> },

    /// An active option's owning category has unmet requirements.
    CategoryGateUnsatisfied { option: String, category: String },

    /// The caller explicitly disabled an option the closure forces active.
    DisabledOptionRequired {
        option: String,
        required_by: Vec<String>,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UnknownOptionRequested { .. } => "unknown_option_requested",
            Diagnostic::ChipIncompatibleSelection { .. } => "chip_incompatible_selection",
            Diagnostic::NegativeRequirementViolated { .. } => "negative_requirement_violated",
            Diagnostic::GroupConflict { .. } => "group_conflict",
            Diagnostic::CategoryGateUnsatisfied { .. } => "category_gate_unsatisfied",
            Diagnostic::DisabledOptionRequired { .. } => "disabled_option_required",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownOptionRequested { option } => {
                write!(f, "Unknown option '{option}'")
            }
            Diagnostic::ChipIncompatibleSelection {
                option,
                chip,
                forced_by: None,
            } => {
                write!(f, "Option '{option}' is not supported for chip {chip}")
            }
            Diagnostic::ChipIncompatibleSelection {
                option,
                chip,
                forced_by: Some(forced_by),
            } => {
                write!(
                    f,
                    "Option '{option}' is not supported for chip {chip} but is required by '{forced_by}'"
                )
            }
            Diagnostic::NegativeRequirementViolated {
                option,
                conflicting,
            } => {
                write!(f, "Option '{option}' is disabled by '{conflicting}'")
            }
            Diagnostic::GroupConflict { group, members } => {
                write!(
                    f,
                    "{} (selection group '{group}')",
                    list_as_sentence("The following options can not be enabled together:", members)
                )
            }
            Diagnostic::CategoryGateUnsatisfied { option, category } => {
                write!(
                    f,
                    "Option '{option}' belongs to category '{category}' whose requirements are not met"
                )
            }
            Diagnostic::DisabledOptionRequired {
                option,
                required_by,
            } => {
                write!(
                    f,
                    "{}",
                    list_as_sentence(
                        &format!("Option '{option}' was disabled but is required by:"),
                        required_by
                    )
                )
            }
        }
    }
}
