//! Option schema and constraint resolution for generated embedded projects.
//!
//! A schema document declares selectable options and categories with
//! dependency (`requires`), mutual-exclusion (`selection_group`), and
//! chip-applicability (`chips`) constraints. The [`resolver`] takes a target
//! chip and the caller's explicit requests and computes a consistent final
//! selection, or reports exactly why none exists. The schema is loaded once
//! per process and shared read-only; every resolution is a pure,
//! deterministic function of its inputs.

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod schema;

pub use diagnostics::Diagnostic;
pub use error::SchemaError;
pub use graph::{ConstraintGraph, Edge, GroupMember, NodeKind, Relationships};
pub use resolver::{ResolutionResult, resolve};
pub use schema::{
    CategoryDecl, CategoryDef, ChipId, DEFAULT_DOCUMENT_JSON, OPTION_SCHEMA_CONTRACT, OptionDecl,
    OptionDef, OptionEntry, Polarity, Requirement, SUPPORTED_SCHEMA_VERSION, SchemaDocument,
    SchemaModel, SchemaNode, default_document, load_model_from_path, load_model_from_str,
    validate_document,
};

/// Split a comma- or whitespace-separated list of names.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join `items` onto `prefix` as a readable sentence.
pub fn list_as_sentence(prefix: &str, items: &[String]) -> String {
    let mut out = String::from(prefix);
    for (idx, item) in items.iter().enumerate() {
        if idx == 0 {
            out.push(' ');
        } else if idx + 1 == items.len() {
            out.push_str(" and ");
        } else {
            out.push_str(", ");
        }
        out.push_str(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_accepts_commas_and_whitespace() {
        assert_eq!(split_list("wifi,alloc"), vec!["wifi", "alloc"]);
        assert_eq!(split_list("wifi alloc"), vec!["wifi", "alloc"]);
        assert_eq!(split_list(" wifi ,  alloc "), vec!["wifi", "alloc"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn list_as_sentence_joins_naturally() {
        let one = vec!["wifi".to_string()];
        let two = vec!["wifi".to_string(), "alloc".to_string()];
        let three = vec![
            "wifi".to_string(),
            "alloc".to_string(),
            "embassy".to_string(),
        ];

        assert_eq!(list_as_sentence("Enabled:", &one), "Enabled: wifi");
        assert_eq!(list_as_sentence("Enabled:", &two), "Enabled: wifi and alloc");
        assert_eq!(
            list_as_sentence("Enabled:", &three),
            "Enabled: wifi, alloc and embassy"
        );
    }
}
