//! Document loading and validation.
//!
//! The loader converts a parsed [`SchemaDocument`] into the immutable
//! [`SchemaModel`]. It enforces the document version marker, merges
//! duplicate-named option declarations into chip-keyed variants (legal only
//! when every declaration is chip-scoped and the scopes are pairwise
//! disjoint), and verifies that every requirement target names a known
//! option or category. It never partially mutates shared state: the result
//! is either a complete model or an error.

use crate::error::SchemaError;
use crate::schema::contract;
use crate::schema::model::{
    CategoryDef, ChipId, OptionDecl, OptionDef, OptionEntry, Requirement, SchemaDocument,
    SchemaModel, SchemaNode,
};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// The document version this build understands.
pub const SUPPORTED_SCHEMA_VERSION: &str = "generator_options_v1";

impl SchemaModel {
    /// Build the immutable model from a parsed document.
    pub fn from_document(doc: &SchemaDocument) -> Result<SchemaModel, SchemaError> {
        if doc.schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedSchemaVersion {
                version: doc.schema_version.clone(),
                expected: SUPPORTED_SCHEMA_VERSION.to_string(),
            });
        }

        let mut options: Vec<OptionEntry> = Vec::new();
        let mut option_index: BTreeMap<String, usize> = BTreeMap::new();
        let mut categories: Vec<CategoryDef> = Vec::new();
        let mut category_index: BTreeMap<String, usize> = BTreeMap::new();

        for node in &doc.nodes {
            match node {
                SchemaNode::Option(decl) => {
                    merge_option(decl, None, &mut options, &mut option_index)?;
                }
                SchemaNode::Category(decl) => {
                    validate_name(&decl.name)?;
                    if category_index.contains_key(&decl.name) {
                        return Err(SchemaError::DuplicateCategory {
                            name: decl.name.clone(),
                        });
                    }
                    category_index.insert(decl.name.clone(), categories.len());
                    categories.push(CategoryDef {
                        name: decl.name.clone(),
                        display_name: decl.display_name.clone(),
                        requires: parse_requirements(&decl.requires),
                    });
                    for opt in &decl.options {
                        merge_option(opt, Some(&decl.name), &mut options, &mut option_index)?;
                    }
                }
            }
        }

        // Requirement targets share one namespace; a name used by both an
        // option and a category cannot be addressed unambiguously.
        for name in option_index.keys() {
            if category_index.contains_key(name) {
                return Err(SchemaError::AmbiguousDuplicateOption { name: name.clone() });
            }
        }

        let model = SchemaModel {
            options,
            categories,
            option_index,
            category_index,
        };
        model.validate_references()?;
        Ok(model)
    }

    fn validate_references(&self) -> Result<(), SchemaError> {
        for entry in self.options() {
            for variant in &entry.variants {
                for req in &variant.requires {
                    if !self.is_known_target(&req.target) {
                        return Err(SchemaError::UnknownOptionReferenced {
                            referrer: entry.name.clone(),
                            target: req.target.clone(),
                        });
                    }
                }
            }
        }
        for category in self.categories() {
            for req in &category.requires {
                if !self.is_known_target(&req.target) {
                    return Err(SchemaError::UnknownOptionReferenced {
                        referrer: category.name.clone(),
                        target: req.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn merge_option(
    decl: &OptionDecl,
    category: Option<&str>,
    options: &mut Vec<OptionEntry>,
    option_index: &mut BTreeMap<String, usize>,
) -> Result<(), SchemaError> {
    validate_name(&decl.name)?;
    if let Some(group) = &decl.selection_group {
        validate_name(group)?;
    }

    let def = OptionDef {
        display_name: decl.display_name.clone(),
        help: decl.help.clone(),
        selection_group: decl.selection_group.clone(),
        requires: parse_requirements(&decl.requires),
        chips: chip_set(&decl.chips),
        category: category.map(str::to_string),
    };

    match option_index.get(&decl.name) {
        None => {
            option_index.insert(decl.name.clone(), options.len());
            options.push(OptionEntry {
                name: decl.name.clone(),
                variants: vec![def],
            });
        }
        Some(&idx) => {
            let entry = &mut options[idx];
            let Some(new_chips) = def.chips.as_ref() else {
                return Err(SchemaError::AmbiguousDuplicateOption {
                    name: decl.name.clone(),
                });
            };
            for existing in &entry.variants {
                let overlapping = match existing.chips.as_ref() {
                    None => true,
                    Some(existing_chips) => !existing_chips.is_disjoint(new_chips),
                };
                if overlapping {
                    return Err(SchemaError::AmbiguousDuplicateOption {
                        name: decl.name.clone(),
                    });
                }
            }
            entry.variants.push(def);
        }
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), SchemaError> {
    let well_formed = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if well_formed {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn parse_requirements(raw: &[String]) -> Vec<Requirement> {
    raw.iter().map(|s| Requirement::parse(s)).collect()
}

// An empty chip list means "all chips", matching the absent case.
fn chip_set(chips: &[ChipId]) -> Option<BTreeSet<ChipId>> {
    if chips.is_empty() {
        None
    } else {
        Some(chips.iter().cloned().collect())
    }
}

/// Parse, contract-validate, and load a document from JSON text.
pub fn load_model_from_str(data: &str) -> Result<SchemaModel> {
    let value: serde_json::Value =
        serde_json::from_str(data).context("parsing option document")?;
    contract::validate_document(&value)?;
    let doc: SchemaDocument =
        serde_json::from_value(value).context("deserializing option document")?;
    Ok(SchemaModel::from_document(&doc)?)
}

/// Load a document from disk.
pub fn load_model_from_path(path: &Path) -> Result<SchemaModel> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading option document {}", path.display()))?;
    load_model_from_str(&data).with_context(|| format!("loading option document {}", path.display()))
}
