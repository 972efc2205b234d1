//! In-memory schema model.
//!
//! Two layers live here: the raw serde types that mirror the serialized
//! document form (`SchemaDocument` and friends), and the resolved model the
//! loader produces (`SchemaModel`), where duplicate-named option declarations
//! have been merged into chip-keyed variants and every requirement string has
//! been parsed into a signed term. The resolved model is immutable after load
//! and safe to share across concurrent resolver calls.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque hardware-target identifier, e.g. a chip family name like `esp32c6`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipId(pub String);

impl ChipId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChipId {
    fn from(value: &str) -> Self {
        ChipId(value.to_string())
    }
}

/// Whether a requirement target must be selected or unselected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// A parsed requirement term: a target name plus a polarity.
///
/// The document form is a bare identifier (positive) or `!identifier`
/// (negative). Parsing happens once at load time so the resolver never
/// inspects strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub target: String,
    pub polarity: Polarity,
}

impl Requirement {
    pub fn parse(raw: &str) -> Requirement {
        match raw.strip_prefix('!') {
            Some(rest) => Requirement {
                target: rest.to_string(),
                polarity: Polarity::Negative,
            },
            None => Requirement {
                target: raw.to_string(),
                polarity: Polarity::Positive,
            },
        }
    }

    pub fn is_positive(&self) -> bool {
        self.polarity == Polarity::Positive
    }
}

/// Raw option declaration as it appears in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDecl {
    pub name: String,
    pub display_name: String,
    pub help: String,
    #[serde(default)]
    pub selection_group: Option<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    /// Empty means the option applies to every chip.
    #[serde(default)]
    pub chips: Vec<ChipId>,
}

/// Raw category declaration: a named group of options with its own gate.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDecl {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub requires: Vec<String>,
    pub options: Vec<OptionDecl>,
}

/// A document node is either a category holding options or a bare option.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    Category(CategoryDecl),
    Option(OptionDecl),
}

/// Parsed-but-unvalidated document, the loader's input.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    pub schema_version: String,
    pub nodes: Vec<SchemaNode>,
}

/// One resolved variant of a logical option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    pub display_name: String,
    pub help: String,
    pub selection_group: Option<String>,
    pub requires: Vec<Requirement>,
    /// `None` applies to every chip.
    pub chips: Option<BTreeSet<ChipId>>,
    /// Owning category name, when declared inside one.
    pub category: Option<String>,
}

impl OptionDef {
    pub fn applies_to(&self, chip: &ChipId) -> bool {
        self.chips.as_ref().is_none_or(|set| set.contains(chip))
    }
}

/// A logical option: one name, one or more chip-keyed variants.
///
/// Most options have a single variant. Chip-specific re-declarations of the
/// same name (disjoint chip lists, typically differing help text) merge into
/// one entry here; the active chip picks the visible variant.
#[derive(Debug, Clone)]
pub struct OptionEntry {
    pub name: String,
    pub variants: Vec<OptionDef>,
}

impl OptionEntry {
    /// The variant visible for `chip`, if any. Chip lists are pairwise
    /// disjoint after load, so at most one variant matches.
    pub fn variant_for(&self, chip: &ChipId) -> Option<&OptionDef> {
        self.variants.iter().find(|v| v.applies_to(chip))
    }

    pub fn applies_to(&self, chip: &ChipId) -> bool {
        self.variant_for(chip).is_some()
    }
}

/// Resolved category definition.
#[derive(Debug, Clone)]
pub struct CategoryDef {
    pub name: String,
    pub display_name: String,
    pub requires: Vec<Requirement>,
}

/// Immutable, declaration-ordered view of a loaded document.
///
/// Options and categories keep document order (diagnostics and any
/// downstream presentation depend on it); the `BTreeMap` indexes give
/// deterministic lookup by name.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    pub(crate) options: Vec<OptionEntry>,
    pub(crate) categories: Vec<CategoryDef>,
    pub(crate) option_index: BTreeMap<String, usize>,
    pub(crate) category_index: BTreeMap<String, usize>,
}

impl SchemaModel {
    /// Logical options in declaration order.
    pub fn options(&self) -> &[OptionEntry] {
        &self.options
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn find_option(&self, name: &str) -> Option<&OptionEntry> {
        self.option_index.get(name).map(|&idx| &self.options[idx])
    }

    pub fn find_category(&self, name: &str) -> Option<&CategoryDef> {
        self.category_index
            .get(name)
            .map(|&idx| &self.categories[idx])
    }

    /// Whether `name` is addressable as a requirement target.
    pub fn is_known_target(&self, name: &str) -> bool {
        self.option_index.contains_key(name) || self.category_index.contains_key(name)
    }

    /// Declaration-ordered options applicable to `chip`, with the variant
    /// visible for that chip.
    pub fn options_for_chip<'a>(
        &'a self,
        chip: &'a ChipId,
    ) -> impl Iterator<Item = (&'a str, &'a OptionDef)> {
        self.options
            .iter()
            .filter_map(move |entry| entry.variant_for(chip).map(|v| (entry.name.as_str(), v)))
    }
}
