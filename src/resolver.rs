//! Option resolution.
//!
//! [`resolve`] is a pure function of the immutable schema, the derived
//! constraint graph, a target chip, and the caller's explicit requests. It
//! seeds an active set from the requests, closes it over positive
//! requirement edges until fixpoint, then validates negative requirements,
//! selection groups, and category gates against the closed set. The closure
//! is purely additive: enabling an option can only enable more options,
//! never silently disable others. Conflicts always surface as diagnostics.

use crate::diagnostics::Diagnostic;
use crate::graph::ConstraintGraph;
use crate::schema::{ChipId, Polarity, SchemaModel};
use std::collections::{BTreeMap, BTreeSet};

/// Final selection plus ordered findings for one resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Every known option name mapped to its final state. Chip-inapplicable
    /// options are always `false`.
    pub selection: BTreeMap<String, bool>,
    /// Findings in production order; empty means the configuration is
    /// consistent.
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolutionResult {
    pub fn is_consistent(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Names of the enabled options.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.selection
            .iter()
            .filter(|&(_, &on)| on)
            .map(|(name, _)| name.as_str())
    }
}

/// Resolve `requested` against `model` for `chip`.
///
/// `requested` holds only the caller's explicit choices; absent options are
/// unconstrained and default to off unless a requirement forces them on.
pub fn resolve(
    model: &SchemaModel,
    graph: &ConstraintGraph,
    chip: &ChipId,
    requested: &BTreeMap<String, bool>,
) -> ResolutionResult {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut active: BTreeSet<String> = BTreeSet::new();
    // Insertion-ordered view of `active`; doubles as the closure worklist.
    let mut worklist: Vec<String> = Vec::new();
    let mut chip_rejected: BTreeSet<String> = BTreeSet::new();

    // Requested names that do not exist in the schema. They have no
    // declaration position, so they come out in name order.
    for name in requested.keys() {
        if model.find_option(name).is_none() {
            diagnostics.push(Diagnostic::UnknownOptionRequested {
                option: name.clone(),
            });
        }
    }

    // Chip filtering and seeding, in declaration order. An explicit request
    // for an inapplicable option is reported and pinned off; resolution
    // continues for the rest.
    for entry in model.options() {
        if requested.get(&entry.name) != Some(&true) {
            continue;
        }
        if entry.applies_to(chip) {
            if active.insert(entry.name.clone()) {
                worklist.push(entry.name.clone());
            }
        } else {
            chip_rejected.insert(entry.name.clone());
            diagnostics.push(Diagnostic::ChipIncompatibleSelection {
                option: entry.name.clone(),
                chip: chip.clone(),
                forced_by: None,
            });
        }
    }

    // Positive closure. Each node enters the active set at most once, so
    // this terminates after at most |nodes| rounds. Edges are guarded by the
    // declaring variant's chips; only edges the target chip admits fire.
    let mut cursor = 0;
    while cursor < worklist.len() {
        let node = worklist[cursor].clone();
        cursor += 1;
        for edge in graph.positive_edges(&node) {
            if !edge.admits(chip) || active.contains(&edge.target) {
                continue;
            }
            if let Some(target) = model.find_option(&edge.target) {
                if !target.applies_to(chip) {
                    // Forcing an option the chip cannot have is a hard
                    // conflict; the target stays out of the active set.
                    if chip_rejected.insert(target.name.clone()) {
                        diagnostics.push(Diagnostic::ChipIncompatibleSelection {
                            option: target.name.clone(),
                            chip: chip.clone(),
                            forced_by: Some(node.clone()),
                        });
                    }
                    continue;
                }
            }
            active.insert(edge.target.clone());
            worklist.push(edge.target.clone());
        }
    }

    // Negative validation. Never removes members; a violated `!target` only
    // invalidates the configuration. Options first, then categories, each in
    // declaration order.
    for entry in model.options() {
        if !active.contains(&entry.name) {
            continue;
        }
        for edge in graph.negative_edges(&entry.name) {
            if edge.admits(chip) && active.contains(&edge.target) {
                diagnostics.push(Diagnostic::NegativeRequirementViolated {
                    option: entry.name.clone(),
                    conflicting: edge.target.clone(),
                });
            }
        }
    }
    for category in model.categories() {
        if !active.contains(&category.name) {
            continue;
        }
        for edge in graph.negative_edges(&category.name) {
            if edge.admits(chip) && active.contains(&edge.target) {
                diagnostics.push(Diagnostic::NegativeRequirementViolated {
                    option: category.name.clone(),
                    conflicting: edge.target.clone(),
                });
            }
        }
    }

    // Selection groups: at most one active member per group. Multiplicity is
    // reported, never auto-resolved, so an explicit user choice is never
    // silently dropped.
    for (group, members) in graph.groups() {
        let mut selected_members: Vec<String> = Vec::new();
        for member in members {
            if member.admits(chip)
                && active.contains(&member.option)
                && !selected_members.contains(&member.option)
            {
                selected_members.push(member.option.clone());
            }
        }
        if selected_members.len() > 1 {
            diagnostics.push(Diagnostic::GroupConflict {
                group: group.to_string(),
                members: selected_members,
            });
        }
    }

    // Category gates: an active option whose owning category's requirements
    // do not hold against the active set should not have been selectable.
    for entry in model.options() {
        if !active.contains(&entry.name) {
            continue;
        }
        let Some(variant) = entry.variant_for(chip) else {
            continue;
        };
        let Some(category_name) = &variant.category else {
            continue;
        };
        let Some(category) = model.find_category(category_name) else {
            continue;
        };
        let unsatisfied = category.requires.iter().any(|req| match req.polarity {
            Polarity::Positive => !active.contains(&req.target),
            Polarity::Negative => active.contains(&req.target),
        });
        if unsatisfied {
            diagnostics.push(Diagnostic::CategoryGateUnsatisfied {
                option: entry.name.clone(),
                category: category_name.clone(),
            });
        }
    }

    // Explicit disables the closure overrode. The request is honored in
    // neither direction silently: the option stays on (closure is additive)
    // and the override is reported.
    for entry in model.options() {
        if requested.get(&entry.name) != Some(&false) || !active.contains(&entry.name) {
            continue;
        }
        let required_by: Vec<String> = worklist
            .iter()
            .filter(|node| {
                *node != &entry.name
                    && graph
                        .positive_edges(node)
                        .iter()
                        .any(|edge| edge.admits(chip) && edge.target == entry.name)
            })
            .cloned()
            .collect();
        diagnostics.push(Diagnostic::DisabledOptionRequired {
            option: entry.name.clone(),
            required_by,
        });
    }

    // Finalize over every known option name. Categories are graph nodes but
    // carry no selection state of their own.
    let selection = model
        .options()
        .iter()
        .map(|entry| (entry.name.clone(), active.contains(&entry.name)))
        .collect();

    ResolutionResult {
        selection,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDocument;
    use serde_json::json;

    fn model_and_graph() -> (SchemaModel, ConstraintGraph) {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "schema_version": "generator_options_v1",
            "nodes": [
                {"name": "a", "display_name": "A", "help": "", "requires": ["b"]},
                {"name": "b", "display_name": "B", "help": "", "requires": ["c"]},
                {"name": "c", "display_name": "C", "help": ""},
                {"name": "d", "display_name": "D", "help": ""}
            ]
        }))
        .expect("fixture document parses");
        let model = SchemaModel::from_document(&doc).expect("fixture loads");
        let graph = ConstraintGraph::build(&model).expect("fixture graph builds");
        (model, graph)
    }

    #[test]
    fn closure_is_transitive() {
        let (model, graph) = model_and_graph();
        let chip = ChipId::from("esp32c6");
        let requested = BTreeMap::from([("a".to_string(), true)]);

        let result = resolve(&model, &graph, &chip, &requested);
        assert!(result.is_consistent());
        assert_eq!(
            result.enabled().collect::<Vec<_>>(),
            vec!["a", "b", "c"],
        );
        assert_eq!(result.selection["d"], false);
    }

    #[test]
    fn explicit_false_is_not_a_seed() {
        let (model, graph) = model_and_graph();
        let chip = ChipId::from("esp32c6");
        let requested = BTreeMap::from([("d".to_string(), false)]);

        let result = resolve(&model, &graph, &chip, &requested);
        assert!(result.is_consistent());
        assert!(result.enabled().next().is_none());
    }

    #[test]
    fn overridden_explicit_false_is_reported() {
        let (model, graph) = model_and_graph();
        let chip = ChipId::from("esp32c6");
        let requested =
            BTreeMap::from([("a".to_string(), true), ("c".to_string(), false)]);

        let result = resolve(&model, &graph, &chip, &requested);
        assert_eq!(result.selection["c"], true);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::DisabledOptionRequired {
                option: "c".to_string(),
                required_by: vec!["b".to_string()],
            }]
        );
    }
}
