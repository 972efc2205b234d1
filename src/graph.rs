//! Constraint graph derived from a loaded schema.
//!
//! Nodes are option and category names. Positive edges ("selecting A forces
//! B") drive the resolver's closure and are subject to cycle detection;
//! negative edges express exclusion, never propagate, and are exempt from
//! cycle analysis. Every option also carries an implicit positive edge to
//! its owning category, so category gating needs no special casing in the
//! resolver. Edges keep the chip list of the variant that declared them, so
//! a chip-specific variant only constrains the chips it covers.

use crate::error::SchemaError;
use crate::schema::{ChipId, Polarity, SchemaModel};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of node an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Option,
    Category,
}

/// A directed requirement edge, guarded by the declaring variant's chips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub target: String,
    /// `None` applies on every chip.
    pub chips: Option<BTreeSet<ChipId>>,
}

impl Edge {
    pub fn admits(&self, chip: &ChipId) -> bool {
        self.chips.as_ref().is_none_or(|set| set.contains(chip))
    }
}

/// Option membership in a selection group, guarded like an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub option: String,
    pub chips: Option<BTreeSet<ChipId>>,
}

impl GroupMember {
    pub fn admits(&self, chip: &ChipId) -> bool {
        self.chips.as_ref().is_none_or(|set| set.contains(chip))
    }
}

/// Direct relationship view for one option, as a UI or CLI presents it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    /// Targets the chip-visible variant positively requires.
    pub requires: Vec<String>,
    /// Selected names that forbid the option: a selected target of one of
    /// its negative terms, a selected option that negatively requires it,
    /// or a selected sibling in its selection group.
    pub disabled_by: Vec<String>,
}

/// Derived, immutable constraint view over a [`SchemaModel`].
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    positive: BTreeMap<String, Vec<Edge>>,
    negative: BTreeMap<String, Vec<Edge>>,
    groups: BTreeMap<String, Vec<GroupMember>>,
    /// Declaration-ordered node list; drives deterministic traversal.
    nodes: Vec<(String, NodeKind)>,
}

impl ConstraintGraph {
    /// Derive the graph and reject schemas with positive requirement cycles.
    ///
    /// Adjacency unions every variant's edges; a positive cycle that spans
    /// variants visible to different chips is still a schema defect.
    pub fn build(model: &SchemaModel) -> Result<ConstraintGraph, SchemaError> {
        let mut positive: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        let mut negative: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        let mut groups: BTreeMap<String, Vec<GroupMember>> = BTreeMap::new();
        let mut nodes: Vec<(String, NodeKind)> = Vec::new();

        for entry in model.options() {
            nodes.push((entry.name.clone(), NodeKind::Option));
            let pos = positive.entry(entry.name.clone()).or_default();
            let neg = negative.entry(entry.name.clone()).or_default();
            for variant in &entry.variants {
                for req in &variant.requires {
                    let edge = Edge {
                        target: req.target.clone(),
                        chips: variant.chips.clone(),
                    };
                    match req.polarity {
                        Polarity::Positive => pos.push(edge),
                        Polarity::Negative => neg.push(edge),
                    }
                }
                if let Some(category) = &variant.category {
                    pos.push(Edge {
                        target: category.clone(),
                        chips: variant.chips.clone(),
                    });
                }
                if let Some(group) = &variant.selection_group {
                    groups.entry(group.clone()).or_default().push(GroupMember {
                        option: entry.name.clone(),
                        chips: variant.chips.clone(),
                    });
                }
            }
        }

        for category in model.categories() {
            nodes.push((category.name.clone(), NodeKind::Category));
            let pos = positive.entry(category.name.clone()).or_default();
            let neg = negative.entry(category.name.clone()).or_default();
            for req in &category.requires {
                let edge = Edge {
                    target: req.target.clone(),
                    chips: None,
                };
                match req.polarity {
                    Polarity::Positive => pos.push(edge),
                    Polarity::Negative => neg.push(edge),
                }
            }
        }

        let graph = ConstraintGraph {
            positive,
            negative,
            groups,
            nodes,
        };
        graph.check_cycles()?;
        Ok(graph)
    }

    /// Positive requirement edges leaving `node` (including category gates).
    pub fn positive_edges(&self, node: &str) -> &[Edge] {
        self.positive.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Negative requirement edges leaving `node`.
    pub fn negative_edges(&self, node: &str) -> &[Edge] {
        self.negative.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Selection groups with their members in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[GroupMember])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Declaration-ordered nodes.
    pub fn nodes(&self) -> &[(String, NodeKind)] {
        &self.nodes
    }

    /// What `name` directly requires on `chip`, and which members of
    /// `selected` forbid it.
    pub fn relationships(
        &self,
        model: &SchemaModel,
        name: &str,
        chip: &ChipId,
        selected: &BTreeSet<String>,
    ) -> Relationships {
        let mut rel = Relationships::default();
        let Some(entry) = model.find_option(name) else {
            return rel;
        };
        let Some(variant) = entry.variant_for(chip) else {
            return rel;
        };

        for req in &variant.requires {
            match req.polarity {
                Polarity::Positive => rel.requires.push(req.target.clone()),
                Polarity::Negative => {
                    if selected.contains(&req.target) {
                        rel.disabled_by.push(req.target.clone());
                    }
                }
            }
        }

        for other in model.options() {
            if other.name == name || !selected.contains(&other.name) {
                continue;
            }
            let Some(other_variant) = other.variant_for(chip) else {
                continue;
            };
            let disables = other_variant
                .requires
                .iter()
                .any(|req| !req.is_positive() && req.target == name);
            if disables && !rel.disabled_by.contains(&other.name) {
                rel.disabled_by.push(other.name.clone());
            }
        }

        if let Some(group) = &variant.selection_group {
            for member in self.groups.get(group).map(Vec::as_slice).unwrap_or(&[]) {
                if member.option != name
                    && member.admits(chip)
                    && selected.contains(&member.option)
                    && !rel.disabled_by.contains(&member.option)
                {
                    rel.disabled_by.push(member.option.clone());
                }
            }
        }

        rel
    }

    // DFS over positive edges with visiting/visited markers; a back-edge to
    // a node still being visited is a cycle. Iterative so a long requirement
    // chain cannot overflow the stack.
    fn check_cycles(&self) -> Result<(), SchemaError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Visiting,
            Done,
        }

        let mut marks: BTreeMap<&str, Mark> = self
            .nodes
            .iter()
            .map(|(name, _)| (name.as_str(), Mark::New))
            .collect();

        for (start, _) in &self.nodes {
            if marks[start.as_str()] != Mark::New {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
            marks.insert(start.as_str(), Mark::Visiting);

            while let Some(&(node, edge_idx)) = stack.last() {
                let edges = self.positive_edges(node);
                if edge_idx >= edges.len() {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let target = edges[edge_idx].target.as_str();
                match marks.get(target).copied().unwrap_or(Mark::Done) {
                    Mark::New => {
                        marks.insert(target, Mark::Visiting);
                        stack.push((target, 0));
                    }
                    Mark::Visiting => {
                        let from = stack
                            .iter()
                            .position(|(name, _)| *name == target)
                            .unwrap_or(0);
                        let path = stack[from..]
                            .iter()
                            .map(|(name, _)| name.to_string())
                            .collect();
                        return Err(SchemaError::CycleDetected { path });
                    }
                    Mark::Done => {}
                }
            }
        }
        Ok(())
    }
}
