#![allow(dead_code)]

// Shared fixture builders: documents are assembled as JSON values so tests
// stay close to the serialized form the loader actually consumes.

use anyhow::{Context, Result};
use genopts::{ChipId, ConstraintGraph, SchemaDocument, SchemaModel, load_model_from_str};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub fn document(nodes: Vec<Value>) -> Value {
    json!({
        "schema_version": "generator_options_v1",
        "nodes": nodes
    })
}

/// Bare option node with no constraints.
pub fn option(name: &str) -> Value {
    json!({
        "name": name,
        "display_name": name,
        "help": format!("option {name}")
    })
}

/// Option node with constraints. Empty lists are omitted so fixtures match
/// hand-written documents.
pub fn option_with(name: &str, requires: &[&str], group: Option<&str>, chips: &[&str]) -> Value {
    let mut node = serde_json::Map::new();
    node.insert("name".to_string(), json!(name));
    node.insert("display_name".to_string(), json!(name));
    node.insert("help".to_string(), json!(format!("option {name}")));
    if !requires.is_empty() {
        node.insert("requires".to_string(), json!(requires));
    }
    if let Some(group) = group {
        node.insert("selection_group".to_string(), json!(group));
    }
    if !chips.is_empty() {
        node.insert("chips".to_string(), json!(chips));
    }
    Value::Object(node)
}

pub fn category(name: &str, requires: &[&str], options: Vec<Value>) -> Value {
    let mut node = serde_json::Map::new();
    node.insert("name".to_string(), json!(name));
    node.insert("display_name".to_string(), json!(name));
    if !requires.is_empty() {
        node.insert("requires".to_string(), json!(requires));
    }
    node.insert("options".to_string(), json!(options));
    Value::Object(node)
}

/// Deserialize a fixture into the loader's input type, bypassing the
/// contract so structural checks can be exercised directly.
pub fn parse_document(doc: &Value) -> Result<SchemaDocument> {
    serde_json::from_value(doc.clone()).context("deserializing fixture document")
}

/// Full load path: contract validation plus structural load.
pub fn load_model(doc: &Value) -> Result<SchemaModel> {
    load_model_from_str(&doc.to_string())
}

pub fn load_model_and_graph(doc: &Value) -> Result<(SchemaModel, ConstraintGraph)> {
    let model = load_model(doc)?;
    let graph = ConstraintGraph::build(&model)?;
    Ok((model, graph))
}

pub fn chip(name: &str) -> ChipId {
    ChipId::from(name)
}

pub fn requested(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
    entries
        .iter()
        .map(|(name, on)| (name.to_string(), *on))
        .collect()
}
