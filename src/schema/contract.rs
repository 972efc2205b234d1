//! JSON Schema contract for the serialized document form.
//!
//! The loader performs the structural checks the model depends on; the
//! contract catches malformed documents up front with pointable error
//! messages. Compiled once per process.

use anyhow::{Result, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::LazyLock;

/// Raw JSON Schema for option documents.
pub const OPTION_SCHEMA_CONTRACT: &str = include_str!("../../schemas/option_schema.schema.json");

static CONTRACT_VALUE: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(OPTION_SCHEMA_CONTRACT).expect("bundled document contract is valid JSON")
});

static CONTRACT: LazyLock<JSONSchema> = LazyLock::new(|| {
    JSONSchema::compile(&CONTRACT_VALUE).expect("bundled document contract compiles")
});

/// Validate a raw document value against the contract.
pub fn validate_document(value: &Value) -> Result<()> {
    if let Err(errors) = CONTRACT.validate(value) {
        let details = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
        bail!("option document failed contract validation:\n{details}");
    }
    Ok(())
}
