//! Validate an option document.
//!
//! Usage:
//!   schema-check --file schemas/options_esp_v1.json
//!   schema-check < document.json
//!
//! Runs the JSON Schema contract, the structural load, and the constraint
//! graph build (cycle detection) in order, reporting the first failure.

use anyhow::{Context, Result};
use clap::Parser;
use genopts::{ConstraintGraph, SchemaDocument, SchemaModel, validate_document};
use serde_json::Value;
use std::fs::File;
use std::io::{Read, stdin};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "schema-check")]
#[command(about = "Validate a generator option document")]
struct Cli {
    /// Optional input file; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
}

fn read_input(file: Option<PathBuf>) -> Result<Value> {
    let mut buf = String::new();
    if let Some(path) = file {
        File::open(&path)
            .with_context(|| format!("opening input file {}", path.display()))?
            .read_to_string(&mut buf)
            .with_context(|| format!("reading input file {}", path.display()))?;
    } else {
        stdin()
            .read_to_string(&mut buf)
            .context("reading stdin for input JSON")?;
    }
    let value: Value = serde_json::from_str(&buf).context("parsing input JSON")?;
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let value = read_input(cli.file)?;

    validate_document(&value)?;
    let doc: SchemaDocument =
        serde_json::from_value(value).context("deserializing option document")?;
    let model = SchemaModel::from_document(&doc)?;
    let graph = ConstraintGraph::build(&model)?;

    println!(
        "ok: {} options, {} categories, {} selection groups",
        model.options().len(),
        model.categories().len(),
        graph.group_count()
    );
    Ok(())
}
