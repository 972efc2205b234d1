//! Headless option resolution for a target chip.
//!
//! Usage:
//!   resolve-options --chip esp32c6 -o wifi
//!   resolve-options --chip esp32c6 -o wifi,embassy -d probe-rs
//!   resolve-options --chip esp32c2 --list
//!
//! Prints the resolved selection as JSON on stdout. Diagnostics are logged
//! and any diagnostic makes the exit status non-zero, so scripts can gate on
//! a consistent configuration while still seeing the best-effort result.

use anyhow::{Result, bail};
use clap::Parser;
use env_logger::{Builder, Env};
use genopts::{ChipId, ConstraintGraph, SchemaModel, resolve, schema, split_list};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resolve-options")]
#[command(about = "Resolve generation options for a target chip")]
struct Cli {
    /// Chip to target.
    #[arg(short, long)]
    chip: String,

    /// Option document path; the bundled ESP document when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Options to enable. Repeatable; comma-separated lists are accepted.
    #[arg(short = 'o', long = "option")]
    option: Vec<String>,

    /// Options to keep disabled even if another selection requires them.
    #[arg(short = 'd', long = "disable")]
    disable: Vec<String>,

    /// List the options applicable to the chip instead of resolving.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or(log::LevelFilter::Info.as_str()))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let model = match &cli.schema {
        Some(path) => schema::load_model_from_path(path)?,
        None => SchemaModel::from_document(schema::default_document())?,
    };
    let graph = ConstraintGraph::build(&model)?;
    let chip = ChipId(cli.chip.clone());

    if cli.list {
        list_options(&model, &graph, &chip);
        return Ok(());
    }

    let mut requested: BTreeMap<String, bool> = BTreeMap::new();
    for raw in &cli.option {
        for name in split_list(raw) {
            requested.insert(name, true);
        }
    }
    for raw in &cli.disable {
        for name in split_list(raw) {
            requested.insert(name, false);
        }
    }

    let result = resolve(&model, &graph, &chip, &requested);
    for diagnostic in &result.diagnostics {
        log::error!("{diagnostic}");
    }

    println!("{}", serde_json::to_string_pretty(&result.selection)?);

    if !result.is_consistent() {
        bail!("Invalid options provided");
    }
    Ok(())
}

fn list_options(model: &SchemaModel, graph: &ConstraintGraph, chip: &ChipId) {
    let none_selected = BTreeSet::new();
    for (name, variant) in model.options_for_chip(chip) {
        let rel = graph.relationships(model, name, chip, &none_selected);
        if rel.requires.is_empty() {
            println!("{name}: {}", variant.display_name);
        } else {
            println!(
                "{name}: {} (requires {})",
                variant.display_name,
                rel.requires.join(", ")
            );
        }
    }
}
