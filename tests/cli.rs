// Binary smoke tests: the headless resolver and the document checker, run
// as real processes.
#[path = "support/common.rs"]
mod common;

use anyhow::{Context, Result};
use common::{document, option_with};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn resolve_options() -> Command {
    Command::new(env!("CARGO_BIN_EXE_resolve-options"))
}

fn schema_check() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schema-check"))
}

fn selection_from(output: &Output) -> Result<BTreeMap<String, bool>> {
    serde_json::from_slice(&output.stdout).context("parsing selection JSON from stdout")
}

#[test]
fn resolves_a_consistent_selection() -> Result<()> {
    let output = resolve_options()
        .args(["--chip", "esp32c6", "-o", "wifi"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let selection = selection_from(&output)?;
    assert_eq!(selection["wifi"], true);
    assert_eq!(selection["alloc"], true);
    assert_eq!(selection["unstable-hal"], true);
    assert_eq!(selection["wokwi"], false);
    Ok(())
}

#[test]
fn conflicting_selection_fails_but_still_prints_the_result() -> Result<()> {
    let output = resolve_options()
        .args(["--chip", "esp32c6", "-o", "ble-bleps,ble-trouble"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("can not be enabled together"),
        "stderr: {stderr}"
    );
    // Best-effort selection is printed regardless.
    let selection = selection_from(&output)?;
    assert_eq!(selection["ble-bleps"], true);
    assert_eq!(selection["ble-trouble"], true);
    Ok(())
}

#[test]
fn incompatible_chip_selection_fails() -> Result<()> {
    let output = resolve_options()
        .args(["--chip", "esp32c2", "-o", "wokwi"])
        .output()?;

    assert!(!output.status.success());
    let selection = selection_from(&output)?;
    assert_eq!(selection["wokwi"], false);
    Ok(())
}

#[test]
fn listing_respects_the_chip() -> Result<()> {
    let output = resolve_options()
        .args(["--chip", "esp32c2", "--list"])
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("wifi"));
    assert!(!stdout.contains("wokwi"));
    Ok(())
}

#[test]
fn schema_check_accepts_the_bundled_document() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/options_esp_v1.json");
    let output = schema_check().args(["--file", path]).output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ok:"), "stdout: {stdout}");
    Ok(())
}

#[test]
fn schema_check_rejects_a_requirement_cycle() -> Result<()> {
    let doc = document(vec![
        option_with("a", &["b"], None, &[]),
        option_with("b", &["a"], None, &[]),
    ]);
    let mut file = NamedTempFile::new()?;
    file.write_all(doc.to_string().as_bytes())?;

    let output = schema_check()
        .arg("--file")
        .arg(file.path())
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cycle"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn schema_check_reads_stdin() -> Result<()> {
    use std::process::Stdio;

    let doc = document(vec![option_with("alloc", &[], None, &[])]);
    let mut child = schema_check()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .context("child stdin")?
        .write_all(doc.to_string().as_bytes())?;
    let output = child.wait_with_output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    Ok(())
}

#[test]
fn resolve_options_accepts_a_custom_document() -> Result<()> {
    let doc = document(vec![
        option_with("base", &[], None, &[]),
        option_with("feature", &["base"], None, &[]),
    ]);
    let mut file = NamedTempFile::new()?;
    file.write_all(doc.to_string().as_bytes())?;

    let output = resolve_options()
        .arg("--chip")
        .arg("esp32c6")
        .arg("--schema")
        .arg(file.path())
        .args(["-o", "feature"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let selection = selection_from(&output)?;
    assert_eq!(selection["base"], true);
    assert_eq!(selection["feature"], true);
    Ok(())
}
