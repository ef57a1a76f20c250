use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Created "));

    let content = test.read_file(".transcatrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["defaultDomain"], "messages");
    assert_eq!(parsed["locale"], "en");
    assert_eq!(parsed["outputDir"], "./languages");
    assert_eq!(parsed["templateExtension"], "twig");
    assert!(content.contains("  "), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".transcatrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output).trim_end(),
        "Error: .transcatrc.json already exists"
    );

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("templates/index.twig", "{{ 'Hello' | trans }}")?;

    let output = test.extract(&["templates"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("languages/messages.pot").exists());

    Ok(())
}
