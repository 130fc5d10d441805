use anyhow::Result;
use insta::assert_snapshot;
use serde_json::Value;

use crate::{CliTest, SPELLS_JSON};

const PT_LOCALE: &str = r#"{
  "common": {
    "measurements": { "a_feet": "{{ a }} pés" }
  },
  "spells": {
    "fireball": {
      "name": "Bola de Fogo",
      "desc": ["Um raio brilhante."]
    }
  }
}
"#;

fn extracted_project() -> Result<CliTest> {
    let test = CliTest::with_file("src/5e-SRD-Spells.json", SPELLS_JSON)?;
    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(test)
}

#[test]
fn test_populate_with_source_locale_round_trips() -> Result<()> {
    let test = extracted_project()?;

    let output = test.populate_command().output()?;
    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stdout).contains(
            "✓ Populated 1 of 1 template for en into multilingual-support/output"
        )
    );

    let populated: Value =
        serde_json::from_str(&test.read_file("multilingual-support/output/5e-SRD-Spells.json")?)?;
    let source: Value = serde_json::from_str(SPELLS_JSON)?;
    assert_eq!(populated, source);

    Ok(())
}

#[test]
fn test_populate_merges_locales() -> Result<()> {
    let test = extracted_project()?;
    test.write_file(
        "locales/en.json",
        &test.read_file("multilingual-support/source-locale.json")?,
    )?;
    test.write_file("locales/pt.json", PT_LOCALE)?;

    let output = test
        .populate_command()
        .args(["--locales-dir", "locales"])
        .output()?;
    assert!(
        output.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );

    assert_snapshot!(
        test.read_file("multilingual-support/output/5e-SRD-Spells.json")?,
        @r#"
    [
      {
        "index": "fireball",
        "name": {
          "en": "Fireball",
          "pt": "Bola de Fogo"
        },
        "desc": {
          "en": [
            "A bright streak flashes."
          ],
          "pt": [
            "Um raio brilhante."
          ]
        },
        "range": {
          "en": "150 feet",
          "pt": "150 pés"
        },
        "level": 3
      }
    ]
    "#
    );

    Ok(())
}

#[test]
fn test_populate_single_requested_locale() -> Result<()> {
    let test = extracted_project()?;
    test.write_file("locales/pt.json", PT_LOCALE)?;
    test.write_file("locales/en.json", "{}")?;

    let output = test
        .populate_command()
        .args(["--locales-dir", "locales", "--locale", "pt"])
        .output()?;
    assert!(output.status.success());

    let populated: Value =
        serde_json::from_str(&test.read_file("multilingual-support/output/5e-SRD-Spells.json")?)?;
    assert_eq!(populated[0]["name"], "Bola de Fogo");
    assert_eq!(populated[0]["range"], "150 pés");

    Ok(())
}

#[test]
fn test_populate_missing_entry_is_reported() -> Result<()> {
    let test = extracted_project()?;
    test.write_file(
        "locales/pt.json",
        r#"{ "spells": { "fireball": { "name": "Bola de Fogo" } } }"#,
    )?;

    let output = test
        .populate_command()
        .args(["--locales-dir", "locales"])
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("render-failure"));
    assert!(stdout.contains("/0/desc/0"));

    // The rest of the file is still rendered.
    let populated: Value =
        serde_json::from_str(&test.read_file("multilingual-support/output/5e-SRD-Spells.json")?)?;
    assert_eq!(populated[0]["name"], "Bola de Fogo");
    assert_eq!(populated[0]["desc"][0], "{{ spells.fireball.desc.0 }}");

    Ok(())
}

#[test]
fn test_populate_unknown_locale() -> Result<()> {
    let test = extracted_project()?;
    test.write_file("locales/pt.json", PT_LOCALE)?;

    let output = test
        .populate_command()
        .args(["--locales-dir", "locales", "--locale", "fr"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Locale 'fr' not found"));

    Ok(())
}

#[test]
fn test_populate_without_templates() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("multilingual-support/source-locale.json", "{}")?;

    let output = test.populate_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Templates directory"));

    Ok(())
}
