use anyhow::Result;
use insta::assert_snapshot;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, SPELLS_JSON};

#[test]
fn test_extract_writes_template_and_source_locale() -> Result<()> {
    let test = CliTest::with_file("src/5e-SRD-Spells.json", SPELLS_JSON)?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Extracted 1 source file (5 dictionary entries)
      templates:     multilingual-support/templates
      source locale: multilingual-support/source-locale.json
      2 files written

    ----- stderr -----
    ");

    assert_snapshot!(
        test.read_file("multilingual-support/templates/5e-SRD-Spells.json")?,
        @r#"
    [
      {
        "index": "fireball",
        "name": "{{ spells.fireball.name }}",
        "desc": [
          "{{ spells.fireball.desc.0 }}"
        ],
        "range": "{{ common.measurements.a_feet | replace: '{{ a }}', '150' }}",
        "level": 3
      }
    ]
    "#
    );

    assert_snapshot!(
        test.read_file("multilingual-support/source-locale.json")?,
        @r#"
    {
      "common": {
        "delimiters": {
          "and": " and ",
          "and_with_oxford_comma": ", and "
        },
        "measurements": {
          "a_feet": "{{ a }} feet"
        }
      },
      "spells": {
        "fireball": {
          "name": "Fireball",
          "desc": [
            "A bright streak flashes."
          ]
        }
      }
    }
    "#
    );

    Ok(())
}

#[test]
fn test_extract_reports_uncategorized_text() -> Result<()> {
    let test = CliTest::with_file(
        "src/5e-SRD-Spells.json",
        r#"[{ "index": "fireball", "flavor": "Hot" }]"#,
    )?;

    let output = test.extract_command().output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Warnings alone do not fail the run.
    assert!(output.status.success());
    assert!(stdout.contains("warning: \"Hot\"  uncategorized"));
    assert!(stdout.contains("src/5e-SRD-Spells.json @ spells.fireball.flavor"));
    assert!(stdout.contains("1 problems (0 errors, 1 warning)"));

    let template = test.read_file("multilingual-support/templates/5e-SRD-Spells.json")?;
    assert!(template.contains("\"flavor\": \"Hot\""));

    Ok(())
}

#[test]
fn test_extract_shares_repeated_phrases_across_files() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "src/5e-SRD-Spells.json",
        r#"[{ "index": "light", "name": "Light" }]"#,
    )?;
    test.write_file(
        "src/5e-SRD-Monsters.json",
        r#"[{ "index": "will-o-wisp", "desc": ["Light"] }]"#,
    )?;

    let output = test.extract_command().output()?;
    assert!(output.status.success());

    // Monsters is deferred, so the spell claims the phrase first.
    let monsters = test.read_file("multilingual-support/templates/5e-SRD-Monsters.json")?;
    assert!(monsters.contains("\"{{ spells.light.name }}\""));

    Ok(())
}

#[test]
fn test_extract_broken_file_is_contained() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/5e-SRD-Spells.json", SPELLS_JSON)?;
    test.write_file("src/5e-SRD-Broken.json", "[{ \"name\": ")?;

    let output = test.extract_command().output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("error: \"failed to load source file\"  parse-error"));
    assert!(
        test.root()
            .join("multilingual-support/templates/5e-SRD-Spells.json")
            .exists()
    );
    assert!(
        !test
            .root()
            .join("multilingual-support/templates/5e-SRD-Broken.json")
            .exists()
    );

    Ok(())
}

#[test]
fn test_extract_missing_source_dir() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("Source directory 'src' does not exist."));
    assert!(stderr.contains("'sourceDir'"));

    Ok(())
}

#[test]
fn test_extract_respects_config_and_overrides() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".lexisrc.json",
        r#"{
          "sourceDir": "data",
          "filePrefix": "srd-",
          "ignores": ["*Backup*"]
        }"#,
    )?;
    test.write_file("data/srd-Spells.json", SPELLS_JSON)?;
    test.write_file("data/srd-Spells-Backup.json", SPELLS_JSON)?;

    let output = test
        .extract_command()
        .args(["--templates-dir", "out/templates"])
        .output()?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(test.root().join("out/templates/srd-Spells.json").exists());
    assert!(
        !test
            .root()
            .join("out/templates/srd-Spells-Backup.json")
            .exists()
    );

    Ok(())
}
