use std::fs;
use std::path::Path;

use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope
use tempfile::{TempDir, tempdir};

const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
    <category label="General">
        <setting id="enabled" type="bool" default="true" />
        <setting id="volume" type="int" default="50" />
        <setting id="name" type="text" default="guest" />
    </category>
</settings>
"#;

fn install_plugin(root: &Path, plugin_id: &str) {
    let resources = root.join("plugins").join(plugin_id).join("resources");
    fs::create_dir_all(&resources).expect("create resources");
    fs::write(resources.join("settings.xml"), SCHEMA).expect("write schema");
}

fn setup() -> TempDir {
    let dir = tempdir().expect("Failed to create temp directory");
    install_plugin(dir.path(), "plugin.audio.test");
    dir
}

fn plugset(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plugset").expect("plugset binary");
    cmd.arg("--install-root")
        .arg(dir.path().join("plugins"))
        .arg("--profile-root")
        .arg(dir.path().join("profiles"));
    cmd
}

#[test]
fn test_get_reads_schema_default() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["get", "plugin.audio.test", "volume"])
        .assert()
        .success()
        .stdout(predicate::eq("50\n"));

    Ok(())
}

#[test]
fn test_set_persists_value() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["set", "plugin.audio.test", "volume", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("volume = 80"));

    let saved = fs::read_to_string(dir.path().join("profiles/plugin.audio.test/settings.xml"))?;
    assert!(saved.contains("<setting id=\"volume\">80</setting>"));

    plugset(&dir)
        .args(["get", "plugin.audio.test", "volume"])
        .assert()
        .success()
        .stdout(predicate::eq("80\n"));

    Ok(())
}

#[test]
fn test_list_marks_modified_settings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["set", "plugin.audio.test", "enabled", "false"])
        .assert()
        .success();

    plugset(&dir)
        .args(["list", "plugin.audio.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("enabled = false (modified)"))
        .stdout(predicate::str::contains("volume = 50\n"))
        .stdout(predicate::str::contains("name = guest\n"));

    Ok(())
}

#[test]
fn test_defaults_resets_saved_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["set", "plugin.audio.test", "name", "host"])
        .assert()
        .success();
    plugset(&dir)
        .args(["defaults", "plugin.audio.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored default settings"));
    plugset(&dir)
        .args(["get", "plugin.audio.test", "name"])
        .assert()
        .success()
        .stdout(predicate::eq("guest\n"));

    Ok(())
}

#[test]
fn test_instances_use_their_own_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["set", "plugin.audio.test", "volume", "10", "--instance", "2"])
        .assert()
        .success();

    assert!(dir.path().join("profiles/plugin.audio.test/instance-settings-2.xml").is_file());
    plugset(&dir)
        .args(["get", "plugin.audio.test", "volume"])
        .assert()
        .success()
        .stdout(predicate::eq("50\n"));

    Ok(())
}

#[test]
fn test_invalid_value_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["set", "plugin.audio.test", "volume", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rejected"));
    assert!(!dir.path().join("profiles/plugin.audio.test/settings.xml").exists());

    Ok(())
}

#[test]
fn test_unknown_key_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["get", "plugin.audio.test", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Setting not found: missing"));

    Ok(())
}

#[test]
fn test_plugin_id_must_stay_inside_roots() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();
    // Where "../escape" would resolve from the install root
    let outside = dir.path().join("escape");
    fs::create_dir_all(outside.join("resources"))?;
    fs::write(outside.join("resources").join("settings.xml"), SCHEMA)?;

    plugset(&dir)
        .args(["set", "../escape", "volume", "80"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path separators"));
    assert!(!outside.join("settings.xml").exists());

    Ok(())
}

#[test]
fn test_plugin_without_settings_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();

    plugset(&dir)
        .args(["list", "plugin.not.installed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no settings"));

    Ok(())
}

#[test]
fn test_roots_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = setup();
    let config = dir.path().join("engine.json");
    fs::write(
        &config,
        json_config(&dir.path().join("plugins"), &dir.path().join("profiles")),
    )?;

    let mut cmd = Command::cargo_bin("plugset")?;
    cmd.arg("--config")
        .arg(&config)
        .args(["get", "plugin.audio.test", "enabled"])
        .assert()
        .success()
        .stdout(predicate::eq("true\n"));

    Ok(())
}

fn json_config(install_root: &Path, profile_root: &Path) -> String {
    format!(
        "{{ \"install_root\": {:?}, \"profile_root\": {:?} }}",
        install_root.display().to_string(),
        profile_root.display().to_string()
    )
}
