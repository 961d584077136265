//! End-to-end tests of the `sermon-templates` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sermon-templates").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "site_url = \"https://church.example/sermons/\"\n").unwrap();
    (temp, config)
}

#[test]
fn test_set_and_render_template() {
    let (temp, config) = setup();
    let template = temp.path().join("single.html");
    fs::write(&template, "<h1>[sermon_title]</h1>").unwrap();
    let data = temp.path().join("data.json");
    fs::write(&data, r#"{"sermon": {"id": 3, "title": "Grace"}}"#).unwrap();

    cmd(&config)
        .args(["template", "set", "single"])
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved single template"));

    cmd(&config)
        .args(["render", "single", "--data"])
        .arg(&data)
        .assert()
        .success()
        .stdout("<h1>Grace</h1>\n");

    cmd(&config)
        .args(["render", "search", "--data"])
        .arg(&data)
        .assert()
        .success()
        .stdout("\n");

    assert!(temp.path().join("state.json").exists());
}

#[test]
fn test_render_rejects_unknown_type() {
    let (_temp, config) = setup();
    cmd(&config)
        .args(["render", "archive"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("archive"));
}

#[test]
fn test_migrate_reports_unknown_tags() {
    let (temp, config) = setup();
    let template = temp.path().join("search.html");
    fs::write(&template, "[sermons_loop][sermon_title] [legacy_tag][/sermons_loop]").unwrap();
    cmd(&config).args(["template", "set", "search"]).arg(&template).assert().success();

    cmd(&config)
        .args(["migrate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy_tag"))
        .stdout(predicate::str::contains("Dry run complete"));

    cmd(&config)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown tags found: legacy_tag"));

    let state = fs::read_to_string(temp.path().join("state.json")).unwrap();
    assert!(state.contains("search_template_backup"));
    assert!(state.contains("template_engine_version"));
}

#[test]
fn test_restore_without_backup_fails() {
    let (_temp, config) = setup();
    cmd(&config)
        .arg("restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No template backup found"));
}

#[test]
fn test_cache_clear_counts_entries() {
    let (_temp, config) = setup();
    cmd(&config).args(["render", "single"]).assert().success();
    cmd(&config).args(["render", "search"]).assert().success();

    cmd(&config)
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 cached render(s)"));
}

#[test]
fn test_tags_lists_catalogue() {
    let (_temp, config) = setup();
    cmd(&config)
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("[sermons_loop]"))
        .stdout(predicate::str::contains("[/passages_loop]"))
        .stdout(predicate::str::contains("[sermon_title]"));
}
