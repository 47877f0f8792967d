use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const PAYLOAD: &str = r#"{
    "id": "set",
    "emotes": [
        {
            "id": "e1",
            "name": "Apple",
            "data": { "host": { "url": "//cdn.7tv.app/emote/e1" }, "owner": { "display_name": "Orchard" } }
        },
        {
            "id": "e2",
            "name": "Application",
            "data": { "host": { "url": "//cdn.7tv.app/emote/e2" } }
        },
        {
            "id": "e3",
            "name": "Banana",
            "data": { "animated": true, "host": { "url": "//cdn.7tv.app/emote/e3" } }
        },
        {
            "id": "e4",
            "name": "KEKW",
            "data": { "host": { "url": "//cdn.7tv.app/emote/e4" }, "owner": { "username": "kek" } }
        },
        {
            "id": "e5",
            "name": "NoHost",
            "data": {}
        }
    ]
}"#;

fn write_payload(dir: &Path) -> PathBuf {
    let path = dir.join("set.json");
    fs::write(&path, PAYLOAD).unwrap();
    path
}

#[allow(deprecated)]
fn emotes(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("emotes").expect("binary");
    cmd.current_dir(dir)
        .arg("--quiet")
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn render_html_replaces_whole_words_only() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    emotes(temp.path())
        .arg("--payload")
        .arg(&payload)
        .args(["render", "hi KEKW xKEKW <b>"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("hi <img class=\"emote\" src=\"https://cdn.7tv.app/emote/e4/2x.webp\""))
        .stdout(predicate::str::contains("data-creator=\"by kek\""))
        .stdout(predicate::str::contains(" xKEKW &lt;b&gt;"));
}

#[test]
fn render_colon_policy_json_segments() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    let body = stdout_json(
        emotes(temp.path())
            .arg("--payload")
            .arg(&payload)
            .args(["--policy", "colon", "render", "--format", "json", "ok :Banana: Banana"]),
    );

    let segments = body.as_array().expect("segments");
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0]["kind"], "literal");
    assert_eq!(segments[0]["text"], "ok ");
    assert_eq!(segments[1]["kind"], "emote");
    assert_eq!(segments[1]["name"], "Banana");
    assert_eq!(segments[1]["matched"], ":Banana:");
    assert_eq!(segments[2]["text"], " Banana");
}

#[test]
fn render_plain_reads_stdin_lines() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    emotes(temp.path())
        .arg("--payload")
        .arg(&payload)
        .args(["--policy", "case-insensitive", "render", "--format", "plain"])
        .write_stdin("kekw lol\nbanana\n")
        .assert()
        .success()
        .stdout("KEKW lol\nBanana\n");
}

#[test]
fn search_orders_exact_prefix_then_rest() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    let body = stdout_json(
        emotes(temp.path())
            .arg("--payload")
            .arg(&payload)
            .args(["search", "app", "--json"]),
    );
    assert_eq!(body, serde_json::json!(["Apple", "Application"]));

    let body = stdout_json(
        emotes(temp.path())
            .arg("--payload")
            .arg(&payload)
            .args(["search", "an", "--limit", "1", "--json"]),
    );
    assert_eq!(body, serde_json::json!(["Banana"]));
}

#[test]
fn lookup_reports_links_and_preview() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    let body = stdout_json(
        emotes(temp.path())
            .arg("--payload")
            .arg(&payload)
            .args(["lookup", "Apple", "--json"]),
    );
    assert_eq!(body["record"]["creator_label"], "Orchard");
    assert_eq!(body["links"]["page_url"], "https://7tv.app/emotes/e1");
    assert_eq!(body["links"]["image_4x"], "https://cdn.7tv.app/emote/e1/4x.webp");
    assert_eq!(body["preview"]["preview_url"], "https://cdn.7tv.app/emote/e1/3x.webp");

    emotes(temp.path())
        .arg("--payload")
        .arg(&payload)
        .args(["lookup", "NoHost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown emote"));
}

#[test]
fn stats_counts_skipped_entries() {
    let temp = tempdir().unwrap();
    let payload = write_payload(temp.path());

    let body = stdout_json(
        emotes(temp.path())
            .arg("--payload")
            .arg(&payload)
            .args(["stats", "--json"]),
    );
    assert_eq!(body["emotes"], 4);
    assert_eq!(body["animated"], 1);
    assert_eq!(body["skipped_no_asset"], 1);
    assert_eq!(body["policy"], "word");
}

#[test]
fn malformed_payload_fails_load() {
    let temp = tempdir().unwrap();
    let payload = temp.path().join("bad.json");
    fs::write(&payload, r#"{"id":"set"}"#).unwrap();

    emotes(temp.path())
        .arg("--payload")
        .arg(&payload)
        .args(["render", "KEKW"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load emotes"));
}

#[test]
fn config_init_then_show_round_trips() {
    let temp = tempdir().unwrap();

    emotes(temp.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(temp.path().join("config.toml").exists());

    emotes(temp.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    emotes(temp.path())
        .args(["--policy", "colon", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("match_policy = \"colon\""))
        .stdout(predicate::str::contains("emote_set_id = \"01FE9DRF000009TR6M9N941CYW\""));
}
