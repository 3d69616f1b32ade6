//! Tests for the scm-bridge binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GITEA_PUSH: &str = r#"{
  "secret": "",
  "ref": "refs/heads/main",
  "before": "4522c9b1ee6eb9c2bb7a0e2bf9f7d67dd3d4b1f0",
  "after": "ef98532add3b2feb7a137426bba1248724367df5",
  "compare_url": "https://try.gitea.io/gitea/hello-world/compare/4522c9b1ee6e...ef98532add3b",
  "commits": [{
    "id": "ef98532add3b2feb7a137426bba1248724367df5",
    "message": "updated README\n",
    "url": "https://try.gitea.io/gitea/hello-world/commit/ef98532add3b2feb7a137426bba1248724367df5",
    "author": { "name": "gitea", "email": "gitea@gitea.io", "username": "gitea" },
    "committer": { "name": "gitea", "email": "gitea@gitea.io", "username": "gitea" },
    "timestamp": "2017-12-25T17:17:13Z"
  }],
  "repository": {
    "id": 6,
    "owner": { "id": 1, "login": "gitea", "full_name": "", "email": "gitea@gitea.io", "username": "gitea" },
    "name": "hello-world",
    "full_name": "gitea/hello-world",
    "private": false,
    "html_url": "https://try.gitea.io/gitea/hello-world",
    "ssh_url": "git@try.gitea.io:gitea/hello-world.git",
    "clone_url": "https://try.gitea.io/gitea/hello-world.git",
    "default_branch": "main"
  },
  "pusher": { "id": 1, "login": "gitea", "email": "gitea@gitea.io", "username": "gitea" },
  "sender": { "id": 1, "login": "gitea", "email": "gitea@gitea.io", "username": "gitea" }
}"#;

/// Working directory with the payload written to `body.json`.
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("body.json"), GITEA_PUSH).expect("write body");
    dir
}

fn scm_bridge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scm-bridge").expect("binary builds");
    cmd.current_dir(dir.path())
        .env_remove("SCM_BRIDGE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn signature(dir: &TempDir, secret: &str) -> String {
    let output = scm_bridge(dir)
        .args(["sign", "--secret", secret, "--body", "body.json"])
        .output()
        .expect("sign runs");
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .expect("utf-8")
        .trim()
        .to_string()
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn test_parse_signed_delivery() {
    let dir = workspace();
    let signature = signature(&dir, "s3cr3t");

    scm_bridge(&dir)
        .args(["parse", "--driver", "gitea", "--body", "body.json"])
        .args(["-H", "X-Gitea-Event: push"])
        .args(["-H", &format!("X-Gitea-Signature: {}", signature)])
        .args(["--secret", "s3cr3t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"push\""))
        .stdout(predicate::str::contains("gitea/hello-world"));
}

#[test]
fn test_parse_reads_stdin() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["parse", "--driver", "gitea", "--body", "-"])
        .args(["-H", "X-Gitea-Event: push"])
        .write_stdin(GITEA_PUSH)
        .assert()
        .success()
        .stdout(predicate::str::contains("ef98532add3b2feb7a137426bba1248724367df5"));
}

#[test]
fn test_parse_bad_signature_exits_3() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["parse", "--driver", "gitea", "--body", "body.json"])
        .args(["-H", "X-Gitea-Event: push"])
        .args(["-H", "X-Gitea-Signature: 00ff"])
        .args(["--secret", "s3cr3t"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid webhook signature"));
}

#[test]
fn test_parse_secret_from_environment() {
    let dir = workspace();

    scm_bridge(&dir)
        .env("SCM_BRIDGE__SECRETS__GITEA", "s3cr3t")
        .args(["parse", "--driver", "gitea", "--body", "body.json"])
        .args(["-H", "X-Gitea-Event: push"])
        .assert()
        .code(3);
}

#[test]
fn test_parse_unknown_event_exits_2() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["parse", "--driver", "gitea", "--body", "body.json"])
        .args(["-H", "X-Gitea-Event: wiki"])
        .assert()
        .code(2);
}

#[test]
fn test_parse_invalid_json_exits_4() {
    let dir = workspace();
    fs::write(dir.path().join("broken.json"), "{").expect("write body");

    scm_bridge(&dir)
        .args(["parse", "--driver", "gitea", "--body", "broken.json"])
        .args(["-H", "X-Gitea-Event: push"])
        .assert()
        .code(4);
}

// ============================================================================
// Other commands
// ============================================================================

#[test]
fn test_sign_with_prefix() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["sign", "--algorithm", "sha1", "--secret", "k", "--body", "body.json", "--prefix"])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^sha1=[0-9a-f]{40}\n$").expect("valid regex"));
}

#[test]
fn test_drivers_lists_headers() {
    let dir = workspace();

    scm_bridge(&dir)
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("X-Gitee-Token"))
        .stdout(predicate::str::contains("codecommit"));
}

#[test]
fn test_config_show_uses_default_file_and_redacts() {
    let dir = workspace();
    fs::write(
        dir.path().join("scm-bridge.toml"),
        "[secrets]\ngithub = \"do-not-print\"\n",
    )
    .expect("write config");

    scm_bridge(&dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github = \"<REDACTED>\""))
        .stdout(predicate::str::contains("do-not-print").not());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["--config", "missing.toml", "config"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_repo_for_driver_without_services_fails() {
    let dir = workspace();

    scm_bridge(&dir)
        .args(["repo", "--driver", "stash", "PRJ/repo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not supported by the stash driver"));
}
