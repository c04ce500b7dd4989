//! End-to-end tests for the `bw` binary.
//!
//! Every command runs with `--offline` against a temp repository and an
//! isolated global config location, so nothing touches the network or the
//! user's home directory.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A repository on `main` plus an isolated config directory.
struct Fixture {
    repo: TempDir,
    config: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let repo = TempDir::new().unwrap();
        let path = repo.path();
        run_git(path, &["init"]);
        run_git(path, &["config", "user.email", "test@example.com"]);
        run_git(path, &["config", "user.name", "Test User"]);
        run_git(path, &["config", "commit.gpgsign", "false"]);
        std::fs::write(path.join("README.md"), "# Test\n").unwrap();
        run_git(path, &["add", "README.md"]);
        run_git(path, &["commit", "-m", "Initial commit"]);
        run_git(path, &["branch", "-M", "main"]);

        Self {
            repo,
            config: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.repo.path()
    }

    /// `bw --offline --no-interactive --cwd <repo>` with isolated config.
    fn bw(&self) -> Command {
        let mut cmd = Command::cargo_bin("bw").unwrap();
        cmd.env("BRANCHWRIGHT_CONFIG", self.config.path().join("config.toml"))
            .env("XDG_CONFIG_HOME", self.config.path())
            .env_remove("BRANCHWRIGHT_LOG")
            .env_remove("RUST_LOG")
            .arg("--offline")
            .arg("--no-interactive")
            .arg("--cwd")
            .arg(self.path());
        cmd
    }

    fn branch_with_commit(&self, branch: &str, file: &str, content: &str) {
        run_git(self.path(), &["checkout", "-b", branch, "main"]);
        std::fs::write(self.path().join(file), content).unwrap();
        run_git(self.path(), &["add", file]);
        run_git(self.path(), &["commit", "-m", branch]);
        run_git(self.path(), &["checkout", "main"]);
    }

    fn git_output(&self, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("bw")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge").and(predicate::str::contains("name")));
}

#[test]
fn outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("bw")
        .unwrap()
        .args(["--offline", "--cwd"])
        .arg(dir.path())
        .arg("refs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open repository"));
}

#[test]
fn name_picks_next_suffix() {
    let fx = Fixture::new();
    run_git(fx.path(), &["branch", "branch_20240101"]);
    run_git(fx.path(), &["branch", "branch_20240101.3"]);

    fx.bw()
        .args(["name", "--date", "20240101"])
        .assert()
        .success()
        .stdout("branch_20240101.4\n");
}

#[test]
fn name_custom_requires_text() {
    let fx = Fixture::new();
    fx.bw()
        .args(["name", "--custom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name is empty"));
}

#[test]
fn tag_twice_gets_suffix() {
    let fx = Fixture::new();
    for _ in 0..2 {
        fx.bw()
            .args(["tag", "--custom", "-s", "release"])
            .assert()
            .success();
    }

    let tags = fx.git_output(&["tag", "-l"]);
    let tags: Vec<_> = tags.lines().collect();
    assert_eq!(tags, vec!["release", "release.1"]);
}

#[test]
fn branch_created_and_checked_out() {
    let fx = Fixture::new();
    fx.bw()
        .args(["branch", "--base", "main", "--prefix", "release", "--date", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created branch 'release_1' from 'main'"));

    assert_eq!(fx.git_output(&["branch", "--show-current"]), "release_1");
}

#[test]
fn refs_json() {
    let fx = Fixture::new();
    run_git(fx.path(), &["branch", "feature"]);
    run_git(fx.path(), &["tag", "v1"]);

    let output = fx.bw().args(["refs", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["current_branch"], "main");
    assert_eq!(json["fetched"], false);
    assert_eq!(json["local"], serde_json::json!(["feature", "main"]));
    assert_eq!(json["tags"], serde_json::json!(["v1"]));
}

#[test]
fn merge_reports_outcomes() {
    let fx = Fixture::new();
    fx.branch_with_commit("feature", "feature.txt", "feature");

    fx.bw()
        .args(["merge", "feature", "--stop-on-failure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("branch feature (merged)"));
}

#[test]
fn merge_json_is_the_only_stdout() {
    let fx = Fixture::new();
    fx.branch_with_commit("feature", "feature.txt", "feature");

    let output = fx
        .bw()
        .args(["merge", "feature", "--stop-on-failure", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["merged"], 1);
    assert_eq!(report["outcomes"][0]["result"], "merged");
}

#[test]
fn merge_failure_exits_non_zero_and_continues() {
    let fx = Fixture::new();
    fx.branch_with_commit("clash", "README.md", "theirs\n");
    fx.branch_with_commit("feature", "feature.txt", "feature");
    std::fs::write(fx.path().join("README.md"), "ours\n").unwrap();
    run_git(fx.path(), &["commit", "-am", "diverge"]);

    let output = fx
        .bw()
        .args(["merge", "clash", "feature", "--continue-on-failure", "--json"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcomes"][0]["result"], "skipped");
    assert_eq!(report["outcomes"][1]["result"], "merged");
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 item(s) not merged"));
    assert_eq!(fx.git_output(&["status", "--porcelain"]), "");
}

#[test]
fn merge_non_interactive_defaults_to_stop() {
    let fx = Fixture::new();
    fx.branch_with_commit("clash", "README.md", "theirs\n");
    fx.branch_with_commit("feature", "feature.txt", "feature");
    std::fs::write(fx.path().join("README.md"), "ours\n").unwrap();
    run_git(fx.path(), &["commit", "-am", "diverge"]);

    fx.bw()
        .args(["merge", "clash", "feature"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("(aborted plan)"))
        .stdout(predicate::str::contains("branch feature (skipped)"));
}

#[test]
fn merge_self_rejected() {
    let fx = Fixture::new();
    fx.bw()
        .args(["merge", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("into itself"));
}

#[test]
fn merge_without_targets_needs_interaction() {
    let fx = Fixture::new();
    fx.bw()
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No merge targets given"));
}

#[test]
fn config_roundtrip_affects_naming() {
    let fx = Fixture::new();
    fx.bw()
        .args(["config", "set", "naming.branch_prefix", "release"])
        .assert()
        .success();
    fx.bw()
        .args(["config", "get", "naming.branch_prefix"])
        .assert()
        .success()
        .stdout("release\n");
    fx.bw()
        .args(["name", "--date", "1"])
        .assert()
        .success()
        .stdout("release_1\n");

    assert!(fx.path().join(".git/branchwright/config.toml").exists());
}

#[test]
fn config_global_on_failure() {
    let fx = Fixture::new();
    fx.bw()
        .args(["config", "set", "merge.on_failure", "continue"])
        .assert()
        .success();

    let written = std::fs::read_to_string(fx.config.path().join("config.toml")).unwrap();
    assert!(written.contains("on_failure = \"continue\""));

    fx.bw()
        .args(["config", "set", "merge.on_failure", "sometimes"])
        .assert()
        .failure();
}

#[test]
fn config_set_updates_the_file_that_is_read() {
    let fx = Fixture::new();
    let home = TempDir::new().unwrap();
    let xdg = fx.config.path().join("branchwright/config.toml");
    std::fs::create_dir_all(xdg.parent().unwrap()).unwrap();
    std::fs::write(&xdg, "[merge]\non_failure = \"stop\"\n").unwrap();

    let bw = || {
        let mut cmd = fx.bw();
        cmd.env_remove("BRANCHWRIGHT_CONFIG").env("HOME", home.path());
        cmd
    };

    bw().args(["config", "set", "merge.on_failure", "continue"])
        .assert()
        .success();
    bw().args(["config", "get", "merge.on_failure"])
        .assert()
        .success()
        .stdout("continue\n");

    assert!(std::fs::read_to_string(&xdg).unwrap().contains("continue"));
    assert!(!home.path().join(".branchwright/config.toml").exists());
}

#[test]
fn option_like_remote_rejected() {
    let fx = Fixture::new();
    fx.bw()
        .args(["--remote=--upload-pack=touch", "refs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --remote"));
    fx.bw()
        .args(["config", "set", "--", "remote", "-evil"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid remote '-evil'"));
}

#[test]
fn config_rejects_invalid_values() {
    let fx = Fixture::new();
    fx.bw()
        .args(["config", "set", "naming.tag_prefix", "has space"])
        .assert()
        .failure();
    fx.bw()
        .args(["config", "get", "trunk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("bw")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bw"));
}
