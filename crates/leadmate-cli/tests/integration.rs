use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn leadmate(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("leadmate").unwrap();
    cmd.env("LEADMATE_HOME", home.path());
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("project"))
        .stdout(predicate::str::contains("board"))
        .stdout(predicate::str::contains("chat"));
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("leadmate"));
}

#[test]
fn commands_require_login() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn board_requires_login_too() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .arg("board")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn logout_without_session_is_fine() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn unknown_agent_is_rejected_before_any_network() {
    let home = TempDir::new().unwrap();
    leadmate(&home)
        .args(["chat", "send", "oracle", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}
