//! Exit status and output of the `omnidat` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn omnidat(file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_omnidat"))
        .arg(file)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run omnidat")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_add_then_list() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("todo.om");

    let out = omnidat(&file, &["add", "title=Write docs", "status=open", "prio=2"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = omnidat(&file, &["add", "title=Ship it", "status=done", "prio=1"]);
    assert!(out.status.success(), "{}", stderr(&out));

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "title='Write docs' status='open' prio=2\ntitle='Ship it' status='done' prio=1\n"
    );

    let out = omnidat(&file, &["list"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "title: Write docs, status: open, prio: 2\ntitle: Ship it, status: done, prio: 1\n"
    );

    let out = omnidat(&file, &["list", "title", "status=open"]);
    assert_eq!(stdout(&out), "Write docs\n");
}

#[test]
fn test_trim_and_remove() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "k='a' n=1\nk='b' n=2\nk='a' n=3\n").unwrap();

    let out = omnidat(&file, &["remove", "k=b"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read_to_string(&file).unwrap(), "k='a' n=1\nk='a' n=3\n");

    let out = omnidat(&file, &["TRIM", "n=3"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read_to_string(&file).unwrap(), "k='a' n=3\n");
}

#[test]
fn test_unknown_action_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "n=1\n").unwrap();

    let out = omnidat(&file, &["explode"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown action 'explode'"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_malformed_value_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "x=\"abc\n").unwrap();

    let out = omnidat(&file, &["list"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("line 1"));
}

#[test]
fn test_malformed_predicate_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "n=1\n").unwrap();

    let out = omnidat(&file, &["list", "n:1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("malformed predicate"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let out = omnidat(&dir.path().join("absent.om"), &["list"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("file not found"));
}

#[test]
fn test_assign_id_flag() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "n=1\nn=2\n").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_omnidat"))
        .arg("--assign-id")
        .arg(&file)
        .args(["add", "n=3"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        fs::read_to_string(&file).unwrap().lines().last(),
        Some("n=3 _id=2")
    );

    let out = omnidat(&file, &["list", "n", "_id", "n=3"]);
    assert_eq!(stdout(&out), "n: 3, _id: 2\n");
}

#[test]
fn test_flags_after_the_action() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");
    fs::write(&file, "n=1\nn=2\n").unwrap();

    let out = omnidat(&file, &["add", "n=3", "--assign-id"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        fs::read_to_string(&file).unwrap().lines().last(),
        Some("n=3 _id=2")
    );

    let out = omnidat(&file, &["list", "n", "-v", "n^2"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "1\n3\n");
    assert!(stderr(&out).contains("Records:  3 in -> 2 out"));
}

#[test]
fn test_negative_value_argument() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.om");

    let out = omnidat(&file, &["add", "n=-5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = omnidat(&file, &["list", "n", "n=-5"]);
    assert_eq!(stdout(&out), "-5\n");
}
