use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn coderefine() -> Command {
    let mut cmd = Command::cargo_bin("coderefine").expect("binary exists");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_displays_usage() {
    coderefine()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn compare_prints_compact_diff() {
    let dir = tempfile::tempdir().unwrap();
    let original = write(&dir, "old.js", "a\nb\nc");
    let optimized = write(&dir, "new.js", "a\nx\nc");

    coderefine()
        .arg("compare")
        .arg(&original)
        .arg(&optimized)
        .args(["--format", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(" a\n-b\n+x\n c\n"))
        .stdout(predicate::str::contains("stats: +1 -1 =2"));
}

#[test]
fn compare_json_reports_signals() {
    let dir = tempfile::tempdir().unwrap();
    let original = write(
        &dir,
        "old.java",
        "for(i=0;i<n;i++){\n  for(j=0;j<n;j++){\n    if(x==null){}\n  }\n}",
    );
    let optimized = write(&dir, "new.java", "while(i<n){ x>>1; }");

    let output = coderefine()
        .arg("compare")
        .arg(&original)
        .arg(&optimized)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["language"], "java");
    let signals: Vec<_> = value["explanation"]["signals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect();
    assert_eq!(signals, vec!["loop_count", "bit_manipulation", "conciseness"]);
}

#[test]
fn strip_removes_comments() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "main.py", "# header\nx = 1  # one\n\ny = 2\n");

    coderefine()
        .arg("strip")
        .arg(&file)
        .assert()
        .success()
        .stdout("x = 1  \ny = 2\n");
}

#[test]
fn review_fails_on_denied_rule_from_config() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, ".coderefine.toml", "[lints]\nnone_equality = \"deny\"\n");
    write(&dir, "check.py", "if value == None:\n    pass\n");

    coderefine()
        .arg("review")
        .arg(dir.path())
        .args(["--format", "compact"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E [none_equality]"));
}

#[test]
fn review_clean_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "ok.rs", "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n");

    coderefine()
        .arg("review")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("No findings"));
}

#[test]
fn missing_file_exits_with_two() {
    coderefine()
        .args(["compare", "/no/such/old.rs", "/no/such/new.rs"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn review_json_prints_one_array() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, "a.py", "print(1)\n");
    write(&dir, "b.cpp", "int main() {\n    int x = 1\n    return x;\n}\n");

    let output = coderefine()
        .arg("review")
        .arg(dir.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let cpp = entries
        .iter()
        .find(|e| e["file"].as_str().unwrap().ends_with("b.cpp"))
        .unwrap();
    assert_eq!(cpp["report"]["findings"][0]["rule_id"], "missing_semicolon");
    assert_eq!(cpp["report"]["findings"][0]["severity"], "error");
}
