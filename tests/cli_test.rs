// tests/cli_test.rs
use std::process::Command;

#[test]
fn test_git_relnotes_help() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "git-relnotes", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("git-relnotes"));
    assert!(stdout.contains("Map release note files"));
}

#[test]
fn test_git_relnotes_version() {
    let output = Command::new("cargo")
        .args(["run", "--bin", "git-relnotes", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("git-relnotes"));
}

#[test]
fn test_git_relnotes_outside_repository() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let output = Command::new("cargo")
        .args(["run", "--bin", "git-relnotes", "--", "--repo-root"])
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR"));
}
