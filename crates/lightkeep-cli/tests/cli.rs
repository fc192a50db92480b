use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lightkeep() -> Command {
    Command::cargo_bin("lightkeep").unwrap()
}

fn seed_input(dir: &TempDir) -> std::path::PathBuf {
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(
        input.join("targets.csv"),
        "URL,Template\nhttps://example.com,landing\n",
    )
    .unwrap();
    input
}

#[test]
fn version_prints_the_package_version() {
    lightkeep()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn non_numeric_interval_is_rejected_by_the_parser() {
    lightkeep()
        .args(["run", "--interval", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn negative_interval_is_rejected_by_the_parser() {
    lightkeep()
        .args(["run", "--interval", "-5"])
        .assert()
        .failure();
}

#[test]
fn unknown_provider_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    let input = seed_input(&dir);
    let db = dir.path().join("audits.db");

    lightkeep()
        .arg("run")
        .arg("--input-dir")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .args(["--provider", "webpagetest"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown provider"));
}

#[test]
fn batch_run_with_the_fake_provider_completes() {
    let dir = TempDir::new().unwrap();
    let input = seed_input(&dir);
    let db = dir.path().join("audits.db");

    lightkeep()
        .arg("run")
        .arg("--input-dir")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .args(["--provider", "fake"])
        .assert()
        .success()
        .stderr(predicate::str::contains("starting audit run"))
        .stderr(predicate::str::contains("ok=1 failed=0"));
}

#[test]
fn recurring_batch_run_registers_its_targets() {
    let dir = TempDir::new().unwrap();
    let input = seed_input(&dir);
    let db = dir.path().join("audits.db");

    lightkeep()
        .arg("run")
        .arg("--input-dir")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .args(["--provider", "fake", "--recurring", "--interval", "7"])
        .assert()
        .success()
        .stderr(predicate::str::contains("registered=1"));
}

#[test]
fn two_csv_files_in_the_input_directory_are_a_config_error() {
    let dir = TempDir::new().unwrap();
    let input = seed_input(&dir);
    std::fs::write(input.join("more.csv"), "url,template\n").unwrap();
    let db = dir.path().join("audits.db");

    lightkeep()
        .arg("run")
        .arg("--input-dir")
        .arg(&input)
        .arg("--db")
        .arg(&db)
        .args(["--provider", "fake"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("input error"));
}
