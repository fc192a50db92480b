use lightkeep_core::errors::InputError;
use lightkeep_core::input::{discover, read_targets};
use lightkeep_core::model::TargetRow;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn discover_picks_the_csv_and_the_budget_sidecar() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "targets.csv", "url,template\n");
    fs::write(dir.path().join("budget.json"), "[]").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let files = discover(dir.path()).unwrap();
    assert_eq!(files.csv.unwrap().file_name().unwrap(), "targets.csv");
    assert_eq!(files.budget.unwrap().file_name().unwrap(), "budget.json");
}

#[test]
fn discover_treats_a_missing_directory_as_no_inputs() {
    let dir = TempDir::new().unwrap();
    let files = discover(&dir.path().join("does-not-exist")).unwrap();
    assert!(files.csv.is_none());
    assert!(files.budget.is_none());
}

#[test]
fn discover_rejects_multiple_csv_files() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "a.csv", "url,template\n");
    write_csv(dir.path(), "b.csv", "url,template\n");

    let err = discover(dir.path()).unwrap_err();
    assert!(matches!(err, InputError::MultipleCsv { found: 2, .. }));
}

#[test]
fn headers_match_by_case_insensitive_substring() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "targets.csv",
        "Page URL,Page Template\nhttps://example.com/,landing\n",
    );

    let targets = read_targets(&path).unwrap();
    assert_eq!(
        targets,
        vec![TargetRow {
            url: "https://example.com/".into(),
            template: Some("landing".into()),
        }]
    );
}

#[test]
fn a_missing_url_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "targets.csv", "page,template\nfoo,bar\n");

    let err = read_targets(&path).unwrap_err();
    assert!(matches!(err, InputError::MissingColumn { column: "url", .. }));
}

#[test]
fn empty_url_rows_are_skipped_and_empty_templates_are_none() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "targets.csv",
        "url,template\nhttps://a.example,\n,orphan\n  ,\nhttps://b.example,news\n",
    );

    let targets = read_targets(&path).unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].url, "https://a.example");
    assert_eq!(targets[0].template, None);
    assert_eq!(targets[1].template.as_deref(), Some("news"));
}
