use crate::errors::InputError;
use crate::model::TargetRow;
use std::path::{Path, PathBuf};

/// Eligible files found in the input directory. A CSV selects batch mode;
/// the budget sidecar is optional either way.
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    pub csv: Option<PathBuf>,
    pub budget: Option<PathBuf>,
}

/// Scans `dir` for exactly one `*.csv` and an optional `budget.json`.
/// A missing directory means no inputs (automatic mode); more than one CSV
/// is a fatal input error.
pub fn discover(dir: &Path) -> Result<InputFiles, InputError> {
    if !dir.exists() {
        return Ok(InputFiles::default());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| InputError::Scan {
        dir: dir.display().to_string(),
        source,
    })?;

    let mut csvs = Vec::new();
    let mut budget = None;
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Scan {
            dir: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            csvs.push(path);
        } else if path.file_name().and_then(|n| n.to_str()) == Some("budget.json") {
            budget = Some(path);
        }
    }

    if csvs.len() > 1 {
        return Err(InputError::MultipleCsv {
            dir: dir.display().to_string(),
            found: csvs.len(),
        });
    }

    Ok(InputFiles {
        csv: csvs.pop(),
        budget,
    })
}

/// Typed column indices, resolved once per file before iteration.
struct Columns {
    url: usize,
    template: usize,
}

fn resolve_columns(path: &Path, headers: &csv::StringRecord) -> Result<Columns, InputError> {
    let find = |needle: &'static str| -> Result<usize, InputError> {
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(needle))
            .ok_or(InputError::MissingColumn {
                path: path.display().to_string(),
                column: needle,
            })
    };
    Ok(Columns {
        url: find("url")?,
        template: find("template")?,
    })
}

/// Reads the batch target list. Header matching is a case-insensitive
/// substring test on "url" and "template"; rows with an empty url cell are
/// skipped.
pub fn read_targets(path: &Path) -> Result<Vec<TargetRow>, InputError> {
    let read_err = |source| InputError::Read {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    let headers = reader.headers().map_err(read_err)?.clone();
    let columns = resolve_columns(path, &headers)?;

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        let url = record.get(columns.url).unwrap_or("").trim();
        if url.is_empty() {
            continue;
        }
        let template = record.get(columns.template).unwrap_or("").trim();
        targets.push(TargetRow {
            url: url.to_string(),
            template: (!template.is_empty()).then(|| template.to_string()),
        });
    }
    Ok(targets)
}
