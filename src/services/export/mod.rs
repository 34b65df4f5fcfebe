pub mod csv_export;
pub mod xlsx_export;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::model::table::RunTables;

pub const XLSX_FILE: &str = "taiwanese_analysis.xlsx";
pub const SENTENCES_CSV_FILE: &str = "taiwanese_sentences.csv";
pub const GLOSSARY_CSV_FILE: &str = "taiwanese_glossary.csv";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const CSV_MIME: &str = "text/csv; charset=utf-8";

/// One downloadable document.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Spreadsheet plus the two CSV exports, in download order.
pub fn build_artifacts(tables: &RunTables) -> Result<Vec<Artifact>, ExportError> {
    let workbook = xlsx_export::build_workbook(tables)?;
    let sentences = csv_export::write_table(&tables.sentences)?;
    let glossary = csv_export::write_table(&tables.glossary)?;

    tracing::debug!(
        xlsx_bytes = workbook.len(),
        sentences_bytes = sentences.len(),
        glossary_bytes = glossary.len(),
        "artifacts built"
    );

    Ok(vec![
        Artifact {
            file_name: XLSX_FILE,
            mime_type: XLSX_MIME,
            bytes: workbook,
        },
        Artifact {
            file_name: SENTENCES_CSV_FILE,
            mime_type: CSV_MIME,
            bytes: sentences,
        },
        Artifact {
            file_name: GLOSSARY_CSV_FILE,
            mime_type: CSV_MIME,
            bytes: glossary,
        },
    ])
}

/// Writes every artifact into `dir`, returning the final paths in the same
/// order. All temp files are staged before any rename; on failure nothing
/// from this call is left behind.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;

    let targets: Vec<PathBuf> = artifacts.iter().map(|a| dir.join(a.file_name)).collect();

    let mut staged: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
    for (a, path) in artifacts.iter().zip(&targets) {
        let tmp = tmp_path(path);
        if let Err(e) = fs::write(&tmp, &a.bytes) {
            staged.push(tmp);
            discard(&staged);
            return Err(e.into());
        }
        staged.push(tmp);
    }

    let mut committed: Vec<&Path> = Vec::with_capacity(targets.len());
    for (tmp, path) in staged.iter().zip(&targets) {
        if let Err(e) = replace(tmp, path) {
            tracing::warn!(path = %path.display(), error = %e, "artifact write failed, rolling back");
            discard(&staged);
            discard(&committed);
            return Err(e.into());
        }
        committed.push(path);
    }

    for path in &targets {
        tracing::info!(path = %path.display(), "artifact written");
    }

    Ok(targets)
}

fn replace(tmp: &Path, path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(tmp, path)
}

fn discard<P: AsRef<Path>>(paths: &[P]) {
    for p in paths {
        let _ = fs::remove_file(p);
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "artifact".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
