//! Reader for `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, TriageError};
use crate::model::email::RawEmail;
use crate::parser::message::parse_message;

/// Read a single `.eml` file.
pub fn read_eml(path: impl AsRef<Path>) -> Result<RawEmail> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| TriageError::io(path, e))?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(TriageError::EmptyInput(path.to_path_buf()));
    }
    Ok(parse_message(&data))
}

/// Read every `.eml` file in a directory (not recursive), ordered by file name.
///
/// Blank files are skipped; the directory is empty input only when none remain.
pub fn read_eml_dir(dir: impl AsRef<Path>) -> Result<Vec<RawEmail>> {
    let dir = dir.as_ref();
    let files = eml_files(dir)?;
    if files.is_empty() {
        return Err(TriageError::EmptyInput(dir.to_path_buf()));
    }

    let mut emails = Vec::with_capacity(files.len());
    for file in &files {
        match read_eml(file) {
            Ok(email) => emails.push(email),
            Err(TriageError::EmptyInput(path)) => {
                warn!(path = %path.display(), "Skipping blank .eml file");
            }
            Err(e) => return Err(e),
        }
    }
    if emails.is_empty() {
        return Err(TriageError::EmptyInput(dir.to_path_buf()));
    }
    info!(dir = %dir.display(), count = emails.len(), "Loaded EML files");
    Ok(emails)
}

/// `.eml` files (case-insensitive extension) directly under `dir`, sorted.
fn eml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TriageError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TriageError::io(dir, e))?.path();
        if path.is_file() && has_eml_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn has_eml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
}
