//! Export the ranked queue: CSV, JSON, and a plain-text report.

pub mod csv;
pub mod json;
pub mod text;

use std::path::Path;

use crate::error::{Result, TriageError};
use crate::model::email::EnrichedEmail;
use crate::triage::extract::join_set;

/// Tabular column headers, in row order.
pub const COLUMNS: [&str; 12] = [
    "Rank",
    "Priority",
    "Sentiment",
    "Date",
    "Sender",
    "Subject",
    "Product",
    "Phones",
    "Emails",
    "Requirements",
    "Draft_Reply",
    "Body",
];

/// Output format for `mailtriage export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Txt,
}

impl ExportFormat {
    /// Parse a format name as written in the config file.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(TriageError::ExportError(format!(
                "unknown export format '{other}'"
            ))),
        }
    }

    /// Guess from the output file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_name(ext).ok()
    }
}

/// One row of cells per email, ranked order preserved. `Rank` is 1-based.
pub fn rows(emails: &[EnrichedEmail]) -> Vec<Vec<String>> {
    emails
        .iter()
        .enumerate()
        .map(|(i, email)| {
            vec![
                (i + 1).to_string(),
                email.priority.to_string(),
                email.sentiment.to_string(),
                email.raw.date.clone().unwrap_or_default(),
                email.raw.sender.clone(),
                email.raw.subject.clone(),
                email.product.clone(),
                join_set(&email.phones),
                join_set(&email.emails),
                email.requirement_summary.clone(),
                email.draft_reply.clone(),
                email.raw.body.clone(),
            ]
        })
        .collect()
}

/// Fail early when the output's parent directory is missing.
pub(crate) fn check_output_path(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(
            TriageError::InvalidPath(format!("directory does not exist: {}", parent.display())),
        ),
        _ if path.is_dir() => Err(TriageError::InvalidPath(format!(
            "output is a directory: {}",
            path.display()
        ))),
        _ => Ok(()),
    }
}
