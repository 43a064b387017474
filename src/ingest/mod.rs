//! Ingestion: turn a CSV export, an MBOX mailbox, or `.eml` files into
//! [`RawEmail`] records.

pub mod csv;
pub mod eml;
pub mod mbox;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::email::RawEmail;

/// Input container format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Pick by extension: `.csv`, `.eml`, a directory of `.eml` files, else MBOX.
    #[default]
    Auto,
    Csv,
    Mbox,
    Eml,
}

impl InputFormat {
    /// Resolve `Auto` for a concrete path.
    pub fn resolve(self, path: &Path) -> Self {
        if self != Self::Auto {
            return self;
        }
        if path.is_dir() || eml::has_eml_extension(path) {
            return Self::Eml;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv
        } else {
            Self::Mbox
        }
    }
}

/// How much to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep only the last N records.
    pub limit: Option<usize>,
    /// Per-message cap for mailboxes.
    pub max_message_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            limit: None,
            max_message_size: mbox::DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Load records from `path`.
pub fn load(path: &Path, format: InputFormat, options: &LoadOptions) -> Result<Vec<RawEmail>> {
    load_with_progress(path, format, options, None)
}

/// Like [`load`], reporting `(bytes_read, total_bytes)` while a mailbox is split.
pub fn load_with_progress(
    path: &Path,
    format: InputFormat,
    options: &LoadOptions,
    progress_callback: Option<&dyn Fn(u64, u64)>,
) -> Result<Vec<RawEmail>> {
    let format = format.resolve(path);
    debug!(path = %path.display(), ?format, "Loading input");

    let mut records = match format {
        InputFormat::Mbox | InputFormat::Auto => {
            return mbox::MboxReader::new(path)?
                .with_max_message_size(options.max_message_size)
                .read(options.limit, progress_callback);
        }
        InputFormat::Csv => csv::read_csv(path)?,
        InputFormat::Eml if path.is_dir() => eml::read_eml_dir(path)?,
        InputFormat::Eml => vec![eml::read_eml(path)?],
    };

    if let Some(limit) = options.limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    Ok(records)
}
