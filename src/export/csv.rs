//! Export the ranked queue to CSV.
//!
//! Output is UTF-8 with BOM for Excel compatibility.

use std::io::Write;
use std::path::Path;

use super::{check_output_path, rows, COLUMNS};
use crate::model::email::EnrichedEmail;

/// Write the header row and one row per email.
///
/// Fields are quoted per RFC 4180 when they contain the separator, a quote,
/// or a line break.
pub fn write_csv<W: Write>(
    mut writer: W,
    emails: &[EnrichedEmail],
    separator: char,
) -> anyhow::Result<()> {
    // UTF-8 BOM for Excel
    writer.write_all(&[0xEF, 0xBB, 0xBF])?;

    let sep = separator.to_string();
    writeln!(writer, "{}", COLUMNS.join(sep.as_str()))?;

    for row in rows(emails) {
        let line = row
            .iter()
            .map(|cell| csv_escape(cell, separator))
            .collect::<Vec<_>>()
            .join(sep.as_str());
        writeln!(writer, "{line}")?;
    }

    writer.flush()?;
    Ok(())
}

/// Export a ranked batch to a CSV file.
pub fn export_csv(emails: &[EnrichedEmail], output_path: &Path, separator: char) -> anyhow::Result<()> {
    check_output_path(output_path)?;
    let file = std::fs::File::create(output_path)?;
    write_csv(std::io::BufWriter::new(file), emails, separator)?;
    tracing::info!(path = %output_path.display(), count = emails.len(), "Exported CSV");
    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains the separator, quotes, or newlines.
fn csv_escape(value: &str, separator: char) -> String {
    if value.contains(separator) || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
