//! Read support emails from a spreadsheet export.
//!
//! Column names vary between exports, so the sender, subject, body, and date
//! columns are picked by name with positional fallbacks.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TriageError};
use crate::model::email::RawEmail;
use crate::parser::normalize::{clean_body, clean_subject};

const SENDER_COLUMNS: &[&str] = &["from", "sender", "sender_email", "email", "from_email"];
const BODY_COLUMNS: &[&str] = &["body", "message", "email_body", "content"];

/// Column positions chosen for a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub sender: usize,
    pub subject: usize,
    pub body: usize,
    pub date: Option<usize>,
}

impl ColumnMap {
    /// Pick columns from (already normalized) header names.
    pub fn detect(headers: &[String]) -> Self {
        let find = |pred: &dyn Fn(&str) -> bool| headers.iter().position(|h| pred(h.as_str()));
        let nth_or_first = |n: usize| if headers.len() > n { n } else { 0 };

        Self {
            sender: find(&|h| SENDER_COLUMNS.contains(&h)).unwrap_or(0),
            subject: find(&|h| h.contains("subject")).unwrap_or_else(|| nth_or_first(1)),
            body: find(&|h| BODY_COLUMNS.contains(&h)).unwrap_or_else(|| nth_or_first(2)),
            // "sentiment" contains "time", so a date column wins over a time column
            date: find(&|h| h.contains("date")).or_else(|| find(&|h| h.contains("time"))),
        }
    }
}

/// `" Sender Email "` → `"sender_email"`.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Read a CSV file into raw emails.
pub fn read_csv(path: &Path) -> Result<Vec<RawEmail>> {
    let bytes = std::fs::read(path).map_err(|e| TriageError::io(path, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => encoding_rs::WINDOWS_1252
            .decode(e.as_bytes())
            .0
            .into_owned(),
    };

    let records = parse_csv(&text)?;
    if records.is_empty() {
        return Err(TriageError::EmptyInput(path.to_path_buf()));
    }
    info!(path = %path.display(), count = records.len(), "Loaded CSV records");
    Ok(records)
}

/// Parse CSV text (first row is the header) into raw emails.
///
/// Short rows yield empty fields; an input without a header row yields no
/// records.
pub fn parse_csv(text: &str) -> Result<Vec<RawEmail>> {
    let mut rows = split_rows(text.trim_start_matches('\u{feff}'))?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    let columns = ColumnMap::detect(&headers);
    debug!(?headers, ?columns, "Detected CSV columns");

    let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();

    Ok(rows
        .filter(|row| row.iter().any(|field| !field.trim().is_empty()))
        .map(|row| {
            RawEmail::new(
                cell(&row, columns.sender).trim(),
                clean_subject(&cell(&row, columns.subject)),
                clean_body(&cell(&row, columns.body)),
                columns.date.map(|idx| cell(&row, idx).trim().to_string()),
            )
        })
        .collect())
}

/// Tokenize RFC 4180 text into rows of fields.
///
/// Handles quoted fields with embedded separators, newlines, and doubled
/// quotes, and both `\n` and `\r\n` row endings.
pub fn split_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(TriageError::InvalidCsv {
            line: quote_line,
            reason: "unterminated quoted field".into(),
        });
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| normalize_header(n)).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Sender Email "), "sender_email");
        assert_eq!(normalize_header("Subject"), "subject");
    }

    #[test]
    fn test_detect_named_columns() {
        let map = ColumnMap::detect(&headers(&["Date Received", "Body", "Subject", "Sender"]));
        assert_eq!(
            map,
            ColumnMap {
                sender: 3,
                subject: 2,
                body: 1,
                date: Some(0),
            }
        );
    }

    #[test]
    fn test_date_column_preferred_over_time() {
        let map = ColumnMap::detect(&headers(&["Sentiment", "Sender", "Date"]));
        assert_eq!(map.date, Some(2));

        let map = ColumnMap::detect(&headers(&["Sender", "Received Time"]));
        assert_eq!(map.date, Some(1));
    }

    #[test]
    fn test_detect_positional_fallback() {
        let map = ColumnMap::detect(&headers(&["a", "b", "c"]));
        assert_eq!(map.sender, 0);
        assert_eq!(map.subject, 1);
        assert_eq!(map.body, 2);
        assert_eq!(map.date, None);

        let map = ColumnMap::detect(&headers(&["only"]));
        assert_eq!((map.sender, map.subject, map.body), (0, 0, 0));
    }

    #[test]
    fn test_split_rows_quoted() {
        let rows = split_rows("a,b\r\n\"x, y\",\"say \"\"hi\"\"\nthere\"\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["x, y", "say \"hi\"\nthere"]);
    }

    #[test]
    fn test_split_rows_trailing_row_without_newline() {
        let rows = split_rows("a,b\n1,").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", ""]]);
    }

    #[test]
    fn test_unterminated_quote_is_an_error() {
        let err = split_rows("a,b\n1,\"open\n").unwrap_err();
        assert!(matches!(err, TriageError::InvalidCsv { line: 2, .. }));
    }

    #[test]
    fn test_parse_csv_records() {
        let text = "\u{feff}sender,subject,body,date\n\
jane.doe@x.com,Need help,\"I cannot log in.\nPlease help.\",2024-01-04 10:00\n\
bob@y.org,Thanks,All good,\n";
        let records = parse_csv(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, "jane.doe@x.com");
        assert_eq!(records[0].body, "I cannot log in.\nPlease help.");
        assert_eq!(records[0].date.as_deref(), Some("2024-01-04 10:00"));
        assert_eq!(records[1].date, None);
    }

    #[test]
    fn test_short_rows_and_blank_lines() {
        let records = parse_csv("from,subject,message\n\nann@z.io\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender, "ann@z.io");
        assert_eq!(records[0].subject, "");
        assert_eq!(records[0].body, "");
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_csv("").unwrap().is_empty());
    }
}
