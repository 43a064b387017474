//! Streaming MBOX reader.
//!
//! Reads the mailbox line-by-line through a 1 MB buffer and hands each message
//! to [`parse_message`]. Tolerant of malformed input.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, TriageError};
use crate::model::email::RawEmail;
use crate::parser::message::parse_message;

/// Size of the internal read buffer.
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Default maximum message size in bytes (32 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 32 * 1024 * 1024;

/// Progress is reported every 4 MB.
const PROGRESS_INTERVAL: u64 = 4 * 1024 * 1024;

/// Splits an MBOX file into raw messages.
///
/// Tolerates mixed `\n` / `\r\n` line endings, `From ` lines without a
/// preceding blank line (logged), a truncated last message, binary content,
/// and a UTF-8 BOM at the start of the file.
pub struct MboxReader {
    path: PathBuf,
    file_size: u64,
    max_message_size: usize,
}

impl MboxReader {
    /// Open a reader for the given file.
    ///
    /// Only checks that the file exists; the content is not validated.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| TriageError::io(&path, e))?;
        Ok(Self {
            path,
            file_size: metadata.len(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        })
    }

    /// Truncate messages larger than `bytes`.
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes.max(1);
        self
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk the mailbox, calling `message_callback` with `(offset, raw_bytes)`
    /// for every message. The callback returns `false` to stop early.
    ///
    /// Returns the number of messages delivered.
    pub fn split(
        &self,
        message_callback: &mut dyn FnMut(u64, &[u8]) -> bool,
        progress_callback: Option<&dyn Fn(u64, u64)>,
    ) -> Result<u64> {
        if self.file_size == 0 {
            return Ok(0);
        }

        let file = File::open(&self.path).map_err(|e| TriageError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut count: u64 = 0;
        let mut offset: u64 = 0;
        let mut message_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut message_start: u64 = 0;
        let mut truncated = false;
        let mut prev_line_was_empty = true;
        let mut first_line = true;
        let mut last_progress: u64 = 0;
        let mut line_buf: Vec<u8> = Vec::with_capacity(4096);

        loop {
            line_buf.clear();
            let line_len = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(|e| TriageError::io(&self.path, e))? as u64;
            if line_len == 0 {
                break;
            }

            if is_mbox_separator(&line_buf) {
                if !first_line && !prev_line_was_empty {
                    warn!(offset, "Found 'From ' separator without preceding blank line");
                }
                if !message_buf.is_empty() {
                    if !message_callback(message_start, &message_buf) {
                        return Ok(count + 1);
                    }
                    count += 1;
                }
                message_start = offset;
                truncated = false;
                message_buf.clear();
                message_buf.extend_from_slice(&line_buf);
            } else if message_buf.len() + line_buf.len() <= self.max_message_size {
                message_buf.extend_from_slice(unescape_from_line(&line_buf));
            } else if !truncated {
                warn!(
                    offset = message_start,
                    max_size = self.max_message_size,
                    "Message exceeds maximum size, truncating body"
                );
                truncated = true;
            }

            prev_line_was_empty = is_blank_line(&line_buf);
            first_line = false;
            offset += line_len;

            if let Some(cb) = progress_callback {
                if offset - last_progress >= PROGRESS_INTERVAL {
                    cb(offset, self.file_size);
                    last_progress = offset;
                }
            }
        }

        if !message_buf.is_empty() {
            message_callback(message_start, &message_buf);
            count += 1;
        }

        if let Some(cb) = progress_callback {
            cb(self.file_size, self.file_size);
        }

        Ok(count)
    }

    /// Parse every message, keeping only the last `limit` when given.
    pub fn read(
        &self,
        limit: Option<usize>,
        progress_callback: Option<&dyn Fn(u64, u64)>,
    ) -> Result<Vec<RawEmail>> {
        let mut kept: VecDeque<Vec<u8>> = VecDeque::new();
        let total = self.split(
            &mut |_, raw| {
                if limit == Some(0) {
                    return true;
                }
                if limit.is_some_and(|n| kept.len() >= n) {
                    kept.pop_front();
                }
                kept.push_back(raw.to_vec());
                true
            },
            progress_callback,
        )?;

        if total == 0 {
            return Err(TriageError::EmptyInput(self.path.clone()));
        }

        debug!(total, kept = kept.len(), "Split mailbox");
        let emails: Vec<RawEmail> = kept.iter().map(|raw| parse_message(raw)).collect();
        info!(path = %self.path.display(), count = emails.len(), "Loaded mailbox");
        Ok(emails)
    }
}

/// Read an MBOX file with the default size cap.
///
/// `limit` keeps the last N messages, the most recent in mailbox order.
pub fn read_mbox(
    path: impl AsRef<Path>,
    limit: Option<usize>,
    progress_callback: Option<&dyn Fn(u64, u64)>,
) -> Result<Vec<RawEmail>> {
    MboxReader::new(path)?.read(limit, progress_callback)
}

/// Check whether a line is an MBOX separator (`From ` at the start).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(line)
        .starts_with(b"From ")
}

/// `>From ` → `From `, `>>From ` → `>From ` (mboxrd quoting).
fn unescape_from_line(line: &[u8]) -> &[u8] {
    let quotes = line.iter().take_while(|&&b| b == b'>').count();
    if quotes > 0 && line[quotes..].starts_with(b"From ") {
        &line[1..]
    } else {
        line
    }
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mailbox(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn message(n: usize) -> String {
        format!(
            "From user{n}@example.com Mon Jan 01 00:00:00 2024\n\
From: user{n}@example.com\n\
Subject: Help {n}\n\
Date: Mon, 0{n} Jan 2024 10:00:00 +0000\n\
\n\
Body {n}\n\
\n"
        )
    }

    #[test]
    fn test_is_mbox_separator() {
        assert!(is_mbox_separator(
            b"From user@example.com Thu Jan 01 00:00:00 2024\n"
        ));
        assert!(!is_mbox_separator(b"from user@example.com\n"));
        assert!(!is_mbox_separator(b">From user@example.com\n"));
        assert!(!is_mbox_separator(b"Subject: From here\n"));

        let mut line = vec![0xEF, 0xBB, 0xBF];
        line.extend_from_slice(b"From user@example.com Thu Jan 01 00:00:00 2024\n");
        assert!(is_mbox_separator(&line));
    }

    #[test]
    fn test_is_blank_line() {
        assert!(is_blank_line(b"\n"));
        assert!(is_blank_line(b"\r\n"));
        assert!(is_blank_line(b"  \n"));
        assert!(!is_blank_line(b"hello\n"));
    }

    #[test]
    fn test_unescape_from_line() {
        assert_eq!(unescape_from_line(b">From the start\n"), b"From the start\n");
        assert_eq!(unescape_from_line(b">>From quoted\n"), b">From quoted\n");
        assert_eq!(unescape_from_line(b"> quoted reply\n"), b"> quoted reply\n");
    }

    #[test]
    fn test_read_all_messages() {
        let file = mailbox(&format!("{}{}{}", message(1), message(2), message(3)));
        let emails = read_mbox(file.path(), None, None).unwrap();
        assert_eq!(emails.len(), 3);
        assert_eq!(emails[0].sender, "user1@example.com");
        assert_eq!(emails[2].subject, "Help 3");
        assert_eq!(emails[1].body, "Body 2");
        assert!(emails[0].date.is_some());
    }

    #[test]
    fn test_limit_keeps_last_messages() {
        let file = mailbox(&format!("{}{}{}", message(1), message(2), message(3)));
        let emails = read_mbox(file.path(), Some(2), None).unwrap();
        let subjects: Vec<&str> = emails.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Help 2", "Help 3"]);
    }

    #[test]
    fn test_escaped_from_in_body() {
        let file = mailbox(
            "From a@b.com Mon Jan 01 00:00:00 2024\n\
Subject: Help\n\
\n\
>From the docs it should work.\n",
        );
        let emails = read_mbox(file.path(), None, None).unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].body, "From the docs it should work.");
    }

    #[test]
    fn test_empty_mailbox_is_an_error() {
        let file = mailbox("");
        let err = read_mbox(file.path(), None, None).unwrap_err();
        assert!(matches!(err, TriageError::EmptyInput(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = read_mbox("/nonexistent/box.mbox", None, None).unwrap_err();
        assert!(matches!(err, TriageError::FileNotFound(_)));
    }

    #[test]
    fn test_split_reports_offsets_and_progress() {
        let file = mailbox(&format!("{}{}", message(1), message(2)));
        let reader = MboxReader::new(file.path()).unwrap();
        let mut offsets = Vec::new();
        let last = std::cell::Cell::new((0u64, 0u64));
        let progress: &dyn Fn(u64, u64) = &|done, total| last.set((done, total));
        let count = reader
            .split(
                &mut |offset, _| {
                    offsets.push(offset);
                    true
                },
                Some(progress),
            )
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], message(1).len() as u64);
        assert_eq!(last.get(), (reader.file_size(), reader.file_size()));
    }

    #[test]
    fn test_oversized_message_is_truncated() {
        let mut text = String::from("From a@b.com Mon Jan 01 00:00:00 2024\nSubject: Big\n\n");
        for _ in 0..100 {
            text.push_str("0123456789012345678901234567890123456789\n");
        }
        let file = mailbox(&text);
        let reader = MboxReader::new(file.path())
            .unwrap()
            .with_max_message_size(200);
        let mut sizes = Vec::new();
        reader
            .split(
                &mut |_, raw| {
                    sizes.push(raw.len());
                    true
                },
                None,
            )
            .unwrap();
        assert_eq!(sizes.len(), 1);
        assert!(sizes[0] <= 200);
    }
}
