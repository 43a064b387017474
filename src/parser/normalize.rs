//! Cleanup applied to every subject and body before triage.

use super::header::decode_encoded_words;

/// Decode encoded-words and collapse whitespace runs (including folded
/// line breaks) to single spaces.
pub fn clean_subject(subject: &str) -> String {
    decode_encoded_words(subject)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip a BOM, normalize line endings to `\n`, drop NUL bytes, and trim.
pub fn clean_body(body: &str) -> String {
    body.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "")
        .trim()
        .to_string()
}
