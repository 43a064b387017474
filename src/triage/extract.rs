//! Fact extraction from message text: contacts, requirement sentences, and
//! the product a message is about.
//!
//! All extractors are total: when nothing matches they return an empty
//! string or empty sets.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::lexicon::{
    alternation, MAX_SUMMARY_CHARS, PRODUCT_LABELS, PRODUCT_STOPLIST, REQUIREMENT_SIGNALS,
};

/// Optional country code, optional (area) code, then 3-4 + 4 digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:\+?\d{1,3}[-.\s]?)?(?:\(?\d{2,4}\)?[-.\s]?)?\d{3,4}[-.\s]?\d{4})")
        .expect("phone pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

/// Sentence terminator plus the whitespace that follows it.
static SENTENCE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(REQUIREMENT_SIGNALS, true)).expect("requirement pattern is valid")
});

static LABELED_PRODUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:{})\s*[:#-]?\s*([A-Za-z0-9._-]+)",
        PRODUCT_LABELS.join("|")
    ))
    .expect("product pattern is valid")
});

static CAPITALIZED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-zA-Z0-9-]{2,}\b").expect("capitalized token pattern is valid")
});

/// Unique phone numbers and email addresses found in a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contacts {
    pub phones: BTreeSet<String>,
    pub emails: BTreeSet<String>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty() && self.emails.is_empty()
    }

    /// Phones as a single `", "`-separated cell.
    pub fn phones_joined(&self) -> String {
        join_set(&self.phones)
    }

    /// Emails as a single `", "`-separated cell.
    pub fn emails_joined(&self) -> String {
        join_set(&self.emails)
    }
}

/// Join a set of strings with `", "`.
pub fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Collect every phone-like and email-like match, deduplicated.
pub fn extract_contacts(text: &str) -> Contacts {
    Contacts {
        phones: PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        emails: EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

/// Keep the sentences that carry a requirement signal.
///
/// Sentences end at `.`, `!` or `?` followed by whitespace. Kept sentences
/// are joined with one space and the result is cut at 500 characters.
pub fn extract_requirements(text: &str) -> String {
    let kept: Vec<&str> = split_sentences(text.trim())
        .filter(|sentence| REQUIREMENT_RE.is_match(sentence))
        .collect();
    truncate_chars(&kept.join(" "), MAX_SUMMARY_CHARS)
}

/// Split on terminators followed by whitespace; the terminator stays with
/// its sentence and the whitespace is dropped.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK_RE.find_iter(text) {
        // terminators are ASCII, so +1 stays on a char boundary
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);
    sentences.into_iter()
}

/// Find the product a message refers to.
///
/// An explicit label (`Plan: Pro-2`, `order #A1`) wins. Otherwise the most
/// frequent capitalized token of three or more characters is used, with the
/// earliest token winning ties.
pub fn extract_product(text: &str) -> String {
    if let Some(caps) = LABELED_PRODUCT_RE.captures(text) {
        return caps[1].to_string();
    }
    most_frequent_capitalized(text).unwrap_or_default()
}

fn most_frequent_capitalized(text: &str) -> Option<String> {
    // (token, count) in order of first appearance
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for token in CAPITALIZED_RE.find_iter(text).map(|m| m.as_str()) {
        if PRODUCT_STOPLIST.contains(&token) {
            continue;
        }
        match counts.iter_mut().find(|(t, _)| *t == token) {
            Some((_, n)) => *n += 1,
            None => counts.push((token, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (token, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((token, n));
        }
    }
    best.map(|(token, _)| token.to_string())
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
