//! Raw and enriched email records.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An email as handed over by ingestion.
///
/// Every field is free text. Missing fields are empty strings, and a missing
/// or blank date is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmail {
    /// Sender field, possibly `"Name <address>"`.
    pub sender: String,
    /// Decoded subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Date as found in the source, not yet parsed.
    pub date: Option<String>,
}

impl RawEmail {
    /// Convenience constructor used by ingestion and tests.
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            date: date.filter(|d| !d.trim().is_empty()),
        }
    }

    /// Subject and body joined by a single space, the text classified as a whole.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

/// Overall tone of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Label used in tables and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a message needs immediate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    #[serde(rename = "Not urgent")]
    NotUrgent,
}

impl Priority {
    /// Label used in tables and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::NotUrgent => "Not urgent",
        }
    }

    /// Primary ranking bucket: urgent mail is handled first.
    pub fn tier(self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::NotUrgent => 1,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key of the review queue.
///
/// Ascending order puts lower tiers first, then newer messages first. A
/// missing recency sorts after every known date in the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankKey {
    pub tier: u8,
    pub recency: Option<DateTime<Utc>>,
}

impl RankKey {
    pub fn new(priority: Priority, recency: Option<DateTime<Utc>>) -> Self {
        Self {
            tier: priority.tier(),
            recency,
        }
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| match (self.recency, other.recency) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A support email after one pass of the triage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEmail {
    /// The untouched source record.
    #[serde(flatten)]
    pub raw: RawEmail,
    pub sentiment: Sentiment,
    pub priority: Priority,
    /// Unique phone-like strings found in the body.
    pub phones: BTreeSet<String>,
    /// Unique email addresses found in the body.
    pub emails: BTreeSet<String>,
    /// Requirement sentences, at most 500 characters.
    pub requirement_summary: String,
    /// Product or topic token, empty when nothing was found.
    pub product: String,
    pub draft_reply: String,
    pub rank_key: RankKey,
}

impl EnrichedEmail {
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }

    /// Parsed send time, if the source date could be parsed.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.rank_key.recency
    }
}
