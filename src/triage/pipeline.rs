//! Batch orchestration: support filter, per-record enrichment, and ranking.

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use super::classify::classify;
use super::extract::{extract_contacts, extract_product, extract_requirements};
use super::lexicon::{alternation, SUPPORT_KEYWORDS};
use super::reply::draft_reply;
use crate::model::email::{EnrichedEmail, RankKey, RawEmail};
use crate::parser::header::parse_date;

static SUPPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(SUPPORT_KEYWORDS, false)).expect("support pattern is valid")
});

/// Batches smaller than this are enriched on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Knobs for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageOptions {
    /// Minimum batch size for parallel enrichment.
    pub parallel_threshold: usize,
    /// Drop records that are not support-relevant before enrichment.
    pub support_only: bool,
}

impl Default for TriageOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            support_only: true,
        }
    }
}

/// True when the subject or body mentions support, a query, a request or help.
pub fn is_support_relevant(raw: &RawEmail) -> bool {
    SUPPORT_RE.is_match(&raw.subject) || SUPPORT_RE.is_match(&raw.body)
}

/// Run every heuristic over one record.
pub fn enrich(raw: &RawEmail) -> EnrichedEmail {
    let full_text = raw.full_text();

    let labels = classify(&full_text);
    let contacts = extract_contacts(&raw.body);
    let requirement_summary = extract_requirements(&raw.body);
    let product = extract_product(&full_text);

    let draft_reply = draft_reply(
        &raw.sender,
        &raw.subject,
        &raw.body,
        labels.sentiment,
        labels.priority,
        &product,
        &requirement_summary,
    );

    let recency = raw.date.as_deref().and_then(parse_date);

    EnrichedEmail {
        raw: raw.clone(),
        sentiment: labels.sentiment,
        priority: labels.priority,
        phones: contacts.phones,
        emails: contacts.emails,
        requirement_summary,
        product,
        draft_reply,
        rank_key: RankKey::new(labels.priority, recency),
    }
}

/// Filter, enrich, and rank a batch with default options.
pub fn enrich_batch(records: &[RawEmail]) -> Vec<EnrichedEmail> {
    enrich_batch_with(records, &TriageOptions::default())
}

/// Filter, enrich, and rank a batch.
///
/// The result is ordered urgent-first, then newest-first; undated records
/// close their tier and ties keep their input order.
pub fn enrich_batch_with(records: &[RawEmail], options: &TriageOptions) -> Vec<EnrichedEmail> {
    let selected: Vec<&RawEmail> = records
        .iter()
        .filter(|raw| !options.support_only || is_support_relevant(raw))
        .collect();

    debug!(
        total = records.len(),
        selected = selected.len(),
        "Applied support filter"
    );

    let mut enriched: Vec<EnrichedEmail> = if selected.len() >= options.parallel_threshold {
        selected.par_iter().map(|raw| enrich(raw)).collect()
    } else {
        selected.iter().map(|raw| enrich(raw)).collect()
    };

    rank(&mut enriched);

    info!(
        count = enriched.len(),
        urgent = enriched.iter().filter(|e| e.is_urgent()).count(),
        "Triaged batch"
    );
    enriched
}

/// Stable sort by rank key.
pub fn rank(emails: &mut [EnrichedEmail]) {
    emails.sort_by(|a, b| a.rank_key.cmp(&b.rank_key));
}
