//! Queue analytics: label counts, distributions, and date range.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::email::{EnrichedEmail, Priority, Sentiment};

/// Summary counts for a triaged batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriageStats {
    pub total: usize,
    pub urgent: usize,
    pub not_urgent: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Emails whose date could not be parsed.
    pub undated: usize,
    /// Oldest and newest parsed dates.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TriageStats {
    pub fn from_batch(emails: &[EnrichedEmail]) -> Self {
        let mut stats = Self {
            total: emails.len(),
            ..Self::default()
        };

        for email in emails {
            match email.priority {
                Priority::Urgent => stats.urgent += 1,
                Priority::NotUrgent => stats.not_urgent += 1,
            }
            match email.sentiment {
                Sentiment::Positive => stats.positive += 1,
                Sentiment::Negative => stats.negative += 1,
                Sentiment::Neutral => stats.neutral += 1,
            }
            match email.recency() {
                Some(date) => {
                    stats.date_range = Some(match stats.date_range {
                        Some((min, max)) => (min.min(date), max.max(date)),
                        None => (date, date),
                    });
                }
                None => stats.undated += 1,
            }
        }

        stats
    }

    /// `(label, count)` per sentiment, most frequent first.
    pub fn sentiment_distribution(&self) -> Vec<(&'static str, usize)> {
        sorted_distribution(vec![
            (Sentiment::Positive.as_str(), self.positive),
            (Sentiment::Negative.as_str(), self.negative),
            (Sentiment::Neutral.as_str(), self.neutral),
        ])
    }

    /// `(label, count)` per priority, most frequent first.
    pub fn priority_distribution(&self) -> Vec<(&'static str, usize)> {
        sorted_distribution(vec![
            (Priority::Urgent.as_str(), self.urgent),
            (Priority::NotUrgent.as_str(), self.not_urgent),
        ])
    }
}

/// Drop empty buckets and sort by count descending, label ascending on ties.
fn sorted_distribution(mut buckets: Vec<(&'static str, usize)>) -> Vec<(&'static str, usize)> {
    buckets.retain(|(_, n)| *n > 0);
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    buckets
}

/// Top `n` products by number of emails, ignoring empty products.
pub fn top_products(emails: &[EnrichedEmail], n: usize) -> Vec<(String, usize)> {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for email in emails.iter().filter(|e| !e.product.is_empty()) {
        *counts.entry(email.product.as_str()).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(product, count)| (product.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::email::RawEmail;
    use crate::triage::pipeline::enrich;

    fn sample() -> Vec<EnrichedEmail> {
        [
            ("Help", "The site is down, terrible.", Some("2024-01-02")),
            ("Help", "Thanks, great support!", Some("2024-01-05")),
            ("Help", "Order: Z1 where is it?", None),
            ("Help", "Order: Z1 again, please", Some("2023-12-30")),
        ]
        .iter()
        .map(|(s, b, d)| enrich(&RawEmail::new("a@b.com", *s, *b, d.map(str::to_string))))
        .collect()
    }

    #[test]
    fn test_counts() {
        let stats = TriageStats::from_batch(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.not_urgent, 3);
        assert_eq!(stats.positive, 1);
        assert_eq!(stats.negative, 1);
        assert_eq!(stats.neutral, 2);
        assert_eq!(stats.undated, 1);
    }

    #[test]
    fn test_date_range() {
        let stats = TriageStats::from_batch(&sample());
        let (min, max) = stats.date_range.unwrap();
        assert_eq!(min.format("%Y-%m-%d").to_string(), "2023-12-30");
        assert_eq!(max.format("%Y-%m-%d").to_string(), "2024-01-05");
    }

    #[test]
    fn test_distributions() {
        let stats = TriageStats::from_batch(&sample());
        assert_eq!(
            stats.sentiment_distribution(),
            vec![("Neutral", 2), ("Negative", 1), ("Positive", 1)]
        );
        assert_eq!(
            stats.priority_distribution(),
            vec![("Not urgent", 3), ("Urgent", 1)]
        );
    }

    #[test]
    fn test_empty_batch() {
        let stats = TriageStats::from_batch(&[]);
        assert_eq!(stats, TriageStats::default());
        assert!(stats.sentiment_distribution().is_empty());
    }

    #[test]
    fn test_top_products() {
        let top = top_products(&sample(), 5);
        assert!(top.contains(&("Z1".to_string(), 2)), "got {top:?}");
        assert_eq!(top_products(&sample(), 1).len(), 1);
    }
}
