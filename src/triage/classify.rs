//! Sentiment and urgency classification by keyword matching.

use std::sync::LazyLock;

use regex::Regex;

use super::lexicon::{alternation, NEGATIVE_WORDS, POSITIVE_WORDS, URGENCY_PATTERNS};
use crate::model::email::{Priority, Sentiment};

/// Word-like tokens; apostrophes stay inside the token (`can't`).
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w']+\b").expect("token pattern is valid"));

static URGENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(URGENCY_PATTERNS, false)).expect("urgency pattern is valid")
});

/// Both labels for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub priority: Priority,
}

/// Classify `text` by sentiment and urgency.
pub fn classify(text: &str) -> Classification {
    Classification {
        sentiment: sentiment_label(text),
        priority: priority_label(text),
    }
}

/// Compare positive and negative lexicon hits; ties (including none) are neutral.
pub fn sentiment_label(text: &str) -> Sentiment {
    let (pos, neg) = lexicon_counts(text);
    match pos.cmp(&neg) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Urgent as soon as any urgency pattern occurs anywhere in `text`.
pub fn priority_label(text: &str) -> Priority {
    if URGENCY_RE.is_match(text) {
        Priority::Urgent
    } else {
        Priority::NotUrgent
    }
}

/// Count `(positive, negative)` lexicon tokens in `text`.
pub fn lexicon_counts(text: &str) -> (usize, usize) {
    let lowered = text.to_lowercase();
    let mut pos = 0;
    let mut neg = 0;
    for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
        if POSITIVE_WORDS.contains(&token) {
            pos += 1;
        } else if NEGATIVE_WORDS.contains(&token) {
            neg += 1;
        }
    }
    (pos, neg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_sentiment() {
        assert_eq!(
            sentiment_label("Thanks, the fix is great and I appreciate it"),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_negative_sentiment() {
        assert_eq!(
            sentiment_label("I am frustrated, the export is broken again"),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_tie_is_neutral() {
        assert_eq!(sentiment_label("great but broken"), Sentiment::Neutral);
        assert_eq!(sentiment_label("Where is my invoice?"), Sentiment::Neutral);
        assert_eq!(sentiment_label(""), Sentiment::Neutral);
    }

    #[test]
    fn test_apostrophes_kept_in_tokens() {
        assert_eq!(lexicon_counts("I can't log in and it won't load"), (0, 2));
        // "can" alone is not in the lexicon
        assert_eq!(lexicon_counts("I can log in"), (0, 0));
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert_eq!(lexicon_counts("THANKS! Awesome work"), (2, 0));
    }

    #[test]
    fn test_every_lexicon_entry_counts() {
        for word in POSITIVE_WORDS {
            assert_eq!(lexicon_counts(word), (1, 0), "{word}");
        }
        for word in NEGATIVE_WORDS {
            assert_eq!(lexicon_counts(word), (0, 1), "{word}");
        }
    }

    #[test]
    fn test_priority_examples() {
        assert_eq!(
            classify("everything is down in production").priority,
            Priority::Urgent
        );
        assert_eq!(classify("thanks, all good").priority, Priority::NotUrgent);
    }

    #[test]
    fn test_every_urgency_pattern_fires() {
        let samples = [
            "please act immediately",
            "URGENT request",
            "fix asap",
            "I cannot access the portal",
            "I can't access the portal",
            "the site is down",
            "critical bug",
            "production outage",
            "prod cluster",
            "I will escalate this",
            "deadline tomorrow",
            "we are blocked",
            "payment failure",
            "severe impact",
        ];
        assert_eq!(samples.len(), URGENCY_PATTERNS.len());
        for sample in samples {
            assert_eq!(priority_label(sample), Priority::Urgent, "{sample}");
        }
    }

    #[test]
    fn test_cant_access_allows_any_separator() {
        assert_eq!(priority_label("I cant access it"), Priority::Urgent);
        assert_eq!(priority_label("I can’t access it"), Priority::Urgent);
    }

    #[test]
    fn test_urgency_matches_inside_words() {
        assert_eq!(priority_label("Question about a product"), Priority::Urgent);
        assert_eq!(priority_label("Where is my invoice?"), Priority::NotUrgent);
    }
}
