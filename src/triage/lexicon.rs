//! Keyword tables behind the triage heuristics.
//!
//! Every heuristic reads its vocabulary from here so tests can enumerate the
//! tables entry by entry.

/// Words counted towards a positive sentiment (lowercase).
pub const POSITIVE_WORDS: &[&str] = &[
    "appreciate",
    "great",
    "thanks",
    "grateful",
    "love",
    "excellent",
    "awesome",
    "fantastic",
    "resolved",
    "happy",
    "pleased",
];

/// Words counted towards a negative sentiment (lowercase).
pub const NEGATIVE_WORDS: &[&str] = &[
    "angry",
    "frustrated",
    "disappointed",
    "terrible",
    "bad",
    "poor",
    "delay",
    "delayed",
    "late",
    "broken",
    "cannot",
    "can't",
    "won't",
    "error",
    "failed",
    "failure",
    "down",
    "urgent",
    "immediately",
    "asap",
    "critical",
    "escalate",
    "unacceptable",
];

/// Regex fragments that mark a message as urgent.
///
/// Matched case-insensitively anywhere in the text, without word boundaries,
/// so `prod` also fires inside `production`.
pub const URGENCY_PATTERNS: &[&str] = &[
    "immediately",
    "urgent",
    "asap",
    "cannot access",
    "can.?t access",
    "down",
    "critical",
    "production",
    "prod",
    "escalate",
    "deadline",
    "blocked",
    "failure",
    "severe",
];

/// Whole words that make a sentence part of the requirement summary.
pub const REQUIREMENT_SIGNALS: &[&str] = &[
    "need",
    "want",
    "request",
    "require",
    "issue",
    "problem",
    "can't",
    "cannot",
    "unable",
    "access",
    "error",
    "refund",
    "cancel",
    "upgrade",
    "downgrade",
    "exchange",
];

/// Labels that introduce an explicit product reference (`Plan: Pro`).
pub const PRODUCT_LABELS: &[&str] = &[
    "product",
    "plan",
    "subscription",
    "order",
    "module",
    "feature",
];

/// Capitalized words never reported as a product.
pub const PRODUCT_STOPLIST: &[&str] = &["I", "We", "Thanks", "Regards", "Hello", "Hi"];

/// Substrings that make an email support-relevant.
pub const SUPPORT_KEYWORDS: &[&str] = &["support", "query", "request", "help"];

/// Upper bound on the requirement summary, in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Build a case-insensitive alternation over `words`.
///
/// With `whole_words` each alternative is wrapped in `\b…\b`; entries are
/// used verbatim either way, so they may carry regex syntax.
pub(crate) fn alternation(words: &[&str], whole_words: bool) -> String {
    let joined = words.join("|");
    if whole_words {
        format!(r"(?i)\b(?:{joined})\b")
    } else {
        format!(r"(?i)(?:{joined})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicons_are_lowercase() {
        for word in POSITIVE_WORDS.iter().chain(NEGATIVE_WORDS) {
            assert_eq!(*word, word.to_lowercase(), "{word} must be lowercase");
        }
    }

    #[test]
    fn test_lexicons_do_not_overlap() {
        for word in POSITIVE_WORDS {
            assert!(!NEGATIVE_WORDS.contains(word), "{word} is in both lexicons");
        }
    }

    #[test]
    fn test_alternation() {
        assert_eq!(alternation(&["a", "b"], false), "(?i)(?:a|b)");
        assert_eq!(alternation(&["a", "b"], true), r"(?i)\b(?:a|b)\b");
    }
}
