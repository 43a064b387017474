//! Templated reply drafting.

use crate::model::address::{name_from_local_part, Sender};
use crate::model::email::{Priority, Sentiment};

/// Greeting used when the sender has no address to derive a name from.
pub const GENERIC_GREETING: &str = "Hi there,";

const EMPATHY_NEGATIVE: &str = "I'm sorry for the trouble you're facing. I understand how \
frustrating this can be, and I'm here to help. ";
const EMPATHY_NEUTRAL: &str = "Thanks for reaching out. I'd be happy to help. ";
const EMPATHY_POSITIVE: &str = "Thanks for the positive note. We're glad you contacted us. ";

const URGENCY_CLAUSE: &str = "We've prioritized this request and will address it right away. ";

/// Fixed request for more information, included in every draft.
pub const NEXT_STEPS: &str = "Could you confirm any recent changes and share a screenshot of \
the issue? Meanwhile, I'm checking logs and our knowledge base for similar reports. ";

/// Fixed closing paragraph and signature, included in every draft.
pub const CLOSING: &str = "We'll keep you posted on progress. If there's anything else you \
want to add, just reply to this email.\n\nBest regards,\nSupport Team";

/// Compose a reply from the triage results.
///
/// `subject` and `body` are accepted so that callers pass the whole record,
/// but the template only depends on the sender and the derived fields.
pub fn draft_reply(
    sender: &str,
    _subject: &str,
    _body: &str,
    sentiment: Sentiment,
    priority: Priority,
    product: &str,
    requirement_summary: &str,
) -> String {
    let mut paragraph = String::from(empathy_line(sentiment));

    if !product.is_empty() {
        paragraph.push_str(&format!("We see this is related to {product}. "));
    }
    if priority == Priority::Urgent {
        paragraph.push_str(URGENCY_CLAUSE);
    }
    if !requirement_summary.is_empty() {
        paragraph.push_str(&format!(
            "From your message, I understand: {requirement_summary} "
        ));
    }
    paragraph.push_str(NEXT_STEPS);
    paragraph.push_str(CLOSING);

    format!("{}\n\n{paragraph}\n", greeting(sender))
}

/// `Hi <Name>,` from the address local part, or the generic greeting.
///
/// When the bracketed part holds no address, the text before the first `@`
/// of the whole field is used instead.
pub fn greeting(sender: &str) -> String {
    let Some((raw_local, _)) = sender.split_once('@') else {
        return GENERIC_GREETING.to_string();
    };
    let name = Sender::parse(sender)
        .name_from_local_part()
        .unwrap_or_else(|| name_from_local_part(raw_local));
    let name = name.trim();
    if name.is_empty() {
        GENERIC_GREETING.to_string()
    } else {
        format!("Hi {name},")
    }
}

fn empathy_line(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Negative => EMPATHY_NEGATIVE,
        Sentiment::Neutral => EMPATHY_NEUTRAL,
        Sentiment::Positive => EMPATHY_POSITIVE,
    }
}
