//! The triage pipeline: classification, extraction, reply drafting, and ranking.
//!
//! Every stage is a pure function of its inputs. [`pipeline::enrich_batch`]
//! threads a batch of [`RawEmail`](crate::model::email::RawEmail) records
//! through all of them and returns the ranked review queue.

pub mod classify;
pub mod extract;
pub mod lexicon;
pub mod pipeline;
pub mod reply;
pub mod stats;

pub use classify::{classify, Classification};
pub use extract::{extract_contacts, extract_product, extract_requirements, Contacts};
pub use pipeline::{enrich, enrich_batch, enrich_batch_with, is_support_relevant, TriageOptions};
pub use reply::draft_reply;
pub use stats::TriageStats;
