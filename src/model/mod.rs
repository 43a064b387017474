//! Core data model types: raw and enriched emails, labels, and sender parsing.

pub mod address;
pub mod email;
