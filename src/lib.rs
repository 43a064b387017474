//! `mailtriage`: heuristic triage for customer-support email.
//!
//! This crate provides the core library: ingestion of CSV exports, MBOX
//! mailboxes and `.eml` files, the rule-based enrichment pipeline (sentiment,
//! priority, contacts, requirements, product, draft reply), urgency-first
//! ranking, analytics, and export.

pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod triage;
