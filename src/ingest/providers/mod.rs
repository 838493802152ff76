// src/ingest/providers/mod.rs
pub mod filing_index;
pub mod xbrl_rss;
