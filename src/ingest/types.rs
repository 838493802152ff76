// src/ingest/types.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::http::Fetcher;

/// One candidate document of one filing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FilingReference {
    pub registry_id: String, // CIK, leading zeros kept
    pub company_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub document_url: String, // absolute
    pub form_type: Option<String>,
    pub accession_number: Option<String>,
}

/// Produces candidate documents in source order. Failures are logged by the
/// implementation and surface as an empty (or shorter) list.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn produce_candidates(&self, fetcher: &dyn Fetcher) -> Vec<FilingReference>;
    fn name(&self) -> &'static str;
}
