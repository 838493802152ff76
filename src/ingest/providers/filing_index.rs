// src/ingest/providers/filing_index.rs
//! Pull mode: scrape an issuer's browse-edgar 8-K listing for filing index pages.

use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::http::Fetcher;
use crate::ingest::types::{CandidateSource, FilingReference};

// Accession numbers come dashed (0001193125-23-123456) in the path's last segment.
static RE_DOCUMENTS_BUTTON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<a\s+href="(/Archives/edgar/data/\d+/\d+/([\d-]+)-index\.htm)"\s+id="documentsbutton""#,
    )
    .expect("documents button regex")
});

pub struct FilingIndexProvider {
    www_base: String,
    registry_id: String,
    company_name: String,
}

impl FilingIndexProvider {
    pub fn new(www_base: &str, registry_id: &str, company_name: &str) -> Self {
        Self {
            www_base: www_base.trim_end_matches('/').to_string(),
            registry_id: registry_id.to_string(),
            company_name: company_name.to_string(),
        }
    }

    /// 8-K family listing, newest first, up to 100 rows.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/cgi-bin/browse-edgar?action=getcompany&CIK={}&type=8-K&dateb=&owner=exclude&count=100",
            self.www_base, self.registry_id
        )
    }

    pub fn parse_listing(&self, html: &str) -> Vec<FilingReference> {
        RE_DOCUMENTS_BUTTON
            .captures_iter(html)
            .map(|caps| FilingReference {
                registry_id: self.registry_id.clone(),
                company_name: self.company_name.clone(),
                published_at: None,
                document_url: format!("{}{}", self.www_base, &caps[1]),
                form_type: None,
                accession_number: Some(caps[2].to_string()),
            })
            .collect()
    }
}

#[async_trait]
impl CandidateSource for FilingIndexProvider {
    async fn produce_candidates(&self, fetcher: &dyn Fetcher) -> Vec<FilingReference> {
        let url = self.listing_url();
        match fetcher.fetch(&url).await {
            Ok(html) => {
                let out = self.parse_listing(&html);
                tracing::debug!(
                    target: "ingest",
                    cik = %self.registry_id,
                    candidates = out.len(),
                    "filing index parsed"
                );
                out
            }
            Err(e) => {
                tracing::error!(
                    target: "ingest",
                    error = %e,
                    cik = %self.registry_id,
                    "failed to fetch filings"
                );
                counter!("ingest_provider_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "filing-index"
    }
}
