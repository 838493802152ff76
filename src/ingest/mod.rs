// src/ingest/mod.rs
//! Candidate acquisition and the shared inspect/report pipeline.
//!
//! Both acquisition modes (issuer lookup, feed polling) feed [`Pipeline::run_once`]
//! through the [`CandidateSource`] capability.

pub mod providers;
pub mod scheduler;
pub mod types;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::classify::{classify, Classification};
use crate::config::WatchConfig;
use crate::error::LookupError;
use crate::http::Fetcher;
use crate::ingest::providers::filing_index::FilingIndexProvider;
use crate::ingest::types::CandidateSource;
use crate::notify::{DisclosureEvent, Reporter};
use crate::resolver::{IdentityResolver, IssuerIdentity};
use crate::text::extract_text;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Feed items parsed from the XBRL RSS feed.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Candidate source fetch/parse errors."
        );
        describe_counter!("edgar_fetch_errors_total", "Failed EDGAR requests.");
        describe_counter!(
            "documents_classified_total",
            "Candidate documents fetched and classified."
        );
        describe_counter!("disclosures_total", "Disclosure events reported.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    });
}

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    resolver: IdentityResolver,
    reporter: Reporter,
    www_base: String,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, cfg: &WatchConfig, reporter: Reporter) -> Self {
        Self {
            fetcher,
            resolver: IdentityResolver::new(&cfg.www_base, &cfg.data_base),
            reporter,
            www_base: cfg.www_base.clone(),
        }
    }

    /// Fetch, extract and classify one document. Fetch failures are logged and
    /// count as "no disclosure".
    pub async fn inspect_document(&self, url: &str) -> Classification {
        let raw = match self.fetcher.fetch(url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(target: "ingest", error = %e, "failed to inspect document");
                return Classification::default();
            }
        };
        counter!("documents_classified_total").increment(1);
        classify(&extract_text(&raw))
    }

    /// Inspect every candidate of `source` in order and report disclosures.
    ///
    /// Within one run a filing is reported at most once, and each issuer's
    /// ticker is fetched at most once (and only after a positive document).
    pub async fn run_once(&self, source: &dyn CandidateSource) -> Vec<DisclosureEvent> {
        ensure_metrics_described();

        let candidates = source.produce_candidates(self.fetcher.as_ref()).await;
        let total = candidates.len();

        let mut reported_filings: HashSet<String> = HashSet::new();
        let mut tickers: HashMap<String, Option<String>> = HashMap::new();
        let mut events = Vec::new();

        for filing in candidates {
            if let Some(acc) = &filing.accession_number {
                if reported_filings.contains(acc) {
                    continue;
                }
            }
            if Url::parse(&filing.document_url).is_err() {
                tracing::error!(target: "ingest", url = %filing.document_url, "candidate url is not absolute");
                continue;
            }

            let verdict = self.inspect_document(&filing.document_url).await;
            let Some(hit) = verdict.matched else {
                continue;
            };
            tracing::debug!(
                target: "ingest",
                url = %filing.document_url,
                tier = ?hit.tier,
                term = hit.term,
                "document classified as disclosure"
            );

            let ticker = match tickers.get(&filing.registry_id) {
                Some(t) => t.clone(),
                None => {
                    let t = self
                        .resolver
                        .resolve_ticker_symbol(self.fetcher.as_ref(), &filing.registry_id)
                        .await;
                    tickers.insert(filing.registry_id.clone(), t.clone());
                    t
                }
            };

            if let Some(acc) = &filing.accession_number {
                reported_filings.insert(acc.clone());
            }
            let issuer = IssuerIdentity {
                name: filing.company_name.clone(),
                registry_id: filing.registry_id.clone(),
                ticker_symbol: ticker,
            };
            events.push(self.reporter.report(issuer, filing, Utc::now()).await);
        }

        tracing::info!(
            target: "ingest",
            source = source.name(),
            candidates = total,
            disclosures = events.len(),
            "run finished"
        );
        events
    }

    /// Pull mode: resolve `issuer_name` and inspect its recent 8-K family filings.
    pub async fn lookup_company(
        &self,
        issuer_name: &str,
    ) -> Result<Vec<DisclosureEvent>, LookupError> {
        let cik = self
            .resolver
            .resolve_registry_id(self.fetcher.as_ref(), issuer_name)
            .await
            .ok_or_else(|| LookupError::IssuerNotFound(issuer_name.to_string()))?;
        tracing::info!(target: "ingest", company = issuer_name, %cik, "resolved issuer");

        let source = FilingIndexProvider::new(&self.www_base, &cik, issuer_name);
        Ok(self.run_once(&source).await)
    }
}

