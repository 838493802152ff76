// src/notify/mod.rs
//! Disclosure reporting: build the event, hand it to every configured sink.

pub mod log;
pub mod webhook;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::ingest::types::FilingReference;
use crate::resolver::IssuerIdentity;

pub use self::log::LogSink;
pub use self::webhook::WebhookSink;

/// Terminal output: this filing discloses a material cybersecurity incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureEvent {
    pub issuer: IssuerIdentity,
    pub filing: FilingReference,
    pub matched_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait DisclosureSink: Send + Sync {
    async fn emit(&self, ev: &DisclosureEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans events out to sinks. A failing sink is logged and never blocks the others.
#[derive(Default)]
pub struct Reporter {
    sinks: Vec<Box<dyn DisclosureSink>>,
}

impl Reporter {
    pub fn new(sinks: Vec<Box<dyn DisclosureSink>>) -> Self {
        Self { sinks }
    }

    pub fn with_sink(mut self, sink: Box<dyn DisclosureSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub async fn report(
        &self,
        issuer: IssuerIdentity,
        filing: FilingReference,
        now: DateTime<Utc>,
    ) -> DisclosureEvent {
        let ev = DisclosureEvent {
            issuer,
            filing,
            matched_at: now,
        };
        counter!("disclosures_total").increment(1);
        for s in &self.sinks {
            if let Err(e) = s.emit(&ev).await {
                tracing::error!(target: "notify", sink = s.name(), error = ?e, "sink emit failed");
            }
        }
        ev
    }
}

// --- Test helper ---
pub struct MemorySink {
    pub events: std::sync::Mutex<Vec<DisclosureEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(vec![]),
        }
    }

    pub fn snapshot(&self) -> Vec<DisclosureEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DisclosureSink for MemorySink {
    async fn emit(&self, ev: &DisclosureEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink poisoned"))?
            .push(ev.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait::async_trait]
impl<T: DisclosureSink + ?Sized> DisclosureSink for std::sync::Arc<T> {
    async fn emit(&self, ev: &DisclosureEvent) -> Result<()> {
        (**self).emit(ev).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FailingSink;

    #[async_trait::async_trait]
    impl DisclosureSink for FailingSink {
        async fn emit(&self, _ev: &DisclosureEvent) -> Result<()> {
            anyhow::bail!("downstream unavailable")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn sample() -> (IssuerIdentity, FilingReference) {
        (
            IssuerIdentity {
                name: "Acme Corp".into(),
                registry_id: "0000012345".into(),
                ticker_symbol: None,
            },
            FilingReference {
                registry_id: "0000012345".into(),
                company_name: "Acme Corp".into(),
                published_at: None,
                document_url: "https://www.sec.gov/Archives/edgar/data/12345/1/d8k.htm".into(),
                form_type: Some("8-K".into()),
                accession_number: None,
            },
        )
    }

    #[tokio::test]
    async fn failing_sink_does_not_block_others() {
        let mem = Arc::new(MemorySink::new());
        let reporter = Reporter::new(vec![Box::new(FailingSink), Box::new(mem.clone())]);
        let (issuer, filing) = sample();
        let now = Utc::now();

        let ev = reporter.report(issuer.clone(), filing.clone(), now).await;

        assert_eq!(ev.matched_at, now);
        assert_eq!(ev.issuer, issuer);
        assert_eq!(mem.snapshot(), vec![ev]);
    }

    #[test]
    fn absent_ticker_serializes_as_null() {
        let (issuer, filing) = sample();
        let ev = DisclosureEvent {
            issuer,
            filing,
            matched_at: Utc::now(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert!(v["issuer"]["ticker_symbol"].is_null());
        assert_eq!(v["filing"]["form_type"], "8-K");
    }
}
