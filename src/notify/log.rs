// src/notify/log.rs
use anyhow::Result;

use super::{DisclosureEvent, DisclosureSink};

/// Emits one INFO line per disclosure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn line(ev: &DisclosureEvent) -> String {
        let ticker = ev.issuer.ticker_symbol.as_deref().unwrap_or("n/a");
        let mut line = format!(
            "Cybersecurity Incident Disclosure found: {} (Ticker: ${}) (CIK: {}) - {}",
            ev.issuer.name, ticker, ev.issuer.registry_id, ev.filing.document_url
        );
        if let Some(p) = ev.filing.published_at {
            line.push_str(&format!(" - Published on {}", p.to_rfc2822()));
        }
        line
    }
}

#[async_trait::async_trait]
impl DisclosureSink for LogSink {
    async fn emit(&self, ev: &DisclosureEvent) -> Result<()> {
        tracing::info!(
            target: "disclosure",
            cik = %ev.issuer.registry_id,
            ticker = ev.issuer.ticker_symbol.as_deref().unwrap_or(""),
            form = ev.filing.form_type.as_deref().unwrap_or(""),
            url = %ev.filing.document_url,
            "{}",
            Self::line(ev)
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
