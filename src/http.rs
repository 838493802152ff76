// src/http.rs
//! Outbound HTTP boundary. Everything that talks to EDGAR goes through [`Fetcher`].

use async_trait::async_trait;
use metrics::counter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::WatchConfig;
use crate::error::FetchError;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the decoded body on a 200 response.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production client: browser-like headers, compressed bodies, and a fixed
/// pause after every request. Requests are serialized so the pause holds per
/// client even if the client is shared.
pub struct EdgarClient {
    client: Client,
    interval: Duration,
    gate: tokio::sync::Mutex<()>,
}

impl EdgarClient {
    pub fn new(user_agent: &str, interval: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(user_agent).map_err(|e| FetchError::Transport {
            url: String::new(),
            message: format!("invalid user agent: {e}"),
        })?;
        headers.insert(USER_AGENT, ua);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        // gzip/deflate/brotli decoding is enabled through crate features and
        // advertises Accept-Encoding on its own.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("building http client: {e}"),
            })?;

        Ok(Self {
            client,
            interval,
            gate: tokio::sync::Mutex::new(()),
        })
    }

    pub fn from_config(cfg: &WatchConfig) -> Result<Self, FetchError> {
        Self::new(
            &cfg.user_agent,
            Duration::from_millis(cfg.request_interval_ms),
        )
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: format!("reading body: {e}"),
        })
    }
}

#[async_trait]
impl Fetcher for EdgarClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let _turn = self.gate.lock().await;
        let res = self.get_once(url).await;
        tokio::time::sleep(self.interval).await;

        if let Err(e) = &res {
            tracing::error!(target: "edgar", error = %e, transient = e.is_transient(), "fetch failed");
            counter!("edgar_fetch_errors_total").increment(1);
        } else {
            tracing::debug!(target: "edgar", %url, "fetched");
        }
        res
    }
}

enum Canned {
    Body(String),
    Status(u16),
}

/// In-memory fetcher keyed by exact URL. Unknown URLs answer 404.
/// Records every requested URL so callers can assert on laziness and order.
#[derive(Default)]
pub struct FixtureFetcher {
    responses: HashMap<String, Canned>,
    requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Canned::Status(status));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut g) = self.requested.lock() {
            g.push(url.to_string());
        }
        match self.responses.get(url) {
            Some(Canned::Body(b)) => Ok(b.clone()),
            Some(Canned::Status(s)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *s,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_serves_bodies_and_records_calls() {
        let f = FixtureFetcher::new()
            .with_body("https://a.test/1", "one")
            .with_status("https://a.test/2", 503);

        assert_eq!(f.fetch("https://a.test/1").await.unwrap(), "one");
        let err = f.fetch("https://a.test/2").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        let err = f.fetch("https://a.test/3").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        assert_eq!(
            f.requested(),
            vec!["https://a.test/1", "https://a.test/2", "https://a.test/3"]
        );
    }

    // Port 1 refuses connections, so both fetches fail fast.
    const REFUSED: &str = "http://127.0.0.1:1/Archives/edgar/usgaap.rss.xml";
    const PAUSE: Duration = Duration::from_millis(300);

    #[tokio::test]
    async fn pause_follows_failed_requests_too() {
        let client = EdgarClient::new("Acme Research admin@acme.test", PAUSE).unwrap();
        let t0 = std::time::Instant::now();

        assert!(client.fetch(REFUSED).await.is_err());
        assert!(client.fetch(REFUSED).await.is_err());

        assert!(t0.elapsed() >= PAUSE * 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shared_client_serializes_requests() {
        let client = std::sync::Arc::new(
            EdgarClient::new("Acme Research admin@acme.test", PAUSE).unwrap(),
        );
        let t0 = std::time::Instant::now();

        let a = tokio::spawn({
            let c = client.clone();
            async move { c.fetch(REFUSED).await.is_err() }
        });
        let b = tokio::spawn({
            let c = client.clone();
            async move { c.fetch(REFUSED).await.is_err() }
        });
        assert!(a.await.unwrap());
        assert!(b.await.unwrap());

        // Overlapping requests would finish after a single pause.
        assert!(t0.elapsed() >= PAUSE * 2);
    }

    #[test]
    fn client_rejects_unprintable_user_agent() {
        assert!(EdgarClient::new("bad\nagent", Duration::ZERO).is_err());
        assert!(EdgarClient::new("Acme Research admin@acme.test", Duration::ZERO).is_ok());
    }
}
