// src/error.rs
//! Failure taxonomy for the filing pipeline.
//!
//! Nothing in here is fatal to a run: callers log the error and skip the unit
//! of work it belongs to (one document, one feed poll). "No such issuer" is
//! modelled as `Option::None` by the resolver, not as an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status.
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Connection, TLS, timeout or body-read failure.
    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Body arrived but could not be parsed as the expected XML/JSON/HTML.
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl FetchError {
    pub fn malformed(url: &str, reason: impl ToString) -> Self {
        FetchError::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Non-success status and network exceptions are transient; malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Status { .. } | FetchError::Transport { .. })
    }
}

/// Terminal failure of the on-demand (pull mode) entry point.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no registry id found for issuer {0:?}")]
    IssuerNotFound(String),
}
