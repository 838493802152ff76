// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod notify;
pub mod resolver;
pub mod telemetry;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::classify::{classify, Classification, Tier, TermMatch};
pub use crate::config::WatchConfig;
pub use crate::error::{FetchError, LookupError};
pub use crate::http::{EdgarClient, Fetcher, FixtureFetcher};
pub use crate::ingest::types::{CandidateSource, FilingReference};
pub use crate::ingest::Pipeline;
pub use crate::notify::{DisclosureEvent, DisclosureSink, Reporter};
pub use crate::resolver::IssuerIdentity;
