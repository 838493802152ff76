// src/resolver.rs
//! Issuer name → CIK, and CIK → ticker.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::http::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerIdentity {
    pub name: String,
    pub registry_id: String,
    /// Looked up only once a disclosure has been found.
    pub ticker_symbol: Option<String>,
}

/// Company-search Atom feed; only the header block matters.
#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "company-info", default)]
    company_info: Vec<CompanyInfo>,
}

#[derive(Debug, Deserialize)]
struct CompanyInfo {
    cik: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Submissions {
    #[serde(default)]
    tickers: Vec<String>,
}

/// Left-pad a numeric CIK to the 10 digits used in EDGAR file names.
/// Anything non-numeric is returned unchanged.
pub fn padded_cik(registry_id: &str) -> String {
    let id = registry_id.trim();
    if !id.is_empty() && id.len() < 10 && id.bytes().all(|b| b.is_ascii_digit()) {
        format!("{id:0>10}")
    } else {
        id.to_string()
    }
}

pub fn first_cik(atom: &str) -> Result<Option<String>> {
    let feed: AtomFeed = from_str(atom).context("parsing company search atom")?;
    Ok(feed
        .company_info
        .into_iter()
        .filter_map(|c| c.cik)
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty()))
}

pub fn first_ticker(json: &str) -> Result<Option<String>> {
    let s: Submissions = serde_json::from_str(json).context("parsing submissions json")?;
    Ok(s.tickers.into_iter().find(|t| !t.trim().is_empty()))
}

pub struct IdentityResolver {
    www_base: String,
    data_base: String,
}

impl IdentityResolver {
    pub fn new(www_base: &str, data_base: &str) -> Self {
        Self {
            www_base: www_base.trim_end_matches('/').to_string(),
            data_base: data_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, issuer_name: &str) -> Result<String> {
        let base = format!("{}/cgi-bin/browse-edgar", self.www_base);
        Url::parse_with_params(
            &base,
            &[
                ("company", issuer_name),
                ("owner", "exclude"),
                ("action", "getcompany"),
                ("output", "atom"),
            ],
        )
        .map(|u| u.to_string())
        .map_err(|e| anyhow!("bad search url {base}: {e}"))
    }

    pub fn submissions_url(&self, registry_id: &str) -> String {
        format!("{}/submissions/CIK{}.json", self.data_base, padded_cik(registry_id))
    }

    /// First CIK the company search returns. `None` covers both "no match" and
    /// fetch/parse failures; the latter are logged.
    pub async fn resolve_registry_id(
        &self,
        fetcher: &dyn Fetcher,
        issuer_name: &str,
    ) -> Option<String> {
        let url = match self.search_url(issuer_name) {
            Ok(u) => u,
            Err(e) => {
                tracing::error!(target: "resolver", error = ?e, "error retrieving CIK number");
                return None;
            }
        };
        let body = match fetcher.fetch(&url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(target: "resolver", error = %e, "failed to fetch CIK number");
                return None;
            }
        };
        match first_cik(&body) {
            Ok(Some(cik)) => Some(cik),
            Ok(None) => {
                tracing::error!(target: "resolver", company = issuer_name, "no CIK number found for company");
                None
            }
            Err(e) => {
                let err = FetchError::malformed(&url, format!("{e:#}"));
                tracing::error!(target: "resolver", error = %err, "error retrieving CIK number");
                None
            }
        }
    }

    pub async fn resolve_ticker_symbol(
        &self,
        fetcher: &dyn Fetcher,
        registry_id: &str,
    ) -> Option<String> {
        let url = self.submissions_url(registry_id);
        let body = match fetcher.fetch(&url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(target: "resolver", error = %e, cik = registry_id, "error fetching ticker symbol");
                return None;
            }
        };
        match first_ticker(&body) {
            Ok(t) => t,
            Err(e) => {
                let err = FetchError::malformed(&url, format!("{e:#}"));
                tracing::error!(target: "resolver", error = %err, cik = registry_id, "error retrieving ticker symbol");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_numeric_ids_only() {
        assert_eq!(padded_cik("12345"), "0000012345");
        assert_eq!(padded_cik("0000012345"), "0000012345");
        assert_eq!(padded_cik("ABC"), "ABC");
    }

    #[test]
    fn search_url_encodes_name() {
        let r = IdentityResolver::new("https://www.sec.gov", "https://data.sec.gov");
        let u = r.search_url("AT&T Inc.").unwrap();
        assert_eq!(
            u,
            "https://www.sec.gov/cgi-bin/browse-edgar?company=AT%26T+Inc.&owner=exclude&action=getcompany&output=atom"
        );
    }

    #[test]
    fn ticker_takes_first_or_none() {
        assert_eq!(
            first_ticker(r#"{"cik":"12345","tickers":["ACME","ACME-P"]}"#).unwrap(),
            Some("ACME".to_string())
        );
        assert_eq!(first_ticker(r#"{"tickers":[]}"#).unwrap(), None);
        assert_eq!(first_ticker(r#"{"name":"x"}"#).unwrap(), None);
        assert!(first_ticker("<html>").is_err());
    }
}
