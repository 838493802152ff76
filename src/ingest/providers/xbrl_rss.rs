// src/ingest/providers/xbrl_rss.rs
//! Push mode: EDGAR's XBRL RSS feed of recent filings.
//!
//! Items carry an `edgar:xbrlFiling` block. Elements are matched on local name,
//! so the feed's namespace prefix doesn't matter.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::FetchError;
use crate::http::Fetcher;
use crate::ingest::types::{CandidateSource, FilingReference};

/// One feed item as read from the XML, before filtering.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeedFiling {
    pub pub_date: Option<String>,
    pub has_xbrl_filing: bool,
    pub form_type: Option<String>,
    pub company_name: Option<String>,
    pub cik: Option<String>,
    pub accession_number: Option<String>,
    pub file_urls: Vec<String>,
}

#[derive(Clone, Copy)]
enum Field {
    PubDate,
    FormType,
    CompanyName,
    Cik,
    Accession,
}

fn field_for(local: &[u8]) -> Option<Field> {
    match local {
        b"pubDate" => Some(Field::PubDate),
        b"formType" => Some(Field::FormType),
        b"companyName" => Some(Field::CompanyName),
        b"cikNumber" => Some(Field::Cik),
        b"accessionNumber" => Some(Field::Accession),
        _ => None,
    }
}

fn text_of(t: &BytesText<'_>) -> String {
    // Stray HTML entities show up in company names now and then.
    t.unescape()
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned())
}

fn url_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"url")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse every `channel/item` of the feed, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedFiling>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut current: Option<FeedFiling> = None;
    let mut field: Option<Field> = None;

    loop {
        let ev = reader
            .read_event()
            .with_context(|| format!("xbrl rss xml at byte {}", reader.buffer_position()))?;
        match ev {
            Event::Start(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"item" => current = Some(FeedFiling::default()),
                    b"xbrlFiling" => {
                        if let Some(it) = current.as_mut() {
                            it.has_xbrl_filing = true;
                        }
                    }
                    b"xbrlFile" => {
                        if let (Some(it), Some(u)) = (current.as_mut(), url_attr(&e)) {
                            it.file_urls.push(u);
                        }
                    }
                    other => {
                        if current.is_some() {
                            field = field_for(other);
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"xbrlFile" {
                    if let (Some(it), Some(u)) = (current.as_mut(), url_attr(&e)) {
                        it.file_urls.push(u);
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(it), Some(f)) = (current.as_mut(), field) {
                    set_field(it, f, text_of(&t));
                }
            }
            Event::CData(c) => {
                if let (Some(it), Some(f)) = (current.as_mut(), field) {
                    set_field(it, f, String::from_utf8_lossy(&c).into_owned());
                }
            }
            Event::End(e) => {
                field = None;
                if e.local_name().as_ref() == b"item" {
                    if let Some(it) = current.take() {
                        out.push(it);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn set_field(it: &mut FeedFiling, f: Field, v: String) {
    let v = v.trim().to_string();
    let slot = match f {
        Field::PubDate => &mut it.pub_date,
        Field::FormType => &mut it.form_type,
        Field::CompanyName => &mut it.company_name,
        Field::Cik => &mut it.cik,
        Field::Accession => &mut it.accession_number,
    };
    *slot = Some(v);
}

pub fn parse_pub_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn is_html_like(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.ends_with(".htm") || lower.ends_with(".html")
}

/// Keep allow-listed form types (exact string match) and their HTML files.
pub fn filter_filings(items: Vec<FeedFiling>, form_types: &[String]) -> Vec<FilingReference> {
    let mut out = Vec::new();
    for it in items {
        if !it.has_xbrl_filing {
            continue;
        }
        let Some(form) = it.form_type.as_deref() else {
            continue;
        };
        if !form_types.iter().any(|f| f == form) {
            continue;
        }
        let Some(cik) = it.cik.clone() else {
            tracing::debug!(target: "ingest", form, "feed item without cikNumber skipped");
            continue;
        };
        let published_at = it.pub_date.as_deref().and_then(parse_pub_date);

        for url in it.file_urls.iter().filter(|u| is_html_like(u)) {
            out.push(FilingReference {
                registry_id: cik.clone(),
                company_name: it.company_name.clone().unwrap_or_default(),
                published_at,
                document_url: url.clone(),
                form_type: Some(form.to_string()),
                accession_number: it.accession_number.clone(),
            });
        }
    }
    out
}

pub struct XbrlRssProvider {
    feed_url: String,
    form_types: Vec<String>,
}

impl XbrlRssProvider {
    pub fn new(feed_url: &str, form_types: Vec<String>) -> Self {
        Self {
            feed_url: feed_url.to_string(),
            form_types,
        }
    }

    pub fn parse_candidates(&self, xml: &str) -> Result<Vec<FilingReference>> {
        let t0 = std::time::Instant::now();
        let items = parse_feed(xml).context("parsing xbrl rss feed")?;
        let total = items.len();
        let out = filter_filings(items, &self.form_types);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_events_total").increment(total as u64);
        Ok(out)
    }
}

#[async_trait]
impl CandidateSource for XbrlRssProvider {
    async fn produce_candidates(&self, fetcher: &dyn Fetcher) -> Vec<FilingReference> {
        let body = match fetcher.fetch(&self.feed_url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(target: "ingest", error = %e, "failed to fetch xbrl rss feed");
                counter!("ingest_provider_errors_total").increment(1);
                return Vec::new();
            }
        };
        match self.parse_candidates(&body) {
            Ok(v) => {
                tracing::info!(target: "ingest", candidates = v.len(), "fetched and parsed RSS feed");
                v
            }
            Err(e) => {
                let err = FetchError::malformed(&self.feed_url, format!("{e:#}"));
                tracing::error!(target: "ingest", error = %err, "error fetching filings");
                counter!("ingest_provider_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "xbrl-rss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pub_date_accepts_named_zones() {
        let dt = parse_pub_date("Mon, 15 Jan 2024 16:05:12 EST").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T21:05:12+00:00");
        assert!(parse_pub_date("yesterday").is_none());
    }

    #[test]
    fn html_extension_check_is_case_insensitive() {
        assert!(is_html_like("https://www.sec.gov/a/b/ex99.HTM"));
        assert!(is_html_like("https://www.sec.gov/a/b/d8k.html"));
        assert!(!is_html_like("https://www.sec.gov/a/b/acme-20240115.xsd"));
    }

    #[test]
    fn item_without_xbrl_block_is_skipped() {
        let items = vec![FeedFiling {
            form_type: Some("8-K".into()),
            cik: Some("1".into()),
            file_urls: vec!["https://www.sec.gov/x.htm".into()],
            ..Default::default()
        }];
        assert!(filter_filings(items, &["8-K".to_string()]).is_empty());
    }
}
