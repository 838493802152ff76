// tests/providers_filing_index.rs
use edgar_cyber_watch::http::FixtureFetcher;
use edgar_cyber_watch::ingest::providers::filing_index::FilingIndexProvider;
use edgar_cyber_watch::ingest::types::CandidateSource;

const LISTING_HTML: &str = include_str!("fixtures/browse_edgar_8k.html");
const LISTING_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK=0000012345&type=8-K&dateb=&owner=exclude&count=100";

fn provider() -> FilingIndexProvider {
    FilingIndexProvider::new("https://www.sec.gov", "0000012345", "Acme Corp")
}

#[tokio::test]
async fn listing_yields_absolute_index_urls() {
    let fetcher = FixtureFetcher::new().with_body(LISTING_URL, LISTING_HTML);
    let refs = provider().produce_candidates(&fetcher).await;

    assert_eq!(refs.len(), 1);
    let r = &refs[0];
    assert_eq!(
        r.document_url,
        "https://www.sec.gov/Archives/edgar/data/12345/000001234524000007/0000012345-24-000007-index.htm"
    );
    assert_eq!(r.registry_id, "0000012345");
    assert_eq!(r.company_name, "Acme Corp");
    assert_eq!(r.published_at, None);
    assert_eq!(r.accession_number.as_deref(), Some("0000012345-24-000007"));
}

#[tokio::test]
async fn failed_listing_yields_empty_sequence() {
    let fetcher = FixtureFetcher::new().with_status(LISTING_URL, 500);
    let refs = provider().produce_candidates(&fetcher).await;
    assert!(refs.is_empty());
    assert_eq!(fetcher.requested(), vec![LISTING_URL.to_string()]);
}

#[tokio::test]
async fn page_without_documents_buttons_is_empty() {
    let fetcher = FixtureFetcher::new()
        .with_body(LISTING_URL, "<html><body>No matching filings.</body></html>");
    assert!(provider().produce_candidates(&fetcher).await.is_empty());
}
