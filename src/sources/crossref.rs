use serde::Deserialize;
use tracing::debug;

use super::{complete_stubs, MetadataSource};
use crate::bibliography::DoiResolver;
use crate::doi;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::types::PaperRecord;

pub const API_URL_BASE: &str = "https://api.crossref.org/";

#[derive(Deserialize)]
struct CrossRefResponse<T> {
    message: T,
}

#[derive(Deserialize)]
struct CrossRefWork {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    title: Option<Vec<String>>,
    #[serde(rename = "container-title")]
    container_title: Option<Vec<String>>,
    published: Option<CrossRefDate>,
    #[serde(rename = "references-count")]
    references_count: Option<u64>,
    #[serde(rename = "is-referenced-by-count")]
    is_referenced_by_count: Option<u64>,
    reference: Option<Vec<CrossRefReference>>,
}

#[derive(Deserialize)]
struct CrossRefDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<Option<i32>>>>,
}

#[derive(Deserialize)]
struct CrossRefReference {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "article-title")]
    article_title: Option<String>,
}

#[derive(Deserialize)]
struct CrossRefItems {
    items: Vec<CrossRefItem>,
}

#[derive(Deserialize)]
struct CrossRefItem {
    #[serde(rename = "DOI")]
    doi: String,
}

/// Crossref works API. Records are keyed by lower-cased DOI; Crossref
/// publishes no citing-works list, so `citations` is always empty.
pub struct Crossref<'a> {
    client: &'a HttpClient,
    base_url: String,
    mailto: Option<String>,
}

impl<'a> Crossref<'a> {
    pub fn new(client: &'a HttpClient, mailto: Option<String>) -> Self {
        Self::with_base_url(client, API_URL_BASE, mailto)
    }

    pub fn with_base_url(client: &'a HttpClient, base_url: &str, mailto: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            mailto,
        }
    }

    pub fn work_url(&self, doi: &str) -> String {
        let mut url = format!("{}works/{}", self.base_url, doi::encode_path(doi));
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("?mailto={}", urlencoding::encode(mailto)));
        }
        url
    }

    pub fn search_url(&self, title: &str) -> String {
        let mut url = format!(
            "{}works?query.bibliographic={}&rows=1&select=DOI",
            self.base_url,
            urlencoding::encode(title)
        );
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("&mailto={}", urlencoding::encode(mailto)));
        }
        url
    }
}

impl MetadataSource for Crossref<'_> {
    fn name(&self) -> &'static str {
        "CrossRef"
    }

    fn fetch(&self, doi: &str) -> Result<PaperRecord, FetchError> {
        let body = self.client.get(&self.work_url(doi), &[])?;
        let record = parse_work(&body)?;
        debug!(doi, references = record.references.len(), "resolved");
        Ok(record)
    }
}

impl DoiResolver for Crossref<'_> {
    fn resolve_title(&self, title: &str) -> Result<Option<String>, FetchError> {
        let body = self.client.get(&self.search_url(title), &[])?;
        parse_search(&body)
    }
}

/// Convert a `/works/{doi}` response body into a record.
pub fn parse_work(body: &str) -> Result<PaperRecord, FetchError> {
    let response: CrossRefResponse<CrossRefWork> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let work = response.message;

    let id = work
        .doi
        .map(|d| doi::canonical(&d))
        .ok_or_else(|| FetchError::MissingId("DOI".to_string()))?;

    let year = work
        .published
        .and_then(|p| p.date_parts)
        .and_then(|parts| parts.into_iter().next())
        .and_then(|first| first.into_iter().next())
        .flatten();

    let references = complete_stubs(
        work.reference
            .unwrap_or_default()
            .into_iter()
            .map(|r| (r.doi.map(|d| doi::canonical(&d)), r.article_title)),
    );

    Ok(PaperRecord {
        id,
        title: first(work.title),
        venue: first(work.container_title),
        year,
        reference_count: work.references_count,
        citation_count: work.is_referenced_by_count,
        references,
        citations: Vec::new(),
    })
}

/// First DOI of a bibliographic search, if any.
fn parse_search(body: &str) -> Result<Option<String>, FetchError> {
    let response: CrossRefResponse<CrossRefItems> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(response.message.items.into_iter().next().map(|item| item.doi))
}

fn first(values: Option<Vec<String>>) -> Option<String> {
    values.and_then(|v| v.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use crate::http::testing::ScriptedTransport;

    const WORK: &str = r#"{
        "status": "ok",
        "message": {
            "DOI": "10.1103/PhysRevLett.19.1264",
            "title": ["A Model of Leptons"],
            "container-title": ["Physical Review Letters"],
            "published": {"date-parts": [[1967, 11, 20]]},
            "references-count": 3,
            "is-referenced-by-count": 12000,
            "reference": [
                {"key": "r1", "DOI": "10.1016/0029-5582(61)90469-2", "article-title": "Partial symmetries"},
                {"key": "r2", "DOI": "10.1103/PhysRev.127.965"},
                {"key": "r3", "DOI": "10.1103/PHYSREVLETT.13.508", "article-title": "Broken symmetries"}
            ]
        }
    }"#;

    #[test]
    fn full_work() {
        let p = parse_work(WORK).unwrap();
        assert_eq!(p.id, "10.1103/physrevlett.19.1264");
        assert_eq!(p.title.as_deref(), Some("A Model of Leptons"));
        assert_eq!(p.venue.as_deref(), Some("Physical Review Letters"));
        assert_eq!(p.year, Some(1967));
        assert_eq!(p.reference_count, Some(3));
        assert_eq!(p.citation_count, Some(12000));
        assert!(p.citations.is_empty());
    }

    #[test]
    fn reference_without_title_dropped() {
        let p = parse_work(WORK).unwrap();
        assert_eq!(p.references.len(), 2);
        assert_eq!(p.references[1].id, "10.1103/physrevlett.13.508");
    }

    #[test]
    fn missing_optional_fields_stay_absent() {
        let p = parse_work(r#"{"message": {"DOI": "10.1/a", "title": []}}"#).unwrap();
        assert_eq!(p.title, None);
        assert_eq!(p.venue, None);
        assert_eq!(p.year, None);
        assert_eq!(p.reference_count, None);
        assert!(p.references.is_empty());
    }

    #[test]
    fn missing_doi_is_failure() {
        assert!(matches!(
            parse_work(r#"{"message": {"title": ["x"]}}"#),
            Err(FetchError::MissingId(_))
        ));
    }

    #[test]
    fn search_takes_first_item() {
        let body = r#"{"message": {"items": [{"DOI": "10.1/first"}, {"DOI": "10.1/second"}]}}"#;
        assert_eq!(parse_search(body).unwrap().as_deref(), Some("10.1/first"));
        assert_eq!(parse_search(r#"{"message": {"items": []}}"#).unwrap(), None);
    }

    #[test]
    fn urls_carry_mailto() {
        let client = HttpClient::new(Box::new(ScriptedTransport::default()), Box::new(NoCache));
        let cr = Crossref::with_base_url(&client, "http://cr.test/", Some("me@example.org".into()));
        assert_eq!(cr.work_url("10.1/a"), "http://cr.test/works/10.1/a?mailto=me%40example.org");
        assert_eq!(
            cr.search_url("Deep learning"),
            "http://cr.test/works?query.bibliographic=Deep%20learning&rows=1&select=DOI&mailto=me%40example.org"
        );
    }

    #[test]
    fn resolve_title_through_client() {
        let transport = ScriptedTransport::default().with(
            "http://cr.test/works?query.bibliographic=Leptons&rows=1&select=DOI",
            r#"{"message": {"items": [{"DOI": "10.1103/PhysRevLett.19.1264"}]}}"#,
        );
        let client = HttpClient::new(Box::new(transport), Box::new(NoCache));
        let cr = Crossref::with_base_url(&client, "http://cr.test/", None);
        assert_eq!(
            cr.resolve_title("Leptons").unwrap().as_deref(),
            Some("10.1103/PhysRevLett.19.1264")
        );
    }
}
