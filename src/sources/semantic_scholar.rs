use serde::Deserialize;
use tracing::debug;

use super::{complete_stubs, MetadataSource};
use crate::doi;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::types::PaperRecord;

pub const API_URL_BASE: &str = "https://api.semanticscholar.org/graph/v1/";

const FIELDS: &str = "paperId,title,venue,year,referenceCount,citationCount,citations,references,\
citations.paperId,references.paperId,citations.title,references.title,\
citations.externalIds,references.externalIds";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    venue: Option<String>,
    year: Option<i32>,
    reference_count: Option<u64>,
    citation_count: Option<u64>,
    references: Option<Vec<S2Stub>>,
    citations: Option<Vec<S2Stub>>,
    /// Present on error payloads, e.g. `{"error": "Paper not found"}`.
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Stub {
    paper_id: Option<String>,
    title: Option<String>,
}

/// Semantic Scholar graph API. Records are keyed by the Semantic Scholar
/// paper id, not the DOI.
pub struct SemanticScholar<'a> {
    client: &'a HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl<'a> SemanticScholar<'a> {
    pub fn new(client: &'a HttpClient, api_key: Option<String>) -> Self {
        Self::with_base_url(client, API_URL_BASE, api_key)
    }

    pub fn with_base_url(client: &'a HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    pub fn paper_url(&self, doi: &str) -> String {
        format!(
            "{}paper/{}?fields={}",
            self.base_url,
            doi::encode_path(doi),
            FIELDS
        )
    }
}

impl MetadataSource for SemanticScholar<'_> {
    fn name(&self) -> &'static str {
        "SemanticScholar"
    }

    fn fetch(&self, doi: &str) -> Result<PaperRecord, FetchError> {
        let url = self.paper_url(doi);
        let headers: Vec<(&str, &str)> = match &self.api_key {
            Some(key) => vec![("x-api-key", key.as_str())],
            None => Vec::new(),
        };
        let body = self.client.get(&url, &headers)?;
        let record = parse_paper(&body)?;
        debug!(
            doi,
            id = %record.id,
            references = record.references.len(),
            citations = record.citations.len(),
            "resolved"
        );
        Ok(record)
    }
}

/// Convert a `/paper/{id}` response body into a record.
pub fn parse_paper(body: &str) -> Result<PaperRecord, FetchError> {
    let paper: S2Paper =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let Some(id) = paper.paper_id else {
        let detail = paper
            .error
            .or(paper.message)
            .unwrap_or_else(|| "paperId".to_string());
        return Err(FetchError::MissingId(detail));
    };

    Ok(PaperRecord {
        id,
        title: paper.title,
        venue: paper.venue,
        year: paper.year,
        reference_count: paper.reference_count,
        citation_count: paper.citation_count,
        references: stubs(paper.references),
        citations: stubs(paper.citations),
    })
}

fn stubs(raw: Option<Vec<S2Stub>>) -> Vec<crate::types::ReferenceStub> {
    complete_stubs(
        raw.unwrap_or_default()
            .into_iter()
            .map(|s| (s.paper_id, s.title)),
    )
}
