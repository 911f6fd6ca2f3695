use clap::ValueEnum;

/// Bibliographic API used to resolve DOIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Semantic Scholar graph API (references and citations).
    #[value(name = "semanticscholar", alias = "semantic-scholar")]
    SemanticScholar,
    /// Crossref works API (references only).
    #[value(name = "crossref")]
    Crossref,
}

impl Provider {
    pub fn label(self) -> &'static str {
        match self {
            Provider::SemanticScholar => "SemanticScholar",
            Provider::Crossref => "CrossRef",
        }
    }
}

/// An edge target as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStub {
    pub id: String,
    pub title: Option<String>,
}

/// Metadata for one resolved paper.
///
/// Only `id` is guaranteed. Every other attribute is `Some` exactly when the
/// provider reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperRecord {
    pub id: String,
    pub title: Option<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub reference_count: Option<u64>,
    pub citation_count: Option<u64>,
    pub references: Vec<ReferenceStub>,
    pub citations: Vec<ReferenceStub>,
}

impl PaperRecord {
    /// A record carrying nothing but its identifier.
    #[cfg(test)]
    pub fn bare(id: impl Into<String>) -> Self {
        PaperRecord {
            id: id.into(),
            title: None,
            venue: None,
            year: None,
            reference_count: None,
            citation_count: None,
            references: Vec::new(),
            citations: Vec::new(),
        }
    }
}

/// A paper outside the bibliography, with the number of bibliography papers
/// that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodCandidate {
    pub id: String,
    pub title: Option<String>,
    pub count: usize,
}

/// Where a graph node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOrigin {
    Primary,
    Neighborhood,
}
