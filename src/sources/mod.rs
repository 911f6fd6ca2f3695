//! Metadata providers.
//!
//! Each provider turns a DOI into a [`PaperRecord`]. Callers hold a
//! `&dyn MetadataSource` chosen once from [`Provider`] and never branch on the
//! provider again.

pub mod crossref;
pub mod semantic_scholar;

use crate::config::ProviderOptions;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::types::{PaperRecord, Provider, ReferenceStub};

pub use crossref::Crossref;
pub use semantic_scholar::SemanticScholar;

/// Resolve an identifier to a paper record.
pub trait MetadataSource {
    fn name(&self) -> &'static str;

    fn fetch(&self, doi: &str) -> Result<PaperRecord, FetchError>;
}

/// Build the source selected on the command line.
pub fn for_provider<'a>(
    provider: Provider,
    client: &'a HttpClient,
    options: &ProviderOptions,
) -> Box<dyn MetadataSource + 'a> {
    match provider {
        Provider::SemanticScholar => Box::new(SemanticScholar::new(client, options.api_key.clone())),
        Provider::Crossref => Box::new(Crossref::new(client, options.mailto.clone())),
    }
}

/// Keep only stubs where both id and title were reported.
pub(crate) fn complete_stubs<I>(raw: I) -> Vec<ReferenceStub>
where
    I: IntoIterator<Item = (Option<String>, Option<String>)>,
{
    raw.into_iter()
        .filter_map(|(id, title)| match (id, title) {
            (Some(id), Some(title)) => Some(ReferenceStub {
                id,
                title: Some(title),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_stubs_dropped() {
        let stubs = complete_stubs(vec![
            (Some("a".into()), Some("A".into())),
            (Some("b".into()), None),
            (None, Some("C".into())),
            (Some("d".into()), Some("D".into())),
        ]);
        let ids: Vec<_> = stubs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "d"]);
    }
}
