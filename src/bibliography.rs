use std::path::Path;

use biblatex::{Bibliography, RetrievalError};
use tracing::{info, warn};

use crate::doi;
use crate::error::{FetchError, LoadError};
use crate::sources::MetadataSource;
use crate::types::PaperRecord;

/// The parts of a bibliography entry this tool cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub doi: Option<String>,
    pub title: Option<String>,
}

/// Find a DOI for an entry that only has a title.
pub trait DoiResolver {
    fn resolve_title(&self, title: &str) -> Result<Option<String>, FetchError>;
}

/// Read and parse a BibTeX/BibLaTeX file, keeping file order.
pub fn read_entries(path: &Path) -> Result<Vec<BibEntry>, LoadError> {
    let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entries(&src).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_entries(src: &str) -> Result<Vec<BibEntry>, String> {
    let bibliography = Bibliography::parse(src).map_err(|e| e.to_string())?;
    Ok(bibliography
        .iter()
        .map(|entry| BibEntry {
            key: entry.key.clone(),
            doi: field(entry, "doi").as_deref().and_then(doi::normalize),
            title: field(entry, "title"),
        })
        .collect())
}

fn field(entry: &biblatex::Entry, name: &str) -> Option<String> {
    match entry.get_as::<String>(name) {
        Ok(value) => Some(value),
        Err(RetrievalError::Missing(_)) => None,
        Err(e) => {
            warn!(key = %entry.key, field = name, error = %e, "unreadable field");
            None
        }
    }
}

/// Parse `path` and resolve every entry through `source`.
///
/// A missing or unparsable file is fatal. Entries without a DOI, or whose
/// fetch fails, are logged and skipped. Output follows file order and is
/// not deduplicated.
pub fn load(
    path: &Path,
    source: &dyn MetadataSource,
    resolver: Option<&dyn DoiResolver>,
) -> Result<Vec<PaperRecord>, LoadError> {
    let entries = read_entries(path)?;
    info!(entries = entries.len(), file = %path.display(), "parsed bibliography");
    Ok(resolve_entries(&entries, source, resolver))
}

pub fn resolve_entries(
    entries: &[BibEntry],
    source: &dyn MetadataSource,
    resolver: Option<&dyn DoiResolver>,
) -> Vec<PaperRecord> {
    let mut papers = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(doi) = entry_doi(entry, resolver) else {
            continue;
        };
        match source.fetch(&doi) {
            Ok(paper) => papers.push(paper),
            Err(e) => warn!(key = %entry.key, doi = %doi, error = %e, "skipping entry"),
        }
    }
    info!(resolved = papers.len(), of = entries.len(), source = source.name(), "fetched metadata");
    papers
}

fn entry_doi(entry: &BibEntry, resolver: Option<&dyn DoiResolver>) -> Option<String> {
    if let Some(doi) = &entry.doi {
        return Some(doi.clone());
    }
    let (Some(resolver), Some(title)) = (resolver, &entry.title) else {
        match &entry.title {
            Some(title) => warn!(key = %entry.key, title = %title, "no DOI, skipping entry"),
            None => warn!(key = %entry.key, "no DOI and no title, skipping entry"),
        }
        return None;
    };
    match resolver.resolve_title(title) {
        Ok(Some(found)) => {
            info!(key = %entry.key, doi = %found, "found DOI by title");
            doi::normalize(&found)
        }
        Ok(None) => {
            warn!(key = %entry.key, title = %title, "no DOI found by title, skipping entry");
            None
        }
        Err(e) => {
            warn!(key = %entry.key, error = %e, "title lookup failed, skipping entry");
            None
        }
    }
}
