use anyhow::Result;
use tracing::{info, warn};

use crate::bibliography::{self, DoiResolver};
use crate::cache::{NoCache, ResponseCache, SqliteCache, DEFAULT_TTL};
use crate::config::{CachePolicy, RunConfig};
use crate::graph::{self, CitationGraph};
use crate::http::{HttpClient, Transport};
use crate::neighborhood::{self, Neighborhood};
use crate::sources::{self, Crossref};

/// Open the cache the run asked for. An unusable cache location downgrades
/// the run to uncached fetching.
pub fn open_cache(policy: &CachePolicy) -> Box<dyn ResponseCache> {
    let CachePolicy::OnDisk(dir) = policy else {
        return Box::new(NoCache);
    };
    let opened = match dir {
        Some(dir) => Ok(dir.clone()),
        None => SqliteCache::default_dir(),
    }
    .and_then(|dir| {
        info!(dir = %dir.display(), "using response cache");
        SqliteCache::open(&dir, DEFAULT_TTL)
    });
    match opened {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "response cache unavailable, fetching without it");
            Box::new(NoCache)
        }
    }
}

/// Bibliography → metadata → neighborhood → graph.
pub fn build_graph(config: &RunConfig, client: &HttpClient) -> Result<CitationGraph> {
    let source = sources::for_provider(config.provider, client, &config.provider_options);
    info!(source = source.name(), "resolving bibliography");

    let title_lookup = Crossref::new(client, config.provider_options.mailto.clone());
    let resolver: Option<&dyn DoiResolver> = if config.resolve_titles {
        Some(&title_lookup)
    } else {
        None
    };

    let papers = bibliography::load(&config.bibliography, &*source, resolver)?;

    let neighborhood = match &config.neighborhood {
        Some(n) => {
            let selected = neighborhood::select_with(&papers, n);
            if selected.is_empty() {
                warn!(
                    threshold = n.threshold,
                    "no referenced paper outside the bibliography met the threshold"
                );
            }
            info!(
                selected = selected.len(),
                threshold = n.threshold,
                max = n.max_count,
                "selected referenced papers outside the bibliography"
            );
            selected
        }
        None => Neighborhood::default(),
    };

    let graph = graph::assemble(&papers, &neighborhood);
    info!(nodes = graph.node_count(), edges = graph.edge_count(), "assembled graph");
    Ok(graph)
}

/// Full run against a live transport.
pub fn run(config: &RunConfig, transport: Box<dyn Transport>) -> Result<CitationGraph> {
    let cache = open_cache(&config.cache);
    let client = HttpClient::new(transport, cache);
    build_graph(config, &client)
}
