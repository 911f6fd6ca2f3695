use std::path::PathBuf;

use tracing_subscriber::{fmt, EnvFilter};

use crate::types::Provider;

/// Everything a run needs, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub bibliography: PathBuf,
    pub provider: Provider,
    pub provider_options: ProviderOptions,
    /// `None` unless out-of-bibliography papers should be shown.
    pub neighborhood: Option<NeighborhoodConfig>,
    pub cache: CachePolicy,
    pub resolve_titles: bool,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Semantic Scholar API key.
    pub api_key: Option<String>,
    /// Contact address for the Crossref polite pool.
    pub mailto: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodConfig {
    /// Minimum number of bibliography papers that must reference a candidate.
    pub threshold: usize,
    /// Upper bound on displayed candidates.
    pub max_count: usize,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            max_count: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    Disabled,
    /// On-disk cache in this directory (`None` = platform default).
    OnDisk(Option<PathBuf>),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    pub verbose: bool,
}

impl LogConfig {
    pub fn default_directive(&self) -> &'static str {
        if self.verbose { "info" } else { "warn" }
    }

    /// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        assert_eq!(LogConfig { verbose: true }.default_directive(), "info");
        assert_eq!(LogConfig::default().default_directive(), "warn");
    }

    #[test]
    fn neighborhood_defaults() {
        let n = NeighborhoodConfig::default();
        assert_eq!((n.threshold, n.max_count), (3, 10));
    }
}
