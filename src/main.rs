mod bibliography;
mod cache;
mod config;
mod doi;
mod error;
mod graph;
mod http;
mod layout;
mod neighborhood;
mod pipeline;
mod render;
mod sources;
mod types;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use config::{CachePolicy, LogConfig, NeighborhoodConfig, ProviderOptions, RunConfig};
use http::UreqTransport;
use types::Provider;

#[derive(Parser)]
#[command(
    name = "citegraph",
    version,
    about = "Visualize the citation graph of a BibTeX bibliography"
)]
struct Cli {
    /// BibTeX/BibLaTeX file to visualize
    file: PathBuf,

    /// Metadata provider
    #[arg(short, long, value_enum, ignore_case = true, default_value = "semanticscholar")]
    source: Provider,

    /// Log progress at info level
    #[arg(short, long)]
    verbose: bool,

    /// Bypass the response cache
    #[arg(short, long)]
    force: bool,

    /// Also show referenced papers that are not in the bibliography
    #[arg(short, long)]
    all: bool,

    /// Maximum number of non-bibliography papers to show
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=64))]
    max: u32,

    /// Minimum number of bibliography papers that must reference a paper for it to be shown
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=256))]
    threshold: u32,

    /// Look up missing DOIs by title through Crossref
    #[arg(long)]
    resolve_titles: bool,

    /// Semantic Scholar API key
    #[arg(long, env = "S2_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Contact e-mail for the Crossref polite pool
    #[arg(long, env = "CROSSREF_MAILTO")]
    mailto: Option<String>,

    /// Override the response cache directory
    #[arg(long, env = "CITEGRAPH_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            bibliography: self.file,
            provider: self.source,
            provider_options: ProviderOptions {
                api_key: self.api_key,
                mailto: self.mailto,
            },
            neighborhood: self.all.then(|| NeighborhoodConfig {
                threshold: self.threshold as usize,
                max_count: self.max as usize,
            }),
            cache: if self.force {
                CachePolicy::Disabled
            } else {
                CachePolicy::OnDisk(self.cache_dir)
            },
            resolve_titles: self.resolve_titles,
            logging: LogConfig {
                verbose: self.verbose,
            },
        }
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config();
    config.logging.init();

    if !config.bibliography.is_file() {
        bail!(
            "Bibliography file not found: {}",
            config.bibliography.display()
        );
    }
    tracing::info!(
        file = %config.bibliography.display(),
        source = config.provider.label(),
        all = config.neighborhood.is_some(),
        "starting"
    );

    let graph = pipeline::run(&config, Box::new(UreqTransport))?;
    let title = config
        .bibliography
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "citation graph".to_string());
    let html = render::to_html(&graph, &title);
    let path = render::show(&html)?;
    eprintln!("Graph view: {}", path.display());
    Ok(())
}
