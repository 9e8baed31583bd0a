//! echograph CLI: citation network analysis for news sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use echograph::extract::{Article, CitationExtractor, LinkScan};
use echograph::network::analytics::SourceSort;
use echograph::network::community::{ChamberConfig, ModularityConfig, PartitionStrategy};
use echograph::network::CitationNetwork;
use echograph::registry::SourceRegistry;
use echograph::seed::{CitationRecord, SourceRecord};

#[derive(Parser)]
#[command(name = "echograph", version, about = "Citation network engine for news sources")]
struct Cli {
    /// TOML registry of recognized outlets; defaults to the built-in table.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample network and print its summary.
    Demo,

    /// Analyze a network seeded from persisted JSON records.
    Analyze {
        /// JSON array of source records.
        #[arg(long)]
        sources: Option<PathBuf>,

        /// JSON array of citation records.
        #[arg(long)]
        citations: PathBuf,

        /// Minimum echo-chamber size.
        #[arg(long, default_value = "2")]
        min_size: usize,

        /// Seed for the community partitioner.
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Sort key for the source listing.
        #[arg(long, value_enum, default_value = "authority")]
        sort: SortKey,
    },

    /// Extract citations from one article file and print them.
    Extract {
        /// Publishing outlet's display name.
        #[arg(long)]
        source: String,

        /// Article identifier recorded on each citation.
        #[arg(long)]
        article_id: Option<String>,

        /// Path to the article content.
        #[arg(long)]
        file: PathBuf,

        /// Treat the content as markup.
        #[arg(long)]
        markup: bool,

        /// Use the regex link scanner instead of the DOM parser.
        #[arg(long)]
        regex_links: bool,
    },

    /// Export a seeded network as visualization JSON.
    Export {
        /// JSON array of source records.
        #[arg(long)]
        sources: Option<PathBuf>,

        /// JSON array of citation records.
        #[arg(long)]
        citations: PathBuf,

        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    Authority,
    CitationsReceived,
    CitationsMade,
    EchoChamberScore,
    Name,
}

impl From<SortKey> for SourceSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Authority => SourceSort::Authority,
            SortKey::CitationsReceived => SourceSort::CitationsReceived,
            SortKey::CitationsMade => SourceSort::CitationsMade,
            SortKey::EchoChamberScore => SourceSort::EchoChamberScore,
            SortKey::Name => SourceSort::Name,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = load_registry(cli.registry.as_deref())?;

    match cli.command {
        Commands::Demo => {
            let mut net = CitationNetwork::demo();
            let summary = net.network_summary();
            let chambers = net.detect_echo_chambers(&ChamberConfig::default());
            let report = serde_json::json!({
                "summary": summary,
                "echo_chambers": chambers,
                "cross_bias": net.cross_bias_matrix().to_nested_map(),
            });
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }

        Commands::Analyze {
            sources,
            citations,
            min_size,
            seed,
            sort,
        } => {
            let mut net = seeded_network(sources.as_deref(), &citations)?;
            let config = ChamberConfig {
                strategy: PartitionStrategy::Modularity(ModularityConfig {
                    seed,
                    ..Default::default()
                }),
                min_size,
            };
            let summary = net.network_summary();
            let chambers = net.detect_echo_chambers(&config);
            let listing = net.sources_list(sort.into());
            let report = serde_json::json!({
                "summary": summary,
                "echo_chambers": chambers,
                "cross_bias": net.cross_bias_matrix().to_nested_map(),
                "sources": listing,
            });
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }

        Commands::Extract {
            source,
            article_id,
            file,
            markup,
            regex_links,
        } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let strategy = if regex_links {
                LinkScan::Regex
            } else {
                LinkScan::Dom
            };
            let extractor = CitationExtractor::with_link_scan(registry, strategy);
            let article = Article {
                source,
                article_id,
                content,
                is_markup: markup,
            };
            let citations = extractor.extract(&article);
            println!(
                "{}",
                serde_json::to_string_pretty(&citations).into_diagnostic()?
            );
        }

        Commands::Export {
            sources,
            citations,
            out,
        } => {
            let mut net = seeded_network(sources.as_deref(), &citations)?;
            let export = net.export_for_visualization();
            let json = serde_json::to_string_pretty(&export).into_diagnostic()?;
            match out {
                Some(path) => std::fs::write(&path, json).into_diagnostic()?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn load_registry(path: Option<&std::path::Path>) -> Result<SourceRegistry> {
    match path {
        Some(path) => Ok(SourceRegistry::from_toml_file(path)?),
        None => Ok(SourceRegistry::builtin()),
    }
}

fn seeded_network(
    sources: Option<&std::path::Path>,
    citations: &std::path::Path,
) -> Result<CitationNetwork> {
    let source_records: Vec<SourceRecord> = match sources {
        Some(path) => {
            let text = std::fs::read_to_string(path).into_diagnostic()?;
            serde_json::from_str(&text).into_diagnostic()?
        }
        None => Vec::new(),
    };
    let text = std::fs::read_to_string(citations).into_diagnostic()?;
    let citation_records: Vec<CitationRecord> = serde_json::from_str(&text).into_diagnostic()?;

    let mut net = CitationNetwork::new();
    let report = net.load_seed(&source_records, &citation_records);
    tracing::info!(
        sources = report.sources_loaded,
        citations = report.citations_loaded,
        skipped = report.skipped,
        "network seeded"
    );
    Ok(net)
}
