pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod searcher;
pub mod types;
pub mod writer;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::Error;
use exchange_core::{DfsCycleFinder, Enumerator};
use generator::DatasetGenerator;
use searcher::ExchangeSearcher;
use writer::ResultWriter;

const DEFAULT_CONFIG_PATH: &str = "crates/executor/Config.toml";

#[derive(Debug, Parser)]
#[command(
    name = "circular-exchange",
    about = "Finds closed exchange loops between users wishing for each other's items"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load users and items, extract every exchange cycle, write the results.
    Run {
        /// Search each weight class on its own worker.
        #[arg(long)]
        parallel: bool,
        /// Overrides `data.users_file`.
        #[arg(long)]
        users: Option<PathBuf>,
        /// Overrides `data.items_file`.
        #[arg(long)]
        items: Option<PathBuf>,
        /// Overrides `data.output_dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Generate a deterministic synthetic users/items dataset.
    Generate {
        /// Directory receiving `users.json` and `items.json`.
        /// Defaults to the configured data file paths.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match config::load_config(&cli.config) {
        Ok(config) => execute(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command, config: Config) -> Result<(), Error> {
    match command {
        Command::Run {
            parallel,
            users,
            items,
            out_dir,
        } => {
            let users = users.unwrap_or_else(|| config.data.users_file.clone());
            let items = items.unwrap_or_else(|| config.data.items_file.clone());
            let out_dir = out_dir.unwrap_or_else(|| config.data.output_dir.clone());
            run(&config, &users, &items, out_dir, parallel).await
        }
        Command::Generate { out_dir } => generate(&config, out_dir),
    }
}

async fn run(
    config: &Config,
    users_path: &std::path::Path,
    items_path: &std::path::Path,
    out_dir: PathBuf,
    parallel: bool,
) -> Result<(), Error> {
    // Reject bad settings before touching any data.
    let options = config.search.options()?;
    let classes = config.items.weight_classes()?;

    let finder = DfsCycleFinder::new(options)?;

    let dataset = loader::read_dataset(users_path, items_path)?;
    let mut graph = loader::build_graph(&dataset)?;
    let initial_edges = graph.edge_count();

    info!(
        users = dataset.users.len(),
        items = dataset.items.len(),
        wishes = dataset.wish_count(),
        weights = ?graph.weights(),
        max_depth = ?finder.options().max_depth,
        edge_removal = %finder.options().edge_removal,
        "Cycle search start"
    );

    let searcher = ExchangeSearcher::new(Enumerator::new(finder, classes));
    let enumeration = if parallel {
        searcher.search_parallel(&mut graph).await?
    } else {
        searcher.search(&mut graph)?
    };

    for (weight, count) in enumeration.counts() {
        info!(?weight, cycles = count, "Weight class summary");
    }
    info!(
        total = enumeration.total_cycles(),
        exchanged_value = enumeration
            .cycles()
            .map(|(_, cycle)| cycle.total_value())
            .sum::<u64>(),
        graph_size_before = initial_edges,
        graph_size_after = graph.edge_count(),
        "Cycle search end"
    );

    ResultWriter::new(out_dir).write_all(&enumeration, &dataset.user_names())?;

    Ok(())
}

fn generate(config: &Config, out_dir: Option<PathBuf>) -> Result<(), Error> {
    let (users_path, items_path) = match out_dir {
        Some(dir) => (dir.join("users.json"), dir.join("items.json")),
        None => (config.data.users_file.clone(), config.data.items_file.clone()),
    };

    let dataset = DatasetGenerator::new(config.generator.clone())?.generate();
    generator::write_dataset(&dataset, &users_path, &items_path)?;

    info!(
        users = %users_path.display(),
        items = %items_path.display(),
        "Dataset written"
    );

    Ok(())
}
