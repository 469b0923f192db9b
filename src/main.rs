//! # Hybrid Guide CLI (`guide`)
//!
//! ## Usage
//!
//! ```bash
//! guide --config ./config/guide.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `guide init` | Create the SQLite database and run schema migrations |
//! | `guide seed <file>` | Load attractions, hours and tickets from a TOML file |
//! | `guide index` | Chunk, embed and upload the docs directory to the search index |
//! | `guide ask "<question>"` | Answer one question and print citations |
//! | `guide serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! guide init
//! guide seed data/attractions.toml
//! guide index --dry-run
//! guide ask "Ce program are Luvrul și ce reguli are pentru bagaje?"
//! guide --log-level debug serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hybrid_guide::{config, indexer, logging, migrate, pipeline::Pipeline, seed, server};

/// Hybrid Guide: answers tourism questions from a structured attraction
/// store and an indexed document corpus.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/guide.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "guide", version, about = "Hybrid retrieval router for tourism Q&A")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/guide.toml")]
    config: PathBuf,

    /// Log filter, e.g. `debug` or `hybrid_guide=trace`. Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable colored log output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Load attractions from a TOML seed file.
    ///
    /// Existing attractions keep their name and have their hours and
    /// tickets replaced.
    Seed {
        /// Path to the seed file.
        file: PathBuf,
    },

    /// Chunk, embed and upload the docs directory.
    Index {
        /// Show chunk and batch counts without calling any service.
        #[arg(long)]
        dry_run: bool,
    },

    /// Answer a single question.
    Ask {
        question: String,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.no_color)?;

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed { file } => {
            seed::run_seed(&cfg, &file).await?;
        }
        Commands::Index { dry_run } => {
            indexer::run_index(&cfg, dry_run).await?;
        }
        Commands::Ask { question } => {
            let pipeline = Pipeline::from_config(&cfg).await?;
            let response = pipeline.answer(&question).await?;

            println!("{}\n", response.answer);
            println!("Citations:");
            if response.citations.is_empty() {
                println!("  (none)");
            }
            for c in &response.citations {
                println!("  - {} | chunk_id: {}", c.source, c.chunk_id);
            }
            println!("\nFlow: {}", response.execution_flow);
            println!("Latency: {} ms", response.latency_ms);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
