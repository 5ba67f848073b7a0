use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prompt_library::config::LibraryConfig;
use prompt_library::generation::OllamaClient;
use prompt_library::rewrite::{self, BatchEvent, DocumentOutcome, SkipReason};
use prompt_library::session::{console, SelectionSession};
use prompt_library::store;

#[derive(Parser)]
#[command(name = "prompt-library")]
#[command(about = "Flatten, combine and rewrite a library of system prompts")]
struct Cli {
    /// Config file (default: <config dir>/prompt-library/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the categorized prompt library
    #[arg(long, global = true)]
    prompts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every prompt into one flat directory with path-derived names
    Flatten {
        /// Destination directory (default: <prompts-dir>/flat-structure)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Interactively combine the base prompt with selected prompts
    Combine {
        /// Directory for combined prompts
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Rewrite every flattened prompt through the generation service
    Rewrite {
        /// Directory of flattened prompts (default: <prompts-dir>/flat-structure)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Generation service base URL
        #[arg(long, env = "OLLAMA_HOST")]
        host: Option<String>,

        /// Model to request
        #[arg(short, long, env = "OLLAMA_MODEL")]
        model: Option<String>,

        /// Pause after each successful call, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Per-request timeout in seconds (0 disables it)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

/// Initialize tracing on stderr; stdout carries menus and progress.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "prompt_library=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = match cli.config {
        Some(ref path) => LibraryConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LibraryConfig::load(),
    };
    if let Some(dir) = cli.prompts_dir {
        config.prompts_dir = dir;
    }

    match cli.command {
        Commands::Flatten { dest } => {
            let dest = dest.unwrap_or_else(|| config.flat_dir());
            let report = store::flatten(&config.prompts_dir, &dest, |copy| {
                println!(
                    "Copied: {} -> {}",
                    copy.source.display(),
                    copy.destination.display()
                );
            })?;

            if report.collisions > 0 {
                println!(
                    "\nWarning: {} files overwrote an earlier copy with the same name",
                    report.collisions
                );
            }
            println!(
                "\nCompleted! {} files copied to {}",
                report.copied,
                report.destination.display()
            );
        }
        Commands::Combine { output_dir } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let catalog = config
                .store()
                .catalog()
                .context("Failed to load prompt categories")?;
            let mut session = SelectionSession::new(catalog);
            let composer = config.composer();

            let stdin = io::stdin();
            console::run(&mut session, &composer, stdin.lock(), io::stdout())?;
        }
        Commands::Rewrite {
            dir,
            host,
            model,
            delay_ms,
            timeout_secs,
        } => {
            if let Some(host) = host {
                config.ollama_host = host;
            }
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(delay) = delay_ms {
                config.rewrite_delay_ms = delay;
            }
            if let Some(secs) = timeout_secs {
                config.request_timeout_secs = (secs > 0).then_some(secs);
            }

            let dir = dir.unwrap_or_else(|| config.flat_dir());
            let documents = rewrite::discover(&dir)?;
            let client =
                OllamaClient::new(&config.ollama_host, &config.model, config.request_timeout())?;

            tracing::info!(
                "Rewriting with model {} at {}",
                client.model(),
                client.base_url()
            );
            println!("Found {} markdown files to process.", documents.len());

            let report = rewrite::run_batch(
                &documents,
                &client,
                &config.batch_options(),
                |event| match event {
                    BatchEvent::Started { index, total, name } => {
                        println!("Processing ({}/{}): {}", index, total, name)
                    }
                    BatchEvent::Finished { name, outcome, .. } => match outcome {
                        DocumentOutcome::Skipped(SkipReason::Readme) => {
                            println!("Skipping README file: {}", name)
                        }
                        DocumentOutcome::Skipped(SkipReason::Empty) => {
                            println!("Skipping empty file: {}", name)
                        }
                        DocumentOutcome::Updated => println!("✓ Updated: {}", name),
                        DocumentOutcome::Failed(detail) => {
                            println!("✗ Error processing {}: {}", name, detail)
                        }
                    },
                },
            )
            .await;

            println!(
                "\nCompleted! {} files processed: {} updated, {} skipped, {} failed.",
                report.processed(),
                report.updated,
                report.skipped,
                report.failures.len()
            );
        }
    }

    Ok(())
}
