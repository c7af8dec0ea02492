//! yojana-ingest: load a scheme catalogue into the vector store.
//!
//! Creates the scheme and memory collections when they are missing, then
//! upserts every scheme from the seed file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use yojana_inference::OpenAIBackend;
use yojana_pipeline::ingest::{ingest_schemes, load_seed};
use yojana_store::{Collections, QdrantStore};

#[derive(Parser)]
#[command(name = "yojana-ingest")]
#[command(author, version, about = "Load welfare schemes into Qdrant")]
struct Cli {
    /// JSON file holding an array of schemes
    #[arg(short, long)]
    seed: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yojana_pipeline=info,yojana_store=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let schemes = load_seed(&cli.seed)?;
    let embedder = OpenAIBackend::from_env()?;
    let store = QdrantStore::from_env()?;
    let collections = Collections::from_env();

    let report = ingest_schemes(&embedder, &store, &collections, &schemes).await?;

    println!(
        "Ingested {} schemes into '{}' (vector size {})",
        report.schemes, collections.schemes, report.vector_size
    );
    for name in &report.created_collections {
        println!("Created collection '{}'", name);
    }
    Ok(())
}
