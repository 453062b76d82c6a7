use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use docket_core::{
    AnalysisConfig, ContentUnderstandingClient, DocStatus, FsStore, IngestPipeline,
    ObjectStore, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "dkt", about = "Tax-notice document ingestion", version)]
struct Cli {
    /// Root directory holding the document containers
    #[arg(long, env = "DOCKET_ROOT", default_value = "data")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the source and destination containers
    Init,
    /// Process a single document from the source container
    Process {
        /// Document name (key within the source container)
        name: String,
    },
    /// Process every document currently in the source container
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();
    let store = Arc::new(FsStore::new(&cli.root));
    tracing::debug!(root = %cli.root.display(), "using document root");

    match cli.command {
        Commands::Init => {
            store.ensure_container(&config.source_container).await?;
            store.ensure_container(&config.destination_container).await?;
            println!("initialized containers under {}", cli.root.display());
        }
        Commands::Process { name } => {
            let pipeline = build_pipeline(store, config)?;
            let ctx = pipeline.process(&name).await;
            println!("{}: {}", ctx.name, ctx.status);
            if ctx.status != DocStatus::Relocated {
                bail!("processing ended with status {}", ctx.status);
            }
        }
        Commands::Sweep => {
            let pipeline = build_pipeline(store, config)?;
            let outcome = pipeline.process_all().await?;
            println!(
                "processed {} document(s): {} succeeded, {} failed",
                outcome.processed.len(),
                outcome.success_count(),
                outcome.failure_count()
            );
        }
    }

    Ok(())
}

fn build_pipeline(store: Arc<FsStore>, config: PipelineConfig) -> Result<IngestPipeline> {
    let analysis = AnalysisConfig::from_env()?;
    let analyzer = Arc::new(
        ContentUnderstandingClient::new(analysis.endpoint, analysis.api_key)
            .with_api_version(analysis.api_version),
    );

    Ok(IngestPipeline::new(store, analyzer).with_config(config))
}
