use anyhow::Context;
use clap::{Parser, Subcommand};
use client_enrichment::{
    backend::{
        BackendClient, ClientDirectory, ClientRecordFetcher, HttpClientDirectory,
        HttpClientRecordFetcher,
    },
    config::{Config, ObservabilityConfig, CONFIG_PATH_ENV},
    enrichment::ContextBuilder,
    ClientProfileController, LoadPhase, SelectOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "client-enrichment")]
#[command(about = "Load and enrich client profiles", long_about = None, version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Override the client data service URL
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable clients
    Clients,

    /// Select a client, run enrichment and print the profile view
    Show {
        #[arg(value_name = "CLIENT_ID")]
        id: String,
    },

    /// Print the enrichment context built for a client
    Context {
        #[arg(value_name = "CLIENT_ID")]
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
        config.validate()?;
    }

    init_tracing(&config.observability);
    tracing::debug!(base_url = %config.backend.base_url, "Configuration loaded");

    match cli.command {
        Commands::Clients => {
            let backend = Arc::new(BackendClient::new(&config.backend)?);
            let entries = HttpClientDirectory::new(backend).list_clients().await?;

            for entry in &entries {
                println!("{}\t{}", entry.identifier, entry.label());
            }
        }

        Commands::Show { id } => {
            let controller = ClientProfileController::from_config(&config)?;
            let outcome = controller.select(&id).await?;
            tracing::info!(identifier = %id, ?outcome, "Selection finished");

            let view = controller.view();
            println!("{}", serde_json::to_string_pretty(&view)?);

            if outcome == SelectOutcome::Completed(LoadPhase::BaseError) {
                std::process::exit(1);
            }
        }

        Commands::Context { id } => {
            let backend = Arc::new(BackendClient::new(&config.backend)?);
            let record = HttpClientRecordFetcher::new(backend).fetch_record(&id).await?;
            let builder = ContextBuilder::with_max_chars(config.enrichment.max_context_chars)?;

            println!("{}", builder.build_context(&record));
        }
    }

    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("client_enrichment={}", observability.log_level))
    });

    // stdout carries command output
    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
