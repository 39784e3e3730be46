mod api;
mod builder;
mod config;
mod convert;
mod document_store;
mod error;
mod ids;
mod lookup;
mod models;
mod source;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use config::Config;
use convert::ConvertOptions;
use lookup::LookupTable;
use models::Hierarchy;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub lookup: Arc<LookupTable>,
    pub hierarchy: Arc<Mutex<Hierarchy>>,
}

/// Builds the nested climbing document from flat route tables.
#[derive(Parser)]
#[command(name = "climbing-atlas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Region/province reference table
    #[arg(long, global = true)]
    lookup: Option<PathBuf>,

    /// Output document
    #[arg(long, global = true)]
    document: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the source table into the hierarchy document
    Convert {
        /// Source table with one row per route
        #[arg(long)]
        source: Option<PathBuf>,
        /// Append to the existing document instead of starting empty
        #[arg(long)]
        extend: bool,
    },
    /// Serve the document and accept new cliffs over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climbing_atlas=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = cli.lookup {
        config.lookup_path = path;
    }
    if let Some(path) = cli.document {
        config.document_path = path;
    }

    match cli.command {
        Commands::Convert { source, extend } => {
            let options = ConvertOptions {
                lookup_path: config.lookup_path,
                source_path: source.unwrap_or(config.source_path),
                document_path: config.document_path,
                extend,
            };
            convert::run_conversion(&options).await?;
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let lookup = LookupTable::load(&config.lookup_path).context("Failed to load lookup table")?;
    let (regions, provinces) = lookup.sizes();
    info!(regions, provinces, "Loaded lookup table");
    let hierarchy = document_store::load_or_default(&config.document_path).await?;
    info!(
        cliffs = hierarchy.summary().cliffs,
        "Loaded document {}",
        config.document_path.display()
    );

    let state = AppState {
        config: config.clone(),
        lookup: Arc::new(lookup),
        hierarchy: Arc::new(Mutex::new(hierarchy)),
    };

    let app = Router::new()
        .route("/healthz", get(api::healthz))
        .route("/v1/hierarchy", get(api::get_hierarchy))
        .route("/v1/cliffs", post(api::add_cliff))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("climbing-atlas listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
