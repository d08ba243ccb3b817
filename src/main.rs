//! admit-standardizer - Admissions record standardization service
//!
//! Runs either as an HTTP microservice (`GET /` health check,
//! `POST /standardize` batch endpoint) or as a one-shot CLI over a JSON
//! batch file. The pipeline is rules-first with a local-model fallback.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admit_standardizer::config::Config;
use admit_standardizer::services::{batch, OllamaClient};
use admit_standardizer::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "admit-standardizer")]
#[command(about = "Standardize program/university records, rules first with a local-model fallback")]
#[command(version)]
struct Args {
    /// Path to a JSON input file (list of rows or {"rows": [...]});
    /// omit to run the HTTP server
    #[arg(long)]
    file: Option<PathBuf>,

    /// Run the HTTP server even when --file is set
    #[arg(long)]
    serve: bool,

    /// Output path for the augmented JSON array
    /// (defaults to <input>_llm.json)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Append to the output file instead of overwriting
    #[arg(long)]
    append: bool,

    /// Write the JSON array to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Port to listen on (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr so --stdout row output stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admit_standardizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let client = Arc::new(
        OllamaClient::new(&config.model_source_url)
            .context("Failed to create model client")?,
    );
    let state = AppState::new(&config, client);

    match &args.file {
        Some(in_path) if !args.serve => {
            batch::process_file(
                &state.batch,
                in_path,
                args.out.as_deref(),
                args.append,
                args.stdout,
            )
            .await
            .with_context(|| format!("Batch run over {} failed", in_path.display()))?;
            Ok(())
        }
        _ => {
            let port = args.port.unwrap_or(config.port);
            let app = build_router(state);

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
                .await
                .with_context(|| format!("Failed to bind port {port}"))?;
            info!("Listening on http://0.0.0.0:{port}");
            info!("Version: {}", env!("CARGO_PKG_VERSION"));

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}
