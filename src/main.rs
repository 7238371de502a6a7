//! Catar CLI - wine quality inference server
//!
//! # Commands
//!
//! - `serve` - Load artifacts and start the HTTP server
//! - `check` - Load and validate an artifact directory without serving
//! - `init` - Write the built-in demo artifact bundle to disk
//! - `info` - Show version and endpoint summary

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use catar::{
    api::{create_router, AppState},
    artifact::WineArtifacts,
    error::{CatarError, Result},
};

/// Catar - wine quality inference server
///
/// Loads the model, scaler, and feature-name artifacts produced by the
/// offline training job and serves predictions over REST.
#[derive(Parser)]
#[command(name = "catar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    ///
    /// Examples:
    ///   catar serve --artifacts ./ml
    ///   catar serve --demo --port 8000
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Directory holding model.json, scaler.json, feature_names.json
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Serve the built-in demo bundle instead of loading files
        #[arg(long)]
        demo: bool,
    },
    /// Validate an artifact directory and print a summary
    Check {
        /// Directory holding the three artifact files
        #[arg(short, long)]
        artifacts: PathBuf,
    },
    /// Write the demo artifact bundle (a format reference for training jobs)
    Init {
        /// Output directory
        #[arg(short, long, default_value = "./ml")]
        out: PathBuf,
    },
    /// Show version and endpoint summary
    Info,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            artifacts,
            demo,
        } => run_serve(&host, port, artifacts, demo).await,
        Commands::Check { artifacts } => run_check(&artifacts),
        Commands::Init { out } => run_init(&out),
        Commands::Info => {
            print_info();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_serve(
    host: &str,
    port: u16,
    artifacts_dir: Option<PathBuf>,
    demo: bool,
) -> Result<()> {
    // Fail fast: artifacts load (or the demo bundle is built) before the
    // listener binds, so a half-initialized service never reports ready.
    let artifacts = if demo {
        println!("Starting catar (demo bundle)...");
        WineArtifacts::demo()
    } else if let Some(dir) = artifacts_dir {
        println!("Loading artifacts from {}...", dir.display());
        let artifacts = WineArtifacts::load(&dir)?;
        println!(
            "Loaded {} ({} trees, {} features)",
            artifacts.model().metadata.algorithm,
            artifacts.model().n_trees(),
            artifacts.feature_names().len()
        );
        artifacts
    } else {
        return Err(CatarError::InvalidInput {
            reason: "either --artifacts DIR or --demo must be given".to_string(),
        });
    };

    let state = AppState::new(artifacts);
    let app = create_router(state);

    let addr: SocketAddr =
        format!("{host}:{port}")
            .parse()
            .map_err(|e| CatarError::ServerError {
                reason: format!("invalid address {host}:{port}: {e}"),
            })?;

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /health        - Readiness probe");
    println!("  POST /predict       - Score one sample");
    println!("  POST /predict_batch - Score a list of samples");
    println!("  GET  /model_info    - Model metadata");
    println!("  GET  /metrics       - Prometheus metrics");
    println!("  GET  /docs          - Interactive documentation");
    println!();
    println!("Example:");
    println!("  curl http://{addr}/health");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CatarError::ServerError {
            reason: format!("failed to bind {addr}: {e}"),
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| CatarError::ServerError {
            reason: format!("server error: {e}"),
        })?;

    Ok(())
}

fn run_check(dir: &Path) -> Result<()> {
    let artifacts = WineArtifacts::load(dir)?;
    let model = artifacts.model();
    println!("Artifacts OK: {}", dir.display());
    println!("  algorithm:  {}", model.metadata.algorithm);
    println!("  target:     {}", model.metadata.target);
    println!("  trees:      {}", model.n_trees());
    println!("  features:   {}", artifacts.feature_names().len());
    println!(
        "  metrics:    rmse={:.3} mae={:.3} r2={:.3}",
        model.metadata.metrics.rmse, model.metadata.metrics.mae, model.metadata.metrics.r2
    );
    Ok(())
}

fn run_init(out: &Path) -> Result<()> {
    let artifacts = WineArtifacts::demo();
    artifacts.save(out)?;
    println!("Wrote demo artifacts to {}", out.display());
    println!("  model.json");
    println!("  scaler.json");
    println!("  feature_names.json");
    println!();
    println!("Serve them with:");
    println!("  catar serve --artifacts {}", out.display());
    Ok(())
}

fn print_info() {
    println!("catar {}", env!("CARGO_PKG_VERSION"));
    println!("Wine quality inference server");
    println!();
    println!("Features:");
    println!("  - Random-forest regression over 11 chemical measurements");
    println!("  - Fail-fast artifact loading (model, scaler, feature names)");
    println!("  - REST API with batch prediction and generated docs");
    println!("  - Prometheus request metrics");
}
