//! Demo service built on the bootstrap library.
//!
//! Serves `GET /health` and `POST /echo` until Ctrl-C, then drains and runs
//! its cleanup callbacks. Exits non-zero if anything in the lifecycle failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use axum::{response::Response, routing::{get, post}, Json, Router};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use service_bootstrap::config::{self, ServerOption};
use service_bootstrap::http::{encode_post_response, encode_response, EncodeError};
use service_bootstrap::observability::{init_logging, logging::DEFAULT_DIRECTIVE};
use service_bootstrap::ShutdownCallback;

#[derive(Parser, Debug)]
#[command(name = "service-bootstrap", version, about = "Demo HTTP service with graceful shutdown")]
struct Cli {
    /// TOML file with server settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on; overrides the config file.
    #[arg(short, long)]
    port: Option<String>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    uptime_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(DEFAULT_DIRECTIVE)?;

    tracing::info!("service-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    let mut options: Vec<ServerOption> = Vec::new();
    if let Some(path) = &cli.config {
        let settings = config::load_settings(path)?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        options.extend(settings.into_options());
    }
    if let Some(port) = cli.port {
        options.push(config::with_port(port));
    }

    let started = Instant::now();
    options.push(config::with_shutdown_callbacks([ShutdownCallback::new(
        "report-uptime",
        move |_token| async move {
            tracing::info!(uptime_secs = started.elapsed().as_secs(), "Service stopping");
            Ok(())
        },
    )]));

    let router = Router::new()
        .route("/health", get(move || health(started)))
        .route("/echo", post(echo))
        .layer(TraceLayer::new_for_http());

    match service_bootstrap::start(CancellationToken::new(), router, options).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            for err in errors.iter() {
                tracing::error!(error = %err, "Lifecycle error");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn health(started: Instant) -> Result<Response, EncodeError> {
    encode_response(&Health {
        status: "ok",
        uptime_secs: started.elapsed().as_secs(),
    })
}

async fn echo(Json(body): Json<Value>) -> Result<Response, EncodeError> {
    encode_post_response(&body)
}
