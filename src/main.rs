use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cloudscope::api::handlers::AuthenticateResponse;
use cloudscope::config::{self, Config, LogFormat};
use cloudscope::credentials::CredentialUpload;
use cloudscope::AppState;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;
    init_tracing(&cfg);

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Validate { path }) => validate_file(cfg, path).await,
        Some(cli::Commands::Report { project_id }) => print_report(cfg, &project_id).await,
        None => run_server(cfg, None).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(cfg: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cfg.default_log_filter()));

    // stdout carries the JSON printed by `validate` and `report`
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match cfg.log_format {
        LogFormat::Json => registry.with(fmt.json()).init(),
        LogFormat::Pretty => registry.with(fmt).init(),
    }
}

async fn run_server(cfg: Config, port: Option<u16>) -> anyhow::Result<()> {
    cfg.ensure_upload_dir()?;
    let addr = SocketAddr::new(cfg.host, port.unwrap_or(cfg.port));
    let debug_mode = cfg.debug;

    let state = Arc::new(AppState::from_config(cfg)?);
    let app = cloudscope::api::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(debug_mode, "cloudscope listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn validate_file(cfg: Config, path: PathBuf) -> anyhow::Result<()> {
    cfg.ensure_upload_dir()?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let state = AppState::from_config(cfg)?;
    match state
        .validator
        .validate(Some(CredentialUpload { file_name, bytes }))
        .await
    {
        Ok(identity) => {
            let body = AuthenticateResponse::from(identity);
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(e) => anyhow::bail!("{} (HTTP {})", e, e.status().as_u16()),
    }
}

async fn print_report(cfg: Config, project_id: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(cfg)?;
    let report = state.reporter.report(Some(project_id)).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
