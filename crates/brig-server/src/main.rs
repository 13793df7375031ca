use std::io::BufWriter;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use brig_config::BrigConfig;
use brig_db::repos::audit::AuditFilter;
use brig_db::service::BrigService;
use brig_server::AppState;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("brig error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = BrigConfig::load_with_dotenv(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        cli::Commands::Serve { bind } => serve(&config, bind.as_deref()).await,
        cli::Commands::ExportAudit { out, search } => export_audit(&config, &out, search).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("BRIG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn open_service(config: &BrigConfig) -> anyhow::Result<BrigService> {
    if !config.database.is_in_memory() {
        if let Some(parent) = Path::new(&config.database.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }
    }
    BrigService::new_local(&config.database.path, config)
        .await
        .with_context(|| format!("failed to open database {}", config.database.path))
}

async fn serve(config: &BrigConfig, bind: Option<&str>) -> anyhow::Result<()> {
    let addr: SocketAddr = match bind {
        Some(bind) => bind
            .parse()
            .with_context(|| format!("invalid --bind address '{bind}'"))?,
        None => config.server.socket_addr()?,
    };

    let service = open_service(config).await?;
    let app = brig_server::router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, database = %config.database.path, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

async fn export_audit(
    config: &BrigConfig,
    out: &Path,
    search: Option<String>,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let file = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let filter = AuditFilter {
        search,
        ..AuditFilter::default()
    };
    let rows = service
        .export_audit(None, &filter, BufWriter::new(file))
        .await?;
    println!(
        "{}",
        serde_json::json!({ "rows": rows, "out": out.display().to_string() })
    );
    Ok(())
}
