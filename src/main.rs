// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use clap::Parser;
use kube::Client;
use router_acme::{
    config::{Config, ConfigArgs},
    constants::{
        DEFAULT_LIST_TIMEOUT_SECS, DEFAULT_METRICS_ADDRESS, EVENT_CHANNEL_CAPACITY,
        METRICS_SERVER_PATH, TOKIO_WORKER_THREADS,
    },
    events::log_events,
    lister::KubeServiceLister,
    metrics::gather_metrics,
    reconciler::CertificateGapReconciler,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tracing::{debug, error, info};

/// Reports Deis router services whose domains lack TLS certificates
#[derive(Parser, Debug)]
#[command(name = "router-acme", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Seconds before a single service listing is abandoned
    #[arg(
        long,
        env = "LIST_TIMEOUT_SECS",
        default_value_t = DEFAULT_LIST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    list_timeout_secs: u64,

    /// Address for the Prometheus metrics endpoint
    #[arg(long, env = "METRICS_ADDRESS", default_value = DEFAULT_METRICS_ADDRESS)]
    metrics_address: SocketAddr,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("router-acme")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = Arc::new(Config::from(cli.config));
    info!(
        selector = %config.routable_service_selector,
        platform_domain = %config.platform_domain,
        domains_annotation = %config.domains_annotation,
        certificates_annotation = %config.certificates_annotation,
        "Starting router certificate watcher"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default()
        .await
        .context("failed to initialize Kubernetes client")?;
    debug!("Kubernetes client initialized successfully");

    let lister = KubeServiceLister::new(client)
        .with_timeout(Duration::from_secs(cli.list_timeout_secs));
    let reconciler = CertificateGapReconciler::new(lister, Arc::clone(&config));

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (stop_tx, stop_rx) = watch::channel(false);

    let worker = tokio::spawn(reconciler.run(events_tx, stop_rx));
    let consumer = tokio::spawn(log_events(events_rx));
    let mut metrics_server = tokio::spawn(serve_metrics(cli.metrics_address));

    let outcome = tokio::select! {
        result = shutdown_signal() => {
            if result.is_ok() {
                info!("Shutdown signal received, stopping reconciliation loop");
            }
            result
        }
        result = &mut metrics_server => {
            let err = metrics_server_exit(result);
            error!("CRITICAL: {err:#}, stopping reconciliation loop");
            Err(err)
        }
    };

    let _ = stop_tx.send(true);
    worker.await.context("reconciliation loop panicked")?;
    let consumed = consumer.await.context("event consumer panicked")?;
    metrics_server.abort();

    info!(events = consumed, "Router certificate watcher stopped");
    outcome
}

/// Turn the metrics server task's outcome into the error the process exits with.
///
/// The server only returns on failure, so every outcome is an error.
fn metrics_server_exit(result: Result<Result<()>, JoinError>) -> anyhow::Error {
    match result {
        Ok(Ok(())) => anyhow!("metrics server exited unexpectedly without error"),
        Ok(Err(e)) => e.context("metrics server exited unexpectedly"),
        Err(e) => anyhow::Error::new(e).context("metrics server panicked"),
    }
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

fn metrics_router() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics_handler))
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn serve_metrics(address: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind metrics server to {address}"))?;
    info!(%address, path = METRICS_SERVER_PATH, "Serving Prometheus metrics");

    axum::serve(listener, metrics_router())
        .await
        .context("metrics server crashed")?;
    Ok(())
}
