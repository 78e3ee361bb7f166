// Main entry point - Dependency injection, server setup and batch export
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::path::Path;
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::aggregator::DeploymentAggregator;
use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_cache::RefreshCache;
use crate::application::task_pool::TaskPool;
use crate::infrastructure::artifacts::write_artifacts;
use crate::infrastructure::config::{AppConfig, FileSettingsSource, load_app_config};
use crate::infrastructure::github_client::GitHubClient;
use crate::infrastructure::page_client::{PageClient, ReqwestTransport};
use crate::presentation::app_state::AppState;
use crate::presentation::grid::GridLabels;
use crate::presentation::handlers::{
    get_dashboard, get_settings, health_check, list_repositories, refresh_dashboard,
};

#[derive(Debug, Parser)]
#[command(name = "deploy-dashboard", version, about = "Latest deployments per environment for an organization's repositories")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the dashboard over HTTP (default)
    Serve,
    /// Fetch once and write the resolved settings and repositories as JSON
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_app_config()?;
    let service = build_service(&config)?;
    verify_settings(&config, &service).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, service).await,
        Command::Check => check(config, service).await,
    }
}

fn build_service(config: &AppConfig) -> anyhow::Result<DashboardService> {
    let transport = ReqwestTransport::new(
        &config.api_url,
        config.github_token.clone(),
        config.request_timeout(),
    )
    .context("failed to build HTTP client")?;
    let api = Arc::new(GitHubClient::new(PageClient::new(Arc::new(transport))));

    let pool = TaskPool::new(config.max_workers).with_wait_timeout(config.batch_timeout());
    tracing::info!(
        "Fetching deployments with {} workers, batch timeout {:?}",
        pool.max_workers(),
        config.batch_timeout()
    );
    let aggregator = DeploymentAggregator::new(api, pool);

    Ok(DashboardService::new(
        Arc::new(FileSettingsSource::new(config.settings_file.clone())),
        aggregator,
        Arc::new(RefreshCache::new(config.cache_ttl())),
    ))
}

/// Settings are re-read on every request, but a broken document must stop
/// the process before it starts serving.
async fn verify_settings(config: &AppConfig, service: &DashboardService) -> anyhow::Result<()> {
    let settings = service
        .load_settings()
        .await
        .with_context(|| format!("refusing to start with settings file {}", config.settings_file))?;

    tracing::info!(
        "Loaded settings for {}: {} tabs, {} groups",
        settings.organization,
        settings.tabs.len(),
        settings.groups().count()
    );
    Ok(())
}

async fn serve(config: AppConfig, service: DashboardService) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        dashboard_service: service,
        labels: GridLabels {
            repository_header: config.repository_header.clone(),
            repository_emoji: config.repository_emoji.clone(),
        },
    });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/settings", get(get_settings))
        .route("/repositories", get(list_repositories))
        .route("/refresh", post(refresh_dashboard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;
    tracing::info!("Starting deploy-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

async fn check(config: AppConfig, service: DashboardService) -> anyhow::Result<()> {
    let snapshot = service.snapshot().await?;

    write_artifacts(
        &snapshot.settings,
        &snapshot.repositories,
        Path::new(&config.final_settings_path),
        Path::new(&config.final_repos_path),
    )
}
