// Dashboard service - Use case for producing the resolved settings and repository map
use crate::application::aggregator::{AggregationError, DeploymentAggregator};
use crate::application::reconciler::reconcile;
use crate::application::refresh_cache::{CacheStatus, RefreshCache};
use crate::domain::repository::RepositoryMap;
use crate::domain::settings::Settings;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Source of the dashboard settings document, read on every snapshot.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> anyhow::Result<Settings>;
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load dashboard settings: {0:#}")]
    Settings(anyhow::Error),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Settings with derived memberships plus the repositories they refer to.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub settings: Settings,
    pub repositories: RepositoryMap,
    pub fetched_at: DateTime<Utc>,
    pub status: CacheStatus,
}

#[derive(Clone)]
pub struct DashboardService {
    settings_source: Arc<dyn SettingsSource>,
    aggregator: DeploymentAggregator,
    cache: Arc<RefreshCache<RepositoryMap>>,
}

impl DashboardService {
    pub fn new(
        settings_source: Arc<dyn SettingsSource>,
        aggregator: DeploymentAggregator,
        cache: Arc<RefreshCache<RepositoryMap>>,
    ) -> Self {
        Self {
            settings_source,
            aggregator,
            cache,
        }
    }

    /// Read the settings document off the async runtime.
    pub async fn load_settings(&self) -> Result<Settings, DashboardError> {
        let source = Arc::clone(&self.settings_source);
        tokio::task::spawn_blocking(move || source.load())
            .await
            .map_err(|e| DashboardError::Settings(anyhow::anyhow!("settings loader failed: {}", e)))?
            .map_err(DashboardError::Settings)
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let mut settings = self.load_settings().await?;
        let mut resolved: Option<Settings> = None;
        let resolved_slot = &mut resolved;
        let base = &settings;
        let aggregator = &self.aggregator;

        let (repositories, fetched_at, status) = self
            .cache
            .get_or_refresh(|| async move {
                let mut working = base.clone();
                let repositories = aggregator.aggregate(&mut working).await?;
                *resolved_slot = Some(working);
                Ok::<_, AggregationError>(repositories)
            })
            .await?;

        let settings = match resolved {
            Some(resolved) => resolved,
            None => {
                // Freshly loaded settings carry no memberships yet
                tracing::debug!("Reusing cached repositories fetched at {}", fetched_at);
                reconcile(&mut settings, &repositories);
                settings
            }
        };

        if status == CacheStatus::Refreshed {
            tracing::info!("Refreshed dashboard data for {}", settings.organization);
        }

        Ok(DashboardSnapshot {
            settings,
            repositories,
            fetched_at,
            status,
        })
    }

    /// Drop the cached repositories and rebuild them.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.cache.invalidate().await;
        self.snapshot().await
    }
}
