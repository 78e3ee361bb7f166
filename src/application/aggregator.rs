// Deployment aggregator - Builds the repository map and enriches it with deployments
use crate::application::hosting_api::HostingApi;
use crate::application::task_pool::{PoolError, TaskPool};
use crate::application::topic_filter::filter_by_topics;
use crate::domain::repository::{OrgRepository, RepositoryMap};
use crate::domain::settings::{Group, Settings};
use crate::infrastructure::error::ApiError;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[derive(Clone)]
pub struct DeploymentAggregator {
    api: Arc<dyn HostingApi>,
    pool: TaskPool,
}

impl DeploymentAggregator {
    pub fn new(api: Arc<dyn HostingApi>, pool: TaskPool) -> Self {
        Self { api, pool }
    }

    /// List the organization once, select repositories for every group and
    /// attach their latest deployments. Group memberships are written back
    /// into `settings`.
    pub async fn aggregate(&self, settings: &mut Settings) -> Result<RepositoryMap, AggregationError> {
        let listing = self.api.list_repositories(&settings.organization).await?;
        let mut repositories = self.select_repositories(settings, listing).await?;
        self.enrich_with_deployments(&settings.organization, &mut repositories)
            .await?;
        Ok(repositories)
    }

    /// Run the topic filter for every group and merge the selections into one
    /// entity per repository name.
    ///
    /// A repository selected by several groups reports the union of their
    /// environments, in tab and group order.
    pub async fn select_repositories(
        &self,
        settings: &mut Settings,
        listing: Vec<OrgRepository>,
    ) -> Result<RepositoryMap, AggregationError> {
        let listing = Arc::new(listing);
        let groups: Vec<Group> = settings.groups().cloned().collect();

        let selections = self
            .pool
            .run_all(groups, |group| {
                let listing = Arc::clone(&listing);
                async move { Ok::<_, AggregationError>(filter_by_topics(&group, &listing)) }
            })
            .await?;

        let mut repositories = RepositoryMap::new();
        for (group, selection) in settings.groups_mut().zip(selections) {
            group.repositories = selection.membership;
            for repository in selection.repositories {
                match repositories.entry(repository.name.clone()) {
                    Entry::Occupied(mut existing) => {
                        existing.get_mut().merge_environments(&repository.environments)
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(repository);
                    }
                }
            }
        }

        tracing::info!(
            "Selected {} repositories out of {} listed",
            repositories.len(),
            listing.len()
        );
        Ok(repositories)
    }

    /// Fetch the latest deployment of every (repository, environment) pair.
    ///
    /// One task per repository walks its environments in order. The first
    /// failed lookup aborts the whole batch and leaves `repositories` as it was.
    pub async fn enrich_with_deployments(
        &self,
        organization: &str,
        repositories: &mut RepositoryMap,
    ) -> Result<(), AggregationError> {
        let started = Instant::now();
        let organization: Arc<str> = Arc::from(organization);
        let units: Vec<(String, Vec<String>)> = repositories
            .values()
            .map(|repo| (repo.name.clone(), repo.environments.clone()))
            .collect();

        let fetched = self
            .pool
            .run_all(units, |(name, environments)| {
                let api = Arc::clone(&self.api);
                let organization = Arc::clone(&organization);
                async move {
                    let mut deployments = BTreeMap::new();
                    for environment in environments {
                        let latest = api
                            .latest_deployment(&organization, &name, &environment)
                            .await?;
                        if let Some(deployment) = latest {
                            deployments.insert(environment, deployment);
                        }
                    }
                    Ok::<_, AggregationError>((name, deployments))
                }
            })
            .await?;

        let mut recorded = 0;
        for (name, deployments) in fetched {
            if let Some(repository) = repositories.get_mut(&name) {
                recorded += deployments.len();
                repository.deployments = deployments;
            }
        }

        tracing::info!(
            "Recorded {} deployments across {} repositories in {:?}",
            recorded,
            repositories.len(),
            started.elapsed()
        );
        Ok(())
    }
}
