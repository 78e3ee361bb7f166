// Repository domain models
use crate::domain::deployment::Deployment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Repositories selected for the dashboard, keyed by repository name.
pub type RepositoryMap = BTreeMap<String, Repository>;

/// The fields of an organization repository listing that the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRepository {
    pub id: u64,
    pub name: String,
    pub topics: BTreeSet<String>,
    pub url: String,
    pub archived: bool,
}

impl OrgRepository {
    /// True when every required topic is present (exact, case-sensitive match).
    pub fn has_topics(&self, required: &[String]) -> bool {
        required.iter().all(|topic| self.topics.contains(topic))
    }
}

/// A repository shown on the dashboard together with its latest deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub url: String,
    /// Topics reported by the hosting API.
    pub topics: Vec<String>,
    /// Environments this repository must report, in first-requested order.
    pub environments: Vec<String>,
    /// Latest deployment per environment. A missing key means none was found.
    pub deployments: BTreeMap<String, Deployment>,
}

impl Repository {
    pub fn from_listing(listing: &OrgRepository, environments: &[String]) -> Self {
        Self {
            id: listing.id,
            name: listing.name.clone(),
            url: listing.url.clone(),
            topics: listing.topics.iter().cloned().collect(),
            environments: environments.to_vec(),
            deployments: BTreeMap::new(),
        }
    }

    pub fn has_topics(&self, required: &[String]) -> bool {
        required.iter().all(|topic| self.topics.contains(topic))
    }

    /// Appends environments not yet tracked, keeping existing order.
    pub fn merge_environments(&mut self, environments: &[String]) {
        for environment in environments {
            if !self.environments.contains(environment) {
                self.environments.push(environment.clone());
            }
        }
    }

    pub fn deployment(&self, environment: &str) -> Option<&Deployment> {
        self.deployments.get(environment)
    }
}
