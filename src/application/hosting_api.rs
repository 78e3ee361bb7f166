// Hosting API trait for repository and deployment data access
use crate::domain::deployment::Deployment;
use crate::domain::repository::OrgRepository;
use crate::infrastructure::error::ApiError;
use async_trait::async_trait;

#[async_trait]
pub trait HostingApi: Send + Sync {
    /// List every repository of an organization, archived ones included
    async fn list_repositories(&self, organization: &str) -> Result<Vec<OrgRepository>, ApiError>;

    /// Most recent deployment of a repository to one environment, if any
    async fn latest_deployment(
        &self,
        organization: &str,
        repository: &str,
        environment: &str,
    ) -> Result<Option<Deployment>, ApiError>;
}
