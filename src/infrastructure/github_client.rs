// GitHub-compatible hosting API adapter
use crate::application::hosting_api::HostingApi;
use crate::domain::deployment::Deployment;
use crate::domain::repository::OrgRepository;
use crate::infrastructure::error::ApiError;
use crate::infrastructure::page_client::PageClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com/";
const REPOSITORIES_PER_PAGE: u32 = 100;

/// Fields read from the repository listing endpoint.
#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    id: u64,
    name: String,
    html_url: String,
    archived: bool,
    #[serde(default)]
    topics: Vec<String>,
}

/// Fields read from the deployments endpoint.
#[derive(Debug, Deserialize)]
struct DeploymentPayload {
    #[serde(rename = "ref")]
    reference: String,
    url: String,
    created_at: DateTime<Utc>,
}

impl From<RepositoryPayload> for OrgRepository {
    fn from(payload: RepositoryPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            topics: payload.topics.into_iter().collect(),
            url: payload.html_url,
            archived: payload.archived,
        }
    }
}

impl From<DeploymentPayload> for Deployment {
    fn from(payload: DeploymentPayload) -> Self {
        Deployment::new(payload.reference, payload.url, payload.created_at)
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    pages: PageClient,
}

impl GitHubClient {
    pub fn new(pages: PageClient) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn list_repositories(&self, organization: &str) -> Result<Vec<OrgRepository>, ApiError> {
        let path = format!("orgs/{}/repos", urlencoding::encode(organization));
        let query = vec![("per_page".to_string(), REPOSITORIES_PER_PAGE.to_string())];

        let repositories: Vec<RepositoryPayload> =
            self.pages.call_paginated_as(&path, &query, None, None).await?;

        tracing::info!(
            "Listed {} repositories for organization {}",
            repositories.len(),
            organization
        );
        Ok(repositories.into_iter().map(OrgRepository::from).collect())
    }

    async fn latest_deployment(
        &self,
        organization: &str,
        repository: &str,
        environment: &str,
    ) -> Result<Option<Deployment>, ApiError> {
        let path = format!(
            "repos/{}/{}/deployments",
            urlencoding::encode(organization),
            urlencoding::encode(repository)
        );
        let query = vec![
            ("environment".to_string(), environment.to_string()),
            ("per_page".to_string(), "1".to_string()),
        ];

        // The API lists deployments most recent first
        let deployments: Vec<DeploymentPayload> =
            self.pages.call_paginated_as(&path, &query, None, Some(1)).await?;

        Ok(deployments.into_iter().next().map(Deployment::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::page_client::RawResponse;
    use crate::infrastructure::page_client::testing::MockTransport;
    use chrono::TimeZone;

    fn client(transport: std::sync::Arc<MockTransport>) -> GitHubClient {
        GitHubClient::new(PageClient::new(transport))
    }

    #[tokio::test]
    async fn test_list_repositories_projects_fields() {
        let transport = MockTransport::json(
            200,
            r#"[
                {"id": 1, "name": "svc-a", "full_name": "acme/svc-a", "html_url": "https://github.com/acme/svc-a",
                 "archived": false, "topics": ["web", "prod"], "stargazers_count": 3},
                {"id": 2, "name": "old", "html_url": "https://github.com/acme/old", "archived": true}
            ]"#,
        );
        let github = client(transport.clone());

        let repos = github.list_repositories("acme").await.unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "svc-a");
        assert_eq!(repos[0].url, "https://github.com/acme/svc-a");
        assert!(repos[0].topics.contains("web") && repos[0].topics.contains("prod"));
        assert!(!repos[0].archived);
        assert!(repos[1].archived);
        assert!(repos[1].topics.is_empty());

        let (path, query) = &transport.requests()[0];
        assert_eq!(path, "orgs/acme/repos");
        assert_eq!(query, &vec![("per_page".to_string(), "100".to_string())]);
    }

    #[tokio::test]
    async fn test_list_repositories_follows_pages() {
        let transport = MockTransport::new(|path, query| {
            let page = query
                .iter()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.clone());
            let (id, link) = match page.as_deref() {
                None => (
                    1,
                    Some(format!(
                        "<https://api.test/{path}?per_page=100&page=2>; rel=\"next\", <https://api.test/{path}?per_page=100&page=2>; rel=\"last\""
                    )),
                ),
                _ => (2, None),
            };
            RawResponse {
                status: 200,
                body: format!(
                    r#"[{{"id": {id}, "name": "r{id}", "html_url": "https://github.com/acme/r{id}", "archived": false, "topics": []}}]"#
                ),
                link,
            }
        });
        let github = client(transport.clone());

        let repos = github.list_repositories("acme").await.unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["r1", "r2"]);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_latest_deployment_returns_first_entry() {
        let transport = MockTransport::new(|_, _| RawResponse {
            status: 200,
            body: r#"[{"id": 9, "ref": "v1.2.0", "url": "https://api.github.com/repos/acme/svc-a/deployments/9",
                       "created_at": "2024-01-01T00:00:00Z", "environment": "staging"}]"#
                .to_string(),
            // The server would happily keep paginating
            link: Some(
                r#"<https://api.test/x?page=2>; rel="next", <https://api.test/x?page=40>; rel="last""#
                    .to_string(),
            ),
        });
        let github = client(transport.clone());

        let deployment = github
            .latest_deployment("acme", "svc-a", "staging")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(deployment.reference, "v1.2.0");
        assert_eq!(
            deployment.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(transport.request_count(), 1);

        let (path, query) = &transport.requests()[0];
        assert_eq!(path, "repos/acme/svc-a/deployments");
        assert!(query.contains(&("environment".to_string(), "staging".to_string())));
        assert!(query.contains(&("per_page".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_latest_deployment_absent_is_not_an_error() {
        let github = client(MockTransport::json(200, "[]"));

        let deployment = github.latest_deployment("acme", "svc-b", "staging").await.unwrap();
        assert_eq!(deployment, None);
    }

    #[tokio::test]
    async fn test_latest_deployment_rejects_malformed_payload() {
        let github = client(MockTransport::json(200, r#"[{"ref": "v1", "url": "u"}]"#));

        let err = github
            .latest_deployment("acme", "svc-a", "prod")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_missing_repository_is_not_found() {
        let github = client(MockTransport::json(404, ""));

        let err = github
            .latest_deployment("acme", "gone", "prod")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref path } if path == "repos/acme/gone/deployments"));
    }
}
