// Settings reconciler - Restores group memberships from an already fetched repository map
use crate::domain::repository::RepositoryMap;
use crate::domain::settings::Settings;

/// Recompute every group's membership from `repositories` without calling
/// the hosting API. Archived repositories were dropped when the map was built
/// and are not re-checked.
pub fn reconcile(settings: &mut Settings, repositories: &RepositoryMap) {
    for group in settings.groups_mut() {
        let mut membership: Vec<String> = repositories
            .values()
            .filter(|repo| repo.has_topics(&group.topics))
            .map(|repo| repo.name.clone())
            .collect();
        membership.sort();
        group.repositories = membership;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::DeploymentAggregator;
    use crate::application::hosting_api::testing::FakeHostingApi;
    use crate::application::task_pool::TaskPool;
    use crate::domain::settings::tests::{group, settings};
    use std::sync::Arc;

    fn fresh_settings() -> Settings {
        settings(vec![
            (
                "Services",
                vec![
                    group("Web", &["web"], &["staging"], 0.2),
                    group("Prod web", &["web", "prod"], &["prod"], 0.2),
                ],
            ),
            ("Data", vec![group("Pipelines", &["data"], &["prod"], 0.3)]),
        ])
    }

    #[tokio::test]
    async fn test_matches_filter_membership_after_reload() {
        let api = Arc::new(
            FakeHostingApi::default()
                .with_repository(1, "svc-a", &["prod", "web"], false)
                .with_repository(2, "svc-b", &["web"], false)
                .with_repository(3, "etl", &["data", "prod"], false)
                .with_repository(4, "legacy-web", &["web"], true),
        );
        let aggregator = DeploymentAggregator::new(api, TaskPool::new(2));

        let mut aggregated = fresh_settings();
        let repos = aggregator.aggregate(&mut aggregated).await.unwrap();

        let mut reloaded = fresh_settings();
        assert!(reloaded.groups().all(|g| g.repositories.is_empty()));
        reconcile(&mut reloaded, &repos);

        assert_eq!(reloaded, aggregated);
        assert_eq!(reloaded.tabs[0].groups[1].repositories, vec!["svc-a"]);
        assert_eq!(reloaded.tabs[1].groups[0].repositories, vec!["etl"]);
    }

    #[test]
    fn test_replaces_stale_membership() {
        let mut settings = fresh_settings();
        settings.tabs[0].groups[0].repositories = vec!["gone".to_string()];

        reconcile(&mut settings, &RepositoryMap::new());

        assert!(settings.groups().all(|g| g.repositories.is_empty()));
    }
}
