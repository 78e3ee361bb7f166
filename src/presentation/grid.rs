// Grid view model - Tabs, groups and deployment cells as the dashboard shows them
use crate::domain::repository::{Repository, RepositoryMap};
use crate::domain::settings::{Group, Settings, Tab};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const NO_TABS_WARNING: &str = "No tabs configured.";
pub const NO_GROUPS_WARNING: &str = "No groups configured for this tab.";
pub const RATIO_WARNING: &str = "The sum of the environment column ratios is greater than 1.0.";
const EMPTY_REFERENCE: &str = "-";

#[derive(Debug, Clone)]
pub struct GridLabels {
    pub repository_header: String,
    pub repository_emoji: String,
}

impl Default for GridLabels {
    fn default() -> Self {
        Self {
            repository_header: "Repository".to_string(),
            repository_emoji: "gear".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub tabs: Vec<TabView>,
    pub warning: Option<String>,
    pub last_refresh: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub title: String,
    pub groups: Vec<GroupView>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub title: String,
    pub columns: Vec<String>,
    pub column_ratios: Vec<f64>,
    pub rows: Vec<RowView>,
    pub caption: String,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub name: String,
    pub url: String,
    pub emoji: String,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub environment: String,
    pub reference: String,
    pub time: String,
}

pub fn build_dashboard_view(
    settings: &Settings,
    repositories: &RepositoryMap,
    labels: &GridLabels,
    fetched_at: DateTime<Utc>,
) -> DashboardView {
    let last_refresh = format!("Last refresh: {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));

    if settings.tabs.is_empty() {
        tracing::warn!("No tabs configured for {}", settings.organization);
        return DashboardView {
            tabs: Vec::new(),
            warning: Some(NO_TABS_WARNING.to_string()),
            last_refresh,
        };
    }

    DashboardView {
        tabs: settings
            .tabs
            .iter()
            .map(|tab| build_tab(tab, repositories, labels))
            .collect(),
        warning: None,
        last_refresh,
    }
}

fn build_tab(tab: &Tab, repositories: &RepositoryMap, labels: &GridLabels) -> TabView {
    let warning = tab.groups.is_empty().then(|| {
        tracing::warn!("No groups configured for tab {}", tab.title);
        NO_GROUPS_WARNING.to_string()
    });

    TabView {
        title: tab.title.clone(),
        groups: tab
            .groups
            .iter()
            .map(|group| build_group(group, repositories, labels))
            .collect(),
        warning,
    }
}

/// A group whose environment columns do not fit yields a warning and no rows.
pub fn build_group(group: &Group, repositories: &RepositoryMap, labels: &GridLabels) -> GroupView {
    let caption = format!("Topics: {}", group.topics.join(", "));

    let Some(column_ratios) = group.column_ratios() else {
        tracing::warn!(
            "Skipping group {}: environment columns take {:.2} of the row",
            group.title,
            group.combined_ratio()
        );
        return GroupView {
            title: group.title.clone(),
            columns: Vec::new(),
            column_ratios: Vec::new(),
            rows: Vec::new(),
            caption,
            warning: Some(RATIO_WARNING.to_string()),
        };
    };

    let mut columns = Vec::with_capacity(group.environments.len() + 1);
    columns.push(labels.repository_header.clone());
    columns.extend(group.environments.iter().cloned());

    let rows = group
        .repositories
        .iter()
        .filter_map(|name| {
            let repository = repositories.get(name);
            if repository.is_none() {
                tracing::warn!("Group {} lists unknown repository {}", group.title, name);
            }
            repository
        })
        .map(|repository| build_row(repository, &group.environments, labels))
        .collect();

    GroupView {
        title: group.title.clone(),
        columns,
        column_ratios,
        rows,
        caption,
        warning: None,
    }
}

fn build_row(repository: &Repository, environments: &[String], labels: &GridLabels) -> RowView {
    let cells = environments
        .iter()
        .map(|environment| match repository.deployment(environment) {
            Some(deployment) => CellView {
                environment: environment.clone(),
                reference: deployment.reference.clone(),
                time: deployment.created_label(),
            },
            None => CellView {
                environment: environment.clone(),
                reference: EMPTY_REFERENCE.to_string(),
                time: String::new(),
            },
        })
        .collect();

    RowView {
        name: repository.name.clone(),
        url: repository.url.clone(),
        emoji: labels.repository_emoji.clone(),
        cells,
    }
}
