// Dashboard settings domain model
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("organization must not be empty")]
    EmptyOrganization,

    #[error("group '{group}' has environment_column_ratio {ratio}, expected a value between 0 and 1")]
    InvalidColumnRatio { group: String, ratio: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub organization: String,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub title: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub title: String,
    /// Topics a repository must carry to be listed. Matched as a set.
    pub topics: Vec<String>,
    pub environments: Vec<String>,
    /// Width of each environment column as a fraction of the row.
    pub environment_column_ratio: f64,
    /// Derived membership, sorted by name. Recomputed on every load.
    #[serde(default)]
    pub repositories: Vec<String>,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.organization.trim().is_empty() {
            return Err(SettingsError::EmptyOrganization);
        }

        for group in self.groups() {
            let ratio = group.environment_column_ratio;
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(SettingsError::InvalidColumnRatio {
                    group: group.title.clone(),
                    ratio,
                });
            }
        }

        Ok(())
    }

    /// All groups of all tabs, in configuration order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.tabs.iter().flat_map(|tab| tab.groups.iter())
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.tabs.iter_mut().flat_map(|tab| tab.groups.iter_mut())
    }
}

impl Group {
    /// Sum of all environment column widths.
    pub fn combined_ratio(&self) -> f64 {
        self.environment_column_ratio * self.environments.len() as f64
    }

    /// Environment columns leave room for the repository column.
    pub fn has_valid_layout(&self) -> bool {
        self.combined_ratio() < 1.0
    }

    /// Column widths: the repository column first, then one per environment.
    /// `None` when the environment columns do not fit.
    pub fn column_ratios(&self) -> Option<Vec<f64>> {
        if !self.has_valid_layout() {
            return None;
        }

        let mut ratios = Vec::with_capacity(self.environments.len() + 1);
        ratios.push(1.0 - self.combined_ratio());
        ratios.extend(std::iter::repeat_n(
            self.environment_column_ratio,
            self.environments.len(),
        ));
        Some(ratios)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn group(title: &str, topics: &[&str], environments: &[&str], ratio: f64) -> Group {
        Group {
            title: title.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            environments: environments.iter().map(|e| e.to_string()).collect(),
            environment_column_ratio: ratio,
            repositories: Vec::new(),
        }
    }

    pub fn settings(tabs: Vec<(&str, Vec<Group>)>) -> Settings {
        Settings {
            organization: "acme".to_string(),
            tabs: tabs
                .into_iter()
                .map(|(title, groups)| Tab {
                    title: title.to_string(),
                    groups,
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_settings() {
        let settings = settings(vec![("Services", vec![group("Web", &["web"], &["staging"], 0.2)])]);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_blank_organization() {
        let mut settings = settings(vec![]);
        settings.organization = "  ".to_string();
        assert_eq!(settings.validate(), Err(SettingsError::EmptyOrganization));
    }

    #[test]
    fn test_validate_rejects_out_of_range_ratio() {
        for ratio in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let settings = settings(vec![("T", vec![group("G", &[], &["prod"], ratio)])]);
            assert!(
                matches!(settings.validate(), Err(SettingsError::InvalidColumnRatio { .. })),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_combined_ratio_too_wide_is_not_a_load_error() {
        let settings = settings(vec![("T", vec![group("G", &[], &["staging", "prod"], 0.6)])]);
        assert_eq!(settings.validate(), Ok(()));

        let group = settings.groups().next().unwrap();
        assert!(!group.has_valid_layout());
        assert_eq!(group.column_ratios(), None);
    }

    #[test]
    fn test_column_ratios() {
        let group = group("G", &[], &["staging", "prod"], 0.25);
        assert_eq!(group.column_ratios(), Some(vec![0.5, 0.25, 0.25]));
    }

    #[test]
    fn test_deserialize_without_repositories() {
        let json = r#"{
            "organization": "acme",
            "tabs": [{"title": "Main", "groups": [{
                "title": "Web",
                "topics": ["web"],
                "environments": ["staging", "prod"],
                "environment_column_ratio": 0.2
            }]}]
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        let group = settings.groups().next().unwrap();
        assert!(group.repositories.is_empty());
        assert_eq!(group.environments, vec!["staging", "prod"]);
    }
}
