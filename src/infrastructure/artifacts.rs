// Batch output documents for downstream rendering
use crate::domain::repository::{Repository, RepositoryMap};
use crate::domain::settings::Settings;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the resolved settings and the repository array as pretty JSON.
pub fn write_artifacts(
    settings: &Settings,
    repositories: &RepositoryMap,
    settings_path: &Path,
    repositories_path: &Path,
) -> anyhow::Result<()> {
    write_json(settings_path, settings)?;

    let repositories: Vec<&Repository> = repositories.values().collect();
    write_json(repositories_path, &repositories)?;

    tracing::info!(
        "Wrote {} and {}",
        settings_path.display(),
        repositories_path.display()
    );
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::Deployment;
    use crate::domain::settings::tests::{group, settings};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn test_writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("final_settings.json");
        let repos_path = dir.path().join("final_repos.json");

        let mut settings = settings(vec![("Main", vec![group("Web", &["web"], &["staging"], 0.2)])]);
        settings.tabs[0].groups[0].repositories = vec!["svc-a".to_string()];

        let mut deployments = BTreeMap::new();
        deployments.insert(
            "staging".to_string(),
            Deployment::new(
                "v1.2.0".to_string(),
                "https://api.github.com/repos/acme/svc-a/deployments/1".to_string(),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ),
        );
        let mut repositories = RepositoryMap::new();
        repositories.insert(
            "svc-a".to_string(),
            Repository {
                id: 1,
                name: "svc-a".to_string(),
                url: "https://github.com/acme/svc-a".to_string(),
                topics: vec!["web".to_string()],
                environments: vec!["staging".to_string()],
                deployments,
            },
        );

        write_artifacts(&settings, &repositories, &settings_path, &repos_path).unwrap();

        let written: Settings =
            serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
        assert_eq!(written, settings);

        let repos: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&repos_path).unwrap()).unwrap();
        assert_eq!(repos[0]["name"], "svc-a");
        assert_eq!(repos[0]["deployments"]["staging"]["ref"], "v1.2.0");
        assert_eq!(repos[0]["deployments"]["staging"]["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_unwritable_path_fails() {
        let settings = settings(vec![]);
        let err = write_artifacts(
            &settings,
            &RepositoryMap::new(),
            Path::new("/nonexistent/dir/final_settings.json"),
            Path::new("/nonexistent/dir/final_repos.json"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("final_settings.json"));
    }
}
