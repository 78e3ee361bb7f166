use crate::application::dashboard_service::SettingsSource;
use crate::application::task_pool::DEFAULT_MAX_WORKERS;
use crate::domain::settings::Settings;
use crate::infrastructure::github_client::DEFAULT_API_URL;
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub settings_file: String,
    pub max_workers: usize,
    #[serde(default)]
    pub github_token: Option<String>,
    pub api_url: String,
    pub cache_ttl_secs: u64,
    pub batch_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub listen_addr: String,
    pub repository_header: String,
    pub repository_emoji: String,
    pub final_settings_path: String,
    pub final_repos_path: String,
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load process configuration from `config/dashboard.*` (optional) and
/// `DASHBOARD_*` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_app_config(config::Environment::with_prefix("DASHBOARD"))
}

fn build_app_config(environment: config::Environment) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("settings_file", "settings.json")?
        .set_default("max_workers", DEFAULT_MAX_WORKERS as i64)?
        .set_default("api_url", DEFAULT_API_URL)?
        .set_default("cache_ttl_secs", 60_i64 * 60)?
        .set_default("batch_timeout_secs", 60_i64)?
        .set_default("request_timeout_secs", 30_i64)?
        .set_default("listen_addr", "0.0.0.0:8080")?
        .set_default("repository_header", "Repository")?
        .set_default("repository_emoji", "gear")?
        .set_default("final_settings_path", "final_settings.json")?
        .set_default("final_repos_path", "final_repos.json")?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(environment.try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Read and validate a settings document. The format follows the file
/// extension (JSON or TOML).
pub fn load_settings(path: &str) -> anyhow::Result<Settings> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::from(PathBuf::from(path)))
        .build()
        .and_then(|c| c.try_deserialize())
        .with_context(|| format!("failed to load settings from {}", path))?;

    settings
        .validate()
        .with_context(|| format!("invalid settings in {}", path))?;
    Ok(settings)
}

/// Settings file re-read on every request.
#[derive(Debug, Clone)]
pub struct FileSettingsSource {
    path: String,
}

impl FileSettingsSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for FileSettingsSource {
    fn load(&self) -> anyhow::Result<Settings> {
        load_settings(&self.path)
    }
}
