use anyhow::{Context, Result};
use pmk_agent::AgentSettings;
use pmk_server::SecurityConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pmk.toml";

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_body_size: usize,
    pub request_timeout_secs: u64,
    pub expose_error_details: bool,
    pub max_workflow_runs: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        let security = SecurityConfig::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: security.allowed_origins,
            max_body_size: security.max_body_size,
            request_timeout_secs: security.request_timeout.as_secs(),
            expose_error_details: security.expose_error_details,
            max_workflow_runs: security.max_workflow_runs,
        }
    }
}

impl ServerSection {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig {
            allowed_origins: self.allowed_origins.clone(),
            max_body_size: self.max_body_size,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            expose_error_details: self.expose_error_details,
            max_workflow_runs: self.max_workflow_runs,
        }
    }
}

/// `[model]` section. Unset fields fall back to the environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub name: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PmkConfig {
    pub server: ServerSection,
    pub model: ModelSection,
    pub workflow: AgentSettings,
}

impl PmkConfig {
    /// Load `path`, or `./pmk.toml` if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Workflow settings with the `[model]` temperature folded in.
    pub fn agent_settings(&self) -> AgentSettings {
        let mut settings = self.workflow.clone();
        if let Some(temperature) = self.model.temperature {
            settings.temperature = Some(temperature);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = PmkConfig::from_toml_str("").unwrap();
        assert_eq!(config, PmkConfig::default());
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
        assert_eq!(config.server.security().request_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_sections_parse() {
        let config = PmkConfig::from_toml_str(
            r#"
            [server]
            port = 9000
            allowed_origins = ["https://pm.example.com"]
            expose_error_details = true
            max_workflow_runs = 50

            [model]
            name = "gemini-2.5-pro"
            temperature = 0.2

            [workflow]
            max_repair_attempts = 2
            batch_concurrency = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        let security = config.server.security();
        assert_eq!(security.allowed_origins, vec!["https://pm.example.com"]);
        assert!(security.expose_error_details);
        assert_eq!(security.max_workflow_runs, 50);
        assert_eq!(config.model.name.as_deref(), Some("gemini-2.5-pro"));

        let settings = config.agent_settings();
        assert_eq!(settings.max_repair_attempts, 2);
        assert_eq!(settings.batch_concurrency, 4);
        assert_eq!(settings.llm_timeout_secs, 120);
        assert_eq!(settings.temperature, Some(0.2));
    }

    #[test]
    fn test_unknown_types_are_errors() {
        assert!(PmkConfig::from_toml_str("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\n").unwrap();
        let config = PmkConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");

        let missing = dir.path().join("missing.toml");
        let err = PmkConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
