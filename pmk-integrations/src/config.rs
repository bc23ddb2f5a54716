//! Per-vendor configuration read from the environment.
//!
//! A vendor whose API key is missing is simply not configured; nothing here fails at
//! start-up.

use std::time::Duration;

use crate::http::DEFAULT_TIMEOUT;

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct LinearConfig {
    pub api_key: String,
    pub team_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl LinearConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), team_id: None, base_url: None, timeout: DEFAULT_TIMEOUT }
    }

    /// `LINEAR_API_KEY`, `LINEAR_TEAM_ID`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut config = Self::new(non_empty(&lookup, "LINEAR_API_KEY")?);
        config.team_id = non_empty(&lookup, "LINEAR_TEAM_ID");
        Some(config)
    }

    pub fn with_team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Miro uses a pre-issued access token; the OAuth client pair is kept for diagnostics.
#[derive(Debug, Clone)]
pub struct MiroConfig {
    pub access_token: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl MiroConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            client_id: None,
            client_secret: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `MIRO_API_KEY`, `MIRO_CLIENT_ID`, `MIRO_CLIENT_SECRET`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut config = Self::new(non_empty(&lookup, "MIRO_API_KEY")?);
        config.client_id = non_empty(&lookup, "MIRO_CLIENT_ID");
        config.client_secret = non_empty(&lookup, "MIRO_CLIENT_SECRET");
        Some(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: String,
    pub prd_database_id: Option<String>,
    /// Name of the title property in the PRD database.
    pub title_property: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl NotionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            prd_database_id: None,
            title_property: "Name".to_string(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `NOTION_API_KEY`, `NOTION_PRD_DATABASE_ID`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut config = Self::new(non_empty(&lookup, "NOTION_API_KEY")?);
        config.prd_database_id = non_empty(&lookup, "NOTION_PRD_DATABASE_ID");
        Some(config)
    }

    pub fn with_database_id(mut self, database_id: impl Into<String>) -> Self {
        self.prd_database_id = Some(database_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Data-plane host of the index, with or without scheme.
    pub host: Option<String>,
    pub index_name: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: None,
            index_name: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `PINECONE_API_KEY`, `PINECONE_HOST`, `PINECONE_INDEX_NAME`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut config = Self::new(non_empty(&lookup, "PINECONE_API_KEY")?);
        config.host = non_empty(&lookup, "PINECONE_HOST");
        config.index_name = non_empty(&lookup, "PINECONE_INDEX_NAME");
        Some(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Every vendor, each present only when its key is set.
#[derive(Debug, Clone, Default)]
pub struct IntegrationsConfig {
    pub linear: Option<LinearConfig>,
    pub miro: Option<MiroConfig>,
    pub notion: Option<NotionConfig>,
    pub pinecone: Option<PineconeConfig>,
}

impl IntegrationsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            linear: LinearConfig::from_lookup(&lookup),
            miro: MiroConfig::from_lookup(&lookup),
            notion: NotionConfig::from_lookup(&lookup),
            pinecone: PineconeConfig::from_lookup(&lookup),
        }
    }

    /// Names of the configured vendors, for start-up logging.
    pub fn configured(&self) -> Vec<&'static str> {
        [
            ("linear", self.linear.is_some()),
            ("miro", self.miro.is_some()),
            ("notion", self.notion.is_some()),
            ("pinecone", self.pinecone.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key_leaves_vendor_unconfigured() {
        let config = IntegrationsConfig::from_lookup(env(&[
            ("LINEAR_TEAM_ID", "team-1"),
            ("NOTION_API_KEY", "secret_abc"),
            ("NOTION_PRD_DATABASE_ID", "db-1"),
        ]));
        assert!(config.linear.is_none());
        assert_eq!(config.notion.as_ref().and_then(|n| n.prd_database_id.as_deref()), Some("db-1"));
        assert_eq!(config.configured(), vec!["notion"]);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let linear = LinearConfig::from_lookup(env(&[
            ("LINEAR_API_KEY", "lin_api_x"),
            ("LINEAR_TEAM_ID", "   "),
        ]))
        .unwrap();
        assert!(linear.team_id.is_none());
        assert!(MiroConfig::from_lookup(env(&[("MIRO_API_KEY", "")])).is_none());
    }

    #[test]
    fn test_pinecone_reads_host_and_index() {
        let pinecone = PineconeConfig::from_lookup(env(&[
            ("PINECONE_API_KEY", "pc-key"),
            ("PINECONE_HOST", "prd-abc.svc.pinecone.io"),
            ("PINECONE_INDEX_NAME", "prd"),
        ]))
        .unwrap();
        assert_eq!(pinecone.host.as_deref(), Some("prd-abc.svc.pinecone.io"));
        assert_eq!(pinecone.index_name.as_deref(), Some("prd"));
        assert_eq!(pinecone.timeout, DEFAULT_TIMEOUT);
    }
}
