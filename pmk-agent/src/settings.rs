use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs shared by every agent step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AgentSettings {
    /// Extra attempts after a reply fails schema or semantic validation.
    pub max_repair_attempts: u32,
    pub llm_timeout_secs: u64,
    /// In-flight vendor calls per best-effort batch.
    pub batch_concurrency: usize,
    pub temperature: Option<f32>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_repair_attempts: 1,
            llm_timeout_secs: 120,
            batch_concurrency: 1,
            temperature: None,
        }
    }
}

impl AgentSettings {
    #[must_use]
    pub fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.max_repair_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout_secs = timeout.as_secs().max(1);
        self
    }

    #[must_use]
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
