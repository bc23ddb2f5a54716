use pmk_agent::AgentContext;
use std::time::Duration;

/// Workflow runs kept in memory before the least recently updated is evicted.
pub const DEFAULT_MAX_WORKFLOW_RUNS: usize = 1000;

/// Security configuration for the PMK server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
    /// Request timeout; a full workflow makes several model calls, so this is generous.
    pub request_timeout: Duration,
    /// Whether 5xx envelopes carry the underlying error message
    pub expose_error_details: bool,
    /// Workflow runs held in the in-memory registry
    pub max_workflow_runs: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 1024 * 1024,
            request_timeout: Duration::from_secs(600),
            expose_error_details: false,
            max_workflow_runs: DEFAULT_MAX_WORKFLOW_RUNS,
        }
    }
}

impl SecurityConfig {
    /// Permissive CORS and detailed errors.
    pub fn development() -> Self {
        Self { expose_error_details: true, ..Self::default() }
    }

    /// Restrict CORS to `allowed_origins`.
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// Configuration for the PMK server.
#[derive(Clone)]
pub struct ServerConfig {
    pub context: AgentContext,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(context: AgentContext) -> Self {
        Self { context, security: SecurityConfig::default() }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// Configure allowed CORS origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }

    pub fn with_max_workflow_runs(mut self, max: usize) -> Self {
        self.security.max_workflow_runs = max;
        self
    }

    /// Enable detailed error messages (for development only)
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.security.expose_error_details = expose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_profiles() {
        let dev = SecurityConfig::development();
        assert!(dev.expose_error_details);
        assert!(dev.allowed_origins.is_empty());

        let prod = SecurityConfig::production(vec!["https://pm.example.com".into()]);
        assert!(!prod.expose_error_details);
        assert_eq!(prod.allowed_origins.len(), 1);
        assert_eq!(prod.max_body_size, 1024 * 1024);
        assert_eq!(prod.max_workflow_runs, DEFAULT_MAX_WORKFLOW_RUNS);
    }
}
