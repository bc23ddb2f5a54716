use std::fmt;

/// External service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Linear,
    Miro,
    Notion,
    Pinecone,
    Gemini,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Linear => "Linear",
            Vendor::Miro => "Miro",
            Vendor::Notion => "Notion",
            Vendor::Pinecone => "Pinecone",
            Vendor::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PmkError {
    /// A required input field is missing or empty. The message is user-facing as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Malformed response from {step} agent: {reason}")]
    MalformedAgentResponse {
        step: String,
        reason: String,
        /// Raw model text, kept for diagnosis.
        raw: String,
    },

    #[error("{vendor} API error ({status}): {body}")]
    VendorApi { vendor: Vendor, status: u16, body: String },

    #[error("{vendor} transport error: {message}")]
    Transport { vendor: Vendor, message: String },

    #[error("Unknown routing target '{target}'")]
    UnknownRoutingTarget { target: String, reasoning: String },

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl PmkError {
    /// Shorthand for the "`field` is required" validation failure.
    pub fn missing_field(field: &str) -> Self {
        PmkError::Validation(format!("{field} is required"))
    }

    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            PmkError::Validation(_) => "validation",
            PmkError::MalformedAgentResponse { .. } => "malformed_agent_response",
            PmkError::VendorApi { .. } => "vendor_api",
            PmkError::Transport { .. } => "transport",
            PmkError::UnknownRoutingTarget { .. } => "unknown_routing_target",
            PmkError::DataIntegrity(_) => "data_integrity",
            PmkError::Model(_) => "model",
            PmkError::Config(_) => "config",
            PmkError::Serde(_) => "serialization",
        }
    }

    /// True when the failure came from the caller's input. A missing key or id is the
    /// operator's to fix, so `Config` is not one.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PmkError::Validation(_))
    }

    /// Raw model output attached to a malformed-response failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            PmkError::MalformedAgentResponse { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PmkError>;

/// Fail with [`PmkError::missing_field`] when `value` is empty or whitespace.
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() { Err(PmkError::missing_field(field)) } else { Ok(()) }
}
