use crate::settings::AgentSettings;
use crate::structured::StructuredGenerator;
use pmk_core::{Llm, PmkError, Result};
use pmk_integrations::{BoardCanvas, DocumentPublisher, Integrations, IssueTracker};
use std::sync::Arc;

/// Everything a step needs: the model, the configured vendor adapters and the settings.
#[derive(Clone)]
pub struct AgentContext {
    pub llm: Arc<dyn Llm>,
    pub integrations: Integrations,
    pub settings: AgentSettings,
}

impl AgentContext {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, integrations: Integrations::none(), settings: AgentSettings::default() }
    }

    pub fn with_integrations(mut self, integrations: Integrations) -> Self {
        self.integrations = integrations;
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn generator(&self) -> StructuredGenerator {
        StructuredGenerator::new(self.llm.clone(), self.settings.clone())
    }

    pub fn issue_tracker(&self) -> Result<Arc<dyn IssueTracker>> {
        self.integrations.issue_tracker.clone().ok_or_else(|| {
            PmkError::Config(
                "Linear is not configured; set LINEAR_API_KEY to create a Linear project".into(),
            )
        })
    }

    pub fn board_canvas(&self) -> Result<Arc<dyn BoardCanvas>> {
        self.integrations.board_canvas.clone().ok_or_else(|| {
            PmkError::Config(
                "Miro is not configured; set MIRO_API_KEY to create a Miro board".into(),
            )
        })
    }

    pub fn document_publisher(&self) -> Result<Arc<dyn DocumentPublisher>> {
        self.integrations.document_publisher.clone().ok_or_else(|| {
            PmkError::Config(
                "Notion is not configured; set NOTION_API_KEY to publish the PRD".into(),
            )
        })
    }
}
