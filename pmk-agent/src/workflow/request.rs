use pmk_core::{PmkError, Result, SprintLength, WorkflowStep, require_non_empty};
use serde::{Deserialize, Serialize};

fn default_team_size() -> u32 {
    5
}

fn default_total_sprints() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Input to a full workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    #[serde(default)]
    pub raw_idea: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default = "default_team_size")]
    pub team_size: u32,
    #[serde(default)]
    pub sprint_length: SprintLength,
    #[serde(default = "default_total_sprints")]
    pub total_sprints: u32,
    #[serde(default = "default_true")]
    pub enable_sprint_planning: bool,
    #[serde(default = "default_true")]
    pub enable_visual_design: bool,
    #[serde(default)]
    pub create_linear_project: bool,
    #[serde(default)]
    pub create_miro_board: bool,
    #[serde(default)]
    pub publish_prd_to_notion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl WorkflowRequest {
    pub fn new(raw_idea: impl Into<String>) -> Self {
        Self {
            raw_idea: raw_idea.into(),
            additional_context: None,
            team_size: default_team_size(),
            sprint_length: SprintLength::default(),
            total_sprints: default_total_sprints(),
            enable_sprint_planning: true,
            enable_visual_design: true,
            create_linear_project: false,
            create_miro_board: false,
            publish_prd_to_notion: false,
            session_id: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = Some(context.into());
        self
    }

    pub fn with_team(
        mut self,
        team_size: u32,
        sprint_length: SprintLength,
        total_sprints: u32,
    ) -> Self {
        self.team_size = team_size;
        self.sprint_length = sprint_length;
        self.total_sprints = total_sprints;
        self
    }

    pub fn with_sprint_planning(mut self, enabled: bool) -> Self {
        self.enable_sprint_planning = enabled;
        self
    }

    pub fn with_visual_design(mut self, enabled: bool) -> Self {
        self.enable_visual_design = enabled;
        self
    }

    pub fn with_linear_project(mut self, enabled: bool) -> Self {
        self.create_linear_project = enabled;
        self
    }

    pub fn with_miro_board(mut self, enabled: bool) -> Self {
        self.create_miro_board = enabled;
        self
    }

    pub fn with_notion_publishing(mut self, enabled: bool) -> Self {
        self.publish_prd_to_notion = enabled;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("rawIdea", &self.raw_idea)?;
        if self.team_size == 0 {
            return Err(PmkError::Validation("teamSize must be a positive number".to_string()));
        }
        if self.total_sprints == 0 {
            return Err(PmkError::Validation("totalSprints must be a positive number".to_string()));
        }
        Ok(())
    }

    /// Whether `step` runs in this workflow; the three core steps always do.
    pub fn is_enabled(&self, step: WorkflowStep) -> bool {
        match step {
            WorkflowStep::SprintPlanning => self.enable_sprint_planning,
            WorkflowStep::VisualDesign => self.enable_visual_design,
            _ => true,
        }
    }
}
