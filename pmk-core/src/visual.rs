//! Visual-design artifacts. The board itself lives in the external canvas; only
//! references and a manifest of created elements are kept locally.

use crate::batch::ItemError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonaCard {
    pub name: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStage {
    pub name: String,
    pub description: String,
    pub touchpoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignPlan {
    pub persona_cards: Vec<PersonaCard>,
    pub journey_stages: Vec<JourneyStage>,
    pub process_flow: Vec<FlowStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualBoard {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCount {
    pub element_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiroIntegration {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<VisualBoard>,
    pub manifest: Vec<ElementCount>,
    pub errors: Vec<ItemError>,
}

impl MiroIntegration {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn element_count(&self, element_type: &str) -> usize {
        self.manifest
            .iter()
            .find(|e| e.element_type == element_type)
            .map(|e| e.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualAnalysis {
    pub design_plan: DesignPlan,
    pub miro_integration: MiroIntegration,
}
