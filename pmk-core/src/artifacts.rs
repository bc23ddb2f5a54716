//! Product artifacts produced by the idea, user-story and PRD steps.

use crate::{PmkError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefinedIdea {
    pub title: String,
    pub problem_statement: String,
    pub target_audience: String,
    pub features: Vec<Feature>,
}

impl RefinedIdea {
    /// Wrap a free-text product description for callers that skipped the idea step.
    pub fn from_description(description: &str) -> Self {
        let description = description.trim();
        let title = description
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(80)
            .collect::<String>()
            .trim()
            .to_string();
        Self {
            title,
            problem_statement: description.to_string(),
            target_audience: String::new(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPersona {
    pub name: String,
    pub role: String,
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaAnalysis {
    pub refined_idea: RefinedIdea,
    pub personas: Vec<UserPersona>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub title: String,
    pub persona: String,
    pub action: String,
    pub benefit: String,
    pub acceptance_criteria: Vec<String>,
    pub priority: Priority,
    pub story_points: u32,
}

impl UserStory {
    /// Canonical id for the story at `index` (zero-based) within a session.
    pub fn id_for_index(index: usize) -> String {
        format!("US-{:03}", index + 1)
    }

    /// "As a <persona>, I want to <action> so that <benefit>".
    pub fn narrative(&self) -> String {
        format!("As a {}, I want to {} so that {}", self.persona, self.action, self.benefit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoryAnalysis {
    pub user_stories: Vec<UserStory>,
    pub total_story_points: u32,
    pub summary: String,
}

impl UserStoryAnalysis {
    /// Fails with [`PmkError::DataIntegrity`] when the point total does not fit in a `u32`.
    pub fn new(user_stories: Vec<UserStory>, summary: impl Into<String>) -> Result<Self> {
        let total_story_points = user_stories
            .iter()
            .try_fold(0u32, |total, s| total.checked_add(s.story_points))
            .ok_or_else(|| PmkError::DataIntegrity("total story points overflow".into()))?;
        Ok(Self { user_stories, total_story_points, summary: summary.into() })
    }

    pub fn story(&self, id: &str) -> Option<&UserStory> {
        self.user_stories.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub description: String,
    pub priority: Priority,
    pub user_story_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrdDocument {
    pub title: String,
    pub overview: String,
    pub goals: Vec<String>,
    pub non_goals: Vec<String>,
    pub functional_requirements: Vec<Requirement>,
    pub success_metrics: Vec<String>,
    pub risks: Vec<String>,
}

impl PrdDocument {
    /// Every requirement must point at stories that exist in `stories`.
    pub fn validate_story_links(&self, stories: &[UserStory]) -> Result<()> {
        let known: HashSet<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        for requirement in &self.functional_requirements {
            for id in &requirement.user_story_ids {
                if !known.contains(id.as_str()) {
                    return Err(PmkError::DataIntegrity(format!(
                        "requirement {} references unknown user story {}",
                        requirement.id, id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n## Overview\n\n{}\n", self.title, self.overview);
        push_list(&mut out, "Goals", &self.goals);
        push_list(&mut out, "Non-Goals", &self.non_goals);

        out.push_str("\n## Functional Requirements\n\n");
        for req in &self.functional_requirements {
            out.push_str(&format!("- **{}** ({}) {}", req.id, req.priority, req.description));
            if !req.user_story_ids.is_empty() {
                out.push_str(&format!(" _[{}]_", req.user_story_ids.join(", ")));
            }
            out.push('\n');
        }

        push_list(&mut out, "Success Metrics", &self.success_metrics);
        push_list(&mut out, "Risks", &self.risks);
        out
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {heading}\n\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

/// Reference to a page created in an external document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPage {
    pub page_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdAnalysis {
    pub prd: PrdDocument,
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_page: Option<PublishedPage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, points: u32) -> UserStory {
        UserStory {
            id: id.to_string(),
            title: format!("Story {id}"),
            persona: "Writer".to_string(),
            action: "capture notes".to_string(),
            benefit: "nothing is lost".to_string(),
            acceptance_criteria: vec!["saved".to_string()],
            priority: Priority::High,
            story_points: points,
        }
    }

    fn prd(links: Vec<&str>) -> PrdDocument {
        PrdDocument {
            title: "Notes".to_string(),
            overview: "AI notes".to_string(),
            goals: vec!["Capture".to_string()],
            non_goals: vec![],
            functional_requirements: vec![Requirement {
                id: "FR-1".to_string(),
                description: "Store notes".to_string(),
                priority: Priority::High,
                user_story_ids: links.into_iter().map(String::from).collect(),
            }],
            success_metrics: vec!["DAU".to_string()],
            risks: vec![],
        }
    }

    #[test]
    fn test_story_ids_are_zero_padded() {
        assert_eq!(UserStory::id_for_index(0), "US-001");
        assert_eq!(UserStory::id_for_index(41), "US-042");
    }

    #[test]
    fn test_analysis_totals_points() {
        let analysis =
            UserStoryAnalysis::new(vec![story("US-001", 5), story("US-002", 8)], "").unwrap();
        assert_eq!(analysis.total_story_points, 13);
        assert!(analysis.story("US-002").is_some());
        assert!(analysis.story("US-003").is_none());
    }

    #[test]
    fn test_point_total_overflow_is_integrity_error() {
        let stories = vec![story("US-001", 4_000_000_000), story("US-002", 4_000_000_000)];
        let err = UserStoryAnalysis::new(stories, "").unwrap_err();
        assert!(matches!(err, PmkError::DataIntegrity(_)));
    }

    #[test]
    fn test_prd_links_must_resolve() {
        let stories = vec![story("US-001", 3)];
        assert!(prd(vec!["US-001"]).validate_story_links(&stories).is_ok());
        let err = prd(vec!["US-009"]).validate_story_links(&stories).unwrap_err();
        assert!(matches!(err, PmkError::DataIntegrity(_)));
    }

    #[test]
    fn test_prd_markdown_sections() {
        let markdown = prd(vec!["US-001"]).to_markdown();
        assert!(markdown.starts_with("# Notes"));
        assert!(markdown.contains("## Goals\n\n- Capture"));
        assert!(markdown.contains("**FR-1** (high) Store notes _[US-001]_"));
        assert!(!markdown.contains("## Risks"));
    }

    #[test]
    fn test_refined_idea_from_description() {
        let idea = RefinedIdea::from_description("  A note-taking app\nwith AI features ");
        assert_eq!(idea.title, "A note-taking app");
        assert!(idea.problem_statement.ends_with("AI features"));
    }

    #[test]
    fn test_priority_serde_lowercase() {
        assert_eq!(serde_json::to_value(Priority::Medium).unwrap(), "medium");
        let p: Priority = serde_json::from_value(serde_json::json!("low")).unwrap();
        assert_eq!(p, Priority::Low);
    }
}
