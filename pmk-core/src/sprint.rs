//! Sprint planning artifacts.

use crate::artifacts::UserStory;
use crate::batch::ItemError;
use crate::{PmkError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Sprint cadence accepted by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SprintLength {
    OneWeek,
    TwoWeeks,
    ThreeWeeks,
    FourWeeks,
}

impl SprintLength {
    pub fn weeks(&self) -> u32 {
        match self {
            SprintLength::OneWeek => 1,
            SprintLength::TwoWeeks => 2,
            SprintLength::ThreeWeeks => 3,
            SprintLength::FourWeeks => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SprintLength::OneWeek => "1 week",
            SprintLength::TwoWeeks => "2 weeks",
            SprintLength::ThreeWeeks => "3 weeks",
            SprintLength::FourWeeks => "4 weeks",
        }
    }
}

impl Default for SprintLength {
    fn default() -> Self {
        SprintLength::TwoWeeks
    }
}

impl fmt::Display for SprintLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SprintLength {
    type Err = PmkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1 week" | "1 weeks" | "1w" => Ok(SprintLength::OneWeek),
            "2 weeks" | "2 week" | "2w" => Ok(SprintLength::TwoWeeks),
            "3 weeks" | "3 week" | "3w" => Ok(SprintLength::ThreeWeeks),
            "4 weeks" | "4 week" | "4w" => Ok(SprintLength::FourWeeks),
            other => Err(PmkError::Validation(format!(
                "sprintLength must be one of \"1 week\", \"2 weeks\", \"3 weeks\", \"4 weeks\" \
                 (got \"{other}\")"
            ))),
        }
    }
}

impl TryFrom<String> for SprintLength {
    type Error = PmkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SprintLength> for String {
    fn from(value: SprintLength) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub duration_weeks: u32,
    pub user_story_ids: Vec<String>,
    pub velocity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCycle {
    pub sprint_id: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIssue {
    pub story_id: String,
    pub id: String,
    pub identifier: String,
    pub url: String,
}

/// Outcome of pushing a plan into the issue tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearIntegration {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub cycles: Vec<ExternalCycle>,
    pub issues: Vec<ExternalIssue>,
    pub errors: Vec<ItemError>,
}

impl LinearIntegration {
    pub fn disabled() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPlan {
    pub sprints: Vec<Sprint>,
    pub unassigned_story_ids: Vec<String>,
    pub total_velocity: u32,
    pub linear_integration: LinearIntegration,
}

impl SprintPlan {
    /// Build a plan from story-id assignments, computing velocities from `stories`.
    ///
    /// Fails with [`PmkError::DataIntegrity`] when an assignment names a story that is
    /// not in `stories`, assigns the same story twice, or a velocity overflows.
    pub fn from_assignments(
        assignments: Vec<SprintAssignment>,
        stories: &[UserStory],
        length: SprintLength,
    ) -> Result<Self> {
        let points: HashMap<&str, u32> =
            stories.iter().map(|s| (s.id.as_str(), s.story_points)).collect();
        let mut assigned: HashSet<String> = HashSet::new();
        let mut sprints = Vec::with_capacity(assignments.len());

        for (index, assignment) in assignments.into_iter().enumerate() {
            let mut velocity = 0u32;
            for id in &assignment.user_story_ids {
                let Some(p) = points.get(id.as_str()) else {
                    return Err(PmkError::DataIntegrity(format!(
                        "sprint {} references unknown user story {}",
                        index + 1,
                        id
                    )));
                };
                if !assigned.insert(id.clone()) {
                    return Err(PmkError::DataIntegrity(format!(
                        "user story {id} is assigned to more than one sprint"
                    )));
                }
                velocity = velocity.checked_add(*p).ok_or_else(|| {
                    PmkError::DataIntegrity(format!("sprint {} velocity overflows", index + 1))
                })?;
            }
            sprints.push(Sprint {
                id: format!("sprint-{}", index + 1),
                name: assignment.name,
                goal: assignment.goal,
                duration_weeks: length.weeks(),
                user_story_ids: assignment.user_story_ids,
                velocity,
            });
        }

        let unassigned_story_ids =
            stories.iter().filter(|s| !assigned.contains(&s.id)).map(|s| s.id.clone()).collect();
        let total_velocity = sprints
            .iter()
            .try_fold(0u32, |total, s| total.checked_add(s.velocity))
            .ok_or_else(|| PmkError::DataIntegrity("total velocity overflows".into()))?;

        Ok(Self {
            sprints,
            unassigned_story_ids,
            total_velocity,
            linear_integration: LinearIntegration::disabled(),
        })
    }

    /// Check every referenced story id against `stories`.
    pub fn validate_references(&self, stories: &[UserStory]) -> Result<()> {
        let known: HashSet<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        for sprint in &self.sprints {
            if let Some(id) = sprint.user_story_ids.iter().find(|id| !known.contains(id.as_str())) {
                return Err(PmkError::DataIntegrity(format!(
                    "{} references unknown user story {}",
                    sprint.id, id
                )));
            }
        }
        Ok(())
    }
}

/// One sprint as proposed by the planning agent, before velocities are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintAssignment {
    pub name: String,
    pub goal: String,
    pub user_story_ids: Vec<String>,
}
