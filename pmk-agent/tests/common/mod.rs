#![allow(dead_code)]

use pmk_agent::AgentContext;
use pmk_core::{LlmRequest, LlmResponse};
use pmk_model::MockLlm;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const IDEA: &str = "idea";
pub const STORIES: &str = "stories";
pub const PRD: &str = "prd";
pub const SPRINT: &str = "sprint";
pub const VISUAL: &str = "visual";
pub const FEEDBACK: &str = "feedback";

pub fn idea_reply() -> Value {
    json!({
        "refinedIdea": {
            "title": "TeamPulse",
            "problemStatement": "Remote teams lose track of how everyone is doing",
            "targetAudience": "Remote engineering teams",
            "features": [{
                "name": "Daily check-in",
                "description": "One-tap mood and focus check-in",
                "acceptanceCriteria": ["Check-in takes under 10 seconds"],
                "priority": "high"
            }]
        },
        "personas": [{
            "name": "Maya",
            "role": "Engineering manager",
            "goals": ["Spot burnout early"],
            "painPoints": ["Status meetings are noisy"]
        }],
        "summary": "A lightweight pulse tool for remote teams"
    })
}

pub fn stories_reply() -> Value {
    let story = |title: &str, points: u32| {
        json!({
            "title": title,
            "persona": "Maya",
            "action": format!("use {title}"),
            "benefit": "the team stays healthy",
            "acceptanceCriteria": ["Works on mobile"],
            "priority": "medium",
            "storyPoints": points
        })
    };
    json!({
        "userStories": [story("Check-in", 3), story("Dashboard", 5), story("Export", 2)],
        "summary": "Three stories"
    })
}

pub fn prd_reply() -> Value {
    json!({
        "title": "TeamPulse PRD",
        "overview": "Pulse checks for remote teams",
        "goals": ["Weekly active use"],
        "nonGoals": ["Performance reviews"],
        "functionalRequirements": [
            {
                "id": "FR-1",
                "description": "Check-in",
                "priority": "high",
                "userStoryIds": ["US-001"]
            },
            {
                "id": "FR-2",
                "description": "Dashboard",
                "priority": "medium",
                "userStoryIds": ["US-002", "US-003"]
            }
        ],
        "successMetrics": ["70% daily check-in rate"],
        "risks": ["Survey fatigue"]
    })
}

pub fn sprint_reply() -> Value {
    json!({
        "sprints": [
            {"name": "Sprint 1", "goal": "Check-ins", "userStoryIds": ["US-001"]},
            {"name": "Sprint 2", "goal": "Dashboard", "userStoryIds": ["US-002"]},
            {"name": "Sprint 3", "goal": "Export", "userStoryIds": ["US-003"]}
        ]
    })
}

pub fn visual_reply() -> Value {
    json!({
        "personaCards": [{"name": "Maya", "summary": "Engineering manager"}],
        "journeyStages": [
            {
                "name": "Onboard",
                "description": "Joins the team space",
                "touchpoints": ["Invite email"]
            },
            {"name": "Check in", "description": "Daily pulse", "touchpoints": []}
        ],
        "processFlow": [{"label": "Open app", "description": "From notification"}]
    })
}

pub fn feedback_reply(target: &str, requires_approval: bool) -> Value {
    json!({
        "targetAgent": target,
        "confidence": 0.9,
        "reasoning": format!("the feedback concerns {target}"),
        "suggestedAction": "rework the output",
        "requiresApproval": requires_approval
    })
}

/// Which agent a request is meant for, from its system instruction.
pub fn classify(request: &LlmRequest) -> &'static str {
    let instruction = request.system_instruction.as_deref().unwrap_or_default();
    if instruction.contains("route stakeholder feedback") {
        FEEDBACK
    } else if instruction.contains("product strategist") {
        IDEA
    } else if instruction.contains("agile product owner") {
        STORIES
    } else if instruction.contains("Product Requirements Document") {
        PRD
    } else if instruction.contains("scrum master") {
        SPRINT
    } else {
        VISUAL
    }
}

/// Deterministic replies keyed by agent. Replies can be swapped between calls.
#[derive(Clone)]
pub struct Script {
    replies: Arc<Mutex<HashMap<&'static str, String>>>,
}

impl Script {
    pub fn new() -> Self {
        let replies = HashMap::from([
            (IDEA, idea_reply().to_string()),
            (STORIES, stories_reply().to_string()),
            (PRD, prd_reply().to_string()),
            (SPRINT, sprint_reply().to_string()),
            (VISUAL, visual_reply().to_string()),
            (FEEDBACK, feedback_reply("none", false).to_string()),
        ]);
        Self { replies: Arc::new(Mutex::new(replies)) }
    }

    pub fn set(&self, agent: &'static str, reply: impl Into<String>) {
        self.replies.lock().unwrap().insert(agent, reply.into());
    }

    pub fn set_json(&self, agent: &'static str, reply: Value) {
        self.set(agent, reply.to_string());
    }

    pub fn llm(&self) -> Arc<MockLlm> {
        let replies = self.replies.clone();
        Arc::new(MockLlm::new("mock-gemini").with_responder(move |request| {
            let text = replies.lock().unwrap().get(classify(request)).cloned().unwrap_or_default();
            Ok(LlmResponse::text(text))
        }))
    }
}

pub fn context(llm: Arc<MockLlm>) -> AgentContext {
    AgentContext::new(llm)
}

/// Requests the mock has seen for one agent, in order.
pub async fn requests_for(llm: &MockLlm, agent: &str) -> Vec<LlmRequest> {
    llm.requests().await.into_iter().filter(|r| classify(r) == agent).collect()
}
