//! Visual design plan and optional Miro board.

use super::to_prompt_json;
use crate::context::AgentContext;
use crate::prompts;
use crate::schema::OutputSchema;
use crate::structured::StepOutput;
use pmk_core::{
    DesignPlan, ElementCount, MiroIntegration, PmkError, RefinedIdea, Result, UserPersona,
    UserStory, VisualAnalysis,
};
use pmk_integrations::{BoardCanvas, Position, ShapeItem, StickyNote, TextItem, run_best_effort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const COLUMN_SPACING: f64 = 320.0;
const ROW_SPACING: f64 = 420.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualInput {
    pub refined_idea: RefinedIdea,
    #[serde(default)]
    pub personas: Vec<UserPersona>,
    #[serde(default)]
    pub user_stories: Vec<UserStory>,
    #[serde(default)]
    pub create_miro_board: bool,
    #[serde(default)]
    pub additional_context: Option<String>,
}

fn check(plan: &DesignPlan) -> std::result::Result<(), String> {
    if plan.persona_cards.is_empty() {
        return Err("personaCards must contain at least one card".to_string());
    }
    if plan.journey_stages.is_empty() {
        return Err("journeyStages must contain at least one stage".to_string());
    }
    Ok(())
}

/// One element to place on the board.
#[derive(Debug, Clone)]
enum BoardElement {
    Title(TextItem),
    Persona(StickyNote),
    JourneyStage(ShapeItem),
    ProcessStep(ShapeItem),
}

impl BoardElement {
    fn element_type(&self) -> &'static str {
        match self {
            BoardElement::Title(_) => "text",
            BoardElement::Persona(_) => "sticky_note",
            BoardElement::JourneyStage(_) => "journey_stage",
            BoardElement::ProcessStep(_) => "process_step",
        }
    }

    fn label(&self) -> String {
        let content = match self {
            BoardElement::Title(text) => &text.content,
            BoardElement::Persona(note) => &note.content,
            BoardElement::JourneyStage(shape) | BoardElement::ProcessStep(shape) => &shape.content,
        };
        format!("{} '{}'", self.element_type(), content.lines().next().unwrap_or_default())
    }

    async fn place(self, canvas: &dyn BoardCanvas, board_id: &str) -> Result<&'static str> {
        let element_type = self.element_type();
        match self {
            BoardElement::Title(text) => canvas.create_text(board_id, text).await?,
            BoardElement::Persona(note) => canvas.create_sticky_note(board_id, note).await?,
            BoardElement::JourneyStage(shape) | BoardElement::ProcessStep(shape) => {
                canvas.create_shape(board_id, shape).await?
            }
        };
        Ok(element_type)
    }
}

fn at(column: usize, row: usize) -> Position {
    Position { x: column as f64 * COLUMN_SPACING, y: row as f64 * ROW_SPACING }
}

/// Lay the plan out in rows: title, personas, journey, process flow.
fn layout(title: &str, plan: &DesignPlan) -> Vec<BoardElement> {
    let mut elements =
        vec![BoardElement::Title(TextItem { content: title.to_string(), position: at(0, 0) })];

    elements.extend(plan.persona_cards.iter().enumerate().map(|(i, card)| {
        BoardElement::Persona(StickyNote {
            content: format!("{}\n{}", card.name, card.summary),
            color: "light_yellow".to_string(),
            position: at(i, 1),
        })
    }));

    elements.extend(plan.journey_stages.iter().enumerate().map(|(i, stage)| {
        let mut content = format!("{}\n{}", stage.name, stage.description);
        if !stage.touchpoints.is_empty() {
            content.push_str(&format!("\nTouchpoints: {}", stage.touchpoints.join(", ")));
        }
        BoardElement::JourneyStage(ShapeItem {
            content,
            shape: "round_rectangle".to_string(),
            fill_color: "#d5f692".to_string(),
            position: at(i, 2),
            width: 280.0,
            height: 200.0,
        })
    }));

    elements.extend(plan.process_flow.iter().enumerate().map(|(i, step)| {
        BoardElement::ProcessStep(ShapeItem {
            content: format!("{}. {}\n{}", i + 1, step.label, step.description),
            shape: "rectangle".to_string(),
            fill_color: "#a6ccf5".to_string(),
            position: at(i, 3),
            width: 240.0,
            height: 140.0,
        })
    }));

    elements
}

/// Produce a design plan and, when asked, render it onto a new Miro board.
///
/// Board creation failing fails the step. Individual elements are placed best-effort and
/// summarised in a manifest of created element counts.
pub async fn design_visuals(
    ctx: &AgentContext,
    input: VisualInput,
) -> Result<StepOutput<VisualAnalysis>> {
    let idea = &input.refined_idea;
    if idea.title.trim().is_empty() && idea.problem_statement.trim().is_empty() {
        return Err(PmkError::missing_field("refinedIdea"));
    }
    let canvas = if input.create_miro_board { Some(ctx.board_canvas()?) } else { None };

    let schema = OutputSchema::for_type::<DesignPlan>()?;
    let prompt = prompts::visual_prompt(
        &to_prompt_json(&input.refined_idea)?,
        &to_prompt_json(&input.personas)?,
        &to_prompt_json(&input.user_stories)?,
        input.additional_context.as_deref(),
    );
    let output = ctx
        .generator()
        .generate("visual-design", prompts::VISUAL_INSTRUCTION, &prompt, &schema, check)
        .await?;

    let miro_integration = match canvas {
        Some(canvas) => {
            render_board(canvas, &input.refined_idea, &output.value, ctx.settings.batch_concurrency)
                .await?
        }
        None => MiroIntegration::disabled(),
    };

    Ok(output.map(|design_plan| VisualAnalysis { design_plan, miro_integration }))
}

async fn render_board(
    canvas: Arc<dyn BoardCanvas>,
    idea: &RefinedIdea,
    plan: &DesignPlan,
    concurrency: usize,
) -> Result<MiroIntegration> {
    let board = canvas
        .create_board(&format!("{} - Design", idea.title), &idea.problem_statement)
        .await?;
    tracing::info!(board_id = %board.id, "Miro board created");

    let board_id = board.id.as_str();
    let outcome = run_best_effort(layout(&idea.title, plan), concurrency, |element| {
        let canvas = canvas.clone();
        async move { element.place(canvas.as_ref(), board_id).await }
    })
    .await;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for element_type in &outcome.succeeded {
        *counts.entry(*element_type).or_default() += 1;
    }
    let manifest = counts
        .into_iter()
        .map(|(element_type, count)| ElementCount { element_type: element_type.to_string(), count })
        .collect();

    Ok(MiroIntegration {
        enabled: true,
        manifest,
        errors: outcome.item_errors(BoardElement::label),
        board: Some(board),
    })
}
