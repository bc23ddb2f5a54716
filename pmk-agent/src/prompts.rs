//! Instructions for each agent.

pub const IDEA_INSTRUCTION: &str = "You are a senior product strategist. Turn a raw product idea \
into a refined concept: a crisp title, the problem it solves, the target audience, and a \
prioritised feature list where every feature has concrete acceptance criteria. Describe the \
main user personas with their goals and pain points, most important first. Reply with JSON only.";

pub const USER_STORY_INSTRUCTION: &str = "You are an agile product owner. Write user stories \
in the form 'As a <persona>, I want to <action> so that <benefit>'. Every story names one of \
the given personas, has testable acceptance criteria, a priority, and a Fibonacci story-point \
estimate (1, 2, 3, 5, 8 or 13). Cover every feature. Reply with JSON only.";

pub const PRD_INSTRUCTION: &str = "You are a product manager writing a Product Requirements \
Document. Be specific and measurable. Number functional requirements FR-1, FR-2, ... and link \
each one to the ids of the user stories it satisfies, using only the ids provided. Reply with \
JSON only.";

pub const SPRINT_INSTRUCTION: &str = "You are a scrum master planning delivery. Assign user \
stories to sprints so that dependencies and priorities are respected and no sprint exceeds the \
team's realistic capacity. Use only the story ids provided and never assign a story twice. \
Stories that do not fit may stay unassigned. Reply with JSON only.";

pub const VISUAL_INSTRUCTION: &str = "You are a UX designer preparing a collaborative design \
board. Produce one persona card per persona, the stages of the main user journey with their \
touchpoints, and the core process flow as ordered steps. Keep labels short enough for sticky \
notes. Reply with JSON only.";

pub const FEEDBACK_INSTRUCTION: &str = "You route stakeholder feedback inside a product \
workflow. Decide which agent must rework its output: idea-generation (concept, audience, \
features), user-story (stories, acceptance criteria, estimates), prd (requirements document), \
sprint-planner (sprint allocation), visual-design (design board). Use none when the feedback \
needs no rework. Give a confidence between 0 and 1, explain your reasoning, suggest the concrete \
action, and set requiresApproval when the change is large or ambiguous. Reply with JSON only.";

/// Append optional context under its own heading.
pub fn with_context(mut prompt: String, additional_context: Option<&str>) -> String {
    if let Some(context) = additional_context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nAdditional context:\n");
        prompt.push_str(context);
    }
    prompt
}

pub fn idea_prompt(raw_idea: &str, additional_context: Option<&str>) -> String {
    with_context(format!("Product idea:\n{}", raw_idea.trim()), additional_context)
}

pub fn user_story_prompt(idea_json: &str, personas_json: &str, context: Option<&str>) -> String {
    with_context(
        format!(
            "Refined idea:\n{idea_json}\n\nPersonas:\n{personas_json}\n\nWrite the user stories."
        ),
        context,
    )
}

pub fn prd_prompt(idea_json: &str, stories_json: &str, context: Option<&str>) -> String {
    with_context(
        format!("Refined idea:\n{idea_json}\n\nUser stories:\n{stories_json}\n\nWrite the PRD."),
        context,
    )
}

pub fn sprint_prompt(
    stories_json: &str,
    team_size: u32,
    sprint_length: &str,
    total_sprints: u32,
    context: Option<&str>,
) -> String {
    with_context(
        format!(
            "User stories:\n{stories_json}\n\nTeam size: {team_size} people\n\
             Sprint length: {sprint_length}\n\
             Plan exactly {total_sprints} sprints, in order."
        ),
        context,
    )
}

pub fn visual_prompt(
    idea_json: &str,
    personas_json: &str,
    stories_json: &str,
    context: Option<&str>,
) -> String {
    with_context(
        format!(
            "Refined idea:\n{idea_json}\n\nPersonas:\n{personas_json}\n\n\
             User stories:\n{stories_json}\n\nDesign the board."
        ),
        context,
    )
}

pub fn feedback_prompt(feedback: &str, artifacts_json: &str) -> String {
    format!("Current workflow artifacts:\n{artifacts_json}\n\nFeedback:\n{}", feedback.trim())
}
