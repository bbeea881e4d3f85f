//! System-prompt construction for the decision oracle.

use crate::action::Action;
use crate::interpret::ACTIONS_PER_PLAN;

/// Fixed short task prompt sent alongside the frame each cycle.
pub const TASK_PROMPT: &str = "Your next moves:";

/// Single-slot rolling context: the previous cycle's raw oracle response,
/// verbatim. Overwritten wholesale each cycle; never accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionContext(String);

impl Default for DecisionContext {
    fn default() -> Self {
        Self("N/A".to_string())
    }
}

impl DecisionContext {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the full system prompt: persona, analysis checklist, the action
/// vocabulary by display name, the required JSON schema, and the prior
/// cycle's raw response. Pure function of its input.
pub fn build_system_prompt(prior: &DecisionContext) -> String {
    let vocabulary = Action::ALL
        .iter()
        .map(|a| format!("    - {}", a.name()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a pro gamer playing the first-person shooter game Doom. Your task is to analyze a given game screen image and decide on a sequence of actions to take.

Here is your previous response:
{prior}

Follow these instructions carefully:

1. Examine the provided game screen image closely. Pay attention to:
    - Your current health and ammo
    - The presence and location of enemies
    - Obstacles or items in the environment
    - Any text or UI elements visible
    - If you are facing a wall, consider turning around to avoid running into it

2. Based on your analysis, determine a sequence of {len} appropriate actions to take. Valid actions are:
{vocabulary}

3. Provide your response in the following JSON format:
{{
    "explanation": "A brief explanation of your overall strategy for this sequence of actions",
    "actions": ["ACTION_1", "ACTION_2", "...", "ACTION_{len}"]
}}

4. Ensure that the "actions" array contains EXACTLY {len} entries and that each entry matches one of the valid actions listed above verbatim. Do not use any other variations or combinations.

5. Keep your explanation concise but informative, focusing on the key factors that influenced your decision for the overall sequence of actions.

Remember, your goal is to survive, defeat enemies, and progress through the game. Make strategic decisions based on the current game state shown in the image, and consider how the situation might evolve over the course of these {len} actions.

Only return the JSON output. Do not include any additional text or explanations outside of the JSON structure."#,
        prior = prior.as_str(),
        len = ACTIONS_PER_PLAN,
        vocabulary = vocabulary,
    )
}
