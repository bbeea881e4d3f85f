//! The episode driver: one synchronous perception-decision-action loop.
//!
//! Each decision cycle captures a frame, asks the oracle for a plan, and
//! executes every planned action with a fixed per-action frame repeat.
//! Termination is checked after every primitive step so a `done` signal can
//! interrupt mid-repeat and mid-plan.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::Action;
use crate::frame::Frame;
use crate::interpret::interpret_plan;
use crate::oracle::OracleClient;
use crate::prompt::{build_system_prompt, DecisionContext, TASK_PROMPT};

/// What the environment returns for one primitive step.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    pub done: bool,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub info: serde_json::Value,
}

/// Boundary the driver uses to read frames from and act on the simulation.
pub trait GameEnv: Send + Sync {
    fn reset<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    fn frame<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<Frame>> + Send + 'a>>;

    fn step<'a>(
        &'a self,
        action: Action,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<StepOutcome>> + Send + 'a>>;

    fn render<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    fn close<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

#[derive(Debug, Clone)]
pub struct EpisodeConfig {
    /// How many environment steps each planned action is repeated for.
    pub frames_per_action: u32,
    pub task_prompt: String,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            frames_per_action: 30,
            task_prompt: TASK_PROMPT.to_string(),
        }
    }
}

/// Monotonic per-episode counters, owned exclusively by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeState {
    pub steps: u64,
    pub total_reward: f64,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub total_reward: f64,
}

/// The agent: episode config plus the only state that crosses cycle
/// boundaries (the single-slot context and the episode counters).
#[derive(Debug)]
pub struct Pilot {
    pub config: EpisodeConfig,
    pub state: EpisodeState,
    pub context: DecisionContext,
}

impl Pilot {
    pub fn new(config: EpisodeConfig) -> Self {
        Self {
            config,
            state: EpisodeState::default(),
            context: DecisionContext::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The whole plan executed; the environment did not signal termination.
    Ran { actions_executed: usize },
    /// The environment reported done mid-plan; remaining repeats and actions
    /// were abandoned.
    Terminated { actions_executed: usize },
}

/// One decision cycle: capture, encode, decide, interpret, execute.
///
/// The raw oracle text becomes the next cycle's context before any
/// interpretation happens, so a response that fails to parse still feeds the
/// rolling history verbatim.
pub async fn run_cycle(
    pilot: &mut Pilot,
    env: &dyn GameEnv,
    oracle: &dyn OracleClient,
) -> anyhow::Result<CycleOutcome> {
    let frame = env.frame().await?;
    let image = frame.encode_png_base64()?;

    let system_prompt = build_system_prompt(&pilot.context);
    let raw = oracle
        .decide(system_prompt, pilot.config.task_prompt.clone(), image)
        .await?;
    info!(raw = raw.as_str(), "oracle response");
    pilot.context = DecisionContext::from_raw(raw.clone());

    let plan = interpret_plan(&raw);
    debug!(?plan, "interpreted plan");

    let mut actions_executed = 0;
    for action in plan {
        actions_executed += 1;
        for _ in 0..pilot.config.frames_per_action {
            let outcome = env.step(action).await?;
            env.render().await?;
            pilot.state.steps += 1;
            pilot.state.total_reward += outcome.reward;
            if outcome.done {
                pilot.state.done = true;
                return Ok(CycleOutcome::Terminated { actions_executed });
            }
        }
    }
    Ok(CycleOutcome::Ran { actions_executed })
}

/// Runs decision cycles until the environment terminates, then closes it and
/// reports the episode summary.
pub async fn run_episode(
    pilot: &mut Pilot,
    env: &dyn GameEnv,
    oracle: &dyn OracleClient,
) -> anyhow::Result<EpisodeSummary> {
    env.reset().await?;
    while !pilot.state.done {
        run_cycle(pilot, env, oracle).await?;
    }
    env.close().await?;

    let summary = EpisodeSummary {
        steps: pilot.state.steps,
        total_reward: pilot.state.total_reward,
    };
    info!(
        steps = summary.steps,
        total_reward = summary.total_reward,
        "episode finished"
    );
    Ok(summary)
}
