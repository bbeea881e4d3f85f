//! Turns raw oracle text into an executable plan of actions.
//!
//! The contract locked down here: the whole function is total. A response
//! that fails to parse (or lacks the `actions` array) degrades to a full
//! plan of `NO_OP`; a single unrecognized name degrades to `NO_OP` for that
//! entry only. The episode can never be blocked by oracle output drift.

use serde::Deserialize;
use tracing::warn;

use crate::action::Action;

/// Plan length the prompt demands. The interpreter does not enforce it:
/// the oracle sometimes returns fewer entries and the driver executes
/// whatever length it is handed.
pub const ACTIONS_PER_PLAN: usize = 10;

// An `explanation` field also arrives; it is informational only and ignored.
#[derive(Deserialize)]
struct PlanWire {
    actions: Vec<String>,
}

/// The all-`NO_OP` plan used when a response cannot be interpreted at all.
pub fn fallback_plan() -> Vec<Action> {
    vec![Action::NoOp; ACTIONS_PER_PLAN]
}

/// Parses the oracle's raw text into an ordered action plan.
pub fn interpret_plan(raw: &str) -> Vec<Action> {
    let wire: PlanWire = match serde_json::from_str(raw) {
        Ok(wire) => wire,
        Err(err) => {
            warn!(%err, raw, "uninterpretable oracle response, falling back to NO_OP plan");
            return fallback_plan();
        }
    };

    wire.actions
        .iter()
        .map(|name| {
            let action = Action::decode(name);
            if action == Action::NoOp && name.as_str() != Action::NoOp.name() {
                warn!(token = %name, "unknown action token, substituting NO_OP");
            }
            action
        })
        .collect()
}
