//! The fixed vocabulary of composite control actions.
//!
//! Codes 0-11 are the simulation environment's numeric contract; the display
//! names are the oracle protocol. `decode` is total: anything the oracle
//! emits that is not an exact vocabulary name degrades to `NoOp` rather than
//! failing the batch.

/// One composite control primitive the environment accepts per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    NoOp = 0,
    Attack = 1,
    MoveForward = 2,
    MoveForwardAttack = 3,
    TurnRight = 4,
    TurnRightAttack = 5,
    TurnRightMoveForward = 6,
    TurnRightMoveForwardAttack = 7,
    TurnLeft = 8,
    TurnLeftAttack = 9,
    TurnLeftMoveForward = 10,
    TurnLeftMoveForwardAttack = 11,
}

impl Action {
    /// Every action, in code order. Used to enumerate the vocabulary in prompts.
    pub const ALL: [Action; 12] = [
        Action::NoOp,
        Action::Attack,
        Action::MoveForward,
        Action::MoveForwardAttack,
        Action::TurnRight,
        Action::TurnRightAttack,
        Action::TurnRightMoveForward,
        Action::TurnRightMoveForwardAttack,
        Action::TurnLeft,
        Action::TurnLeftAttack,
        Action::TurnLeftMoveForward,
        Action::TurnLeftMoveForwardAttack,
    ];

    /// Stable integer code submitted to the environment's `step`.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Canonical display name used in prompts and oracle responses.
    pub fn name(self) -> &'static str {
        match self {
            Action::NoOp => "NO_OP",
            Action::Attack => "ATTACK",
            Action::MoveForward => "MOVE_FORWARD",
            Action::MoveForwardAttack => "MOVE_FORWARD ATTACK",
            Action::TurnRight => "TURN_RIGHT",
            Action::TurnRightAttack => "TURN_RIGHT ATTACK",
            Action::TurnRightMoveForward => "TURN_RIGHT MOVE_FORWARD",
            Action::TurnRightMoveForwardAttack => "TURN_RIGHT MOVE_FORWARD ATTACK",
            Action::TurnLeft => "TURN_LEFT",
            Action::TurnLeftAttack => "TURN_LEFT ATTACK",
            Action::TurnLeftMoveForward => "TURN_LEFT MOVE_FORWARD",
            Action::TurnLeftMoveForwardAttack => "TURN_LEFT MOVE_FORWARD ATTACK",
        }
    }

    /// Maps a display name back to its action. Exact, case-sensitive match;
    /// any unrecognized name resolves to `NoOp`. Never fails.
    pub fn decode(name: &str) -> Action {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .unwrap_or(Action::NoOp)
    }
}
