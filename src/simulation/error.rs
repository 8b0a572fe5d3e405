use std::fmt;

use serde::Serialize;

use crate::formula::FormulaError;
use crate::model::{ActionType, Actor};

/// Where in an action's lifecycle a fault happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Starting the action: ability lookup, rank, cooldown and cast time.
    Cast,
    /// Turning a queued formula into a number at its fire tick.
    Evaluation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cast => "cast",
            Self::Evaluation => "evaluation",
        })
    }
}

/// A combo run aborted at a specific action.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("SimulationError during '{phase}' at action #{action_index} ({action_type}) by {actor}: {message}")]
pub struct SimulationError {
    pub message: String,
    pub action_index: usize,
    pub action_type: ActionType,
    pub actor: Actor,
    pub phase: Phase,
}

/// Fault raised by a [Character](super::Character); the engine adds the
/// action context.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub phase: Phase,
    pub source: ActionType,
    pub message: String,
}

impl Fault {
    pub fn cast(source: ActionType, message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Cast,
            source,
            message: message.into(),
        }
    }

    pub fn evaluation(source: ActionType, err: &FormulaError) -> Self {
        Self {
            phase: Phase::Evaluation,
            source,
            message: err.to_string(),
        }
    }

    pub fn at(self, action_index: usize, actor: Actor) -> SimulationError {
        SimulationError {
            message: self.message,
            action_index,
            action_type: self.source,
            actor,
            phase: self.phase,
        }
    }
}
