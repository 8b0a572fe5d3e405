//! Passive buffs: conditional stat bonuses and on-cast triggers.

use serde::{Deserialize, Serialize};

use crate::formula::Stat;
use crate::model::effect::EffectComponent;
use crate::model::enums::ActionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equal,
}

impl Comparison {
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Self::GreaterThan => left > right,
            Self::LessThan => left < right,
            Self::Equal => (left - right).abs() < f64::EPSILON,
        }
    }
}

/// Gate on a buff. `key` is a formula over the owner's variables, usually a
/// stat token (`"ap"`) or a stack counter (`"q"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub comparison: Comparison,
    pub value: f64,
}

/// What a triggered buff does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuffAction {
    /// Add `amount` (a formula) to the counter of `stack_key`.
    Stack { stack_key: ActionType, amount: String },
    /// Emit an extra effect from the passive.
    Effect { effect: EffectComponent },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "buff", rename_all = "snake_case")]
pub enum PassiveEffect {
    /// Adds `scaling` to `stat` while `condition` holds.
    Stats {
        stat: Stat,
        scaling: String,
        #[serde(default)]
        condition: Option<Condition>,
    },
    /// Runs `actions` when the owner performs one of `trigger`.
    Cast {
        trigger: Vec<ActionType>,
        actions: Vec<BuffAction>,
        #[serde(default)]
        condition: Option<Condition>,
    },
    /// On-hit and on-being-hit buffs are recorded but not simulated yet.
    Hit {
        #[serde(default)]
        condition: Option<Condition>,
    },
    GetHit {
        #[serde(default)]
        condition: Option<Condition>,
    },
}
