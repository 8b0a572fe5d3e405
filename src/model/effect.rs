use serde::{Deserialize, Serialize};

use crate::formula::HpScaling;
use crate::model::enums::{DamageSubType, DamageType, StatusType};

/// What an effect component does when it resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectPayload {
    Damage {
        formula: String,
        #[serde(default)]
        damage_type: DamageType,
        #[serde(default)]
        sub_type: DamageSubType,
        #[serde(default)]
        hp_scaling: HpScaling,
        /// Fraction of dealt damage healed back to the source.
        #[serde(default)]
        vamp: f64,
    },
    Heal {
        formula: String,
        #[serde(default)]
        hp_scaling: HpScaling,
    },
    Shield {
        formula: String,
        /// Seconds; zero means the shield lasts until depleted.
        #[serde(default, rename = "shield_duration")]
        duration: f64,
        #[serde(default = "true_damage")]
        sub_type: DamageSubType,
        #[serde(default)]
        hp_scaling: HpScaling,
    },
    Status {
        status: StatusType,
        /// Seconds.
        #[serde(rename = "status_duration")]
        duration: f64,
        #[serde(default)]
        strength: f64,
    },
}

fn true_damage() -> DamageSubType {
    DamageSubType::True
}

impl EffectPayload {
    pub fn formula(&self) -> Option<&str> {
        match self {
            Self::Damage { formula, .. } | Self::Heal { formula, .. } | Self::Shield { formula, .. } => {
                Some(formula)
            }
            Self::Status { .. } => None,
        }
    }

    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Damage { .. } => EffectKind::Damage,
            Self::Heal { .. } => EffectKind::Heal,
            Self::Shield { .. } => EffectKind::Shield,
            Self::Status { .. } => EffectKind::Status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
    Shield,
    Status,
}

/// One typed scaling payload plus its timing. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectComponent {
    #[serde(flatten)]
    pub payload: EffectPayload,
    /// Positive for damage over time.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub interval: f64,
    #[serde(default)]
    pub delay: f64,
    /// Units per second; zero for effects that do not travel.
    #[serde(default)]
    pub projectile_speed: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl EffectComponent {
    pub fn new(payload: EffectPayload) -> Self {
        Self {
            payload,
            duration: 0.0,
            interval: 0.0,
            delay: 0.0,
            projectile_speed: 0.0,
            comment: String::new(),
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.duration > 0.0
    }
}

/// One paragraph of ability behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub text: String,
    #[serde(default)]
    pub components: Vec<EffectComponent>,
}
