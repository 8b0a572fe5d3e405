use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Aa,
    Q,
    W,
    E,
    R,
    Passive,
}

impl ActionType {
    pub const fn is_ability(self) -> bool {
        matches!(self, Self::Q | Self::W | Self::E | Self::R)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aa => "aa",
            Self::Q => "q",
            Self::W => "w",
            Self::E => "e",
            Self::R => "r",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Blue,
    Red,
}

impl Actor {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blue => "blue",
            Self::Red => "red",
        })
    }
}

/// How damage is delivered, as categorised by the wiki.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Area,
    Basic,
    #[default]
    Default,
    Dot,
    Pet,
    Proc,
    Spell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSubType {
    #[default]
    Physical,
    Magic,
    True,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Airborne,
    Berserk,
    Blind,
    Cripple,
    Disarm,
    Drowsy,
    Ground,
    Kinematics,
    Nearsight,
    Silence,
    Sleep,
    Slow,
    Stasis,
    Stun,
    Suppression,
    Suspension,
    Taunt,
}

impl StatusType {
    /// Crowd control whose duration tenacity shortens.
    pub const fn tenacity_affected(self) -> bool {
        matches!(
            self,
            Self::Berserk
                | Self::Blind
                | Self::Cripple
                | Self::Disarm
                | Self::Ground
                | Self::Kinematics
                | Self::Silence
                | Self::Sleep
                | Self::Slow
                | Self::Stun
                | Self::Suspension
                | Self::Taunt
        )
    }

    /// Map a wiki crowd-control name, folding aliases like root or charm.
    pub fn from_label(label: &str) -> Option<Self> {
        let status = match label.trim().to_lowercase().as_str() {
            "airborne" | "knock up" | "knockup" | "knock back" => Self::Airborne,
            "berserk" => Self::Berserk,
            "blind" => Self::Blind,
            "cripple" => Self::Cripple,
            "disarm" => Self::Disarm,
            "drowsy" => Self::Drowsy,
            "ground" | "root" => Self::Ground,
            "kinematics" => Self::Kinematics,
            "nearsight" => Self::Nearsight,
            "silence" => Self::Silence,
            "sleep" => Self::Sleep,
            "slow" => Self::Slow,
            "stasis" => Self::Stasis,
            "stun" | "charm" | "flee" | "fear" | "polymorph" => Self::Stun,
            "suppression" => Self::Suppression,
            "suspension" => Self::Suspension,
            "taunt" => Self::Taunt,
            _ => return None,
        };
        Some(status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    #[default]
    Melee,
    Ranged,
}
