//! Entity records produced by the scrapers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formula::{Stat, Table};
use crate::model::effect::Effect;
use crate::model::enums::RangeType;
use crate::model::passive::PassiveEffect;

/// Base stats from the structured feed. `*_per_lvl` values use the game's
/// growth curve, see `Character::base_stat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub hp: f64,
    pub hp_per_lvl: f64,
    pub mana: f64,
    pub mana_per_lvl: f64,
    pub ad: f64,
    pub ad_per_lvl: f64,
    pub armor: f64,
    pub armor_per_lvl: f64,
    pub mr: f64,
    pub mr_per_lvl: f64,
    pub move_speed: f64,
    pub attack_range: f64,
    pub hp_regen: f64,
    pub hp_regen_per_lvl: f64,
    pub mana_regen: f64,
    pub mana_regen_per_lvl: f64,
    pub attack_speed: f64,
    /// Fraction per level, e.g. 0.025.
    pub attack_speed_per_lvl: f64,
}

impl BaseStats {
    /// Level-one value and per-level growth for stats the feed carries.
    pub fn growth(&self, stat: Stat) -> Option<(f64, f64)> {
        let pair = match stat {
            Stat::Hp => (self.hp, self.hp_per_lvl),
            Stat::Mana => (self.mana, self.mana_per_lvl),
            Stat::Ad => (self.ad, self.ad_per_lvl),
            Stat::Armor => (self.armor, self.armor_per_lvl),
            Stat::Mr => (self.mr, self.mr_per_lvl),
            Stat::MoveSpeed => (self.move_speed, 0.0),
            Stat::HpRegen => (self.hp_regen, self.hp_regen_per_lvl),
            Stat::ManaRegen => (self.mana_regen, self.mana_regen_per_lvl),
            _ => return None,
        };
        Some(pair)
    }
}

/// Attack timing from the wiki's attack speed box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTiming {
    pub attack_speed_ratio: f64,
    /// Fraction of the attack time before the hit lands.
    pub attack_windup: f64,
    pub windup_modifier: f64,
    /// Units per second; zero for melee or non-projectile attacks.
    pub missile_speed: f64,
}

impl Default for AttackTiming {
    fn default() -> Self {
        Self {
            attack_speed_ratio: 0.625,
            attack_windup: 0.0,
            windup_modifier: 1.0,
            missile_speed: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionAbility {
    pub name: String,
    /// Formula over `rank`, seconds.
    #[serde(default = "zero_formula")]
    pub cooldown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_table: Option<Table>,
    #[serde(default = "zero_formula")]
    pub cost: String,
    #[serde(default = "zero_formula")]
    pub cast_time: String,
    #[serde(default = "zero_formula")]
    pub recharge: String,
    #[serde(default)]
    pub raw_stats: BTreeMap<String, String>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub validated: bool,
}

impl ChampionAbility {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: zero_formula(),
            cooldown_table: None,
            cost: zero_formula(),
            cast_time: zero_formula(),
            recharge: zero_formula(),
            raw_stats: BTreeMap::new(),
            effects: Vec::new(),
            validated: false,
        }
    }
}

fn zero_formula() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub static_cooldown: Option<String>,
    #[serde(default)]
    pub raw_stats: BTreeMap<String, String>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Not scraped; supplied with the champion record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffs: Vec<PassiveEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub last_changed: Option<String>,
    #[serde(default)]
    pub range_type: RangeType,
    #[serde(default)]
    pub stats: BaseStats,
    #[serde(default)]
    pub timing: AttackTiming,
    #[serde(default)]
    pub passive: Passive,
    pub q: ChampionAbility,
    pub w: ChampionAbility,
    pub e: ChampionAbility,
    pub r: ChampionAbility,
}

/// Feed record for a champion: everything the wiki does not reliably carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChampionMeta {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub stats: BaseStats,
    #[serde(default)]
    pub ability_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPassive {
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    /// Percent stats are stored as fractions (20% tenacity is 0.2).
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    #[serde(default)]
    pub active: Option<ItemPassive>,
    #[serde(default)]
    pub passives: Vec<ItemPassive>,
    #[serde(default)]
    pub validated: bool,
}

impl Item {
    pub fn with_stats(name: impl Into<String>, stats: impl IntoIterator<Item = (Stat, f64)>) -> Self {
        Self {
            name: name.into(),
            stats: stats.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rune {
    pub name: String,
    #[serde(default)]
    pub tree: Option<String>,
    pub passive: Passive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summonerspell {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cooldown: Option<String>,
    #[serde(default)]
    pub recharge: Option<String>,
    #[serde(default)]
    pub raw_stats: BTreeMap<String, String>,
}
