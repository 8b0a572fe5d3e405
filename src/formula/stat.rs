//! Canonical stat tokens and wiki phrase synonyms.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    AbilityHaste,
    Ad,
    Ap,
    Armor,
    ArmorPenPercent,
    AttackSpeed,
    CritChance,
    Hp,
    HpRegen,
    Lethality,
    LifeSteal,
    MagicPen,
    MagicPenPercent,
    Mana,
    ManaRegen,
    MoveSpeed,
    Mr,
    Omnivamp,
    Tenacity,
    BonusAd,
    BonusAp,
    BonusArmor,
    BonusAttackSpeed,
    BonusHp,
    BonusMana,
    BonusMoveSpeed,
    BonusMr,
    MaxHp,
    MissingHp,
    MaxMana,
    Flat,
    Error,
}

impl Stat {
    pub const ALL: [Stat; 32] = [
        Stat::AbilityHaste,
        Stat::Ad,
        Stat::Ap,
        Stat::Armor,
        Stat::ArmorPenPercent,
        Stat::AttackSpeed,
        Stat::CritChance,
        Stat::Hp,
        Stat::HpRegen,
        Stat::Lethality,
        Stat::LifeSteal,
        Stat::MagicPen,
        Stat::MagicPenPercent,
        Stat::Mana,
        Stat::ManaRegen,
        Stat::MoveSpeed,
        Stat::Mr,
        Stat::Omnivamp,
        Stat::Tenacity,
        Stat::BonusAd,
        Stat::BonusAp,
        Stat::BonusArmor,
        Stat::BonusAttackSpeed,
        Stat::BonusHp,
        Stat::BonusMana,
        Stat::BonusMoveSpeed,
        Stat::BonusMr,
        Stat::MaxHp,
        Stat::MissingHp,
        Stat::MaxMana,
        Stat::Flat,
        Stat::Error,
    ];

    /// Variable name used for this stat inside formulas.
    pub const fn token(self) -> &'static str {
        match self {
            Self::AbilityHaste => "ability_haste",
            Self::Ad => "ad",
            Self::Ap => "ap",
            Self::Armor => "armor",
            Self::ArmorPenPercent => "armor_pen_percent",
            Self::AttackSpeed => "attack_speed",
            Self::CritChance => "crit_chance",
            Self::Hp => "hp",
            Self::HpRegen => "hp_regen",
            Self::Lethality => "lethality",
            Self::LifeSteal => "life_steal",
            Self::MagicPen => "magic_pen",
            Self::MagicPenPercent => "magic_pen_percent",
            Self::Mana => "mana",
            Self::ManaRegen => "mana_regen",
            Self::MoveSpeed => "move_speed",
            Self::Mr => "mr",
            Self::Omnivamp => "omnivamp",
            Self::Tenacity => "tenacity",
            Self::BonusAd => "bonus_ad",
            Self::BonusAp => "bonus_ap",
            Self::BonusArmor => "bonus_armor",
            Self::BonusAttackSpeed => "bonus_attack_speed",
            Self::BonusHp => "bonus_hp",
            Self::BonusMana => "bonus_mana",
            Self::BonusMoveSpeed => "bonus_move_speed",
            Self::BonusMr => "bonus_mr",
            Self::MaxHp => "max_hp",
            Self::MissingHp => "missing_hp",
            Self::MaxMana => "max_mana",
            Self::Flat => "flat",
            Self::Error => "error",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stat| stat.token() == token)
    }

    /// The stat a `bonus_*` token sums item contributions of.
    pub const fn bonus_of(self) -> Option<Self> {
        match self {
            Self::BonusAd => Some(Self::Ad),
            Self::BonusAp => Some(Self::Ap),
            Self::BonusArmor => Some(Self::Armor),
            Self::BonusAttackSpeed => Some(Self::AttackSpeed),
            Self::BonusHp => Some(Self::Hp),
            Self::BonusMana => Some(Self::Mana),
            Self::BonusMoveSpeed => Some(Self::MoveSpeed),
            Self::BonusMr => Some(Self::Mr),
            _ => None,
        }
    }
}

/// Which health pool an effect magnitude is a fraction of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpScaling {
    #[default]
    Flat,
    MaxHp,
    CurrentHp,
    MissingHp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatResolution {
    pub stat: Stat,
    pub hp_scaling: HpScaling,
    /// Phrase was "per 100 X": values are a percentage per hundred points.
    pub per_hundred: bool,
}

/// One phrase mapping, as stored in a synonym overlay file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub phrase: String,
    pub stat: Stat,
    #[serde(default)]
    pub hp_scaling: HpScaling,
}

#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: HashMap<String, (Stat, HpScaling)>,
}

const BUILTIN: &[(&str, Stat, HpScaling)] = &[
    ("", Stat::Flat, HpScaling::Flat),
    ("flat", Stat::Flat, HpScaling::Flat),
    ("seconds", Stat::Flat, HpScaling::Flat),
    ("units", Stat::Flat, HpScaling::Flat),
    ("ability haste", Stat::AbilityHaste, HpScaling::Flat),
    ("ad", Stat::Ad, HpScaling::Flat),
    ("attack damage", Stat::Ad, HpScaling::Flat),
    ("total attack damage", Stat::Ad, HpScaling::Flat),
    ("ap", Stat::Ap, HpScaling::Flat),
    ("ability power", Stat::Ap, HpScaling::Flat),
    ("armor", Stat::Armor, HpScaling::Flat),
    ("total armor", Stat::Armor, HpScaling::Flat),
    ("armor penetration", Stat::ArmorPenPercent, HpScaling::Flat),
    ("attack speed", Stat::AttackSpeed, HpScaling::Flat),
    ("attackspeed", Stat::AttackSpeed, HpScaling::Flat),
    ("critical strike chance", Stat::CritChance, HpScaling::Flat),
    ("hp", Stat::Hp, HpScaling::Flat),
    ("health", Stat::Hp, HpScaling::Flat),
    ("base health regeneration", Stat::HpRegen, HpScaling::Flat),
    ("lethality", Stat::Lethality, HpScaling::Flat),
    ("life steal", Stat::LifeSteal, HpScaling::Flat),
    ("magic penetration", Stat::MagicPen, HpScaling::Flat),
    ("magic penetration percent", Stat::MagicPenPercent, HpScaling::Flat),
    ("mana", Stat::Mana, HpScaling::Flat),
    ("base mana regeneration", Stat::ManaRegen, HpScaling::Flat),
    ("move speed", Stat::MoveSpeed, HpScaling::Flat),
    ("movement speed", Stat::MoveSpeed, HpScaling::Flat),
    ("mr", Stat::Mr, HpScaling::Flat),
    ("magic resist", Stat::Mr, HpScaling::Flat),
    ("magic resistance", Stat::Mr, HpScaling::Flat),
    ("total magic resistance", Stat::Mr, HpScaling::Flat),
    ("omnivamp", Stat::Omnivamp, HpScaling::Flat),
    ("tenacity", Stat::Tenacity, HpScaling::Flat),
    ("bonus ad", Stat::BonusAd, HpScaling::Flat),
    ("bonus attack damage", Stat::BonusAd, HpScaling::Flat),
    ("bonus ap", Stat::BonusAp, HpScaling::Flat),
    ("bonus ability power", Stat::BonusAp, HpScaling::Flat),
    ("bonus armor", Stat::BonusArmor, HpScaling::Flat),
    ("bonus attack speed", Stat::BonusAttackSpeed, HpScaling::Flat),
    ("bonus health", Stat::BonusHp, HpScaling::Flat),
    ("of his bonus health", Stat::BonusHp, HpScaling::Flat),
    ("of her bonus health", Stat::BonusHp, HpScaling::Flat),
    ("of bonus health", Stat::BonusHp, HpScaling::Flat),
    ("bonus mana", Stat::BonusMana, HpScaling::Flat),
    ("bonus movement speed", Stat::BonusMoveSpeed, HpScaling::Flat),
    ("bonus magic resistance", Stat::BonusMr, HpScaling::Flat),
    ("bonus magic resist", Stat::BonusMr, HpScaling::Flat),
    ("bonus mr", Stat::BonusMr, HpScaling::Flat),
    ("maximum health", Stat::MaxHp, HpScaling::Flat),
    ("of maximum health", Stat::MaxHp, HpScaling::Flat),
    ("of his maximum health", Stat::MaxHp, HpScaling::Flat),
    ("of her maximum health", Stat::MaxHp, HpScaling::Flat),
    ("of their maximum health", Stat::MaxHp, HpScaling::Flat),
    ("missing health", Stat::MissingHp, HpScaling::Flat),
    ("of missing health", Stat::MissingHp, HpScaling::Flat),
    ("his missing health", Stat::MissingHp, HpScaling::Flat),
    ("of his missing health", Stat::MissingHp, HpScaling::Flat),
    ("of her missing health", Stat::MissingHp, HpScaling::Flat),
    ("maximum mana", Stat::MaxMana, HpScaling::Flat),
    ("target's maximum health", Stat::Flat, HpScaling::MaxHp),
    ("of target's maximum health", Stat::Flat, HpScaling::MaxHp),
    ("of the target's maximum health", Stat::Flat, HpScaling::MaxHp),
    ("target's current health", Stat::Flat, HpScaling::CurrentHp),
    ("of target's current health", Stat::Flat, HpScaling::CurrentHp),
    ("of the target's current health", Stat::Flat, HpScaling::CurrentHp),
    ("target's missing health", Stat::Flat, HpScaling::MissingHp),
    ("of target's missing health", Stat::Flat, HpScaling::MissingHp),
    ("of the target's missing health", Stat::Flat, HpScaling::MissingHp),
];

/// Built-in phrase table shared by every scrape.
pub fn default_synonyms() -> &'static SynonymTable {
    static TABLE: OnceLock<SynonymTable> = OnceLock::new();
    TABLE.get_or_init(SynonymTable::builtin)
}

/// Resolve a phrase against the built-in table.
pub fn resolve_stat_synonym(phrase: &str) -> StatResolution {
    default_synonyms().resolve(phrase)
}

impl SynonymTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(phrase, stat, hp)| ((*phrase).to_string(), (*stat, *hp)))
            .collect();
        Self { entries }
    }

    /// Add or replace phrases; later entries win.
    pub fn extend(&mut self, overlay: impl IntoIterator<Item = SynonymEntry>) {
        for entry in overlay {
            self.entries
                .insert(normalize_phrase(&entry.phrase), (entry.stat, entry.hp_scaling));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look a phrase up without logging a miss.
    pub fn lookup(&self, phrase: &str) -> Option<StatResolution> {
        let normalized = normalize_phrase(phrase);
        let (rest, per_hundred) = match normalized.strip_prefix("per 100 ") {
            Some(rest) => (rest.to_string(), true),
            None => (normalized, false),
        };
        self.entries
            .get(&rest)
            .map(|(stat, hp_scaling)| StatResolution {
                stat: *stat,
                hp_scaling: *hp_scaling,
                per_hundred,
            })
    }

    /// Unknown phrases resolve to [Stat::Error] and are logged for curation.
    pub fn resolve(&self, phrase: &str) -> StatResolution {
        self.lookup(phrase).unwrap_or_else(|| {
            warn!(target: "liandrys::patch", phrase, "unknown stat phrase");
            StatResolution {
                stat: Stat::Error,
                hp_scaling: HpScaling::Flat,
                per_hundred: normalize_phrase(phrase).starts_with("per 100 "),
            }
        })
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ','])
        .to_lowercase()
        .replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_for_every_stat() {
        for stat in Stat::ALL {
            assert_eq!(Stat::from_token(stat.token()), Some(stat));
        }
    }

    #[test]
    fn compound_phrases_resolve() {
        assert_eq!(
            resolve_stat_synonym("AP"),
            StatResolution {
                stat: Stat::Ap,
                hp_scaling: HpScaling::Flat,
                per_hundred: false
            }
        );
        assert_eq!(resolve_stat_synonym("bonus AD").stat, Stat::BonusAd);
        assert_eq!(
            resolve_stat_synonym("per 100 AP"),
            StatResolution {
                stat: Stat::Ap,
                hp_scaling: HpScaling::Flat,
                per_hundred: true
            }
        );
        assert_eq!(
            resolve_stat_synonym("of target's  current health").hp_scaling,
            HpScaling::CurrentHp
        );
    }

    #[test]
    fn unknown_phrase_is_error_token() {
        let resolved = resolve_stat_synonym("souls collected");
        assert_eq!(resolved.stat, Stat::Error);
        assert_eq!(resolved.hp_scaling, HpScaling::Flat);
    }

    #[test]
    fn overlay_adds_phrases() {
        let mut table = SynonymTable::builtin();
        let before = table.len();
        table.extend([SynonymEntry {
            phrase: "Soul Stacks".to_string(),
            stat: Stat::Flat,
            hp_scaling: HpScaling::Flat,
        }]);
        assert_eq!(table.len(), before + 1);
        assert_eq!(table.lookup("soul stacks").map(|r| r.stat), Some(Stat::Flat));
    }
}
