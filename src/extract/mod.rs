//! Wiki markup to structured records.

pub mod effects;
pub mod entity;
pub mod markup;
pub mod patch_notes;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use effects::{classify_label, extract_ability_stats, extract_effects, AbilityStats, ExtractedEffects};
pub use entity::{scrape_champion, scrape_item, scrape_rune, scrape_summonerspell};
pub use markup::{clean_text, Document, NodeId};
pub use patch_notes::{scrape_hotfix, scrape_hotfix_list, scrape_patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Champion,
    Item,
    Rune,
    Summonerspell,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Champion => "champion",
            Self::Item => "item",
            Self::Rune => "rune",
            Self::Summonerspell => "summonerspell",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "champion" => Some(Self::Champion),
            "item" => Some(Self::Item),
            "rune" => Some(Self::Rune),
            "summonerspell" | "spell" => Some(Self::Summonerspell),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mandatory markup section was missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("failed to scrape {entity} '{name}': {reason}")]
pub struct ScrapeError {
    pub entity: EntityKind,
    pub name: String,
    pub reason: String,
}

impl ScrapeError {
    pub fn new(entity: EntityKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            reason: reason.into(),
        }
    }
}
