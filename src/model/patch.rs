use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Champion changes are grouped by sub-entity label (ability name or
/// "General").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionChanges {
    pub new: Vec<String>,
    pub changed: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChanges {
    pub new: Vec<String>,
    pub changed: BTreeMap<String, Vec<String>>,
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Champions,
    Items,
    Runes,
    Summonerspells,
}

impl EntityCategory {
    /// Anchor id of the category heading in patch notes.
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Champions => "Champions",
            Self::Items => "Items",
            Self::Runes => "Runes",
            Self::Summonerspells => "Summonerspells",
        }
    }
}

/// Change sets of one patch or hotfix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchChanges {
    pub champions: ChampionChanges,
    pub items: EntityChanges,
    pub runes: EntityChanges,
    pub summonerspells: EntityChanges,
}

impl PatchChanges {
    pub fn entity_mut(&mut self, category: EntityCategory) -> Option<&mut EntityChanges> {
        match category {
            EntityCategory::Champions => None,
            EntityCategory::Items => Some(&mut self.items),
            EntityCategory::Runes => Some(&mut self.runes),
            EntityCategory::Summonerspells => Some(&mut self.summonerspells),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.champions == ChampionChanges::default()
            && [&self.items, &self.runes, &self.summonerspells]
                .iter()
                .all(|changes| **changes == EntityChanges::default())
    }
}
