//! Shared domain records.

pub mod effect;
pub mod entity;
pub mod enums;
pub mod passive;
pub mod patch;

pub use effect::{Effect, EffectComponent, EffectKind, EffectPayload};
pub use entity::{
    AttackTiming, BaseStats, Champion, ChampionAbility, ChampionMeta, Item, ItemPassive, Passive,
    Rune, Summonerspell,
};
pub use enums::{ActionType, Actor, DamageSubType, DamageType, RangeType, StatusType};
pub use passive::{BuffAction, Comparison, Condition, PassiveEffect};
pub use patch::{ChampionChanges, EntityCategory, EntityChanges, PatchChanges};
