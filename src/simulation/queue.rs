//! Time-indexed effect queue and damage-over-time bookkeeping.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::formula::HpScaling;
use crate::model::{ActionType, Actor, DamageSubType, DamageType, EffectPayload, StatusType};

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 30;

/// Seconds to whole ticks, rounding up. Negative input is zero.
pub fn seconds_to_ticks(seconds: f64) -> u32 {
    let ticks = (seconds * f64::from(TICK_RATE)).ceil();
    if ticks.is_finite() && ticks > 0.0 {
        ticks as u32
    } else {
        0
    }
}

/// An effect emitted by an action, with its timing already in ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEffect {
    pub source: ActionType,
    /// Position of the component within the action, keeps DoTs apart.
    pub slot: usize,
    pub target: Actor,
    pub payload: EffectPayload,
    pub duration: u32,
    /// Ticks between periodic hits; fractional cadences round up per hit.
    pub interval: f64,
    pub delay: u32,
    pub projectile_speed: f64,
}

/// What an action produced: the tick the actor is free again and its effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEffect {
    pub tick: u32,
    pub effects: Vec<PendingEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DotKey {
    pub actor: Actor,
    pub source: ActionType,
    pub slot: usize,
    pub target: Actor,
}

/// A scheduled, not yet evaluated effect.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueComponent {
    pub source: ActionType,
    /// Combo index of the action that queued this effect.
    pub origin: usize,
    pub actor: Actor,
    pub target: Actor,
    pub payload: EffectPayload,
    pub dot: Option<DotKey>,
}

/// An effect with its formula replaced by a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resolved {
    Damage {
        value: f64,
        flat_pen: f64,
        percent_pen: f64,
        damage_type: DamageType,
        sub_type: DamageSubType,
        hp_scaling: HpScaling,
        vamp: f64,
    },
    Heal {
        value: f64,
        hp_scaling: HpScaling,
    },
    Shield {
        value: f64,
        /// Ticks; zero lasts until depleted.
        duration: u32,
        hp_scaling: HpScaling,
    },
    Status {
        status: StatusType,
        duration: u32,
        strength: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub source: ActionType,
    pub actor: Actor,
    pub target: Actor,
    pub effect: Resolved,
}

#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    entries: BTreeMap<u32, Vec<QueueComponent>>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u32, component: QueueComponent) {
        self.entries.entry(tick).or_default().push(component);
    }

    /// Earliest entry group at or before `tick`.
    pub fn pop_due(&mut self, tick: u32) -> Option<(u32, Vec<QueueComponent>)> {
        let first = *self.entries.keys().next()?;
        if first > tick {
            return None;
        }
        self.entries.remove_entry(&first)
    }

    pub fn pop_next(&mut self) -> Option<(u32, Vec<QueueComponent>)> {
        self.entries.pop_first()
    }

    /// Drop the entries of one DoT instance at `tick`.
    pub fn remove_dot_entry(&mut self, tick: u32, key: DotKey) {
        if let Some(group) = self.entries.get_mut(&tick) {
            group.retain(|component| component.dot != Some(key));
            if group.is_empty() {
                self.entries.remove(&tick);
            }
        }
    }

    /// Scheduled ticks of one DoT instance, ascending.
    pub fn dot_ticks(&self, key: DotKey) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|(_, group)| group.iter().any(|component| component.dot == Some(key)))
            .map(|(tick, _)| *tick)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// One running damage-over-time instance.
///
/// Regular hits land at `start + ceil(i * interval)`. When `end` is off that
/// cadence an extra hit lands exactly at `end`; a refresh unschedules that
/// final hit before the cadence continues to the new end.
#[derive(Debug, Clone, PartialEq)]
pub struct DotState {
    pub start: u32,
    pub last_regular: u32,
    pub end: u32,
    interval: f64,
    issued: u32,
    final_tick: Option<u32>,
}

impl DotState {
    pub fn new(start: u32, interval: f64, end: u32) -> Self {
        Self {
            start,
            last_regular: start,
            end: end.max(start),
            interval,
            issued: 0,
            final_tick: None,
        }
    }

    /// Still has hits after `tick`.
    pub fn is_active(&self, tick: u32) -> bool {
        self.end > tick
    }

    /// Push the end out; returns the irregular final tick that is now stale.
    pub fn extend(&mut self, end: u32) -> Option<u32> {
        self.end = self.end.max(end);
        self.final_tick.take()
    }

    /// Ticks that still need scheduling, ascending.
    pub fn pending_ticks(&mut self) -> Vec<u32> {
        let mut ticks = Vec::new();
        if self.interval > 0.0 {
            loop {
                let offset = (f64::from(self.issued + 1) * self.interval).ceil();
                let next = self.start.saturating_add(offset as u32);
                if next > self.end {
                    break;
                }
                self.issued += 1;
                self.last_regular = next;
                ticks.push(next);
            }
        }
        if self.last_regular != self.end && self.final_tick.is_none() {
            self.final_tick = Some(self.end);
            ticks.push(self.end);
        }
        ticks
    }
}
