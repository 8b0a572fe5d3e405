//! Tick-based combo replay between two characters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::{ActionType, Actor};
use crate::simulation::character::{Character, EffectResult};
use crate::simulation::error::SimulationError;
use crate::simulation::queue::{
    DotKey, DotState, EffectQueue, PendingEffect, QueueComponent, ResolvedComponent, TICK_RATE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// No tick log; results carry totals only.
    Off,
    #[default]
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Game units between the two characters; drives projectile travel.
    pub distance: f64,
    pub trace_mode: TraceMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            distance: 0.0,
            trace_mode: TraceMode::Events,
        }
    }
}

/// One action of a combo. `target` defaults to the actor's opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default = "default_actor")]
    pub actor: Actor,
    #[serde(default)]
    pub target: Option<Actor>,
    pub action_type: ActionType,
}

fn default_actor() -> Actor {
    Actor::Blue
}

impl Action {
    pub fn new(actor: Actor, action_type: ActionType) -> Self {
        Self {
            actor,
            target: None,
            action_type,
        }
    }

    pub fn target(&self) -> Actor {
        self.target.unwrap_or(self.actor.opponent())
    }
}

/// Everything that resolved on one tick, in application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickEvent {
    pub tick: u32,
    pub results: Vec<EffectResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub tick_rate: u32,
    /// Health damage dealt to the red side after shields.
    pub total_damage: f64,
    pub elapsed_ticks: u32,
    pub damage_taken: BTreeMap<Actor, f64>,
    pub final_hp: BTreeMap<Actor, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<TickEvent>,
}

pub struct Simulation {
    tick: u32,
    blue: Character,
    red: Character,
    config: SimulationConfig,
    queue: EffectQueue,
    dots: BTreeMap<DotKey, DotState>,
    events: Vec<TickEvent>,
}

impl Simulation {
    pub fn new(blue: Character, red: Character, config: SimulationConfig) -> Self {
        Self {
            tick: 0,
            blue,
            red,
            config,
            queue: EffectQueue::new(),
            dots: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn character(&self, actor: Actor) -> &Character {
        match actor {
            Actor::Blue => &self.blue,
            Actor::Red => &self.red,
        }
    }

    fn character_mut(&mut self, actor: Actor) -> &mut Character {
        match actor {
            Actor::Blue => &mut self.blue,
            Actor::Red => &mut self.red,
        }
    }

    pub fn queue(&self) -> &EffectQueue {
        &self.queue
    }

    /// Replay `actions` in order, then resolve whatever is still queued.
    ///
    /// Evaluation faults name the action that queued the failing effect, not
    /// the one running when it fired.
    pub fn do_combo(&mut self, actions: &[Action]) -> Result<SimulationResult, SimulationError> {
        for (index, action) in actions.iter().enumerate() {
            let now = self.tick;
            let ready = self.character_mut(action.actor).check_action_delay(action.action_type, now);
            self.tick = now.max(ready);
            self.process_queue(self.tick)?;

            let now = self.tick;
            let effect = self
                .character_mut(action.actor)
                .do_action(action.action_type, action.target(), now)
                .map_err(|fault| fault.at(index, action.actor))?;
            debug!(
                target: "liandrys::simulation",
                index,
                action = %action.action_type,
                actor = %action.actor,
                from = now,
                until = effect.tick,
                "action executed"
            );
            self.tick = effect.tick;
            for pending in effect.effects {
                self.schedule(index, action.actor, pending);
            }
            self.process_queue(self.tick)?;
        }

        self.drain()?;
        Ok(self.result())
    }

    fn result(&mut self) -> SimulationResult {
        let sides = [Actor::Blue, Actor::Red];
        SimulationResult {
            tick_rate: TICK_RATE,
            total_damage: self.red.damage_taken,
            elapsed_ticks: self.tick,
            damage_taken: sides.iter().map(|side| (*side, self.character(*side).damage_taken)).collect(),
            final_hp: sides.iter().map(|side| (*side, self.character(*side).hp)).collect(),
            events: std::mem::take(&mut self.events),
        }
    }

    /// Ticks until an effect reaches its target after `delay`.
    fn fire_delay(&self, pending: &PendingEffect) -> u32 {
        let travel = if pending.projectile_speed > 0.0 {
            (self.config.distance / pending.projectile_speed * f64::from(TICK_RATE)).ceil().max(0.0) as u32
        } else {
            0
        };
        pending.delay.saturating_add(travel)
    }

    /// Queue a one-shot effect, or hand a periodic one to the DoT scheduler.
    pub fn schedule(&mut self, origin: usize, actor: Actor, pending: PendingEffect) {
        let start = self.tick.saturating_add(self.fire_delay(&pending));
        if pending.duration == 0 {
            self.queue.push(
                start,
                QueueComponent {
                    source: pending.source,
                    origin,
                    actor,
                    target: pending.target,
                    payload: pending.payload,
                    dot: None,
                },
            );
            return;
        }

        let key = DotKey {
            actor,
            source: pending.source,
            slot: pending.slot,
            target: pending.target,
        };
        let end = start.saturating_add(pending.duration);
        if self.dots.get(&key).is_some_and(|state| state.is_active(self.tick)) {
            if let Some(stale) = self.dots.get_mut(&key).and_then(|state| state.extend(end)) {
                self.queue.remove_dot_entry(stale, key);
            }
        } else {
            self.dots.insert(key, DotState::new(start, pending.interval, end));
        }
        let Some(state) = self.dots.get_mut(&key) else {
            return;
        };
        let ticks = state.pending_ticks();
        trace!(target: "liandrys::simulation", source = %pending.source, start = state.start, end = state.end, ?ticks, "dot scheduled");
        for tick in ticks {
            self.queue.push(
                tick,
                QueueComponent {
                    source: pending.source,
                    origin,
                    actor,
                    target: pending.target,
                    payload: pending.payload.clone(),
                    dot: Some(key),
                },
            );
        }
    }

    /// Resolve every queue entry due at or before `until`.
    fn process_queue(&mut self, until: u32) -> Result<(), SimulationError> {
        while let Some((tick, entries)) = self.queue.pop_due(until) {
            self.resolve(tick, entries)?;
        }
        Ok(())
    }

    /// Final drain: the clock follows the last resolved entry.
    fn drain(&mut self) -> Result<(), SimulationError> {
        while let Some((tick, entries)) = self.queue.pop_next() {
            self.tick = self.tick.max(tick);
            self.resolve(tick, entries)?;
        }
        Ok(())
    }

    fn resolve(&mut self, tick: u32, entries: Vec<QueueComponent>) -> Result<(), SimulationError> {
        let mut by_target: BTreeMap<Actor, Vec<ResolvedComponent>> = BTreeMap::new();
        for entry in &entries {
            let resolved = self
                .character(entry.actor)
                .evaluate(entry)
                .map_err(|fault| fault.at(entry.origin, entry.actor))?;
            by_target.entry(resolved.target).or_default().push(resolved);
        }

        let mut results = Vec::new();
        let mut vamps = Vec::new();
        // the defending side resolves first
        for side in [Actor::Red, Actor::Blue] {
            if let Some(components) = by_target.remove(&side) {
                let (owed, applied) = self.character_mut(side).take_effects(components, tick);
                vamps.extend(owed);
                results.extend(applied);
            }
        }
        for side in [Actor::Red, Actor::Blue] {
            let heals: Vec<ResolvedComponent> = vamps.iter().filter(|vamp| vamp.target == side).cloned().collect();
            if !heals.is_empty() {
                results.extend(self.character_mut(side).apply_heals(&heals));
            }
        }

        if self.config.trace_mode == TraceMode::Events && !results.is_empty() {
            self.events.push(TickEvent { tick, results });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::HpScaling;
    use crate::model::{BaseStats, Champion, ChampionAbility, DamageSubType, DamageType, EffectPayload};
    use crate::simulation::character::Ranks;

    fn champion(name: &str) -> Champion {
        Champion {
            name: name.to_string(),
            id: None,
            last_changed: None,
            range_type: Default::default(),
            stats: BaseStats {
                hp: 1000.0,
                ad: 100.0,
                attack_speed: 1.0,
                ..BaseStats::default()
            },
            timing: Default::default(),
            passive: Default::default(),
            q: ChampionAbility::named("Q"),
            w: ChampionAbility::named("W"),
            e: ChampionAbility::named("E"),
            r: ChampionAbility::named("R"),
        }
    }

    fn simulation() -> Simulation {
        Simulation::new(
            Character::new(Actor::Blue, champion("Blue"), 1, Ranks::default(), Vec::new()),
            Character::new(Actor::Red, champion("Red"), 1, Ranks::default(), Vec::new()),
            SimulationConfig::default(),
        )
    }

    fn burn(duration: u32) -> PendingEffect {
        PendingEffect {
            source: ActionType::E,
            slot: 0,
            target: Actor::Red,
            payload: EffectPayload::Damage {
                formula: "10".to_string(),
                damage_type: DamageType::Dot,
                sub_type: DamageSubType::True,
                hp_scaling: HpScaling::Flat,
                vamp: 0.0,
            },
            duration,
            interval: 15.0,
            delay: 0,
            projectile_speed: 0.0,
        }
    }

    const BURN: DotKey = DotKey {
        actor: Actor::Blue,
        source: ActionType::E,
        slot: 0,
        target: Actor::Red,
    };

    #[test]
    fn refresh_on_cadence_extends_with_a_final_tick() {
        let mut sim = simulation();
        sim.schedule(0, Actor::Blue, burn(60));
        assert_eq!(sim.queue.dot_ticks(BURN), vec![15, 30, 45, 60]);

        sim.tick = 12;
        sim.schedule(0, Actor::Blue, burn(60));
        assert_eq!(sim.queue.dot_ticks(BURN), vec![15, 30, 45, 60, 72]);
    }

    #[test]
    fn refresh_removes_the_orphaned_final_tick() {
        let mut sim = simulation();
        sim.schedule(0, Actor::Blue, burn(50));
        assert_eq!(sim.queue.dot_ticks(BURN), vec![15, 30, 45, 50]);

        sim.tick = 12;
        sim.schedule(0, Actor::Blue, burn(50));
        assert_eq!(sim.queue.dot_ticks(BURN), vec![15, 30, 45, 60, 62]);
    }

    #[test]
    fn expired_dot_starts_a_fresh_instance() {
        let mut sim = simulation();
        sim.schedule(0, Actor::Blue, burn(30));
        sim.process_queue(40).unwrap();
        assert!(sim.queue.is_empty());

        sim.tick = 40;
        sim.schedule(0, Actor::Blue, burn(30));
        assert_eq!(sim.queue.dot_ticks(BURN), vec![55, 70]);
    }

    #[test]
    fn projectile_travel_delays_the_hit() {
        let mut sim = simulation();
        sim.config.distance = 600.0;
        let mut bolt = burn(0);
        bolt.projectile_speed = 1200.0;
        sim.schedule(0, Actor::Blue, bolt);
        assert!(sim.queue.pop_due(14).is_none());
        assert!(sim.queue.pop_due(15).is_some());
    }

    #[test]
    fn basic_attacks_land_after_windup_and_respect_cooldown() {
        let mut sim = simulation();
        let actions = [Action::new(Actor::Blue, ActionType::Aa), Action::new(Actor::Blue, ActionType::Aa)];
        let result = sim.do_combo(&actions).unwrap();
        // attack speed 1.0: one attack per 30 ticks, no windup, no armor
        assert_eq!(result.elapsed_ticks, 30);
        assert_eq!(result.events.len(), 2);
        assert!((result.total_damage - 200.0).abs() < 1e-9);
    }

    #[test]
    fn trace_off_skips_the_event_log() {
        let mut sim = simulation();
        sim.config.trace_mode = TraceMode::Off;
        let result = sim.do_combo(&[Action::new(Actor::Blue, ActionType::Aa)]).unwrap();
        assert!(result.events.is_empty());
        assert!((result.total_damage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unlearned_ability_faults_at_cast() {
        let mut sim = simulation();
        let actions = [Action::new(Actor::Blue, ActionType::Aa), Action::new(Actor::Blue, ActionType::Q)];
        let err = sim.do_combo(&actions).unwrap_err();
        assert_eq!(err.action_index, 1);
        assert_eq!(err.action_type, ActionType::Q);
        assert_eq!(err.phase, crate::simulation::error::Phase::Cast);
    }
}
