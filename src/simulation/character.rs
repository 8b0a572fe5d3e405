//! One side's live combat state.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::formula::expr::Bindings;
use crate::formula::{evaluate, FormulaError, HpScaling, Stat};
use crate::model::{
    ActionType, Actor, BuffAction, Champion, ChampionAbility, Condition, DamageSubType, DamageType,
    EffectComponent, EffectPayload, Item, PassiveEffect, StatusType,
};
use crate::simulation::error::Fault;
use crate::simulation::queue::{
    seconds_to_ticks, ActionEffect, PendingEffect, QueueComponent, Resolved, ResolvedComponent, TICK_RATE,
};

/// Block every action.
const FULL_LOCKOUT: [StatusType; 4] = [
    StatusType::Stun,
    StatusType::Suspension,
    StatusType::Sleep,
    StatusType::Airborne,
];
/// Block abilities only.
const SILENCE_FAMILY: [StatusType; 3] = [StatusType::Berserk, StatusType::Silence, StatusType::Taunt];

const ACTIONS: [ActionType; 6] = [
    ActionType::Aa,
    ActionType::Q,
    ActionType::W,
    ActionType::E,
    ActionType::R,
    ActionType::Passive,
];

/// Tenacity never shortens crowd control below this many ticks.
pub const MIN_STATUS_TICKS: u32 = 9;

/// Ability ranks for Q/W/E/R; zero means unlearned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ranks {
    pub q: u32,
    pub w: u32,
    pub e: u32,
    pub r: u32,
}

impl Ranks {
    pub const fn of(self, action: ActionType) -> Option<u32> {
        match action {
            ActionType::Q => Some(self.q),
            ActionType::W => Some(self.w),
            ActionType::E => Some(self.e),
            ActionType::R => Some(self.r),
            ActionType::Aa | ActionType::Passive => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shield {
    pub expires: u32,
    pub value: f64,
    pub source: ActionType,
    pub owner: Actor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Damage,
    Heal,
    /// Damage absorbed by a shield.
    Shield,
    Status,
}

/// What one resolved component did to its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectResult {
    pub source: ActionType,
    pub actor: Actor,
    pub target: Actor,
    pub kind: ResultKind,
    pub value: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub raw: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub mitigated: f64,
    #[serde(skip_serializing_if = "is_zero")]
    pub overheal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<DamageSubType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusType>,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl EffectResult {
    fn new(component: &ResolvedComponent, kind: ResultKind, value: f64) -> Self {
        Self {
            source: component.source,
            actor: component.actor,
            target: component.target,
            kind,
            value,
            raw: 0.0,
            mitigated: 0.0,
            overheal: 0.0,
            sub_type: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    champion: Champion,
    level: u32,
    ranks: Ranks,
    items: Vec<Item>,
    actor: Actor,
    pub hp: f64,
    shields: Vec<Shield>,
    status_effects: BTreeMap<StatusType, Vec<(u32, f64)>>,
    cooldowns: BTreeMap<ActionType, u32>,
    stacks: BTreeMap<ActionType, i64>,
    /// Stats whose passive buffs are being evaluated right now.
    evaluating: RefCell<BTreeSet<Stat>>,
    pub damage_taken: f64,
    pub healed: f64,
    pub damage_shielded: f64,
}

impl Character {
    pub fn new(actor: Actor, champion: Champion, level: u32, ranks: Ranks, items: Vec<Item>) -> Self {
        let mut character = Self {
            champion,
            level: level.max(1),
            ranks,
            items,
            actor,
            hp: 0.0,
            shields: Vec::new(),
            status_effects: BTreeMap::new(),
            cooldowns: BTreeMap::new(),
            stacks: BTreeMap::new(),
            evaluating: RefCell::new(BTreeSet::new()),
            damage_taken: 0.0,
            healed: 0.0,
            damage_shielded: 0.0,
        };
        character.hp = character.stat(Stat::Hp);
        character
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn champion(&self) -> &Champion {
        &self.champion
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn shields(&self) -> &[Shield] {
        &self.shields
    }

    pub fn cooldown(&self, action: ActionType) -> u32 {
        self.cooldowns.get(&action).copied().unwrap_or(0)
    }

    /// Stack counter keyed by the action that builds it.
    pub fn stacks(&self, key: ActionType) -> i64 {
        self.stacks.get(&key).copied().unwrap_or(0)
    }

    pub fn add_stacks(&mut self, key: ActionType, amount: i64) {
        let count = self.stacks.entry(key).or_insert(0);
        *count = count.saturating_add(amount);
    }

    /// Earliest tick `action` is off cooldown.
    pub fn set_cooldown(&mut self, action: ActionType, ready_at: u32) {
        self.cooldowns.insert(action, ready_at);
    }

    /// Level-one value grown along the game's per-level curve.
    pub fn base_stat(&self, stat: Stat) -> f64 {
        let Some((base, per_level)) = self.champion.stats.growth(stat) else {
            return 0.0;
        };
        base + per_level * growth_factor(self.level)
    }

    /// Sum of item contributions.
    pub fn bonus_stat(&self, stat: Stat) -> f64 {
        self.items.iter().filter_map(|item| item.stats.get(&stat)).sum()
    }

    pub fn stat(&self, stat: Stat) -> f64 {
        if let Some(base) = stat.bonus_of() {
            return self.bonus_stat(base);
        }
        match stat {
            Stat::AttackSpeed => self.attack_speed(),
            Stat::Tenacity => self.tenacity(),
            Stat::MaxHp => self.stat(Stat::Hp),
            Stat::MaxMana => self.stat(Stat::Mana),
            Stat::MissingHp => self.stat(Stat::Hp) - self.hp,
            Stat::Flat => 1.0,
            Stat::MoveSpeed => {
                (self.base_stat(stat) + self.bonus_stat(stat) + self.buff_stat(stat)) * self.slow_factor()
            }
            _ => self.base_stat(stat) + self.bonus_stat(stat) + self.buff_stat(stat),
        }
    }

    /// Passive stat buffs whose condition holds. A buff formula reading the
    /// stat it buffs sees that stat without buffs.
    pub fn buff_stat(&self, stat: Stat) -> f64 {
        if self.champion.passive.buffs.is_empty() {
            return 0.0;
        }
        let entered = self.evaluating.borrow_mut().insert(stat);
        if !entered {
            return 0.0;
        }
        let total: f64 = self
            .champion
            .passive
            .buffs
            .iter()
            .filter_map(|buff| match buff {
                PassiveEffect::Stats {
                    stat: buffed,
                    scaling,
                    condition,
                } if *buffed == stat => Some((scaling, condition)),
                _ => None,
            })
            .filter(|(_, condition)| self.condition_holds(condition.as_ref()))
            .map(|(scaling, _)| {
                self.evaluate_formula(scaling, None).unwrap_or_else(|err| {
                    warn!(target: "liandrys::simulation", stat = stat.token(), scaling = scaling.as_str(), error = %err, "stat buff ignored");
                    0.0
                })
            })
            .sum();
        self.evaluating.borrow_mut().remove(&stat);
        total
    }

    fn condition_holds(&self, condition: Option<&Condition>) -> bool {
        let Some(condition) = condition else {
            return true;
        };
        match self.evaluate_formula(&condition.key, None) {
            Ok(value) => condition.comparison.holds(value, condition.value),
            Err(err) => {
                warn!(target: "liandrys::simulation", key = condition.key.as_str(), error = %err, "buff condition unreadable");
                false
            }
        }
    }

    fn attack_speed(&self) -> f64 {
        let stats = &self.champion.stats;
        let bonus = stats.attack_speed_per_lvl * growth_factor(self.level) + self.bonus_stat(Stat::AttackSpeed);
        (stats.attack_speed + self.champion.timing.attack_speed_ratio * bonus) * self.cripple_factor()
    }

    /// Fraction of crowd-control duration that remains; sources multiply.
    pub fn tenacity(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|item| item.stats.get(&Stat::Tenacity))
            .map(|tenacity| 1.0 - tenacity)
            .product()
    }

    /// Only the strongest slow counts.
    fn slow_factor(&self) -> f64 {
        let strongest = self
            .active(StatusType::Slow)
            .map(|(_, strength)| strength)
            .fold(0.0_f64, f64::max);
        1.0 - strongest
    }

    fn cripple_factor(&self) -> f64 {
        self.active(StatusType::Cripple)
            .map(|(_, strength)| 1.0 - strength)
            .product()
    }

    fn active(&self, status: StatusType) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.status_effects.get(&status).into_iter().flatten().copied()
    }

    fn latest_expiry(&self, statuses: &[StatusType]) -> Option<u32> {
        statuses
            .iter()
            .flat_map(|status| self.active(*status))
            .map(|(expires, _)| expires)
            .max()
    }

    pub fn has_status(&self, status: StatusType) -> bool {
        self.status_effects.get(&status).is_some_and(|entries| !entries.is_empty())
    }

    fn remove_expired_status_effects(&mut self, tick: u32) {
        self.status_effects.retain(|_, entries| {
            entries.retain(|(expires, _)| *expires > tick);
            !entries.is_empty()
        });
    }

    /// Evaluate a formula with this character's live stats bound.
    pub fn evaluate_formula(&self, formula: &str, rank: Option<u32>) -> Result<f64, FormulaError> {
        evaluate(formula, &Scope { character: self, rank })
    }

    /// Earliest tick `action` may run when proposed at `tick`.
    pub fn check_action_delay(&mut self, action: ActionType, tick: u32) -> u32 {
        let mut tick = tick.max(self.cooldown(action));
        self.remove_expired_status_effects(tick);

        for blocking in [
            self.latest_expiry(&[StatusType::Stasis]),
            self.latest_expiry(&[StatusType::Suppression]),
            self.latest_expiry(&FULL_LOCKOUT),
        ] {
            tick = tick.max(blocking.unwrap_or(0));
        }
        if action == ActionType::Aa {
            tick = tick.max(self.latest_expiry(&[StatusType::Disarm]).unwrap_or(0));
        }
        if action.is_ability() {
            tick = tick.max(self.latest_expiry(&SILENCE_FAMILY).unwrap_or(0));
        }
        tick
    }

    pub fn do_action(&mut self, action: ActionType, target: Actor, tick: u32) -> Result<ActionEffect, Fault> {
        let mut effect = match action {
            ActionType::Aa => self.basic_attack(target, tick),
            ActionType::Q | ActionType::W | ActionType::E | ActionType::R => self.cast_ability(action, target, tick)?,
            ActionType::Passive => return Err(Fault::cast(action, "passive cannot be cast")),
        };
        effect.effects.extend(self.trigger_cast_buffs(action, target)?);
        Ok(effect)
    }

    /// Run the passive's cast buffs listening for `action`.
    fn trigger_cast_buffs(&mut self, action: ActionType, target: Actor) -> Result<Vec<PendingEffect>, Fault> {
        let triggered: Vec<BuffAction> = self
            .champion
            .passive
            .buffs
            .iter()
            .filter_map(|buff| match buff {
                PassiveEffect::Cast {
                    trigger,
                    actions,
                    condition,
                } if trigger.contains(&action) && self.condition_holds(condition.as_ref()) => Some(actions),
                _ => None,
            })
            .flatten()
            .cloned()
            .collect();

        let mut effects = Vec::new();
        for (slot, buff_action) in triggered.iter().enumerate() {
            match buff_action {
                BuffAction::Stack { stack_key, amount } => {
                    let amount = self
                        .evaluate_formula(amount, None)
                        .map_err(|err| Fault::cast(action, format!("stack amount: {err}")))?;
                    self.add_stacks(*stack_key, amount.trunc() as i64);
                }
                BuffAction::Effect { effect } => {
                    effects.push(self.pending_effect(ActionType::Passive, slot, effect, target));
                }
            }
        }
        Ok(effects)
    }

    /// Heals and shields land on the caster, everything else on `target`.
    fn pending_effect(&self, source: ActionType, slot: usize, component: &EffectComponent, target: Actor) -> PendingEffect {
        PendingEffect {
            source,
            slot,
            target: match component.payload {
                EffectPayload::Heal { .. } | EffectPayload::Shield { .. } => self.actor,
                EffectPayload::Damage { .. } | EffectPayload::Status { .. } => target,
            },
            payload: component.payload.clone(),
            duration: seconds_to_ticks(component.duration),
            interval: component.interval * f64::from(TICK_RATE),
            delay: seconds_to_ticks(component.delay),
            projectile_speed: component.projectile_speed,
        }
    }

    fn basic_attack(&mut self, target: Actor, tick: u32) -> ActionEffect {
        let attack_time = 1.0 / self.attack_speed();
        self.set_cooldown(ActionType::Aa, tick.saturating_add(seconds_to_ticks(attack_time)));
        let windup = seconds_to_ticks(attack_time * self.champion.timing.attack_windup);

        let formula = if self.has_status(StatusType::Blind) {
            "0".to_string()
        } else {
            Stat::Ad.token().to_string()
        };
        ActionEffect {
            tick: tick.saturating_add(windup),
            effects: vec![PendingEffect {
                source: ActionType::Aa,
                slot: 0,
                target,
                payload: EffectPayload::Damage {
                    formula,
                    damage_type: DamageType::Basic,
                    sub_type: DamageSubType::Physical,
                    hp_scaling: HpScaling::Flat,
                    vamp: self.stat(Stat::LifeSteal) + self.stat(Stat::Omnivamp),
                },
                duration: 0,
                interval: 0.0,
                delay: 0,
                projectile_speed: self.champion.timing.missile_speed,
            }],
        }
    }

    fn ability(&self, action: ActionType) -> Option<&ChampionAbility> {
        match action {
            ActionType::Q => Some(&self.champion.q),
            ActionType::W => Some(&self.champion.w),
            ActionType::E => Some(&self.champion.e),
            ActionType::R => Some(&self.champion.r),
            ActionType::Aa | ActionType::Passive => None,
        }
    }

    fn cast_ability(&mut self, action: ActionType, target: Actor, tick: u32) -> Result<ActionEffect, Fault> {
        let rank = self.ranks.of(action).unwrap_or(0);
        if rank == 0 {
            return Err(Fault::cast(action, "ability has not been learned (rank 0)"));
        }
        let ability = self
            .ability(action)
            .ok_or_else(|| Fault::cast(action, "no ability bound to this action"))?;
        if !ability.validated {
            return Err(Fault::cast(
                action,
                format!("ability '{}' of {} is not validated", ability.name, self.champion.name),
            ));
        }

        let cooldown = self
            .evaluate_formula(&ability.cooldown, Some(rank))
            .map_err(|err| Fault::cast(action, err.to_string()))?;
        let cooldown = cooldown * 100.0 / (100.0 + self.bonus_stat(Stat::AbilityHaste));
        let cast_time = self
            .evaluate_formula(&ability.cast_time, Some(rank))
            .map_err(|err| Fault::cast(action, err.to_string()))?;
        let cast_ticks = seconds_to_ticks(cast_time);

        let effects = ability
            .effects
            .iter()
            .flat_map(|effect| &effect.components)
            .enumerate()
            .map(|(slot, component)| self.pending_effect(action, slot, component, target))
            .collect();

        let ready = tick.saturating_add(seconds_to_ticks(cooldown)).saturating_add(cast_ticks);
        self.set_cooldown(action, ready);
        Ok(ActionEffect {
            tick: tick.saturating_add(cast_ticks),
            effects,
        })
    }

    /// Resolve a queued component's formula against this (source) character.
    pub fn evaluate(&self, component: &QueueComponent) -> Result<ResolvedComponent, Fault> {
        let rank = self.ranks.of(component.source);
        let value = |formula: &str| {
            self.evaluate_formula(formula, rank)
                .map_err(|err| Fault::evaluation(component.source, &err))
        };
        let effect = match &component.payload {
            EffectPayload::Damage {
                formula,
                damage_type,
                sub_type,
                hp_scaling,
                vamp,
            } => {
                let sub_type = self.resolve_sub_type(*sub_type);
                let (flat_pen, percent_pen) = self.penetration(sub_type);
                Resolved::Damage {
                    value: value(formula.as_str())?,
                    flat_pen,
                    percent_pen,
                    damage_type: *damage_type,
                    sub_type,
                    hp_scaling: *hp_scaling,
                    vamp: *vamp,
                }
            }
            EffectPayload::Heal { formula, hp_scaling } => Resolved::Heal {
                value: value(formula.as_str())?,
                hp_scaling: *hp_scaling,
            },
            EffectPayload::Shield {
                formula,
                duration,
                hp_scaling,
                ..
            } => Resolved::Shield {
                value: value(formula.as_str())?,
                duration: seconds_to_ticks(*duration),
                hp_scaling: *hp_scaling,
            },
            EffectPayload::Status {
                status,
                duration,
                strength,
            } => Resolved::Status {
                status: *status,
                duration: seconds_to_ticks(*duration),
                strength: *strength,
            },
        };
        Ok(ResolvedComponent {
            source: component.source,
            actor: component.actor,
            target: component.target,
            effect,
        })
    }

    /// Adaptive damage follows whichever of bonus AD and AP is larger.
    fn resolve_sub_type(&self, sub_type: DamageSubType) -> DamageSubType {
        match sub_type {
            DamageSubType::Adaptive if self.stat(Stat::BonusAd) > self.stat(Stat::Ap) => DamageSubType::Physical,
            DamageSubType::Adaptive => DamageSubType::Magic,
            other => other,
        }
    }

    fn penetration(&self, sub_type: DamageSubType) -> (f64, f64) {
        match sub_type {
            DamageSubType::Physical => (self.bonus_stat(Stat::Lethality), self.bonus_stat(Stat::ArmorPenPercent)),
            DamageSubType::Magic => (self.bonus_stat(Stat::MagicPen), self.bonus_stat(Stat::MagicPenPercent)),
            DamageSubType::True | DamageSubType::Adaptive => (0.0, 0.0),
        }
    }

    fn resistance(&self, sub_type: DamageSubType) -> f64 {
        match sub_type {
            DamageSubType::Physical => self.stat(Stat::Armor),
            DamageSubType::Magic => self.stat(Stat::Mr),
            DamageSubType::True | DamageSubType::Adaptive => 0.0,
        }
    }

    fn hp_scaled(&self, value: f64, hp_scaling: HpScaling) -> f64 {
        match hp_scaling {
            HpScaling::Flat => value,
            HpScaling::MaxHp => value * self.stat(Stat::Hp),
            HpScaling::CurrentHp => value * self.hp,
            HpScaling::MissingHp => value * (self.stat(Stat::Hp) - self.hp),
        }
    }

    /// Post-mitigation damage, raw damage and the mitigated amount.
    pub fn calculate_damage(&self, value: f64, hp_scaling: HpScaling, sub_type: DamageSubType, flat_pen: f64, percent_pen: f64) -> (f64, f64, f64) {
        let raw = self.hp_scaled(value, hp_scaling);
        let resistance = self.resistance(sub_type);
        let resistance = (resistance - resistance * percent_pen - flat_pen).max(0.0);
        let dealt = raw * 100.0 / (100.0 + resistance);
        (dealt, raw, raw - dealt)
    }

    /// Apply everything that lands on this character at `tick`: shields,
    /// then damage, then heals, then statuses. Returns the vamp heals owed
    /// to the damage sources.
    pub fn take_effects(&mut self, components: Vec<ResolvedComponent>, tick: u32) -> (Vec<ResolvedComponent>, Vec<EffectResult>) {
        let mut shields = Vec::new();
        let mut damages = Vec::new();
        let mut heals = Vec::new();
        let mut statuses = Vec::new();
        for component in components {
            match component.effect {
                Resolved::Shield { .. } => shields.push(component),
                Resolved::Damage { .. } => damages.push(component),
                Resolved::Heal { .. } => heals.push(component),
                Resolved::Status { .. } => statuses.push(component),
            }
        }

        self.apply_shields(&shields, tick);
        let (vamps, mut results) = self.apply_damages(&damages);
        results.extend(self.apply_heals(&heals));
        results.extend(self.apply_status_effects(&statuses, tick));
        (vamps, results)
    }

    pub fn apply_shields(&mut self, components: &[ResolvedComponent], tick: u32) {
        self.shields.retain(|shield| shield.expires > tick && shield.value > 0.0);
        for component in components {
            if let Resolved::Shield {
                value,
                duration,
                hp_scaling,
            } = component.effect
            {
                let expires = if duration == 0 { u32::MAX } else { tick.saturating_add(duration) };
                self.shields.push(Shield {
                    expires,
                    value: self.hp_scaled(value, hp_scaling),
                    source: component.source,
                    owner: component.actor,
                });
            }
        }
        self.shields.sort_by_key(|shield| shield.expires);
    }

    /// Add a shield directly; kept sorted by expiry.
    pub fn add_shield(&mut self, shield: Shield) {
        self.shields.push(shield);
        self.shields.sort_by_key(|shield| shield.expires);
    }

    fn apply_damages(&mut self, components: &[ResolvedComponent]) -> (Vec<ResolvedComponent>, Vec<EffectResult>) {
        let mut total = 0.0;
        let mut vamps = Vec::new();
        let mut results = Vec::new();
        for component in components {
            let Resolved::Damage {
                value,
                flat_pen,
                percent_pen,
                sub_type,
                hp_scaling,
                vamp,
                ..
            } = component.effect
            else {
                continue;
            };
            let (dealt, raw, mitigated) = self.calculate_damage(value, hp_scaling, sub_type, flat_pen, percent_pen);
            total += dealt;
            let mut result = EffectResult::new(component, ResultKind::Damage, dealt);
            result.raw = raw;
            result.mitigated = mitigated;
            result.sub_type = Some(sub_type);
            results.push(result);
            if vamp > 0.0 {
                vamps.push(ResolvedComponent {
                    source: component.source,
                    actor: component.actor,
                    target: component.actor,
                    effect: Resolved::Heal {
                        value: dealt * vamp,
                        hp_scaling: HpScaling::Flat,
                    },
                });
            }
        }
        if let Some(first) = components.first() {
            let (remaining, absorbed) = self.use_shields(total, first);
            results.extend(absorbed);
            self.damage_taken += remaining;
            self.hp -= remaining;
        }
        (vamps, results)
    }

    /// Absorb `damage` with shields in expiry order; returns what is left.
    pub fn absorb(&mut self, damage: f64) -> f64 {
        let mut damage = damage;
        for shield in &mut self.shields {
            if damage <= 0.0 {
                break;
            }
            let absorbed = damage.min(shield.value);
            shield.value -= absorbed;
            self.damage_shielded += absorbed;
            damage -= absorbed;
        }
        damage
    }

    fn use_shields(&mut self, damage: f64, hit: &ResolvedComponent) -> (f64, Vec<EffectResult>) {
        let before: Vec<f64> = self.shields.iter().map(|shield| shield.value).collect();
        let remaining = self.absorb(damage);
        let results = self
            .shields
            .iter()
            .zip(before)
            .filter(|(shield, before)| *before > shield.value)
            .map(|(shield, before)| EffectResult {
                source: shield.source,
                actor: shield.owner,
                target: hit.target,
                kind: ResultKind::Shield,
                value: before - shield.value,
                raw: 0.0,
                mitigated: 0.0,
                overheal: 0.0,
                sub_type: None,
                status: None,
            })
            .collect();
        (remaining, results)
    }

    pub fn apply_heals(&mut self, components: &[ResolvedComponent]) -> Vec<EffectResult> {
        let max_hp = self.stat(Stat::Hp);
        let mut results = Vec::new();
        for component in components {
            let Resolved::Heal { value, hp_scaling } = component.effect else {
                continue;
            };
            let raw = self.hp_scaled(value, hp_scaling);
            let heal = raw.min((max_hp - self.hp).max(0.0));
            self.hp += heal;
            self.healed += heal;
            let mut result = EffectResult::new(component, ResultKind::Heal, heal);
            result.raw = raw;
            result.overheal = raw - heal;
            results.push(result);
        }
        results
    }

    /// Tenacity-affected statuses are shortened, but never below
    /// [MIN_STATUS_TICKS] nor above their full duration.
    pub fn status_ticks(&self, status: StatusType, duration: u32) -> u32 {
        if !status.tenacity_affected() {
            return duration;
        }
        let reduced = (self.tenacity() * f64::from(duration)).ceil() as u32;
        reduced.max(MIN_STATUS_TICKS).min(duration)
    }

    pub fn apply_status_effects(&mut self, components: &[ResolvedComponent], tick: u32) -> Vec<EffectResult> {
        let mut results = Vec::new();
        for component in components {
            let Resolved::Status {
                status,
                duration,
                strength,
            } = component.effect
            else {
                continue;
            };
            let ticks = self.status_ticks(status, duration);
            self.status_effects
                .entry(status)
                .or_default()
                .push((tick.saturating_add(ticks), strength));
            let mut result = EffectResult::new(component, ResultKind::Status, f64::from(ticks));
            result.status = Some(status);
            results.push(result);
        }
        results
    }
}

fn growth_factor(level: u32) -> f64 {
    let steps = f64::from(level.saturating_sub(1));
    steps * (0.7025 + 0.0175 * steps)
}

/// Formula variables: every stat token, `level`, `rank` for abilities, and
/// one stack counter per action token.
struct Scope<'a> {
    character: &'a Character,
    rank: Option<u32>,
}

impl Bindings for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<f64> {
        match name {
            "level" => Some(f64::from(self.character.level)),
            "rank" => self.rank.map(f64::from),
            _ => Stat::from_token(name)
                .filter(|stat| *stat != Stat::Error)
                .map(|stat| self.character.stat(stat))
                .or_else(|| {
                    ACTIONS
                        .into_iter()
                        .find(|action| action.as_str() == name)
                        .map(|action| self.character.stacks(action) as f64)
                }),
        }
    }
}
