use liandrys::formula::{HpScaling, Stat};
use liandrys::model::{
    ActionType, Actor, BaseStats, BuffAction, Champion, ChampionAbility, DamageSubType, DamageType,
    Effect, EffectComponent, EffectPayload, Item, PassiveEffect, StatusType,
};
use liandrys::simulation::{
    Action, Character, Phase, Ranks, Resolved, ResolvedComponent, ResultKind, Shield, Simulation,
    SimulationConfig, MIN_STATUS_TICKS,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn fireball() -> ChampionAbility {
    let mut ability = ChampionAbility::named("Disintegrate");
    ability.cooldown = "4".to_string();
    ability.cast_time = "0.25".to_string();
    ability.validated = true;
    ability.effects = vec![Effect {
        text: "Hurls a fireball that stuns.".to_string(),
        components: vec![
            EffectComponent::new(EffectPayload::Damage {
                formula: "80.0 + (rank - 1) * 35.0 + (0.8) * ap".to_string(),
                damage_type: DamageType::default(),
                sub_type: DamageSubType::Magic,
                hp_scaling: HpScaling::Flat,
                vamp: 0.0,
            }),
            EffectComponent::new(EffectPayload::Status {
                status: StatusType::Stun,
                duration: 1.0,
                strength: 0.0,
            }),
        ],
    }];
    ability
}

fn champion(name: &str, q: ChampionAbility) -> Champion {
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
        q,
        w: ChampionAbility::named("W"),
        e: ChampionAbility::named("E"),
        r: ChampionAbility::named("R"),
    }
}

fn duel() -> Simulation {
    let ranks = Ranks {
        q: 1,
        ..Ranks::default()
    };
    let rod = Item::with_stats("Needlessly Large Rod", [(Stat::Ap, 100.0)]);
    Simulation::new(
        Character::new(Actor::Blue, champion("Annie", fireball()), 1, ranks, vec![rod]),
        Character::new(Actor::Red, champion("Garen", ChampionAbility::named("Q")), 1, Ranks::default(), Vec::new()),
        SimulationConfig::default(),
    )
}

fn combo() -> Vec<Action> {
    vec![Action::new(Actor::Blue, ActionType::Q), Action::new(Actor::Red, ActionType::Aa)]
}

fn dummy(items: Vec<Item>) -> Character {
    Character::new(Actor::Red, champion("Dummy", ChampionAbility::named("Q")), 1, Ranks::default(), items)
}

fn status(status: StatusType, ticks: f64) -> ResolvedComponent {
    ResolvedComponent {
        source: ActionType::E,
        actor: Actor::Blue,
        target: Actor::Red,
        effect: Resolved::Status {
            status,
            duration: ticks as u32,
            strength: 0.0,
        },
    }
}

#[test]
fn stun_delays_the_opponents_attack() {
    let mut sim = duel();
    let result = sim.do_combo(&combo()).unwrap();

    // cast time 0.25 s lands the fireball at tick 8; the one second stun ends at 38
    assert_eq!(result.tick_rate, 30);
    assert_eq!(result.elapsed_ticks, 38);
    approx_eq(result.total_damage, 160.0, 1e-9);
    approx_eq(result.damage_taken[&Actor::Blue], 100.0, 1e-9);
    approx_eq(result.final_hp[&Actor::Red], 840.0, 1e-9);

    assert_eq!(result.events.len(), 2);
    assert_eq!(result.events[0].tick, 8);
    let kinds: Vec<ResultKind> = result.events[0].results.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ResultKind::Damage, ResultKind::Status]);
    assert_eq!(result.events[1].tick, 38);
}

#[test]
fn identical_combos_are_deterministic() {
    let first = duel().do_combo(&combo()).unwrap();
    let second = duel().do_combo(&combo()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn cooldown_blocks_a_second_cast() {
    let mut sim = duel();
    let actions = [Action::new(Actor::Blue, ActionType::Q), Action::new(Actor::Blue, ActionType::Q)];
    let result = sim.do_combo(&actions).unwrap();
    // ready again at 8 + 120 cooldown ticks, second cast time ends at 136
    assert_eq!(result.elapsed_ticks, 136);
    approx_eq(result.total_damage, 320.0, 1e-9);
}

#[test]
fn fault_reports_index_actor_and_phase() {
    let mut sim = duel();
    let actions = [Action::new(Actor::Blue, ActionType::Q), Action::new(Actor::Red, ActionType::Q)];
    let err = sim.do_combo(&actions).unwrap_err();
    assert_eq!(err.action_index, 1);
    assert_eq!(err.actor, Actor::Red);
    assert_eq!(err.action_type, ActionType::Q);
    assert_eq!(err.phase, Phase::Cast);
    assert!(err.to_string().starts_with("SimulationError during 'cast' at action #1 (q) by red"));
}

#[test]
fn delayed_fault_names_the_action_that_queued_it() {
    let mut ability = fireball();
    let mut broken = EffectComponent::new(EffectPayload::Damage {
        formula: "(0.3) * error".to_string(),
        damage_type: DamageType::default(),
        sub_type: DamageSubType::Magic,
        hp_scaling: HpScaling::Flat,
        vamp: 0.0,
    });
    broken.delay = 1.0;
    ability.effects[0].components = vec![broken];

    let mut sim = Simulation::new(
        Character::new(Actor::Blue, champion("Annie", ability), 1, Ranks { q: 1, ..Ranks::default() }, Vec::new()),
        Character::new(Actor::Red, champion("Garen", ChampionAbility::named("Q")), 1, Ranks::default(), Vec::new()),
        SimulationConfig::default(),
    );
    // the red attack resolves first; the blue effect only fires once drained
    let err = sim.do_combo(&combo()).unwrap_err();
    assert_eq!(err.action_index, 0);
    assert_eq!(err.actor, Actor::Blue);
    assert_eq!(err.action_type, ActionType::Q);
    assert_eq!(err.phase, Phase::Evaluation);
}

#[test]
fn passive_stacks_feed_ability_power() {
    let mut annie = champion("Annie", fireball());
    annie.passive.buffs = vec![
        PassiveEffect::Cast {
            trigger: vec![ActionType::Q],
            actions: vec![BuffAction::Stack {
                stack_key: ActionType::Q,
                amount: "1".to_string(),
            }],
            condition: None,
        },
        PassiveEffect::Stats {
            stat: Stat::Ap,
            scaling: "50 * q".to_string(),
            condition: None,
        },
    ];
    let rod = Item::with_stats("Needlessly Large Rod", [(Stat::Ap, 100.0)]);
    let mut sim = Simulation::new(
        Character::new(Actor::Blue, annie, 1, Ranks { q: 1, ..Ranks::default() }, vec![rod]),
        Character::new(Actor::Red, champion("Garen", ChampionAbility::named("Q")), 1, Ranks::default(), Vec::new()),
        SimulationConfig::default(),
    );
    let result = sim.do_combo(&combo()).unwrap();
    // 80 + 0.8 * (100 + 50)
    approx_eq(result.final_hp[&Actor::Red], 800.0, 1e-9);
}

#[test]
fn shields_absorb_in_expiry_order() {
    let mut target = dummy(Vec::new());
    target.add_shield(Shield {
        expires: 90,
        value: 100.0,
        source: ActionType::E,
        owner: Actor::Red,
    });
    target.add_shield(Shield {
        expires: 60,
        value: 50.0,
        source: ActionType::W,
        owner: Actor::Red,
    });

    let remaining = target.absorb(120.0);
    approx_eq(remaining, 0.0, 1e-12);
    let shields: Vec<(u32, f64)> = target.shields().iter().map(|s| (s.expires, s.value)).collect();
    assert_eq!(shields, vec![(60, 0.0), (90, 30.0)]);
    approx_eq(target.damage_shielded, 120.0, 1e-12);
}

#[test]
fn tenacity_sources_multiply() {
    let boots = |name: &str| Item::with_stats(name, [(Stat::Tenacity, 0.2)]);
    let target = dummy(vec![boots("Mercury's Treads"), boots("Sterak's Gage")]);
    approx_eq(target.tenacity(), 0.64, 1e-12);
    approx_eq(1.0 - target.tenacity(), 0.36, 1e-12);

    assert_eq!(target.status_ticks(StatusType::Stun, 60), 39);
    assert_eq!(target.status_ticks(StatusType::Stun, 10), MIN_STATUS_TICKS);
    assert_eq!(target.status_ticks(StatusType::Stun, 5), 5);
    assert_eq!(target.status_ticks(StatusType::Suppression, 60), 60);
}

#[test]
fn action_delay_follows_the_blocking_crowd_control() {
    let mut target = dummy(Vec::new());
    target.set_cooldown(ActionType::Aa, 30);
    target.set_cooldown(ActionType::Q, 30);
    assert_eq!(target.check_action_delay(ActionType::Aa, 30), 30);

    target.apply_status_effects(&[status(StatusType::Stun, 60.0)], 0);
    assert_eq!(target.check_action_delay(ActionType::Aa, 30), 60);

    target.apply_status_effects(&[status(StatusType::Disarm, 75.0)], 0);
    assert_eq!(target.check_action_delay(ActionType::Aa, 30), 75);
    assert_eq!(target.check_action_delay(ActionType::Q, 30), 60);
}

#[test]
fn silence_blocks_abilities_only() {
    let mut target = dummy(Vec::new());
    target.apply_status_effects(&[status(StatusType::Silence, 45.0)], 0);
    assert_eq!(target.check_action_delay(ActionType::Aa, 0), 0);
    assert_eq!(target.check_action_delay(ActionType::R, 0), 45);
}

#[test]
fn heals_cap_at_max_health() {
    let mut target = dummy(Vec::new());
    target.hp = 950.0;
    let heal = ResolvedComponent {
        source: ActionType::W,
        actor: Actor::Red,
        target: Actor::Red,
        effect: Resolved::Heal {
            value: 80.0,
            hp_scaling: HpScaling::Flat,
        },
    };
    let results = target.apply_heals(&[heal]);
    approx_eq(target.hp, 1000.0, 1e-12);
    approx_eq(results[0].value, 50.0, 1e-12);
    approx_eq(results[0].overheal, 30.0, 1e-12);
}

#[test]
fn base_stats_follow_the_growth_curve() {
    let mut annie = champion("Annie", ChampionAbility::named("Q"));
    annie.stats.hp_per_lvl = 100.0;
    let level_seven = Character::new(Actor::Blue, annie, 7, Ranks::default(), Vec::new());
    // 6 * (0.7025 + 0.0175 * 6) = 4.845
    approx_eq(level_seven.base_stat(Stat::Hp), 1484.5, 1e-9);
}
