use liandrys::extract::{scrape_champion, scrape_rune, scrape_summonerspell, EntityKind};
use liandrys::formula::{HpScaling, SynonymTable};
use liandrys::model::{BaseStats, ChampionMeta, DamageSubType, EffectPayload, RangeType};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

const ANNIE: &str = r#"
<div class="mw-parser-output">
  <div class="infobox">
    <div class="infobox-header">Attack speed</div>
    <div class="infobox-section-two-cell">
      <div class="infobox-data-row"><div class="infobox-data-label">Attack windup</div><div class="infobox-data-value">19.58% (mod. 1.0)</div></div>
      <div class="infobox-data-row"><div class="infobox-data-label">AS ratio</div><div class="infobox-data-value">0.625</div></div>
      <div class="infobox-data-row"><div class="infobox-data-label">Missile speed</div><div class="infobox-data-value">1200</div></div>
    </div>
  </div>
  <div class="side-box">
    <div class="infobox-data-label">Last changed</div><div class="infobox-data-value">V25.07</div>
    <div class="infobox-data-label">Range type</div><div class="infobox-data-value">Ranged</div>
  </div>
  <div class="skill skill_innate">
    <div class="ability-info-content">Every fourth ability stuns.</div>
    <div class="ability-info-row">
      <div class="ability-info-description no-stats">Annie's next damaging ability stuns.</div>
    </div>
  </div>
  <div class="skill skill_q">
    <div class="ability-info-stats__stat"><div class="ability-info-stats__stat-label">Cost:</div><div class="ability-info-stats__stat-value">60 / 65 / 70 / 75 / 80 Mana</div></div>
    <div class="ability-info-stats__stat"><div class="ability-info-stats__stat-label">Cooldown:</div><div class="ability-info-stats__stat-value">4</div></div>
    <div class="ability-info-row">
      <div class="ability-info-description">Annie hurls a fireball.</div>
      <div class="ability-info-stats">
        <dl class="skill-tabs"><dt><b>Magic Damage:</b></dt><dd>80 / 115 / 150 / 185 / 220 <span>(+ 80% AP)</span></dd></dl>
      </div>
    </div>
  </div>
  <div class="skill skill_w">
    <div class="ability-info-row">
      <div class="ability-info-description">Annie casts a cone of fire.</div>
      <div class="ability-info-stats">
        <dl class="skill-tabs"><dt><b>Magic Damage:</b></dt><dd>70 / 115 / 160 <span>(+ 4% of target's maximum health)</span></dd></dl>
      </div>
    </div>
  </div>
  <div class="skill skill_e">
    <div class="ability-info-row">
      <div class="ability-info-description">Annie shields an ally.</div>
      <div class="ability-info-stats">
        <dl class="skill-tabs"><dt><b>Shield Strength:</b></dt><dd><span data-bot_values="30;24;18;12" data-top_values="1;6;11;16"></span></dd></dl>
      </div>
    </div>
  </div>
  <div class="skill skill_r">
    <div class="ability-info-row">
      <div class="ability-info-description">Annie summons Tibbers.</div>
      <div class="ability-info-stats">
        <dl class="skill-tabs"><dt><b>Magic Damage:</b></dt><dd>150 / 275 / 400 souls</dd></dl>
      </div>
    </div>
  </div>
</div>
"#;

fn annie_meta() -> ChampionMeta {
    ChampionMeta {
        name: "Annie".to_string(),
        id: Some("1".to_string()),
        stats: BaseStats {
            hp: 560.0,
            attack_speed: 0.579,
            ..BaseStats::default()
        },
        ability_names: ["Pyromania", "Disintegrate", "Incinerate", "Molten Shield", "Summon: Tibbers"]
            .map(String::from)
            .to_vec(),
    }
}

#[test]
fn champion_page_scrapes_timing_side_box_and_abilities() {
    let annie = scrape_champion(ANNIE, &annie_meta(), &SynonymTable::builtin()).unwrap();

    approx_eq(annie.timing.attack_windup, 0.1958, 1e-12);
    approx_eq(annie.timing.windup_modifier, 1.0, 1e-12);
    approx_eq(annie.timing.attack_speed_ratio, 0.625, 1e-12);
    approx_eq(annie.timing.missile_speed, 1200.0, 1e-12);
    assert_eq!(annie.last_changed.as_deref(), Some("15.7.1"));
    assert_eq!(annie.range_type, RangeType::Ranged);

    assert_eq!(annie.passive.name, "Pyromania");
    assert_eq!(annie.passive.effects.len(), 1);
    assert!(annie.passive.effects[0].components.is_empty());

    assert_eq!(annie.q.name, "Disintegrate");
    assert_eq!(annie.q.cost, "60.0 + (rank - 1) * 5.0");
    assert_eq!(annie.q.cooldown, "4.0");
    assert!(annie.q.validated);
    let component = &annie.q.effects[0].components[0];
    match &component.payload {
        EffectPayload::Damage { formula, sub_type, .. } => {
            assert_eq!(formula, "80.0 + (rank - 1) * 35.0 + (0.8) * ap");
            assert_eq!(*sub_type, DamageSubType::Magic);
        }
        other => panic!("expected damage, got {other:?}"),
    }
}

#[test]
fn other_health_pool_bonus_becomes_its_own_component() {
    let annie = scrape_champion(ANNIE, &annie_meta(), &SynonymTable::builtin()).unwrap();
    let components = &annie.w.effects[0].components;
    assert_eq!(components.len(), 2);
    match (&components[0].payload, &components[1].payload) {
        (
            EffectPayload::Damage { formula, hp_scaling, .. },
            EffectPayload::Damage { formula: bonus, hp_scaling: bonus_scaling, .. },
        ) => {
            assert_eq!(formula, "70.0 + (rank - 1) * 45.0");
            assert_eq!(*hp_scaling, HpScaling::Flat);
            assert_eq!(bonus, "0.04");
            assert_eq!(*bonus_scaling, HpScaling::MaxHp);
        }
        other => panic!("expected two damage components, got {other:?}"),
    }
}

#[test]
fn tooltip_table_becomes_a_level_formula() {
    let annie = scrape_champion(ANNIE, &annie_meta(), &SynonymTable::builtin()).unwrap();
    match &annie.e.effects[0].components[0].payload {
        EffectPayload::Shield { formula, sub_type, .. } => {
            assert_eq!(formula, "30.0 + ((level - 1.0) // 5.0) * -6.0");
            assert_eq!(*sub_type, DamageSubType::True);
        }
        other => panic!("expected shield, got {other:?}"),
    }
}

#[test]
fn unknown_stat_flags_the_ability_but_keeps_the_record() {
    let annie = scrape_champion(ANNIE, &annie_meta(), &SynonymTable::builtin()).unwrap();
    assert!(!annie.r.validated);
    let component = &annie.r.effects[0].components[0];
    assert_eq!(component.comment, "needs validation");
}

#[test]
fn missing_ability_block_is_a_scrape_error() {
    let without_r = ANNIE.replace("skill skill_r", "skill skill_gone");
    let err = scrape_champion(&without_r, &annie_meta(), &SynonymTable::builtin()).unwrap_err();
    assert_eq!(err.entity, EntityKind::Champion);
    assert_eq!(err.name, "Annie");
    assert!(err.reason.contains("R block"));
}

#[test]
fn rune_and_spell_rows() {
    let rune = r#"<div class="mw-parser-output">
        <div class="infobox-section">Passive: Gain adaptive force on hit.</div>
        <div class="infobox-section-column">
          <div class="infobox-data-row"><div class="infobox-data-label">Cooldown:</div><div class="infobox-data-value">4</div></div>
        </div>
      </div>"#;
    let rune = scrape_rune(rune, "Conqueror", Some("Precision".to_string()), &SynonymTable::builtin()).unwrap();
    assert_eq!(rune.tree.as_deref(), Some("Precision"));
    assert_eq!(rune.passive.description, "Gain adaptive force on hit.");
    assert_eq!(rune.passive.static_cooldown.as_deref(), Some("4"));

    let spell = r#"<div class="mw-parser-output">
        <div class="infobox-section">Teleports a short distance.</div>
        <div class="infobox-section-column">
          <div class="infobox-data-row"><div class="infobox-data-label">Cooldown</div><div class="infobox-data-value">300 seconds</div></div>
        </div>
      </div>"#;
    let spell = scrape_summonerspell(spell, "Flash").unwrap();
    assert_eq!(spell.cooldown.as_deref(), Some("300"));
    assert_eq!(spell.description, "Teleports a short distance.");
}
