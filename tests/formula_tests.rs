use std::collections::HashMap;

use liandrys::formula::{
    evaluate, parse_freeform_scaling, parse_linear_progression, parse_stat_value,
    parse_table_progression, resolve_stat_synonym, Expr, FormulaError, HpScaling, Stat,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn at(formula: &str, var: &'static str, value: f64) -> f64 {
    let bindings: HashMap<&str, f64> = HashMap::from([(var, value)]);
    evaluate(formula, &bindings).unwrap()
}

#[test]
fn linear_progressions_reproduce_their_values() {
    let cases: [&[f64]; 3] = [
        &[80.0, 115.0, 150.0, 185.0, 220.0],
        &[12.0, 11.0, 10.0],
        &[0.35, 0.4, 0.45, 0.5, 0.55],
    ];
    for values in cases {
        let formula = parse_linear_progression(values, "rank").unwrap();
        for (index, expected) in values.iter().enumerate() {
            approx_eq(at(&formula, "rank", (index + 1) as f64), *expected, 1e-9);
        }
    }
}

#[test]
fn level_table_keeps_bucket_values() {
    let parsed = parse_table_progression(&[30.0, 24.0, 18.0, 12.0], &[1.0, 6.0, 11.0, 16.0], "level");
    let formula = parsed.formula.unwrap();
    assert_eq!(formula, "30.0 + ((level - 1.0) // 5.0) * -6.0");
    approx_eq(at(&formula, "level", 1.0), 30.0, 1e-9);
    approx_eq(at(&formula, "level", 5.0), 30.0, 1e-9);
    approx_eq(at(&formula, "level", 10.0), 24.0, 1e-9);
    approx_eq(at(&formula, "level", 18.0), 12.0, 1e-9);
}

#[test]
fn per_rank_table_steps_every_rank() {
    let parsed = parse_table_progression(&[10.0, 20.0, 30.0], &[], "rank");
    let formula = parsed.formula.unwrap();
    approx_eq(at(&formula, "rank", 3.0), 30.0, 1e-9);
}

#[test]
fn freeform_literal_examples() {
    let flat = parse_freeform_scaling("80 / 115 / 150 / 185 / 220", "rank");
    assert_eq!(flat.formula, "80.0 + (rank - 1) * 35.0");
    assert_eq!(flat.hp_scaling, HpScaling::Flat);
    assert!(flat.validated);

    let bonus = parse_freeform_scaling("(+ 80% AP)", "rank");
    assert_eq!(bonus.formula, "(0.8) * ap");

    let health = parse_freeform_scaling(
        "10 / 15 / 20% (+ 2.5% per 100 AP) of target's maximum health",
        "rank",
    );
    assert_eq!(health.formula, "0.1 + (rank - 1) * 0.05 + (0.00025) * ap");
    assert_eq!(health.hp_scaling, HpScaling::MaxHp);
}

#[test]
fn unparseable_text_is_kept_raw_and_flagged() {
    let parsed = parse_freeform_scaling("Deals bonus damage to minions", "rank");
    assert_eq!(parsed.formula, "Deals bonus damage to minions");
    assert_eq!(parsed.hp_scaling, HpScaling::Flat);
    assert!(!parsed.validated);
}

#[test]
fn synonym_resolution() {
    let per_hundred = resolve_stat_synonym("per 100 AP");
    assert_eq!(per_hundred.stat, Stat::Ap);
    assert_eq!(per_hundred.hp_scaling, HpScaling::Flat);
    assert!(per_hundred.per_hundred);

    let missing = resolve_stat_synonym("of target's missing health");
    assert_eq!(missing.stat, Stat::Flat);
    assert_eq!(missing.hp_scaling, HpScaling::MissingHp);
    assert!(!missing.per_hundred);

    assert_eq!(resolve_stat_synonym("grey health").stat, Stat::Error);
}

#[test]
fn stat_rows_drop_a_trailing_unit() {
    let cost = parse_stat_value("60 / 65 / 70 / 75 / 80 Mana", "rank");
    assert_eq!(cost.formula, "60.0 + (rank - 1) * 5.0");
    assert!(cost.parsed);

    let raw = parse_stat_value("Varies by stacks", "rank");
    assert_eq!(raw.formula, "Varies by stacks");
    assert!(!raw.parsed);
}

#[test]
fn every_emitted_token_binds_or_fails_loudly() {
    let expr = Expr::parse("(0.6) * bonus_ad + rank").unwrap();
    let partial: HashMap<&str, f64> = HashMap::from([("rank", 1.0)]);
    assert_eq!(
        expr.evaluate(&partial),
        Err(FormulaError::UnboundVariable("bonus_ad".to_string()))
    );
}
