//! Free-form wiki scaling text to formulas.
//!
//! Grammar of one clause:
//!
//! ```text
//! clause  := flats? '%'? (group | phrase)*
//! flats   := number ('/' number)* | number range-sep number
//! group   := '(' '+' clause ')' | '(' "based on" word ')'
//! phrase  := words naming a stat, at most one per clause
//! ```
//!
//! Bonus groups are parsed recursively with the same grammar. Anything that
//! does not fit comes back as the raw input with `validated = false`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::formula::progression::{format_number, is_linear, parse_linear_progression, LEVEL_CAP};
use crate::formula::stat::{default_synonyms, HpScaling, Stat, SynonymTable};

/// Result of converting one piece of scaling text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParse {
    pub formula: String,
    pub hp_scaling: HpScaling,
    /// False when the text was kept raw or referenced an unknown stat.
    pub validated: bool,
    /// Bonus clauses scaling off a different health pool; each becomes its
    /// own effect component.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detached: Vec<ScalingParse>,
}

impl ScalingParse {
    fn raw(text: &str) -> Self {
        Self {
            formula: text.trim().to_string(),
            hp_scaling: HpScaling::Flat,
            validated: false,
            detached: Vec::new(),
        }
    }
}

/// Value of an ability stat row such as cooldown or cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub formula: String,
    pub parsed: bool,
}

pub fn parse_freeform_scaling(text: &str, scale: &str) -> ScalingParse {
    parse_freeform_scaling_with(text, scale, default_synonyms())
}

pub fn parse_freeform_scaling_with(text: &str, scale: &str, synonyms: &SynonymTable) -> ScalingParse {
    match parse_clause(text, scale, synonyms) {
        Ok(parsed) => {
            debug!(target: "liandrys::patch", text, formula = %parsed.formula, "parsed scaling");
            parsed
        }
        Err(reason) => {
            warn!(target: "liandrys::patch", text, reason, "unparseable scaling text");
            ScalingParse::raw(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Flats {
    None,
    List(Vec<f64>),
    Range(f64, f64),
}

#[derive(Debug)]
struct Clause<'a> {
    flats: Flats,
    percent: bool,
    bonuses: Vec<&'a str>,
    scale: Option<String>,
    phrase: &'a str,
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<f64> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
            .map_or(rest.len(), |(i, _)| i);
        let value = rest[..len].parse::<f64>().ok()?;
        self.pos += len;
        Some(value)
    }

    fn range_separator(&mut self) -> bool {
        ['-', '\u{2013}', '\u{2014}', '\u{2212}'].into_iter().any(|c| self.eat(c))
            || self.eat_word("to")
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let rest = self.rest();
        let matches = rest.starts_with(word)
            && rest[word.len()..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace);
        if matches {
            self.pos += word.len();
        }
        matches
    }

    /// Contents of a balanced parenthesised group, cursor on its '('.
    fn group(&mut self) -> Result<&'a str, &'static str> {
        let rest = self.rest();
        let mut depth = 0usize;
        for (i, c) in rest.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += i + 1;
                        return Ok(&rest[1..i]);
                    }
                }
                _ => {}
            }
        }
        Err("unbalanced parenthesis")
    }

    /// Text up to the next '(' or the end.
    fn phrase(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find('(').unwrap_or(rest.len());
        self.pos += len;
        rest[..len].trim()
    }
}

fn split_clause(text: &str) -> Result<Clause<'_>, &'static str> {
    let mut cursor = Cursor { text, pos: 0 };
    cursor.skip_ws();

    let flats = match cursor.number() {
        None => Flats::None,
        Some(first) => {
            let mut values = vec![first];
            loop {
                let save = cursor.pos;
                cursor.skip_ws();
                if cursor.eat('/') {
                    cursor.skip_ws();
                    values.push(cursor.number().ok_or("expected number after '/'")?);
                } else {
                    cursor.pos = save;
                    break;
                }
            }
            let save = cursor.pos;
            cursor.skip_ws();
            if values.len() == 1 && cursor.range_separator() {
                cursor.skip_ws();
                let second = cursor.number().ok_or("expected number after range separator")?;
                Flats::Range(first, second)
            } else {
                cursor.pos = save;
                Flats::List(values)
            }
        }
    };

    cursor.skip_ws();
    let percent = flats != Flats::None && cursor.eat('%');

    let mut bonuses = Vec::new();
    let mut scale = None;
    let mut phrase = "";
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => break,
            Some('(') => {
                let inner = cursor.group()?.trim();
                if let Some(bonus) = inner.strip_prefix('+') {
                    bonuses.push(bonus.trim());
                } else if let Some(basis) = inner.to_lowercase().strip_prefix("based on") {
                    scale = Some(scale_variable(basis.trim()).ok_or("unknown scale basis")?);
                } else {
                    return Err("unexpected parenthesised text");
                }
            }
            Some(_) => {
                let words = cursor.phrase();
                if !phrase.is_empty() {
                    return Err("more than one stat phrase");
                }
                if stat_words(words).contains(|c: char| c.is_ascii_digit() || c == ')') {
                    return Err("stat phrase contains numbers");
                }
                phrase = words;
            }
        }
    }

    Ok(Clause {
        flats,
        percent,
        bonuses,
        scale,
        phrase,
    })
}

/// Phrase without a leading "per 100", the only place a number may appear.
fn stat_words(phrase: &str) -> &str {
    let mut words = phrase.split_whitespace();
    match (words.next(), words.next()) {
        (Some(per), Some("100")) if per.eq_ignore_ascii_case("per") => {
            let start = phrase.find("100").map_or(0, |i| i + 3);
            &phrase[start..]
        }
        _ => phrase,
    }
}

fn scale_variable(basis: &str) -> Option<String> {
    match basis {
        "level" | "champion level" => Some("level".to_string()),
        "rank" | "ability rank" => Some("rank".to_string()),
        _ => None,
    }
}

fn parse_clause(text: &str, scale: &str, synonyms: &SynonymTable) -> Result<ScalingParse, &'static str> {
    let clause = split_clause(text)?;
    let scale = clause.scale.as_deref().unwrap_or(scale);
    let has_flats = clause.flats != Flats::None;

    if !has_flats && clause.bonuses.is_empty() {
        return Err("no values");
    }

    let resolved = synonyms.lookup(clause.phrase);
    let mut validated = resolved.is_some();
    let resolved = resolved.unwrap_or_else(|| synonyms.resolve(clause.phrase));

    let mut divisor = 1.0;
    if clause.percent {
        divisor *= 100.0;
    }
    if resolved.per_hundred {
        divisor *= 100.0;
    }

    let mut parts = Vec::new();
    match &clause.flats {
        Flats::None => {
            if resolved.stat != Stat::Flat {
                return Err("stat phrase without values");
            }
        }
        Flats::List(values) => {
            let values: Vec<f64> = values.iter().map(|v| v / divisor).collect();
            if !is_linear(&values) {
                return Err("progression is not linear");
            }
            let base = parse_linear_progression(&values, scale).ok_or("no values")?;
            parts.push(apply_stat(base, resolved.stat));
        }
        Flats::Range(low, high) => {
            if scale != "level" {
                return Err("value range without level basis");
            }
            let step = (high - low) / divisor / f64::from(LEVEL_CAP - 1);
            let base = format!(
                "{} + (level - 1) * {}",
                format_number(low / divisor),
                format_number(step)
            );
            parts.push(apply_stat(base, resolved.stat));
        }
    }

    let mut hp_scaling = resolved.hp_scaling;
    let mut detached = Vec::new();
    for (index, bonus_text) in clause.bonuses.iter().enumerate() {
        let bonus = parse_clause(bonus_text, scale, synonyms)?;
        validated &= bonus.validated;
        if index == 0 && !has_flats && hp_scaling == HpScaling::Flat {
            hp_scaling = bonus.hp_scaling;
        }
        if bonus.hp_scaling == HpScaling::Flat || bonus.hp_scaling == hp_scaling {
            parts.push(bonus.formula);
            detached.extend(bonus.detached);
        } else {
            debug!(
                target: "liandrys::patch",
                bonus = bonus_text,
                "bonus scales off another health pool, detaching"
            );
            detached.push(bonus);
        }
    }

    Ok(ScalingParse {
        formula: parts.join(" + "),
        hp_scaling,
        validated,
        detached,
    })
}

fn apply_stat(base: String, stat: Stat) -> String {
    if stat == Stat::Flat {
        base
    } else {
        format!("({base}) * {}", stat.token())
    }
}

fn stat_value_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^(\d+(?:\.\d+)?(?:\s*/\s*\d+(?:\.\d+)?)*)\s*(%?)\s*(?:[A-Za-z]+)?$").ok()
        })
        .as_ref()
}

fn based_on_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\(\s*based on ([a-z ]+)\)").ok())
        .as_ref()
}

/// Parse an ability stat row value like `"60 / 65 / 70 / 75 / 80 Mana"`.
///
/// One trailing unit word is dropped. Anything else is returned unchanged
/// with `parsed = false`.
pub fn parse_stat_value(text: &str, scale: &str) -> StatValue {
    let raw = || StatValue {
        formula: text.to_string(),
        parsed: false,
    };

    let mut scale = scale.to_string();
    let mut body = text.trim().to_string();
    let (Some(value_pattern), Some(basis_pattern)) = (stat_value_pattern(), based_on_pattern())
    else {
        return raw();
    };
    if let Some(captures) = basis_pattern.captures(&body) {
        if let Some(basis) = captures
            .get(1)
            .and_then(|m| scale_variable(&m.as_str().trim().to_lowercase()))
        {
            scale = basis;
        }
        body = basis_pattern.replace(&body, "").trim().to_string();
    }

    let Some(captures) = value_pattern.captures(&body) else {
        return raw();
    };
    let divisor = if captures.get(2).is_some_and(|m| !m.as_str().is_empty()) {
        100.0
    } else {
        1.0
    };
    let values: Option<Vec<f64>> = captures[1]
        .split('/')
        .map(|part| part.trim().parse::<f64>().ok().map(|v| v / divisor))
        .collect();
    let Some(values) = values else {
        return raw();
    };
    if !is_linear(&values) {
        warn!(target: "liandrys::patch", text, "stat value progression is not linear");
        return raw();
    }
    match parse_linear_progression(&values, &scale) {
        Some(formula) => StatValue {
            formula,
            parsed: true,
        },
        None => raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_flats_percent_groups_and_phrase() {
        let clause = split_clause("10 / 15 / 20% (+ 2.5% per 100 AP) of target's maximum health")
            .unwrap();
        assert_eq!(clause.flats, Flats::List(vec![10.0, 15.0, 20.0]));
        assert!(clause.percent);
        assert_eq!(clause.bonuses, vec!["2.5% per 100 AP"]);
        assert_eq!(clause.phrase, "of target's maximum health");
    }

    #[test]
    fn per_hundred_phrase_divides_again() {
        let parsed = parse_freeform_scaling("2.5% per 100 AP", "rank");
        assert_eq!(parsed.formula, "(0.00025) * ap");
        assert!(parsed.validated);

        let clause = split_clause("2.5% per 100 AP").unwrap();
        assert_eq!(clause.phrase, "per 100 AP");
        assert!(split_clause("5% per 2 AP").is_err());
    }

    #[test]
    fn literal_health_scaling_with_ap_bonus() {
        let parsed = parse_freeform_scaling(
            "10 / 15 / 20% (+ 2.5% per 100 AP) of target's maximum health",
            "rank",
        );
        assert_eq!(parsed.formula, "0.1 + (rank - 1) * 0.05 + (0.00025) * ap");
        assert_eq!(parsed.hp_scaling, HpScaling::MaxHp);
        assert!(parsed.validated);
        assert!(parsed.detached.is_empty());
    }

    #[test]
    fn multiple_bonus_groups_are_summed() {
        let parsed = parse_freeform_scaling("50 / 75 (+ 60% bonus AD) (+ 40% AP)", "rank");
        assert_eq!(
            parsed.formula,
            "50.0 + (rank - 1) * 25.0 + (0.6) * bonus_ad + (0.4) * ap"
        );
        assert!(parsed.validated);
    }

    #[test]
    fn bonus_on_other_health_pool_is_detached() {
        let parsed = parse_freeform_scaling(
            "60 / 90 (+ 4% of target's maximum health)",
            "rank",
        );
        assert_eq!(parsed.formula, "60.0 + (rank - 1) * 30.0");
        assert_eq!(parsed.hp_scaling, HpScaling::Flat);
        assert_eq!(parsed.detached.len(), 1);
        assert_eq!(parsed.detached[0].formula, "0.04");
        assert_eq!(parsed.detached[0].hp_scaling, HpScaling::MaxHp);
    }

    #[test]
    fn level_range_spreads_over_all_levels() {
        let parsed = parse_freeform_scaling("20 \u{2212} 190 (based on level)", "rank");
        assert_eq!(parsed.formula, "20.0 + (level - 1) * 10.0");
    }

    #[test]
    fn unknown_stat_is_flagged_but_kept() {
        let parsed = parse_freeform_scaling("30% souls", "rank");
        assert_eq!(parsed.formula, "(0.3) * error");
        assert!(!parsed.validated);
    }

    #[test]
    fn nonlinear_progression_stays_raw() {
        let parsed = parse_freeform_scaling("10 / 20 / 40", "rank");
        assert_eq!(parsed.formula, "10 / 20 / 40");
        assert!(!parsed.validated);
    }

    #[test]
    fn stat_value_with_level_basis() {
        let value = parse_stat_value("12 / 10 / 8 (based on level)", "rank");
        assert_eq!(value.formula, "12.0 + (level - 1) * -2.0");
        assert!(value.parsed);
    }
}
