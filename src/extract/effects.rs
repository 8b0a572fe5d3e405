//! Ability blocks to structured effects.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::extract::markup::{clean_text, Document, NodeId};
use crate::formula::{
    parse_freeform_scaling_with, parse_stat_value, parse_table_progression, parse_table_values,
    ScalingParse, SynonymTable, Table,
};
use crate::model::{DamageSubType, DamageType, Effect, EffectComponent, EffectKind, EffectPayload};

/// Map a stat-row label to the effect it describes.
///
/// Returns `None` for generic labels ("Bonus Armor", "Health Cost
/// Reduction") that do not describe a damage, heal or shield amount.
pub fn classify_label(label: &str) -> Option<(EffectKind, DamageSubType)> {
    let lowered = label.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .collect();
    let has = |word: &str| words.contains(&word);

    if has("shield") {
        return Some((EffectKind::Shield, DamageSubType::True));
    }
    if has("damage") {
        let sub_type = if has("magic") {
            DamageSubType::Magic
        } else if has("true") {
            DamageSubType::True
        } else if has("adaptive") {
            DamageSubType::Adaptive
        } else {
            DamageSubType::Physical
        };
        return Some((EffectKind::Damage, sub_type));
    }
    if has("heal") || has("healing") {
        return Some((EffectKind::Heal, DamageSubType::True));
    }
    None
}

/// Build a component from a parsed scaling clause.
pub fn component_for(kind: EffectKind, sub_type: DamageSubType, parsed: &ScalingParse) -> Option<EffectComponent> {
    let formula = parsed.formula.clone();
    let payload = match kind {
        EffectKind::Damage => EffectPayload::Damage {
            formula,
            damage_type: DamageType::Default,
            sub_type,
            hp_scaling: parsed.hp_scaling,
            vamp: 0.0,
        },
        EffectKind::Heal => EffectPayload::Heal {
            formula,
            hp_scaling: parsed.hp_scaling,
        },
        EffectKind::Shield => EffectPayload::Shield {
            formula,
            duration: 0.0,
            sub_type,
            hp_scaling: parsed.hp_scaling,
        },
        EffectKind::Status => return None,
    };
    let mut component = EffectComponent::new(payload);
    if !parsed.validated {
        component.comment = "needs validation".to_string();
    }
    Some(component)
}

/// Effects of an ability block plus whether every clause parsed cleanly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEffects {
    pub effects: Vec<Effect>,
    pub validated: bool,
}

pub fn extract_effects(doc: &Document, block: NodeId, synonyms: &SynonymTable) -> ExtractedEffects {
    let mut extracted = ExtractedEffects {
        effects: Vec::new(),
        validated: true,
    };
    for paragraph in doc.find_all(block, "div.ability-info-row") {
        let (effect, validated) = extract_paragraph(doc, paragraph, synonyms);
        extracted.validated &= validated;
        extracted.effects.push(effect);
    }
    extracted
}

fn extract_paragraph(doc: &Document, paragraph: NodeId, synonyms: &SynonymTable) -> (Effect, bool) {
    if let Some(text_only) = doc.find(paragraph, "div.ability-info-description.no-stats") {
        return (
            Effect {
                text: doc.clean_text(text_only),
                components: Vec::new(),
            },
            true,
        );
    }
    let Some(description) = doc.find(paragraph, "div.ability-info-description") else {
        return (
            Effect {
                text: doc.clean_text(paragraph),
                components: Vec::new(),
            },
            true,
        );
    };
    let mut effect = Effect {
        text: doc.clean_text(description),
        components: Vec::new(),
    };
    let mut validated = true;
    if let Some(stats) = doc.find(paragraph, "div.ability-info-stats") {
        for row in doc.find_all(stats, "dl.skill-tabs") {
            let (components, row_validated) = extract_stat_row(doc, row, synonyms);
            validated &= row_validated;
            effect.components.extend(components);
        }
    }
    (effect, validated)
}

/// One `label: value` row of an effect paragraph.
fn extract_stat_row(doc: &Document, row: NodeId, synonyms: &SynonymTable) -> (Vec<EffectComponent>, bool) {
    let (Some(dt), Some(dd)) = (doc.find(row, "dt"), doc.find(row, "dd")) else {
        return (Vec::new(), true);
    };
    let label = doc.find(dt, "b").map_or_else(|| doc.clean_text(dt), |b| doc.clean_text(b));
    let Some((kind, sub_type)) = classify_label(&label) else {
        debug!(target: "liandrys::patch", label, "skipping generic label");
        return (Vec::new(), true);
    };

    // text and plain spans form one clause; tooltip tables are added after
    let mut clause = String::new();
    let mut table_formulas = Vec::new();
    let mut validated = true;
    for child in doc.children(dd) {
        let child = *child;
        if doc.is_element(child) && doc.has_attr(child, "data-bot_values") {
            let bottom = doc.attr(child, "data-bot_values").and_then(parse_table_values);
            let top = doc
                .attr(child, "data-top_values")
                .map_or(Some(Vec::new()), parse_table_values);
            match (bottom, top) {
                (Some(bottom), Some(top)) => {
                    let parsed = parse_table_progression(&bottom, &top, table_scale(&bottom, &top));
                    match parsed.formula {
                        Some(formula) => table_formulas.push(formula),
                        None => validated = false,
                    }
                }
                _ => {
                    warn!(target: "liandrys::patch", label, "unreadable tooltip table");
                    validated = false;
                }
            }
        } else {
            clause.push_str(&doc.text(child));
            clause.push(' ');
        }
    }

    let clause = clean_text(&clause);
    let mut parsed = if clause.is_empty() {
        ScalingParse {
            formula: String::new(),
            hp_scaling: Default::default(),
            validated: true,
            detached: Vec::new(),
        }
    } else {
        parse_freeform_scaling_with(&clause, "rank", synonyms)
    };
    validated &= parsed.validated;

    let mut parts: Vec<String> = Vec::new();
    if !parsed.formula.is_empty() {
        parts.push(std::mem::take(&mut parsed.formula));
    }
    parts.extend(table_formulas);
    if parts.is_empty() {
        return (Vec::new(), validated);
    }
    parsed.formula = parts.join(" + ");

    let mut components: Vec<EffectComponent> = component_for(kind, sub_type, &parsed).into_iter().collect();
    components.extend(
        parsed
            .detached
            .iter()
            .filter_map(|detached| component_for(kind, sub_type, detached)),
    );
    (components, validated)
}

/// Level tables have breakpoints or one value per level; rank tables are short.
fn table_scale(bottom: &[f64], top: &[f64]) -> &'static str {
    if !top.is_empty() || bottom.len() > 5 {
        "level"
    } else {
        "rank"
    }
}

/// Stat rows of an ability (cooldown, cost, cast time, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbilityStats {
    pub values: BTreeMap<String, String>,
    pub tables: BTreeMap<String, Table>,
    pub validated: bool,
}

impl AbilityStats {
    /// Remove a row, defaulting to `"0"`.
    pub fn take(&mut self, label: &str) -> String {
        self.values.remove(label).unwrap_or_else(|| "0".to_string())
    }
}

pub fn extract_ability_stats(doc: &Document, block: NodeId) -> AbilityStats {
    let mut stats = AbilityStats {
        validated: true,
        ..AbilityStats::default()
    };
    for stat in doc.find_all(block, "div.ability-info-stats__stat") {
        let (Some(label), Some(value)) = (
            doc.find(stat, "div.ability-info-stats__stat-label"),
            doc.find(stat, "div.ability-info-stats__stat-value"),
        ) else {
            continue;
        };
        let label = doc
            .clean_text(label)
            .to_lowercase()
            .trim_end_matches(':')
            .trim()
            .to_string();
        let text = doc.clean_text(value);

        let (body, scale) = match text.split_once('(') {
            Some((body, basis)) => {
                let basis = basis.trim_end_matches(')').replace("based on", "");
                let basis = basis.trim().to_lowercase();
                let scale = if basis.is_empty() { "rank".to_string() } else { basis };
                (body.trim().to_string(), scale)
            }
            None => (text.clone(), "rank".to_string()),
        };

        let table_span = doc
            .find(value, "span[data-bot_values]")
            .filter(|span| doc.has_attr(*span, "data-top_values"));
        let formula = match table_span {
            Some(span) => {
                let bottom = doc.attr(span, "data-bot_values").and_then(parse_table_values);
                let top = doc.attr(span, "data-top_values").and_then(parse_table_values);
                match (bottom, top) {
                    (Some(bottom), Some(top)) => {
                        let parsed = parse_table_progression(&bottom, &top, &scale);
                        match parsed.formula {
                            Some(formula) => formula,
                            None => {
                                stats.tables.insert(label.clone(), parsed.table);
                                stats.validated = false;
                                body
                            }
                        }
                    }
                    _ => {
                        stats.validated = false;
                        body
                    }
                }
            }
            None => {
                let parsed = parse_stat_value(&body, &scale);
                stats.validated &= parsed.parsed;
                parsed.formula
            }
        };
        stats.values.insert(label, formula);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_classify_by_whole_words() {
        assert_eq!(
            classify_label("Shield Strength:"),
            Some((EffectKind::Shield, DamageSubType::True))
        );
        assert_eq!(
            classify_label("Total Magic Damage:"),
            Some((EffectKind::Damage, DamageSubType::Magic))
        );
        assert_eq!(classify_label("Heal:"), Some((EffectKind::Heal, DamageSubType::True)));
        assert_eq!(classify_label("Health Cost Reduction:"), None);
        assert_eq!(classify_label("Bonus Armor:"), None);
    }

    #[test]
    fn physical_is_the_default_damage_type() {
        assert_eq!(
            classify_label("Bonus Damage:"),
            Some((EffectKind::Damage, DamageSubType::Physical))
        );
    }
}
