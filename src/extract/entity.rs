//! Champion, item, rune and summoner spell pages.
//!
//! Each scraper takes the page markup plus the feed record for the entity
//! and fills in what only the wiki carries. A missing mandatory section is a
//! [ScrapeError]; anything merely unparseable is kept raw and flagged.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::extract::effects::{extract_ability_stats, extract_effects};
use crate::extract::markup::{clean_text, Document, NodeId};
use crate::extract::{EntityKind, ScrapeError};
use crate::formula::{Stat, SynonymTable};
use crate::loader::patch_version::wiki_to_riot_patch;
use crate::model::{
    AttackTiming, Champion, ChampionAbility, ChampionMeta, Item, ItemPassive, Passive, RangeType,
    Rune, Summonerspell,
};

const ABILITY_LETTERS: [&str; 4] = ["q", "w", "e", "r"];

pub fn scrape_champion(html: &str, meta: &ChampionMeta, synonyms: &SynonymTable) -> Result<Champion, ScrapeError> {
    let doc = Document::parse(html);
    let fail = |reason: String| ScrapeError::new(EntityKind::Champion, &meta.name, reason);

    let timing = scrape_attack_timing(&doc, meta.stats.attack_speed).map_err(fail)?;
    let (last_changed, range_type) = scrape_side_box(&doc).map_err(fail)?;
    let passive = scrape_champion_passive(&doc, meta, synonyms).map_err(fail)?;

    let mut abilities = Vec::with_capacity(ABILITY_LETTERS.len());
    for (slot, letter) in ABILITY_LETTERS.iter().enumerate() {
        let name = meta
            .ability_names
            .get(slot + 1)
            .cloned()
            .unwrap_or_else(|| letter.to_uppercase());
        let ability = scrape_ability(&doc, letter, name, synonyms).map_err(fail)?;
        abilities.push(ability);
    }
    let mut abilities = abilities.into_iter();
    let (Some(q), Some(w), Some(e), Some(r)) = (abilities.next(), abilities.next(), abilities.next(), abilities.next())
    else {
        return Err(fail("ability list incomplete".to_string()));
    };

    debug!(target: "liandrys::patch", champion = %meta.name, "scraped champion");
    Ok(Champion {
        name: meta.name.clone(),
        id: meta.id.clone(),
        last_changed,
        range_type,
        stats: meta.stats.clone(),
        timing,
        passive,
        q,
        w,
        e,
        r,
    })
}

fn scrape_attack_timing(doc: &Document, base_attack_speed: f64) -> Result<AttackTiming, String> {
    let mut timing = AttackTiming {
        attack_speed_ratio: base_attack_speed,
        ..AttackTiming::default()
    };
    let header = doc
        .find_all(doc.root(), "div.infobox-header")
        .into_iter()
        .find(|header| doc.text(*header).to_lowercase().contains("attack speed"))
        .ok_or("attack speed section not found")?;
    let Some(section) = doc
        .next_element_siblings(header)
        .into_iter()
        .find(|sibling| doc.has_class(*sibling, "infobox-section-two-cell"))
    else {
        return Ok(timing);
    };

    for row in doc.find_all(section, "div.infobox-data-row") {
        let (Some(label), Some(value)) = (
            doc.find(row, "div.infobox-data-label"),
            doc.find(row, "div.infobox-data-value"),
        ) else {
            continue;
        };
        let label = doc.clean_text(label).to_lowercase();
        let value = doc.clean_text(value).to_lowercase();

        if label.contains("windup") {
            let mut parts = value.splitn(2, ' ');
            let windup = parts.next().unwrap_or_default().trim_matches([' ', '%']);
            timing.attack_windup = parse_number(windup)? / 100.0;
            if let Some(modifier) = parts.next() {
                let modifier = modifier.trim_matches(|c: char| " ()mod.".contains(c));
                timing.windup_modifier = parse_number(modifier)?;
            }
        } else if label.contains("as ratio") && value != "n/a" {
            timing.attack_speed_ratio = parse_number(&value)?;
        } else if label.contains("missile") && !value.contains("non-projectile") {
            timing.missile_speed = parse_number(&value)?;
        }
    }
    Ok(timing)
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("expected a number, found '{raw}'"))
}

fn scrape_side_box(doc: &Document) -> Result<(Option<String>, RangeType), String> {
    let mut last_changed = None;
    let mut range_type = RangeType::Melee;
    for label in doc.find_all(doc.root(), "div.infobox-data-label") {
        let text = doc.clean_text(label).to_lowercase();
        let Some(value) = doc
            .next_element_siblings(label)
            .into_iter()
            .find(|sibling| doc.has_class(*sibling, "infobox-data-value"))
        else {
            continue;
        };
        let value = doc.clean_text(value);

        if text.contains("last changed") {
            last_changed = Some(match wiki_to_riot_patch(&value) {
                Ok(riot) => riot,
                Err(err) => {
                    warn!(target: "liandrys::patch", value, error = %err, "keeping raw last-changed patch");
                    value
                }
            });
        } else if text.contains("range type") {
            let lowered = value.to_lowercase();
            if lowered.contains("ranged") {
                range_type = RangeType::Ranged;
            } else if !lowered.contains("melee") {
                return Err(format!("unknown range type '{value}'"));
            }
        }
    }
    Ok((last_changed, range_type))
}

fn scrape_champion_passive(doc: &Document, meta: &ChampionMeta, synonyms: &SynonymTable) -> Result<Passive, String> {
    let block = doc
        .find(doc.root(), "div.skill.skill_innate")
        .ok_or("passive block not found")?;
    let mut stats = extract_ability_stats(doc, block);
    let description = doc
        .find(block, "div.ability-info-content")
        .map(|content| doc.clean_text(content))
        .unwrap_or_default();
    let effects = extract_effects(doc, block, synonyms);

    Ok(Passive {
        name: meta.ability_names.first().cloned().unwrap_or_else(|| "Passive".to_string()),
        description,
        static_cooldown: stats.values.remove("static cooldown"),
        raw_stats: stats.values,
        effects: effects.effects,
        buffs: Vec::new(),
    })
}

fn scrape_ability(doc: &Document, letter: &str, name: String, synonyms: &SynonymTable) -> Result<ChampionAbility, String> {
    let block = doc
        .find(doc.root(), &format!("div.skill.skill_{letter}"))
        .ok_or_else(|| format!("{} block not found", letter.to_uppercase()))?;

    let mut stats = extract_ability_stats(doc, block);
    let extracted = extract_effects(doc, block, synonyms);

    let mut ability = ChampionAbility::named(name);
    ability.cooldown = stats.take("cooldown");
    ability.cooldown_table = stats.tables.remove("cooldown");
    ability.cost = stats.take("cost");
    ability.cast_time = stats.take("cast time");
    ability.recharge = stats.take("recharge");
    ability.validated = stats.validated && extracted.validated;
    ability.raw_stats = stats.values;
    ability.effects = extracted.effects;
    Ok(ability)
}

/// Item page. Items without a stat block or passives still scrape; only the
/// infobox itself is mandatory.
pub fn scrape_item(html: &str, name: &str, id: Option<String>, synonyms: &SynonymTable) -> Result<Item, ScrapeError> {
    let doc = Document::parse(html);
    let fail = |reason: &str| ScrapeError::new(EntityKind::Item, name, reason);
    let content = doc
        .find(doc.root(), "div.mw-parser-output")
        .ok_or_else(|| fail("page content not found"))?;
    let infobox = doc
        .find(content, "div.infobox")
        .ok_or_else(|| fail("item infobox not found"))?;

    let mut item = Item {
        name: name.to_string(),
        id,
        class: scrape_item_class(&doc, content),
        validated: true,
        ..Item::default()
    };

    for header in doc.find_all(infobox, "div.infobox-header") {
        let Some(section) = doc.next_element_sibling(header) else {
            continue;
        };
        match doc.clean_text(header).as_str() {
            "Stats" => {
                if let Some(block) = doc.find(section, "div.infobox-section-stacked") {
                    let (stats, clean) = scrape_item_stats(&doc, block, synonyms);
                    item.stats = stats;
                    item.validated &= clean;
                }
            }
            "Active" => {
                item.active = scrape_item_passive(&doc, section);
                item.validated = false;
            }
            "Passive" => {
                item.passives = doc
                    .find_all(section, "div.infobox-data-value")
                    .into_iter()
                    .filter_map(|value| scrape_item_passive(&doc, value))
                    .collect();
                item.validated = false;
            }
            other => debug!(target: "liandrys::patch", item = name, section = other, "ignoring item section"),
        }
    }
    Ok(item)
}

fn scrape_item_class(doc: &Document, content: NodeId) -> Option<String> {
    doc.find_all(content, "a[title]")
        .into_iter()
        .find(|link| doc.attr(*link, "title").is_some_and(|title| title.contains("Category")))
        .map(|link| doc.clean_text(link))
}

/// `"+45 attack damage"` or `"20% tenacity"`; percents become fractions.
fn scrape_item_stats(doc: &Document, block: NodeId, synonyms: &SynonymTable) -> (BTreeMap<Stat, f64>, bool) {
    let mut stats = BTreeMap::new();
    let mut clean = true;
    for value in doc.find_all(block, "div.infobox-data-value") {
        let text = doc.clean_text(value);
        let Some((amount, phrase)) = text.split_once(' ') else {
            warn!(target: "liandrys::patch", text, "unreadable item stat");
            clean = false;
            continue;
        };
        let percent = amount.contains('%');
        let Ok(number) = amount.trim_matches(['+', '%']).parse::<f64>() else {
            warn!(target: "liandrys::patch", text, "unreadable item stat");
            clean = false;
            continue;
        };
        let number = if percent { number / 100.0 } else { number };
        let stat = synonyms.resolve(phrase).stat;
        if stat == Stat::Error {
            clean = false;
        }
        *stats.entry(stat).or_insert(0.0) += number;
    }
    (stats, clean)
}

/// Bold title plus description; `"Unique – "` marks unique effects.
fn scrape_item_passive(doc: &Document, node: NodeId) -> Option<ItemPassive> {
    let title_node = doc.find(node, "b")?;
    let title = doc.clean_text(title_node);
    let description = clean_text(&doc.text(node).replacen(&doc.text(title_node), "", 1));
    let (unique, title) = match title.strip_prefix("Unique - ").or_else(|| title.strip_prefix("Unique – ")) {
        Some(rest) => (true, rest.to_string()),
        None => (false, title),
    };
    Some(ItemPassive {
        name: title.trim_end_matches(':').trim().to_string(),
        unique,
        description,
    })
}

pub fn scrape_rune(html: &str, name: &str, tree: Option<String>, synonyms: &SynonymTable) -> Result<Rune, ScrapeError> {
    let doc = Document::parse(html);
    let fail = |reason: &str| ScrapeError::new(EntityKind::Rune, name, reason);
    let content = doc
        .find(doc.root(), "div.mw-parser-output")
        .ok_or_else(|| fail("page content not found"))?;
    let info = doc
        .find(content, "div.infobox-section")
        .ok_or_else(|| fail("rune description not found"))?;

    let mut raw_stats = scrape_info_rows(&doc, content);
    let effects = extract_effects(&doc, content, synonyms);
    Ok(Rune {
        name: name.to_string(),
        tree,
        passive: Passive {
            name: name.to_string(),
            description: clean_text(&doc.text(info).replace("Passive:", "")),
            static_cooldown: raw_stats.remove("cooldown"),
            raw_stats,
            effects: effects.effects,
            buffs: Vec::new(),
        },
    })
}

pub fn scrape_summonerspell(html: &str, name: &str) -> Result<Summonerspell, ScrapeError> {
    let doc = Document::parse(html);
    let fail = |reason: &str| ScrapeError::new(EntityKind::Summonerspell, name, reason);
    let content = doc
        .find(doc.root(), "div.mw-parser-output")
        .ok_or_else(|| fail("page content not found"))?;
    let info = doc
        .find(content, "div.infobox-section")
        .ok_or_else(|| fail("spell description not found"))?;

    let mut raw_stats = scrape_info_rows(&doc, content);
    let seconds = |value: String| value.trim_end_matches("seconds").trim().to_string();
    Ok(Summonerspell {
        name: name.to_string(),
        description: doc.clean_text(info),
        cooldown: raw_stats.remove("cooldown").map(seconds),
        recharge: raw_stats.remove("recharge time").map(seconds),
        raw_stats,
    })
}

/// Label/value rows of the first two-column infobox section.
fn scrape_info_rows(doc: &Document, content: NodeId) -> BTreeMap<String, String> {
    let mut rows = BTreeMap::new();
    let Some(column) = doc.find(content, "div.infobox-section-column") else {
        return rows;
    };
    for row in doc.find_all(column, "div.infobox-data-row") {
        if let (Some(label), Some(value)) = (
            doc.find(row, "div.infobox-data-label"),
            doc.find(row, "div.infobox-data-value"),
        ) {
            let label = doc.clean_text(label).to_lowercase();
            rows.insert(label.trim_end_matches(':').to_string(), doc.clean_text(value));
        }
    }
    rows
}
