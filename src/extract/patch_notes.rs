//! Patch-notes change sets.
//!
//! A category section starts at the `h3` holding the category anchor and
//! runs over its following siblings: each `dl` names an entity, the `ul`
//! after it lists the changes, and any other element ends the section.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{error, warn};

use crate::extract::markup::{Document, NodeId};
use crate::model::{EntityCategory, EntityChanges, PatchChanges};

const GENERAL: &str = "General";

/// Full patch: every category heading on the page.
pub fn scrape_patch(html: &str) -> PatchChanges {
    let doc = Document::parse(html);
    let content = content_root(&doc);
    let mut changes = PatchChanges::default();

    for entry in section_entries(&doc, content, EntityCategory::Champions.anchor()) {
        let text = doc.clean_text(entry);
        if let Some(name) = text.strip_suffix(" - New Champion") {
            changes.champions.new.push(name.trim().to_string());
            continue;
        }
        let groups = champion_groups(&doc, entry, false);
        changes.champions.changed.insert(text, groups);
    }

    for category in [EntityCategory::Items, EntityCategory::Runes, EntityCategory::Summonerspells] {
        let mut bucket = EntityChanges::default();
        for entry in section_entries(&doc, content, category.anchor()) {
            scrape_entity_entry(&doc, entry, &mut bucket);
        }
        if let Some(slot) = changes.entity_mut(category) {
            *slot = bucket;
        }
    }
    changes
}

fn scrape_entity_entry(doc: &Document, entry: NodeId, bucket: &mut EntityChanges) {
    let text = doc.clean_text(entry);
    if text.contains(" - New ") || text.ends_with(" - New") || text.contains(" - Re-added") {
        let name = text.split(" - ").next().unwrap_or_default();
        bucket.new.push(name.trim().to_string());
    } else if let Some(name) = text.strip_suffix(" - Removed") {
        bucket.deleted.push(name.trim().to_string());
    } else {
        let lines = change_list(doc, entry)
            .map(|list| direct_items(doc, list).map(|li| doc.clean_text(li)).collect())
            .unwrap_or_default();
        bucket.changed.insert(text, lines);
    }
}

/// One hotfix section, found by its dated anchor (`May_2,_2025`).
pub fn scrape_hotfix(html: &str, date: NaiveDate) -> PatchChanges {
    let doc = Document::parse(html);
    let content = content_root(&doc);
    let anchor = date.format("%B %-d, %Y").to_string().replace(' ', "_");
    let mut changes = PatchChanges::default();

    let entries = section_entries(&doc, content, &anchor);
    if entries.is_empty() && !has_anchor(&doc, content, &anchor) {
        error!(target: "liandrys::patch", hotfix = %date, "hotfix not found in patch notes");
        return changes;
    }

    for entry in entries {
        let Some(category) = hotfix_category(&doc, entry) else {
            warn!(target: "liandrys::patch", hotfix = %date, entry = %doc.clean_text(entry), "hotfix entry without entity type");
            continue;
        };
        let name = doc.clean_text(entry);
        match category {
            EntityCategory::Champions => {
                let groups = champion_groups(&doc, entry, true);
                changes.champions.changed.insert(name, groups);
            }
            other => {
                let lines = change_list(&doc, entry)
                    .map(|list| {
                        doc.find_all(list, "li")
                            .into_iter()
                            .map(|li| doc.clean_text(li))
                            .collect()
                    })
                    .unwrap_or_default();
                if let Some(bucket) = changes.entity_mut(other) {
                    bucket.changed.insert(name, lines);
                }
            }
        }
    }
    changes
}

/// Dates listed under the "Hotfixes" table-of-contents entry.
pub fn scrape_hotfix_list(html: &str) -> Vec<NaiveDate> {
    let doc = Document::parse(html);
    let content = content_root(&doc);
    let has_section = doc
        .find_all(content, "h2")
        .into_iter()
        .any(|heading| doc.text(heading).contains("Hotfixes"));
    if !has_section {
        return Vec::new();
    }

    let mut dates = Vec::new();
    for topic in doc.find_all(content, "li.toclevel-1") {
        if !doc.text(topic).contains("Hotfixes") {
            continue;
        }
        for item in doc.find_all(topic, "li") {
            let Some(label) = doc.find(item, "span.toctext") else {
                continue;
            };
            let label = doc.clean_text(label);
            match NaiveDate::parse_from_str(&label, "%B %d, %Y") {
                Ok(date) => dates.push(date),
                Err(err) => warn!(target: "liandrys::patch", label, error = %err, "unreadable hotfix date"),
            }
        }
    }
    dates
}

fn content_root(doc: &Document) -> NodeId {
    doc.find(doc.root(), "div.mw-parser-output").unwrap_or_else(|| doc.root())
}

fn has_anchor(doc: &Document, content: NodeId, anchor: &str) -> bool {
    doc.find(content, &format!("span#{anchor}")).is_some()
}

/// The `dl` entries following the `h3` that holds `span#anchor`.
fn section_entries(doc: &Document, content: NodeId, anchor: &str) -> Vec<NodeId> {
    let Some(heading) = doc
        .find(content, &format!("span#{anchor}"))
        .and_then(|span| doc.ancestor(span, "h3"))
    else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for sibling in doc.next_element_siblings(heading) {
        match doc.tag(sibling) {
            Some("dl") => entries.push(sibling),
            Some("ul") => continue,
            _ => break,
        }
    }
    entries
}

/// The `ul` directly after an entry, if any.
fn change_list(doc: &Document, entry: NodeId) -> Option<NodeId> {
    doc.next_element_sibling(entry)
        .filter(|sibling| doc.tag(*sibling) == Some("ul"))
}

fn direct_items<'a>(doc: &'a Document, list: NodeId) -> impl Iterator<Item = NodeId> + 'a {
    doc.element_children(list).filter(move |child| doc.tag(*child) == Some("li"))
}

/// Champion changes grouped by sub-entity: each top-level item's span is the
/// label ("General" when absent), its nested items are the lines. Hotfix
/// notes use every descendant item.
fn champion_groups(doc: &Document, entry: NodeId, all_descendants: bool) -> BTreeMap<String, Vec<String>> {
    let mut groups = BTreeMap::new();
    let Some(list) = change_list(doc, entry) else {
        return groups;
    };
    for item in direct_items(doc, list) {
        let label = doc
            .find(item, "span")
            .map(|span| doc.clean_text(span))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| GENERAL.to_string());
        let lines: Vec<String> = if all_descendants {
            doc.find_all(item, "li")
        } else {
            doc.find_children(item, "ul")
                .into_iter()
                .flat_map(|nested| direct_items(doc, nested).collect::<Vec<_>>())
                .collect()
        }
        .into_iter()
        .map(|li| doc.clean_text(li))
        .collect();
        groups.entry(label).or_insert_with(Vec::new).extend(lines);
    }
    groups
}

/// Hotfix entries carry their entity type as a data attribute on the label.
fn hotfix_category(doc: &Document, entry: NodeId) -> Option<EntityCategory> {
    let span = doc.find(entry, "dt").and_then(|dt| doc.find(dt, "span"))?;
    if !doc.has_attr(span, "data-param") {
        return None;
    }
    [
        ("data-champion", EntityCategory::Champions),
        ("data-item", EntityCategory::Items),
        ("data-rune", EntityCategory::Runes),
        ("data-spell", EntityCategory::Summonerspells),
    ]
    .into_iter()
    .find(|(attr, _)| doc.has_attr(span, attr))
    .map(|(_, category)| category)
}
