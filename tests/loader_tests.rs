use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use liandrys::extract::EntityKind;
use liandrys::formula::{Stat, SynonymTable};
use liandrys::loader::{
    extract_batch, riot_to_wiki_patch, wiki_to_riot_patch, EntityPage, Extracted, LoadCoordinator,
    LoaderError, Todo, TodoKind,
};
use liandrys::parallel::WorkerPool;

fn item_page(name: &str, stat_line: &str) -> EntityPage {
    let html = format!(
        r#"<div class="mw-parser-output"><div class="infobox">
            <div class="infobox-header">Stats</div>
            <div class="infobox-section"><div class="infobox-section-stacked">
              <div class="infobox-data-value">{stat_line}</div>
            </div></div>
          </div></div>"#
    );
    EntityPage::new(EntityKind::Item, name, html)
}

#[test]
fn only_one_load_runs_at_a_time() {
    let coordinator = Arc::new(LoadCoordinator::new());
    let guard = coordinator.try_begin().unwrap();

    let contender = Arc::clone(&coordinator);
    let busy = thread::spawn(move || matches!(contender.try_begin(), Err(LoaderError::Busy)))
        .join()
        .unwrap();
    assert!(busy);

    drop(guard);
    let contender = Arc::clone(&coordinator);
    let acquired = thread::spawn(move || contender.try_begin().is_ok()).join().unwrap();
    assert!(acquired);
}

#[test]
fn work_queued_during_a_load_is_drained_in_order() {
    let coordinator = LoadCoordinator::new();
    let guard = coordinator.try_begin().unwrap();
    let hotfix = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
    coordinator.enqueue(Todo::patch("15.8.1"));
    coordinator.enqueue(Todo::hotfix("15.8.1", hotfix));
    assert_eq!(coordinator.pending(), 2);

    let kinds: Vec<TodoKind> = std::iter::from_fn(|| guard.next_todo()).map(|todo| todo.kind).collect();
    assert_eq!(kinds, vec![TodoKind::Patch, TodoKind::Hotfix]);
    assert!(guard.next_todo().is_none());
}

#[test]
fn patch_versions_convert_both_ways() {
    assert_eq!(riot_to_wiki_patch("15.7.1").unwrap(), "V25.07");
    assert_eq!(wiki_to_riot_patch("V25.07").unwrap(), "15.7.1");
    assert_eq!(wiki_to_riot_patch("v14.10").unwrap(), "14.10.1");
    assert_eq!(wiki_to_riot_patch("V25.S1.3").unwrap(), "15.3.1");

    let err = wiki_to_riot_patch("25.07").unwrap_err();
    assert!(LoaderError::from(err).to_string().contains("25.07"));
}

#[test]
fn batch_keeps_order_and_isolates_failures() {
    let mut pages = vec![
        item_page("Long Sword", "+10 attack damage"),
        item_page("Amplifying Tome", "+20 ability power"),
        EntityPage::new(EntityKind::Rune, "Broken", "<div class=\"mw-parser-output\"></div>"),
        item_page("Cloth Armor", "+15 armor"),
    ];
    pages.push(EntityPage::new(EntityKind::Champion, "Nameless", "<div></div>"));

    let report = extract_batch(&WorkerPool::with_workers(3), &pages, &SynonymTable::builtin());

    let names: Vec<&str> = report.extracted.iter().map(Extracted::name).collect();
    assert_eq!(names, vec!["Long Sword", "Amplifying Tome", "Cloth Armor"]);
    match &report.extracted[1] {
        Extracted::Item(item) => assert_eq!(item.stats.get(&Stat::Ap), Some(&20.0)),
        other => panic!("expected an item, got {other:?}"),
    }

    let failed: Vec<(EntityKind, &str)> = report
        .failures
        .iter()
        .map(|failure| (failure.entity, failure.name.as_str()))
        .collect();
    assert_eq!(failed, vec![(EntityKind::Rune, "Broken"), (EntityKind::Champion, "Nameless")]);
}
