//! Parallel extraction of downloaded wiki pages.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::extract::{scrape_champion, scrape_item, scrape_rune, scrape_summonerspell, EntityKind, ScrapeError};
use crate::formula::SynonymTable;
use crate::model::{Champion, ChampionMeta, Item, Rune, Summonerspell};
use crate::parallel::WorkerPool;

/// One fetched page waiting to be scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPage {
    pub kind: EntityKind,
    pub name: String,
    pub html: String,
    /// Required for champions.
    #[serde(default)]
    pub meta: Option<ChampionMeta>,
    /// Item id or rune tree, depending on `kind`.
    #[serde(default)]
    pub tag: Option<String>,
}

impl EntityPage {
    pub fn new(kind: EntityKind, name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            html: html.into(),
            meta: None,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Extracted {
    Champion(Box<Champion>),
    Item(Item),
    Rune(Rune),
    Summonerspell(Summonerspell),
}

impl Extracted {
    pub fn name(&self) -> &str {
        match self {
            Self::Champion(champion) => &champion.name,
            Self::Item(item) => &item.name,
            Self::Rune(rune) => &rune.name,
            Self::Summonerspell(spell) => &spell.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub extracted: Vec<Extracted>,
    pub failures: Vec<ScrapeError>,
}

pub fn extract_one(page: &EntityPage, synonyms: &SynonymTable) -> Result<Extracted, ScrapeError> {
    match page.kind {
        EntityKind::Champion => {
            let meta = page
                .meta
                .as_ref()
                .ok_or_else(|| ScrapeError::new(EntityKind::Champion, &page.name, "missing champion metadata"))?;
            scrape_champion(&page.html, meta, synonyms).map(|champion| Extracted::Champion(Box::new(champion)))
        }
        EntityKind::Item => scrape_item(&page.html, &page.name, page.tag.clone(), synonyms).map(Extracted::Item),
        EntityKind::Rune => scrape_rune(&page.html, &page.name, page.tag.clone(), synonyms).map(Extracted::Rune),
        EntityKind::Summonerspell => scrape_summonerspell(&page.html, &page.name).map(Extracted::Summonerspell),
    }
}

/// Scrape every page on `pool`. Output keeps the input order; a failed page
/// is reported and skipped without stopping the rest.
pub fn extract_batch(pool: &WorkerPool, pages: &[EntityPage], synonyms: &SynonymTable) -> BatchReport {
    let results: Vec<Result<Extracted, ScrapeError>> =
        pool.install(|| pages.par_iter().map(|page| extract_one(page, synonyms)).collect());

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(extracted) => {
                debug!(target: "liandrys::load", name = extracted.name(), "extracted");
                report.extracted.push(extracted);
            }
            Err(err) => {
                error!(target: "liandrys::load", entity = %err.entity, name = %err.name, "{err}");
                report.failures.push(err);
            }
        }
    }
    report
}
