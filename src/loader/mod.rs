//! Patch loading plumbing: who may load, what is queued, and parallel
//! scraping of fetched pages.

pub mod batch;
pub mod coordinator;
pub mod patch_version;

pub use batch::{extract_batch, extract_one, BatchReport, EntityPage, Extracted};
pub use coordinator::{LoadCoordinator, LoadGuard, Todo, TodoKind};
pub use patch_version::{riot_to_wiki_patch, wiki_to_riot_patch, PatchVersionError};

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("a patch load is already running")]
    Busy,
    #[error(transparent)]
    PatchVersion(#[from] PatchVersionError),
    #[error(transparent)]
    Scrape(#[from] crate::extract::ScrapeError),
}
