//! Wiki extraction and tick-based combat simulation for League of Legends
//! champions, items, runes and summoner spells.

pub mod cli;
pub mod config;
pub mod extract;
pub mod formula;
pub mod loader;
pub mod model;
pub mod parallel;
pub mod simulation;
