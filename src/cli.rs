use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::extract::{scrape_hotfix, scrape_hotfix_list, scrape_patch, EntityKind};
use crate::formula::{parse_freeform_scaling_with, SynonymTable};
use crate::loader::{extract_batch, riot_to_wiki_patch, wiki_to_riot_patch, EntityPage};
use crate::model::{Actor, Champion, ChampionMeta, Item};
use crate::parallel::WorkerPool;
use crate::simulation::{Action, Character, Ranks, Simulation, SimulationConfig};

const USAGE: &str = "usage: liandrys <simulate|formula|extract|patch|patch-version>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Formula,
    Extract,
    Patch,
    PatchVersion,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("formula") => Some(Command::Formula),
        Some("extract") => Some(Command::Extract),
        Some("patch") => Some(Command::Patch),
        Some("patch-version") => Some(Command::PatchVersion),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 1;
        }
    };
    config.init_tracing();

    match command {
        Command::Simulate => handle_simulate(args, &config),
        Command::Formula => handle_formula(args, &config),
        Command::Extract => handle_extract(args, &config),
        Command::Patch => handle_patch(args),
        Command::PatchVersion => handle_patch_version(args),
    }
}

/// One side of a simulation scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Fighter {
    pub champion: Champion,
    #[serde(default = "level_one")]
    pub level: u32,
    #[serde(default)]
    pub ranks: Ranks,
    #[serde(default)]
    pub items: Vec<Item>,
}

fn level_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub blue: Fighter,
    pub red: Fighter,
    pub actions: Vec<Action>,
    /// Falls back to `LIANDRYS_DISTANCE` when absent.
    #[serde(default)]
    pub config: Option<SimulationConfig>,
}

/// Entry of an extraction manifest; `path` is relative to the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub kind: EntityKind,
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub meta: Option<ChampionMeta>,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct VersionOutput {
    riot: String,
    wiki: String,
}

/// Parse YAML or JSON by file extension.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(|err| format!("failed to parse {}: {err}", path.display()))
    } else {
        serde_yaml::from_str(&raw).map_err(|err| format!("failed to parse {}: {err}", path.display()))
    }
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String], config: &Config) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: liandrys simulate <scenario.yaml|scenario.json> [--table]");
        return 2;
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let scenario: Scenario = match read_document(Path::new(path)) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let sim_config = scenario.config.unwrap_or(SimulationConfig {
        distance: config.distance,
        ..SimulationConfig::default()
    });
    let side = |actor: Actor, fighter: Fighter| {
        Character::new(actor, fighter.champion, fighter.level, fighter.ranks, fighter.items)
    };
    let mut simulation = Simulation::new(
        side(Actor::Blue, scenario.blue),
        side(Actor::Red, scenario.red),
        sim_config,
    );

    let result = match simulation.do_combo(&scenario.actions) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    info!(target: "liandrys::simulation", total_damage = result.total_damage, elapsed_ticks = result.elapsed_ticks, "combo finished");

    if as_table {
        println!("elapsed_ticks\ttotal_damage\tevent_count");
        println!("{}\t{:.6}\t{}", result.elapsed_ticks, result.total_damage, result.events.len());
        return 0;
    }
    print_json(&result, "simulation result")
}

fn synonyms(config: &Config) -> Option<SynonymTable> {
    match config.synonym_table() {
        Ok(table) => Some(table),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

fn handle_formula(args: &[String], config: &Config) -> i32 {
    let Some(text) = args.get(2) else {
        eprintln!("usage: liandrys formula <text> [rank|level]");
        return 2;
    };
    let scale = args.get(3).map(String::as_str).unwrap_or("rank");
    let Some(table) = synonyms(config) else {
        return 1;
    };
    print_json(&parse_freeform_scaling_with(text, scale, &table), "formula")
}

fn handle_extract(args: &[String], config: &Config) -> i32 {
    let Some(manifest_path) = args.get(2).map(Path::new) else {
        eprintln!("usage: liandrys extract <manifest.yaml|manifest.json>");
        return 2;
    };
    let entries: Vec<ManifestEntry> = match read_document(manifest_path) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut pages = Vec::with_capacity(entries.len());
    for entry in entries {
        let page_path = base.join(&entry.path);
        let html = match fs::read_to_string(&page_path) {
            Ok(html) => html,
            Err(err) => {
                eprintln!("failed to read {}: {err}", page_path.display());
                return 1;
            }
        };
        pages.push(EntityPage {
            kind: entry.kind,
            name: entry.name,
            html,
            meta: entry.meta,
            tag: entry.tag,
        });
    }
    let Some(table) = synonyms(config) else {
        return 1;
    };

    let report = extract_batch(&WorkerPool::with_workers(config.workers), &pages, &table);
    let status = print_json(&report, "extraction report");
    if status == 0 && !report.failures.is_empty() {
        eprintln!("{} of {} page(s) failed", report.failures.len(), pages.len());
        return 1;
    }
    status
}

fn handle_patch(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: liandrys patch <notes.html> [YYYY-MM-DD|--hotfixes]");
        return 2;
    };
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(err) => {
            eprintln!("failed to read {path}: {err}");
            return 1;
        }
    };

    match args.get(3).map(String::as_str) {
        None => print_json(&scrape_patch(&html), "patch changes"),
        Some("--hotfixes") => {
            let dates: Vec<String> = scrape_hotfix_list(&html).iter().map(ToString::to_string).collect();
            print_json(&dates, "hotfix list")
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => print_json(&scrape_hotfix(&html, date), "hotfix changes"),
            Err(_) => {
                eprintln!("invalid hotfix date '{raw}', expected YYYY-MM-DD");
                2
            }
        },
    }
}

fn handle_patch_version(args: &[String]) -> i32 {
    let (Some(kind), Some(value)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: liandrys patch-version <riot|wiki> <version>");
        return 2;
    };
    let converted = match kind.as_str() {
        "riot" => riot_to_wiki_patch(value).map(|wiki| VersionOutput {
            riot: value.clone(),
            wiki,
        }),
        "wiki" => wiki_to_riot_patch(value).map(|riot| VersionOutput {
            riot,
            wiki: value.clone(),
        }),
        other => {
            eprintln!("unknown patch kind '{other}', expected riot or wiki");
            return 2;
        }
    };
    match converted {
        Ok(output) => print_json(&output, "patch version"),
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["liandrys", "simulate"])), Some(Command::Simulate));
        assert_eq!(parse_command(&args(&["liandrys", "patch-version"])), Some(Command::PatchVersion));
        assert_eq!(parse_command(&args(&["liandrys", "serve"])), None);
        assert_eq!(parse_command(&args(&["liandrys"])), None);
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        assert_eq!(run_with_args(&args(&["liandrys", "formula"])), 2);
        assert_eq!(run_with_args(&args(&["liandrys", "patch-version", "riot"])), 2);
        assert_eq!(run_with_args(&args(&["liandrys", "patch-version", "steam", "1.0"])), 2);
    }

    #[test]
    fn scenario_defaults_fill_level_and_ranks() {
        let yaml = r#"
blue:
  champion: {name: Annie, q: {name: Disintegrate}, w: {name: Incinerate}, e: {name: Molten Shield}, r: {name: Summon Tibbers}}
red:
  champion: {name: Garen, q: {name: Decisive Strike}, w: {name: Courage}, e: {name: Judgment}, r: {name: Demacian Justice}}
  level: 6
actions:
  - action_type: aa
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.blue.level, 1);
        assert_eq!(scenario.red.level, 6);
        assert_eq!(scenario.blue.ranks, Ranks::default());
        assert_eq!(scenario.actions[0].actor, Actor::Blue);
        assert!(scenario.config.is_none());
    }
}
