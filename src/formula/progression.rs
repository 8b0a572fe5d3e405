//! Numeric progressions by rank or level.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Highest champion level; level tables are expanded up to here.
pub const LEVEL_CAP: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    ByRank,
    ByLevel,
    Constant,
    Error,
}

/// Piecewise progression as scraped, kept when no closed form exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub kind: TableKind,
    pub top: Vec<f64>,
    pub values: Vec<f64>,
}

impl Table {
    fn error() -> Self {
        Self {
            kind: TableKind::Error,
            top: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Value at `x`, holding each breakpoint until the next one.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        let first = *self.values.first()?;
        Some(
            self.top
                .iter()
                .zip(&self.values)
                .take_while(|(top, _)| **top <= x)
                .last()
                .map_or(first, |(_, value)| *value),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableProgression {
    /// `None` when the table cannot be linearised.
    pub formula: Option<String>,
    pub table: Table,
}

/// Render a number the way formulas carry it: always with a fractional part,
/// shortest round-trip digits.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0.0"
        return "0.0".to_string();
    }
    format!("{value:?}")
}

/// Closed form for values evenly spaced over `scale = 1, 2, ...`.
pub fn parse_linear_progression(values: &[f64], scale: &str) -> Option<String> {
    match values {
        [] => None,
        [single] => Some(format_number(*single)),
        [first, .., last] => {
            let step = (last - first) / (values.len() - 1) as f64;
            Some(format!(
                "{} + ({scale} - 1) * {}",
                format_number(*first),
                format_number(step)
            ))
        }
    }
}

/// Whether consecutive differences all match the overall step.
///
/// Wiki values are rounded to two decimals, so the tolerance is 1% of the
/// step with a 0.01 floor.
pub fn is_linear(values: &[f64]) -> bool {
    if values.len() < 3 {
        return true;
    }
    let step = (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64;
    let tolerance = (step.abs() * 0.01).max(0.01) + 1e-9;
    values
        .windows(2)
        .all(|pair| ((pair[1] - pair[0]) - step).abs() <= tolerance)
}

/// Parse a `;`-separated value list from a tooltip data attribute.
pub fn parse_table_values(raw: &str) -> Option<Vec<f64>> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect()
}

/// Closed form for a tooltip table.
///
/// Without `top` the bottom values are one per unit of `scale` and the
/// formula steps every unit. With `top` the values hold from each breakpoint
/// to the next; the table is expanded per level and the formula uses floor
/// division so it reproduces the buckets.
pub fn parse_table_progression(bottom: &[f64], top: &[f64], scale: &str) -> TableProgression {
    let kind = if scale == "level" {
        TableKind::ByLevel
    } else {
        TableKind::ByRank
    };

    if bottom.is_empty() {
        warn!(target: "liandrys::patch", "empty table");
        return TableProgression {
            formula: None,
            table: Table::error(),
        };
    }

    if bottom.iter().all(|value| *value == bottom[0]) {
        return TableProgression {
            formula: Some(format_number(bottom[0])),
            table: Table {
                kind: TableKind::Constant,
                top: vec![1.0],
                values: vec![bottom[0]],
            },
        };
    }

    if top.is_empty() {
        let table = Table {
            kind,
            top: (1..=bottom.len()).map(|i| i as f64).collect(),
            values: bottom.to_vec(),
        };
        if !is_linear(bottom) {
            warn!(target: "liandrys::patch", ?bottom, "table is not linear");
            return TableProgression {
                formula: None,
                table,
            };
        }
        let step = (bottom[bottom.len() - 1] - bottom[0]) / (bottom.len() - 1) as f64;
        return TableProgression {
            formula: Some(format!(
                "{} + (({scale} - 1) // 1.0) * {}",
                format_number(bottom[0]),
                format_number(step)
            )),
            table,
        };
    }

    if top.len() != bottom.len() || top.windows(2).any(|pair| pair[1] < pair[0]) {
        warn!(target: "liandrys::patch", ?bottom, ?top, "malformed table breakpoints");
        return TableProgression {
            formula: None,
            table: Table {
                kind: TableKind::Error,
                top: top.to_vec(),
                values: bottom.to_vec(),
            },
        };
    }

    let sparse = Table {
        kind,
        top: top.to_vec(),
        values: bottom.to_vec(),
    };
    let last_unit = (top[top.len() - 1].ceil() as u32).max(LEVEL_CAP);
    let dense_top: Vec<f64> = (1..=last_unit).map(f64::from).collect();
    let dense_values: Vec<f64> = dense_top
        .iter()
        .filter_map(|x| sparse.value_at(*x))
        .collect();
    let table = Table {
        kind,
        top: dense_top,
        values: dense_values,
    };

    if !is_linear(top) || !is_linear(bottom) {
        warn!(target: "liandrys::patch", ?bottom, ?top, "table breakpoints are not linear");
        return TableProgression {
            formula: None,
            table,
        };
    }

    let top_step = (top[top.len() - 1] - top[0]) / (top.len() - 1) as f64;
    let value_step = (bottom[bottom.len() - 1] - bottom[0]) / (bottom.len() - 1) as f64;
    if top_step <= 0.0 {
        return TableProgression {
            formula: None,
            table,
        };
    }
    TableProgression {
        formula: Some(format!(
            "{} + (({scale} - {}) // {}) * {}",
            format_number(bottom[0]),
            format_number(top[0]),
            format_number(top_step),
            format_number(value_step)
        )),
        table,
    }
}
