//! Text-to-formula conversion.
//!
//! Wiki prose and tooltip tables are turned into closed-form arithmetic
//! formulas over a scale variable (`rank`, `level`) and canonical stat tokens
//! (`ad`, `ap`, `bonus_ad`, ...). Formulas stay textual so they can be stored
//! with the entity records; [Expr] parses them for evaluation at combat time.

pub mod expr;
pub mod progression;
pub mod scaling;
pub mod stat;

pub use expr::{BinaryOp, Bindings, Expr};
pub use progression::{
    format_number, parse_linear_progression, parse_table_progression, parse_table_values,
    Table, TableKind, TableProgression, LEVEL_CAP,
};
pub use scaling::{
    parse_freeform_scaling, parse_freeform_scaling_with, parse_stat_value, ScalingParse, StatValue,
};
pub use stat::{
    default_synonyms, resolve_stat_synonym, HpScaling, Stat, StatResolution, SynonymEntry,
    SynonymTable,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("cannot parse formula '{input}' at offset {offset}: {message}")]
    Parse {
        input: String,
        offset: usize,
        message: String,
    },
    #[error("unbound variable '{0}' in formula")]
    UnboundVariable(String),
    #[error("division by zero in formula")]
    DivisionByZero,
}

impl FormulaError {
    pub(crate) fn parse(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            offset,
            message: message.into(),
        }
    }
}

/// Parse and evaluate a formula in one step.
pub fn evaluate(formula: &str, bindings: &dyn Bindings) -> Result<f64, FormulaError> {
    Expr::parse(formula)?.evaluate(bindings)
}
