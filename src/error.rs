//! Error types shared by every layer of aqmap
//!
//! Setup failures (missing tables, unsupported combinations, malformed
//! input files) are fatal. Failures raised while handling a selector event
//! are reported as notices and never abort the session.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A composite table name such as `PM2_5_DRY_mort_mean` is not loaded
    #[error("table '{0}' not found in the scenario store")]
    MissingTableKey(String),

    /// No bounds/units entry exists for this pollutant and outcome
    #[error("no color-scale bounds for outcome '{outcome}' with pollutant '{pollutant}'")]
    UnsupportedCombination { pollutant: String, outcome: String },

    /// The derived scenario key has no column in a table
    #[error("scenario '{key}' has no column in table '{table}'")]
    MissingScenarioColumn { table: String, key: String },

    /// The national aggregate has no value for this key
    #[error("no national {statistic} for {pollutant}/{outcome} under scenario '{key}'")]
    MissingAggregate {
        pollutant: String,
        outcome: String,
        statistic: String,
        key: String,
    },

    #[error("invalid scenario key '{0}'")]
    InvalidScenarioKey(String),

    #[error("invalid emission multiplier '{0}'")]
    InvalidMultiplier(String),

    #[error("unknown pollutant '{0}'")]
    UnknownPollutant(String),

    #[error("unknown outcome '{0}'")]
    UnknownOutcome(String),

    /// A column whose length disagrees with the number of regions
    #[error("column '{column}' in table '{table}' has {found} values, expected {expected}")]
    ColumnLength {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' in table '{table}' is not a list of numbers")]
    InvalidColumn { table: String, column: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors the selector downgrades to a notice
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingScenarioColumn { .. } | Error::MissingAggregate { .. }
        )
    }
}
