//! Pre-computed national statistics per scenario
//!
//! Read from a JSON document nested as
//! pollutant → outcome → statistic → scenario key → value:
//!
//! ```json
//! { "PM2_5_DRY": { "mort": { "mean": { "RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0": 149962.0 } } } }
//! ```
//!
//! Only the `mean` statistic feeds the panel titles. Every statistic present
//! for the current key is listed per panel in the JSON report and `/api/state`.

use crate::error::{Error, Result};
use crate::outcome::{OutcomeKind, Pollutant};
use crate::scenario::ScenarioKey;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const MEAN: &str = "mean";

type RawAggregate = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, Option<f64>>>>>;

#[derive(Debug, Clone, Default)]
pub struct NationalAggregate {
    values: BTreeMap<(Pollutant, OutcomeKind), BTreeMap<String, BTreeMap<ScenarioKey, f64>>>,
}

impl NationalAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let raw: RawAggregate = serde_json::from_str(text).map_err(|source| Error::Json {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut aggregate = Self::new();
        for (pollutant, outcomes) in raw {
            let Ok(pollutant) = pollutant.parse::<Pollutant>() else {
                debug!(pollutant = %pollutant, "skipping unknown pollutant in aggregate");
                continue;
            };
            for (outcome, stats) in outcomes {
                let Ok(outcome) = outcome.parse::<OutcomeKind>() else {
                    debug!(outcome = %outcome, "skipping unknown outcome in aggregate");
                    continue;
                };
                for (statistic, by_key) in stats {
                    for (key, value) in by_key {
                        match (key.parse::<ScenarioKey>(), value) {
                            (Ok(key), Some(value)) => aggregate.insert(pollutant, outcome, &statistic, key, value),
                            _ => debug!(key = %key, "skipping aggregate entry"),
                        }
                    }
                }
            }
        }
        Ok(aggregate)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let aggregate = Self::parse(&text, path)?;
        info!(path = %path.display(), entries = aggregate.len(), "loaded national aggregates");
        Ok(aggregate)
    }

    pub fn insert(&mut self, pollutant: Pollutant, outcome: OutcomeKind, statistic: &str, key: ScenarioKey, value: f64) {
        self.values
            .entry((pollutant, outcome))
            .or_default()
            .entry(statistic.to_string())
            .or_default()
            .insert(key, value);
    }

    pub fn get(&self, pollutant: Pollutant, outcome: OutcomeKind, statistic: &str, key: &ScenarioKey) -> Option<f64> {
        self.values.get(&(pollutant, outcome))?.get(statistic)?.get(key).copied()
    }

    pub fn mean(&self, pollutant: Pollutant, outcome: OutcomeKind, key: &ScenarioKey) -> Option<f64> {
        self.get(pollutant, outcome, MEAN, key)
    }

    /// Like [`mean`](Self::mean) but failing with `MissingAggregate`
    pub fn require_mean(&self, pollutant: Pollutant, outcome: OutcomeKind, key: &ScenarioKey) -> Result<f64> {
        self.mean(pollutant, outcome, key).ok_or_else(|| Error::MissingAggregate {
            pollutant: pollutant.to_string(),
            outcome: outcome.to_string(),
            statistic: MEAN.to_string(),
            key: key.to_string(),
        })
    }

    /// Statistic names available for a pollutant/outcome pair
    pub fn statistics(&self, pollutant: Pollutant, outcome: OutcomeKind) -> Vec<&str> {
        self.values
            .get(&(pollutant, outcome))
            .map(|stats| stats.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of stored values
    pub fn len(&self) -> usize {
        self.values.values().flat_map(|stats| stats.values()).map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
