//! The loaded session: data store, national aggregates, one plot per
//! outcome for a fixed pollutant, and the scenario selector driving them.

use crate::aggregate::NationalAggregate;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::outcome::{OutcomeKind, Pollutant};
use crate::plot::{create_plot, Plot};
use crate::scenario::{ScenarioKey, KEY_COUNT};
use crate::selector::{ControlValues, SelectionUpdate, Selector};
use crate::store::{self, table_name, DataSource, ScenarioStore};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pollutant: Pollutant,
    store: ScenarioStore,
    aggregate: NationalAggregate,
    options: serde_json::Value,
    plots: Vec<Plot>,
    selector: Selector,
}

/// Scenario-key coverage of one table
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub table: String,
    pub regions: usize,
    pub present: usize,
    pub possible: usize,
    pub has_default: bool,
    /// Single-sector variants of the default scenario the table lacks
    pub missing_variants: Vec<ScenarioKey>,
}

impl Coverage {
    pub fn percent(&self) -> f64 {
        self.present as f64 / self.possible as f64 * 100.0
    }
}

impl Dashboard {
    /// Create one plot per outcome for `pollutant`.
    ///
    /// A missing table or a missing default-scenario mean aborts setup.
    pub fn new(
        store: ScenarioStore,
        aggregate: NationalAggregate,
        options: serde_json::Value,
        pollutant: Pollutant,
        outcomes: &[OutcomeKind],
    ) -> Result<Self> {
        let plots = outcomes
            .iter()
            .map(|&outcome| {
                let source = store.get(&table_name(pollutant, outcome))?;
                create_plot(source, pollutant, outcome, &aggregate)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pollutant,
            store,
            aggregate,
            options,
            plots,
            selector: Selector::new(),
        })
    }

    /// Load every input named by `settings`
    pub fn load(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let started = Instant::now();

        let mut tables = Vec::new();
        for path in settings.table_paths() {
            tables.extend(store::load_tables(&path)?);
        }
        let store = ScenarioStore::from_tables(tables, ScenarioKey::default());
        let aggregate = NationalAggregate::load(&settings.aggregate_path())?;
        let options = match settings.options_path() {
            Some(path) => load_options(&path)?,
            None => serde_json::Value::Null,
        };

        let dashboard = Self::new(store, aggregate, options, settings.pollutant, &settings.outcomes)?;
        info!(
            tables = dashboard.store.len(),
            panels = dashboard.plots.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard ready"
        );
        Ok(dashboard)
    }

    /// Run a selector event against every panel
    pub fn apply(&mut self, controls: ControlValues) -> Result<SelectionUpdate> {
        self.selector.apply(controls, &mut self.store, &mut self.plots, &self.aggregate)
    }

    pub fn select_key(&mut self, key: &ScenarioKey) -> Result<SelectionUpdate> {
        self.apply(ControlValues::from_key(key))
    }

    pub fn pollutant(&self) -> Pollutant {
        self.pollutant
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn aggregate(&self) -> &NationalAggregate {
        &self.aggregate
    }

    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn key(&self) -> ScenarioKey {
        self.selector.key()
    }

    /// Plots paired with the data source each one draws
    pub fn panels(&self) -> Result<Vec<(&Plot, &DataSource)>> {
        self.plots
            .iter()
            .map(|plot| Ok((plot, self.store.get(&plot.source)?)))
            .collect()
    }

    pub fn plot(&self, outcome: OutcomeKind) -> Result<(&Plot, &DataSource)> {
        let plot = self
            .plots
            .iter()
            .find(|p| p.outcome == outcome)
            .ok_or_else(|| Error::MissingTableKey(table_name(self.pollutant, outcome)))?;
        Ok((plot, self.store.get(&plot.source)?))
    }

    /// Scenario-key coverage of every loaded table
    pub fn coverage(&self) -> Vec<Coverage> {
        let variants: Vec<ScenarioKey> = ScenarioKey::single_sector_variants().collect();
        self.store
            .sources()
            .map(|source| {
                let table = source.table();
                Coverage {
                    table: table.name().to_string(),
                    regions: table.len(),
                    present: table.column_count(),
                    possible: KEY_COUNT,
                    has_default: table.contains(&ScenarioKey::default()),
                    missing_variants: variants.iter().filter(|k| !table.contains(k)).copied().collect(),
                }
            })
            .collect()
    }
}

fn load_options(path: &std::path::Path) -> Result<serde_json::Value> {
    if !path.is_file() {
        warn!(path = %path.display(), "options file not found, continuing without it");
        return Ok(serde_json::Value::Null);
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
