//! Scenario selector: turns five control values into a scenario switch
//!
//! Every control shares one handler. Whichever control moved, the handler
//! re-reads all five values, snaps them to the 0.2 grid, derives the
//! scenario key, rebinds every managed data source to that key's column and
//! recomputes the panel titles.
//!
//! A key without a column (or without a national mean) is not an error for
//! the session: the panel keeps what it showed before and a notice is
//! returned alongside the update. A panel switches its column and its title
//! together or not at all, so its map and title always describe the same
//! scenario.

use crate::aggregate::NationalAggregate;
use crate::color::Rgb;
use crate::error::Result;
use crate::format::format_numeral;
use crate::outcome::OutcomeKind;
use crate::plot::Plot;
use crate::scenario::{ScenarioKey, Sector};
use crate::store::ScenarioStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn baseline() -> f64 {
    1.0
}

/// Raw values of the five range controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlValues {
    #[serde(default = "baseline")]
    pub res: f64,
    #[serde(default = "baseline")]
    pub ind: f64,
    #[serde(default = "baseline")]
    pub tra: f64,
    #[serde(default = "baseline")]
    pub agr: f64,
    #[serde(default = "baseline")]
    pub ene: f64,
}

impl Default for ControlValues {
    fn default() -> Self {
        Self { res: 1.0, ind: 1.0, tra: 1.0, agr: 1.0, ene: 1.0 }
    }
}

impl ControlValues {
    /// RES, IND, TRA, AGR, ENE order
    pub fn as_array(&self) -> [f64; 5] {
        [self.res, self.ind, self.tra, self.agr, self.ene]
    }

    pub fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Res => self.res,
            Sector::Ind => self.ind,
            Sector::Tra => self.tra,
            Sector::Agr => self.agr,
            Sector::Ene => self.ene,
        }
    }

    pub fn set(&mut self, sector: Sector, value: f64) {
        match sector {
            Sector::Res => self.res = value,
            Sector::Ind => self.ind = value,
            Sector::Tra => self.tra = value,
            Sector::Agr => self.agr = value,
            Sector::Ene => self.ene = value,
        }
    }

    pub fn key(&self) -> Result<ScenarioKey> {
        ScenarioKey::from_values(self.as_array())
    }

    /// Control positions for a key
    pub fn from_key(key: &ScenarioKey) -> Self {
        let mut values = Self::default();
        for sector in Sector::ALL {
            values.set(sector, key.get(sector).value());
        }
        values
    }
}

/// What one panel shows after a selector event
#[derive(Debug, Clone, Serialize)]
pub struct PanelUpdate {
    pub outcome: OutcomeKind,
    pub source: String,
    pub title: String,
    /// Column actually bound, which lags the requested key when it was missing
    pub bound_key: Option<ScenarioKey>,
    pub colors: Vec<Rgb>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionUpdate {
    pub key: ScenarioKey,
    pub controls: ControlValues,
    pub panels: Vec<PanelUpdate>,
    pub notices: Vec<String>,
}

impl SelectionUpdate {
    pub fn is_complete(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Current control state; lives only as long as the session
#[derive(Debug, Clone, Default)]
pub struct Selector {
    controls: ControlValues,
    key: ScenarioKey,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> ControlValues {
        self.controls
    }

    pub fn key(&self) -> ScenarioKey {
        self.key
    }

    /// Handle a change of any control.
    ///
    /// Non-finite control values fail and leave the selector untouched.
    /// Recoverable misses become notices; any other error is returned.
    pub fn apply(
        &mut self,
        controls: ControlValues,
        store: &mut ScenarioStore,
        plots: &mut [Plot],
        aggregate: &NationalAggregate,
    ) -> Result<SelectionUpdate> {
        let key = controls.key()?;
        debug!(key = %key, "selector event");

        let mut notices = Vec::new();
        let mut panels = Vec::with_capacity(plots.len());

        for plot in plots.iter_mut() {
            let source = store.get_mut(&plot.source)?;

            // Column and title switch together so map and title never disagree
            match (source.require_column(&key), plot.title_for(&key, aggregate)) {
                (Ok(()), Ok(title)) => {
                    source.rebind(key)?;
                    plot.title = title;
                }
                (column, title) => {
                    for e in [column.err(), title.err()].into_iter().flatten() {
                        if !e.is_recoverable() {
                            return Err(e);
                        }
                        warn!(panel = %plot.outcome, "{}", e);
                        notices.push(e.to_string());
                    }
                }
            }

            let values = source.values();
            panels.push(PanelUpdate {
                outcome: plot.outcome,
                source: plot.source.clone(),
                title: plot.title.clone(),
                bound_key: source.active_key(),
                colors: plot.mapper.colors(&values),
                values: values.iter().map(|&v| format_numeral(v)).collect(),
            });
        }

        self.controls = controls;
        self.key = key;

        Ok(SelectionUpdate { key, controls, panels, notices })
    }
}
