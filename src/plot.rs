//! Plot construction: bounds, ticks, color mapping and titles for one panel

use crate::aggregate::NationalAggregate;
use crate::color::ColorMapper;
use crate::error::Result;
use crate::format::{format_numeral, format_rounded};
use crate::outcome::{OutcomeKind, OutcomeSpec, Pollutant};
use crate::scenario::ScenarioKey;
use crate::store::DataSource;
use serde::Serialize;

pub const PLOT_WIDTH: u32 = 600;
pub const PLOT_HEIGHT: u32 = 400;
/// Opacity of region fills
pub const FILL_ALPHA: f64 = 0.7;

/// Everything needed to draw one choropleth panel, minus the data
#[derive(Debug, Clone)]
pub struct Plot {
    pub pollutant: Pollutant,
    pub outcome: OutcomeKind,
    pub spec: OutcomeSpec,
    pub mapper: ColorMapper,
    pub ticks: Vec<f64>,
    pub title: String,
    /// Name of the data source this panel draws
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// One hover row, e.g. `("State", "Beijing")`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
}

/// Build the panel for `source`.
///
/// Fails when the pollutant/outcome pair has no bounds entry or when the
/// national mean for the default scenario is missing.
pub fn create_plot(
    source: &DataSource,
    pollutant: Pollutant,
    outcome: OutcomeKind,
    aggregate: &NationalAggregate,
) -> Result<Plot> {
    let spec = OutcomeSpec::lookup(pollutant, outcome)?;
    let value = aggregate.require_mean(pollutant, outcome, &ScenarioKey::default())?;

    Ok(Plot {
        pollutant,
        outcome,
        spec,
        mapper: ColorMapper::yl_or_rd(spec.low, spec.high),
        ticks: spec.ticks(),
        title: title_text(pollutant, outcome, &spec, value),
        source: source.name().to_string(),
        width: PLOT_WIDTH,
        height: PLOT_HEIGHT,
    })
}

/// `"{variable} from {pollutant} in China = {value} {units}"`
pub fn title_text(pollutant: Pollutant, outcome: OutcomeKind, spec: &OutcomeSpec, value: f64) -> String {
    format!(
        "{} from {} in China = {} {}",
        outcome.label(),
        pollutant.label(),
        format_rounded(value, spec.round_to),
        spec.units
    )
}

impl Plot {
    /// Title for another scenario; `MissingAggregate` if the aggregate lacks it
    pub fn title_for(&self, key: &ScenarioKey, aggregate: &NationalAggregate) -> Result<String> {
        let value = aggregate.require_mean(self.pollutant, self.outcome, key)?;
        Ok(title_text(self.pollutant, self.outcome, &self.spec, value))
    }

    /// Hover value as `0,0` plus units
    pub fn format_value(&self, value: f64) -> String {
        format!("{} {}", format_numeral(value), self.spec.units)
    }

    pub fn tooltip(&self, location: &str, value: f64) -> Vec<TooltipRow> {
        vec![
            TooltipRow { label: "State".to_string(), value: location.to_string() },
            TooltipRow { label: self.outcome.label().to_string(), value: self.format_value(value) },
        ]
    }

    /// Color-bar tick labels
    pub fn tick_labels(&self) -> Vec<String> {
        self.ticks.iter().map(|&t| format_numeral(t)).collect()
    }
}
