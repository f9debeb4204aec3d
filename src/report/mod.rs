//! Report generation for a rendered scenario
//!
//! This module provides output formatters for the dashboard's current state:
//!
//! - **HTML**: Both panels as inline SVG with the control positions shown
//! - **JSON**: Titles, bounds, ticks and per-region values for programmatic use
//! - **CSV**: One row per region and panel, for spreadsheets
//! - **SVG**: A single panel (the first one), for embedding elsewhere
//!
//! # Usage
//!
//! ```ignore
//! use aqmap::report;
//!
//! // Automatically picks format based on extension
//! report::generate("scenario.html", &dashboard)?;  // HTML
//! report::generate("scenario.json", &dashboard)?;  // JSON
//! report::generate("scenario.csv", &dashboard)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;
pub mod svg;

use crate::dashboard::{Coverage, Dashboard};
use crate::error::{Error, Result};
use crate::format::format_numeral;
use crate::outcome::OutcomeKind;
use crate::scenario::ScenarioKey;
use crate::selector::ControlValues;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, dashboard: &Dashboard) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let io_err = |source| Error::Io { path: path.to_path_buf(), source };
    let mut file = std::fs::File::create(path).map_err(io_err)?;

    let written = match ext.as_str() {
        "html" | "htm" => html::write(&mut file, dashboard),
        "json" => json::write(&mut file, dashboard),
        "svg" => write_first_panel(&mut file, dashboard),
        _ => csv::write(&mut file, dashboard),
    };
    written.map_err(io_err)?;

    info!(path = %path.display(), key = %dashboard.key(), "report written");
    Ok(())
}

fn write_first_panel<W: Write>(writer: &mut W, dashboard: &Dashboard) -> std::io::Result<()> {
    let panels = dashboard.panels().map_err(to_io_error)?;
    match panels.first() {
        Some((plot, source)) => writer.write_all(svg::panel(plot, source).as_bytes()),
        None => Ok(()),
    }
}

/// Serializable snapshot of the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated: String,
    pub pollutant: String,
    pub key: ScenarioKey,
    pub controls: ControlValues,
    pub panels: Vec<PanelSnapshot>,
    pub coverage: Vec<Coverage>,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub outcome: OutcomeKind,
    pub table: String,
    pub title: String,
    pub units: String,
    pub low: f64,
    pub high: f64,
    pub round_to: i32,
    pub ticks: Vec<f64>,
    pub national_mean: Option<f64>,
    /// Every national statistic present for the current key, `mean` included
    pub statistics: BTreeMap<String, f64>,
    pub bound_key: Option<ScenarioKey>,
    pub regions: Vec<RegionValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionValue {
    pub location: String,
    /// `None` where the column has no value
    pub value: Option<f64>,
    pub formatted: String,
    pub color: String,
}

impl Snapshot {
    pub fn from_dashboard(dashboard: &Dashboard) -> Result<Self> {
        let key = dashboard.key();
        let panels = dashboard
            .panels()?
            .into_iter()
            .map(|(plot, source)| {
                let aggregate = dashboard.aggregate();
                let statistics = aggregate
                    .statistics(plot.pollutant, plot.outcome)
                    .into_iter()
                    .filter_map(|name| {
                        let value = aggregate.get(plot.pollutant, plot.outcome, name, &key)?;
                        Some((name.to_string(), value))
                    })
                    .collect();

                let values = source.values();
                let regions = source
                    .table()
                    .regions()
                    .iter()
                    .zip(&values)
                    .map(|(region, &value)| RegionValue {
                        location: region.location.clone(),
                        value: (!value.is_nan()).then_some(value),
                        formatted: format_numeral(value),
                        color: plot.mapper.color(value).hex(),
                    })
                    .collect();

                PanelSnapshot {
                    outcome: plot.outcome,
                    table: plot.source.clone(),
                    title: plot.title.clone(),
                    units: plot.spec.units.to_string(),
                    low: plot.spec.low,
                    high: plot.spec.high,
                    round_to: plot.spec.round_to,
                    ticks: plot.ticks.clone(),
                    national_mean: aggregate.mean(plot.pollutant, plot.outcome, &key),
                    statistics,
                    bound_key: source.active_key(),
                    regions,
                }
            })
            .collect();

        Ok(Self {
            generated: chrono::Local::now().to_rfc3339(),
            pollutant: dashboard.pollutant().to_string(),
            key,
            controls: dashboard.selector().controls(),
            panels,
            coverage: dashboard.coverage(),
            options: dashboard.options().clone(),
        })
    }
}

pub(crate) fn to_io_error(e: Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
}
