//! Scenario data store
//!
//! One table per (pollutant, outcome) pair, e.g. `PM2_5_DRY_exposure_mean`.
//! A table holds one row per region (name + multi-polygon geometry) and one
//! value column per scenario key. Tables are loaded once from JSON files of
//! the form:
//!
//! ```json
//! {
//!   "PM2_5_DRY_exposure_mean": {
//!     "location": ["Beijing", "Tianjin"],
//!     "xs": [[[[116.0, 117.1, 116.5]]], [[[117.2, 118.0, 117.6]]]],
//!     "ys": [[[[39.5, 39.6, 40.8]]], [[[38.6, 39.0, 40.2]]]],
//!     "RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0": [61.2, 58.9],
//!     "RES0.0_IND1.0_TRA1.0_AGR1.0_ENE1.0": [49.7, 47.1]
//!   }
//! }
//! ```
//!
//! `xs`/`ys` nest region → polygon → ring → coordinate; the first ring of a
//! polygon is its exterior. Columns whose name is not a scenario key are
//! ignored.
//!
//! # Precision
//!
//! Values are stored as 16-bit brain floats (`bf16`), the same size as the
//! upstream float16 files. IEEE `f16` tops out at 65,504, below the largest
//! provincial mortality counts, so the wider-ranged `bf16` is used instead.
//! It keeps 2-3 significant digits: finer than the 9-color scale can show,
//! but a mortality count of 123,456 reads back within ±256 of the original.
//! Titles use the separately stored national aggregates and are not
//! affected.

use crate::error::{Error, Result};
use crate::outcome::{OutcomeKind, Pollutant};
use crate::scenario::ScenarioKey;
use half::bf16;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// One closed ring of (lon, lat) points
pub type Ring = Vec<[f64; 2]>;
/// Exterior ring followed by any holes
pub type Polygon = Vec<Ring>;

/// Composite table name: `"{pollutant}_{outcome}_mean"`
pub fn table_name(pollutant: Pollutant, outcome: OutcomeKind) -> String {
    format!("{}_{}_mean", pollutant.as_str(), outcome.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub location: String,
    pub geometry: Vec<Polygon>,
}

impl RegionRecord {
    /// Bounding box as `[min_x, min_y, max_x, max_y]`, `None` without points
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut points = self.geometry.iter().flatten().flatten();
        let first = points.next()?;
        let init = [first[0], first[1], first[0], first[1]];
        Some(points.fold(init, |b, p| [b[0].min(p[0]), b[1].min(p[1]), b[2].max(p[0]), b[3].max(p[1])]))
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioTable {
    name: String,
    regions: Vec<RegionRecord>,
    columns: BTreeMap<ScenarioKey, Vec<bf16>>,
}

#[derive(Deserialize)]
struct RawTable {
    location: Vec<String>,
    xs: Vec<Vec<Vec<Vec<f64>>>>,
    ys: Vec<Vec<Vec<Vec<f64>>>>,
    #[serde(flatten)]
    columns: BTreeMap<String, serde_json::Value>,
}

impl ScenarioTable {
    /// Build a table from regions and full-precision columns
    pub fn new(
        name: impl Into<String>,
        regions: Vec<RegionRecord>,
        columns: impl IntoIterator<Item = (ScenarioKey, Vec<f64>)>,
    ) -> Result<Self> {
        let name = name.into();
        let mut stored = BTreeMap::new();
        for (key, values) in columns {
            check_length(&name, &key.to_string(), regions.len(), values.len())?;
            stored.insert(key, values.into_iter().map(bf16::from_f64).collect());
        }
        Ok(Self { name, regions, columns: stored })
    }

    fn from_raw(name: String, raw: RawTable) -> Result<Self> {
        let n = raw.location.len();
        check_length(&name, "xs", n, raw.xs.len())?;
        check_length(&name, "ys", n, raw.ys.len())?;

        let regions = raw
            .location
            .into_iter()
            .zip(raw.xs.into_iter().zip(raw.ys))
            .map(|(location, (xs, ys))| RegionRecord { location, geometry: zip_geometry(xs, ys) })
            .collect();

        let columns: Vec<(String, serde_json::Value)> = raw.columns.into_iter().collect();
        let columns = columns
            .into_par_iter()
            .filter_map(|(column, value)| {
                let key = match column.parse::<ScenarioKey>() {
                    Ok(key) => key,
                    Err(_) => {
                        debug!(table = %name, column = %column, "skipping non-scenario column");
                        return None;
                    }
                };
                Some(convert_column(&name, &column, n, value).map(|values| (key, values)))
            })
            .collect::<Result<BTreeMap<ScenarioKey, Vec<bf16>>>>()?;

        if columns.is_empty() {
            warn!(table = %name, "table has no scenario columns");
        }

        Ok(Self { name, regions, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn column(&self, key: &ScenarioKey) -> Option<&[bf16]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &ScenarioKey) -> bool {
        self.columns.contains_key(key)
    }

    /// Scenario keys present in this table, in key order
    pub fn keys(&self) -> impl Iterator<Item = &ScenarioKey> {
        self.columns.keys()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

fn check_length(table: &str, column: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::ColumnLength {
            table: table.to_string(),
            column: column.to_string(),
            expected,
            found,
        })
    }
}

fn zip_geometry(xs: Vec<Vec<Vec<f64>>>, ys: Vec<Vec<Vec<f64>>>) -> Vec<Polygon> {
    xs.into_iter()
        .zip(ys)
        .map(|(px, py)| {
            px.into_iter()
                .zip(py)
                .map(|(rx, ry)| rx.into_iter().zip(ry).map(|(x, y)| [x, y]).collect())
                .collect()
        })
        .collect()
}

fn convert_column(table: &str, column: &str, expected: usize, value: serde_json::Value) -> Result<Vec<bf16>> {
    let serde_json::Value::Array(items) = value else {
        return Err(Error::InvalidColumn {
            table: table.to_string(),
            column: column.to_string(),
        });
    };
    check_length(table, column, expected, items.len())?;

    // null is the upstream marker for a missing value; anything else non-numeric is suspect
    let odd = items.iter().filter(|v| !v.is_number() && !v.is_null()).count();
    if odd > 0 {
        debug!(table, column, entries = odd, "non-numeric entries read as NaN");
    }
    Ok(items
        .iter()
        .map(|v| bf16::from_f64(v.as_f64().unwrap_or(f64::NAN)))
        .collect())
}

/// Parse a JSON document mapping table names to tables
pub fn parse_tables(text: &str, origin: &Path) -> Result<Vec<ScenarioTable>> {
    let raw: BTreeMap<String, RawTable> = serde_json::from_str(text).map_err(|source| Error::Json {
        path: origin.to_path_buf(),
        source,
    })?;
    raw.into_iter().map(|(name, table)| ScenarioTable::from_raw(name, table)).collect()
}

/// Load every table in a JSON table file
pub fn load_tables(path: &Path) -> Result<Vec<ScenarioTable>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tables = parse_tables(&text, path)?;
    info!(path = %path.display(), tables = tables.len(), "loaded scenario tables");
    Ok(tables)
}

/// A table plus the scenario column currently bound for rendering
#[derive(Debug, Clone)]
pub struct DataSource {
    table: ScenarioTable,
    active: Option<ScenarioKey>,
}

impl DataSource {
    /// Wrap a table, binding `initial` if the table has it
    pub fn new(table: ScenarioTable, initial: ScenarioKey) -> Self {
        let active = if table.contains(&initial) {
            Some(initial)
        } else {
            warn!(table = %table.name(), key = %initial, "initial scenario missing, regions render without values");
            None
        };
        Self { table, active }
    }

    pub fn table(&self) -> &ScenarioTable {
        &self.table
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn active_key(&self) -> Option<ScenarioKey> {
        self.active
    }

    /// Scenario keys this source can be bound to
    pub fn keys(&self) -> impl Iterator<Item = &ScenarioKey> {
        self.table.keys()
    }

    /// Bind a different scenario column.
    ///
    /// When the table has no such column the previous binding is kept and
    /// `MissingScenarioColumn` is returned.
    pub fn rebind(&mut self, key: ScenarioKey) -> Result<()> {
        self.require_column(&key)?;
        self.active = Some(key);
        Ok(())
    }

    /// `MissingScenarioColumn` unless the table has a column for `key`
    pub fn require_column(&self, key: &ScenarioKey) -> Result<()> {
        if self.table.contains(key) {
            Ok(())
        } else {
            Err(Error::MissingScenarioColumn {
                table: self.table.name().to_string(),
                key: key.to_string(),
            })
        }
    }

    /// Values of the bound column, NaN where absent
    pub fn values(&self) -> Vec<f64> {
        match self.active.and_then(|k| self.table.column(&k)) {
            Some(column) => column.iter().map(|v| v.to_f64()).collect(),
            None => vec![f64::NAN; self.table.len()],
        }
    }
}

/// All loaded data sources, addressed by composite table name
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    sources: BTreeMap<String, DataSource>,
}

impl ScenarioStore {
    pub fn from_tables(tables: impl IntoIterator<Item = ScenarioTable>, initial: ScenarioKey) -> Self {
        let sources = tables
            .into_iter()
            .map(|t| (t.name().to_string(), DataSource::new(t, initial)))
            .collect();
        Self { sources }
    }

    pub fn get(&self, name: &str) -> Result<&DataSource> {
        self.sources.get(name).ok_or_else(|| Error::MissingTableKey(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut DataSource> {
        self.sources.get_mut(name).ok_or_else(|| Error::MissingTableKey(name.to_string()))
    }

    pub fn sources(&self) -> impl Iterator<Item = &DataSource> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
