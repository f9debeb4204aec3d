//! Shared fixtures for unit tests: three provinces, two PM2.5 tables and
//! their national means.

use crate::aggregate::NationalAggregate;
use crate::dashboard::Dashboard;
use crate::outcome::{OutcomeKind, Pollutant};
use crate::scenario::ScenarioKey;
use crate::store::{parse_tables, ScenarioStore};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn res06() -> ScenarioKey {
    ScenarioKey::from_values([0.6, 1.0, 1.0, 1.0, 1.0]).unwrap()
}

pub fn res04() -> ScenarioKey {
    ScenarioKey::from_values([0.4, 1.0, 1.0, 1.0, 1.0]).unwrap()
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> (serde_json::Value, serde_json::Value) {
    (json!([x0, x1, x1, x0]), json!([y0, y0, y1, y1]))
}

fn table(values: [(ScenarioKey, [f64; 3]); 3]) -> serde_json::Value {
    let (bj_x, bj_y) = square(116.0, 39.0, 117.0, 40.0);
    let (tj_x, tj_y) = square(117.0, 38.5, 118.0, 39.5);
    let (hole_x, hole_y) = square(117.4, 38.8, 117.6, 39.0);
    let (hb_x, hb_y) = square(114.0, 36.0, 116.0, 42.0);

    let mut table = json!({
        "location": ["Beijing", "Tianjin", "Hebei"],
        "xs": [[[bj_x]], [[tj_x, hole_x]], [[hb_x]]],
        "ys": [[[bj_y]], [[tj_y, hole_y]], [[hb_y]]],
        "scenario_variable": [0.0, 0.0, 0.0]
    });
    for (key, column) in values {
        table[key.to_string()] = json!(column);
    }
    table
}

pub fn exposure_tables() -> serde_json::Value {
    json!({
        "PM2_5_DRY_exposure_mean": table([
            (ScenarioKey::default(), [61.25, 58.5, 40.0]),
            (res06(), [50.0, 48.0, 32.0]),
            (res04(), [45.0, 44.0, 30.0]),
        ])
    })
}

pub fn mort_tables() -> serde_json::Value {
    json!({
        "PM2_5_DRY_mort_mean": table([
            (ScenarioKey::default(), [12_288.0, 8_192.0, 30_720.0]),
            (res06(), [10_240.0, 7_168.0, 26_624.0]),
            (res04(), [9_216.0, 6_144.0, 24_576.0]),
        ])
    })
}

pub fn aggregate_json() -> serde_json::Value {
    let default = ScenarioKey::default().to_string();
    let res06 = res06().to_string();
    json!({
        "PM2_5_DRY": {
            "exposure": {
                "mean": { (default.clone()): 23.46, (res06.clone()): 20.04 },
                "std": { (default.clone()): 2.5 }
            },
            "mort": { "mean": { (default): 149_962.0, (res06): 131_234.0 } }
        }
    })
}

pub fn store_and_aggregate() -> (ScenarioStore, NationalAggregate) {
    let origin = Path::new("fixture.json");
    let mut tables = parse_tables(&exposure_tables().to_string(), origin).unwrap();
    tables.extend(parse_tables(&mort_tables().to_string(), origin).unwrap());
    let store = ScenarioStore::from_tables(tables, ScenarioKey::default());
    let aggregate = NationalAggregate::parse(&aggregate_json().to_string(), origin).unwrap();
    (store, aggregate)
}

pub fn dashboard() -> Dashboard {
    let (store, aggregate) = store_and_aggregate();
    Dashboard::new(
        store,
        aggregate,
        json!({"emulator": "gp"}),
        Pollutant::Pm25,
        &[OutcomeKind::Exposure, OutcomeKind::Mort],
    )
    .unwrap()
}

/// Write the fixture files into a fresh temp directory
pub fn write_data_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("aqmap-test-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("source_dfs_exposure.json"), exposure_tables().to_string()).unwrap();
    std::fs::write(dir.join("source_dfs_mort.json"), mort_tables().to_string()).unwrap();
    std::fs::write(dir.join("options.json"), json!({"emulator": "gp"}).to_string()).unwrap();
    std::fs::write(dir.join("results_china.json"), aggregate_json().to_string()).unwrap();
    dir
}
