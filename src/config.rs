//! Runtime settings
//!
//! Defaults match the layout the upstream notebooks write:
//!
//! ```text
//! data/
//!   source_dfs_exposure.json   exposure tables
//!   source_dfs_mort.json       mortality tables
//!   options.json               upstream options (carried, not interpreted)
//!   results_china.json         national aggregates
//!   aqmap.json                 optional overrides for this file
//! ```
//!
//! Settings are read from `--config <file>` or `<data_dir>/aqmap.json` when
//! present; command-line flags are applied on top.

use crate::error::{Error, Result};
use crate::outcome::{OutcomeKind, Pollutant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "aqmap.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Table files, relative to `data_dir`
    pub table_files: Vec<String>,
    pub options_file: Option<String>,
    pub aggregate_file: String,
    /// Pollutant shown by the panels
    pub pollutant: Pollutant,
    /// One panel per outcome, left to right
    pub outcomes: Vec<OutcomeKind>,
    pub port: u16,
    pub report_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            table_files: vec!["source_dfs_exposure.json".to_string(), "source_dfs_mort.json".to_string()],
            options_file: Some("options.json".to_string()),
            aggregate_file: "results_china.json".to_string(),
            pollutant: Pollutant::Pm25,
            outcomes: vec![OutcomeKind::Exposure, OutcomeKind::Mort],
            port: 3001,
            report_dir: PathBuf::from("aqmap-reports"),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings for `data_dir`, honouring an `aqmap.json` inside it
    pub fn discover(data_dir: &Path) -> Result<Self> {
        let candidate = data_dir.join(CONFIG_FILE_NAME);
        let mut settings = if candidate.is_file() {
            debug!(path = %candidate.display(), "reading settings");
            Self::from_file(&candidate)?
        } else {
            Self::default()
        };
        settings.data_dir = data_dir.to_path_buf();
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_files.is_empty() {
            return Err(Error::Config("no table files configured".to_string()));
        }
        if self.outcomes.is_empty() {
            return Err(Error::Config("no outcomes configured".to_string()));
        }
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if self.outcomes[..i].contains(outcome) {
                return Err(Error::Config(format!("outcome '{}' listed twice", outcome)));
            }
        }
        Ok(())
    }

    pub fn table_paths(&self) -> Vec<PathBuf> {
        self.table_files.iter().map(|f| self.data_dir.join(f)).collect()
    }

    pub fn options_path(&self) -> Option<PathBuf> {
        self.options_file.as_ref().map(|f| self.data_dir.join(f))
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.data_dir.join(&self.aggregate_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pollutant, Pollutant::Pm25);
        assert_eq!(settings.outcomes, vec![OutcomeKind::Exposure, OutcomeKind::Mort]);
        assert_eq!(settings.port, 3001);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.aggregate_path(), PathBuf::from("data/results_china.json"));
        assert_eq!(settings.table_paths()[1], PathBuf::from("data/source_dfs_mort.json"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"pollutant": "o3_6mDM8h", "outcomes": ["exposure", "dalys_rate"]}"#).unwrap();
        assert_eq!(settings.pollutant, Pollutant::O3);
        assert_eq!(settings.outcomes, vec![OutcomeKind::Exposure, OutcomeKind::DalysRate]);
        assert_eq!(settings.aggregate_file, "results_china.json");
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicate_outcomes() {
        let mut settings = Settings { outcomes: vec![], ..Settings::default() };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
        settings.outcomes = vec![OutcomeKind::Mort, OutcomeKind::Mort];
        assert!(settings.validate().is_err());
        settings.outcomes = vec![OutcomeKind::Mort];
        settings.table_files.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = std::env::temp_dir().join("aqmap-config-test-none");
        let settings = Settings::discover(&dir).unwrap();
        assert_eq!(settings.data_dir, dir);
        assert_eq!(settings.table_files.len(), 2);
    }

    #[test]
    fn test_discover_reads_config_file() {
        let dir = std::env::temp_dir().join(format!("aqmap-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), r#"{"port": 8080, "options_file": null}"#).unwrap();

        let settings = Settings::discover(&dir).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.options_path(), None);
        assert_eq!(settings.data_dir, dir);

        std::fs::remove_dir_all(&dir).ok();
    }
}
