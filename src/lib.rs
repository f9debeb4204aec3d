//! aqmap - Explore air quality under emission scenarios
//!
//! aqmap shows province-level choropleth maps of China for one pollutant
//! (PM₂.₅ or ozone): population-weighted exposure next to attributable
//! mortality. Five controls scale the residential, industrial, transport,
//! agricultural and power-generation emissions; every combination of their
//! positions names a precomputed scenario whose columns drive the maps.
//!
//! # Overview
//!
//! Scenario outputs come from an upstream emulator and arrive as tables with
//! one column per scenario key (`RES1.0_IND0.6_TRA1.0_AGR1.0_ENE1.0`), plus a
//! table of national means used in the panel titles. Nothing is computed at
//! view time beyond picking the right column and coloring it.
//!
//! # Quick Start
//!
//! ```no_run
//! use aqmap::{ControlValues, Dashboard, Settings};
//!
//! let settings = Settings::discover("data".as_ref())?;
//! let mut dashboard = Dashboard::load(&settings)?;
//!
//! // Cut residential emissions to 60%
//! let update = dashboard.apply(ControlValues { res: 0.6, ..ControlValues::default() })?;
//! for panel in &update.panels {
//!     println!("{}", panel.title);
//! }
//! for notice in &update.notices {
//!     eprintln!("{}", notice);
//! }
//!
//! aqmap::report::generate("scenario.html", &dashboard)?;
//! # Ok::<(), aqmap::Error>(())
//! ```
//!
//! # Missing scenarios
//!
//! Upstream tables rarely hold all 32,768 keys. When the selected key has no
//! column (or no national mean), the panel keeps what it showed before and
//! the update carries a notice instead of failing.
//!
//! # Modules
//!
//! - [`scenario`]: Sectors, multipliers and scenario keys
//! - [`store`]: Region tables and the rebindable data sources
//! - [`aggregate`]: National means per scenario
//! - [`plot`]: Bounds, colors and titles for one panel
//! - [`selector`]: Control events to scenario switches
//! - [`report`]: Output formatters (HTML, JSON, CSV, SVG)
//! - [`serve`]: Local web UI with live controls

pub mod aggregate;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod outcome;
pub mod plot;
pub mod report;
pub mod scenario;
pub mod selector;
pub mod serve;
pub mod store;

#[cfg(test)]
mod testutil;

pub use config::Settings;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use outcome::{OutcomeKind, OutcomeSpec, Pollutant};
pub use plot::{create_plot, Plot};
pub use scenario::{Multiplier, ScenarioKey, Sector};
pub use selector::{ControlValues, Selector};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        // Verify core types are re-exported from crate root
        let _: Pollutant = Pollutant::Pm25;
        let _: OutcomeKind = OutcomeKind::Mort;
        let _selector = Selector::new();
        let _settings = Settings::default();
    }

    #[test]
    fn test_default_key_accessible() {
        let key = ScenarioKey::default();
        assert_eq!(key.to_string(), "RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0");
        assert_eq!(key.get(Sector::Ene), Multiplier::BASELINE);
    }

    #[test]
    fn test_sector_variants() {
        // All sectors should be accessible, in key order
        let codes: Vec<&str> = Sector::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec!["RES", "IND", "TRA", "AGR", "ENE"]);
    }

    #[test]
    fn test_outcome_spec_accessible() {
        let spec = OutcomeSpec::lookup(Pollutant::O3, OutcomeKind::DalysRate).unwrap();
        assert_eq!(spec.units, "DALYs per 100,000");
    }
}
