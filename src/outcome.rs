//! Pollutants, outcome kinds and their static display configuration
//!
//! The color-scale bounds, rounding and units for each panel are fixed.
//! They live here as plain `match` tables rather than in a config file:
//!
//! | Outcome | Pollutant | Low | High | Round to | Units |
//! |---------|-----------|-----|------|----------|-------|
//! | exposure | PM2_5_DRY | 0 | 90 | 1 | μg/m³ |
//! | exposure | O3_6mDM8h | 24 | 60 | 1 | ppb |
//! | mort | PM2_5_DRY | 0 | 150000 | -2 | deaths |
//! | mort | O3_6mDM8h | 0 | 2700 | -2 | deaths |
//! | dalys_rate | any | 0 | 200 | 1 | DALYs per 100,000 |
//!
//! A negative `round_to` rounds to a power of ten (-2 → nearest hundred).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2_5_DRY")]
    Pm25,
    #[serde(rename = "O3_6mDM8h", alias = "o3_6mDM8h")]
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 2] = [Pollutant::Pm25, Pollutant::O3];

    /// Identifier used in table names and aggregate files
    pub fn as_str(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2_5_DRY",
            Pollutant::O3 => "O3_6mDM8h",
        }
    }

    /// Typeset name for titles
    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM\u{2082}.\u{2085}",
            Pollutant::O3 => "O\u{2083}",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Older data files spell ozone with a lowercase 'o'
        match s {
            "PM2_5_DRY" => Ok(Pollutant::Pm25),
            "O3_6mDM8h" | "o3_6mDM8h" => Ok(Pollutant::O3),
            _ => Err(Error::UnknownPollutant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Exposure,
    Mort,
    DalysRate,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [OutcomeKind::Exposure, OutcomeKind::Mort, OutcomeKind::DalysRate];

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Exposure => "exposure",
            OutcomeKind::Mort => "mort",
            OutcomeKind::DalysRate => "dalys_rate",
        }
    }

    /// Variable name for titles and tooltips
    pub fn label(self) -> &'static str {
        match self {
            OutcomeKind::Exposure => "Exposure",
            OutcomeKind::Mort => "MORT",
            OutcomeKind::DalysRate => "Rate of DALYs",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exposure" => Ok(OutcomeKind::Exposure),
            "mort" => Ok(OutcomeKind::Mort),
            "dalys_rate" => Ok(OutcomeKind::DalysRate),
            _ => Err(Error::UnknownOutcome(s.to_string())),
        }
    }
}

/// Color-scale bounds, rounding and units for one panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeSpec {
    pub low: f64,
    pub high: f64,
    /// Decimal digits kept in the title value; negative rounds to tens, hundreds, ...
    pub round_to: i32,
    pub units: &'static str,
}

impl OutcomeSpec {
    pub fn lookup(pollutant: Pollutant, outcome: OutcomeKind) -> Result<Self> {
        let spec = match (outcome, pollutant) {
            (OutcomeKind::Exposure, Pollutant::Pm25) => OutcomeSpec {
                low: 0.0,
                high: 90.0,
                round_to: 1,
                units: "\u{03BC}g/m\u{00b3}",
            },
            (OutcomeKind::Exposure, Pollutant::O3) => OutcomeSpec {
                low: 24.0,
                high: 60.0,
                round_to: 1,
                units: "ppb",
            },
            (OutcomeKind::Mort, Pollutant::Pm25) => OutcomeSpec {
                low: 0.0,
                high: 150_000.0,
                round_to: -2,
                units: "deaths",
            },
            (OutcomeKind::Mort, Pollutant::O3) => OutcomeSpec {
                low: 0.0,
                high: 2_700.0,
                round_to: -2,
                units: "deaths",
            },
            (OutcomeKind::DalysRate, _) => OutcomeSpec {
                low: 0.0,
                high: 200.0,
                round_to: 1,
                units: "DALYs per 100,000",
            },
        };
        Ok(spec)
    }

    /// Lookup from raw identifiers, e.g. values read from a query string
    pub fn lookup_str(pollutant: &str, outcome: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedCombination {
            pollutant: pollutant.to_string(),
            outcome: outcome.to_string(),
        };
        let pollutant: Pollutant = pollutant.parse().map_err(|_| unsupported())?;
        let outcome: OutcomeKind = outcome.parse().map_err(|_| unsupported())?;
        Self::lookup(pollutant, outcome)
    }

    /// Ten evenly spaced color-bar ticks over `[low, high]`
    pub fn ticks(&self) -> Vec<f64> {
        linspace(self.low, self.high, 10)
    }
}

pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            // Pin the last value so it is exactly `end`
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // BOUNDS TABLE
    // ==========================================================================
    //
    // These values define the color scales users compare across scenarios;
    // changing them silently would make old screenshots disagree with new
    // ones, so every row is pinned here.
    // ==========================================================================

    #[test]
    fn test_exposure_bounds() {
        let pm = OutcomeSpec::lookup(Pollutant::Pm25, OutcomeKind::Exposure).unwrap();
        assert_eq!((pm.low, pm.high, pm.round_to), (0.0, 90.0, 1));
        assert_eq!(pm.units, "μg/m³");

        let o3 = OutcomeSpec::lookup(Pollutant::O3, OutcomeKind::Exposure).unwrap();
        assert_eq!((o3.low, o3.high, o3.round_to), (24.0, 60.0, 1));
        assert_eq!(o3.units, "ppb");
    }

    #[test]
    fn test_mortality_bounds() {
        let pm = OutcomeSpec::lookup(Pollutant::Pm25, OutcomeKind::Mort).unwrap();
        assert_eq!((pm.low, pm.high, pm.round_to), (0.0, 150_000.0, -2));
        assert_eq!(pm.units, "deaths");

        let o3 = OutcomeSpec::lookup(Pollutant::O3, OutcomeKind::Mort).unwrap();
        assert_eq!((o3.low, o3.high, o3.round_to), (0.0, 2_700.0, -2));
        assert_eq!(o3.units, "deaths");
    }

    #[test]
    fn test_dalys_rate_is_pollutant_independent() {
        for pollutant in Pollutant::ALL {
            let spec = OutcomeSpec::lookup(pollutant, OutcomeKind::DalysRate).unwrap();
            assert_eq!((spec.low, spec.high, spec.round_to), (0.0, 200.0, 1));
            assert_eq!(spec.units, "DALYs per 100,000");
        }
    }

    #[test]
    fn test_lookup_str_unsupported_combination() {
        assert!(OutcomeSpec::lookup_str("PM2_5_DRY", "mort").is_ok());
        assert!(OutcomeSpec::lookup_str("o3_6mDM8h", "exposure").is_ok());
        assert!(matches!(
            OutcomeSpec::lookup_str("NO2", "exposure"),
            Err(Error::UnsupportedCombination { .. })
        ));
        assert!(matches!(
            OutcomeSpec::lookup_str("PM2_5_DRY", "yll"),
            Err(Error::UnsupportedCombination { .. })
        ));
    }

    // ==========================================================================
    // TICKS
    // ==========================================================================

    #[test]
    fn test_ten_ticks_inclusive() {
        let spec = OutcomeSpec::lookup(Pollutant::Pm25, OutcomeKind::Exposure).unwrap();
        let ticks = spec.ticks();
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[9], 90.0);
        assert!((ticks[1] - 10.0).abs() < 1e-9);

        let o3 = OutcomeSpec::lookup(Pollutant::O3, OutcomeKind::Exposure).unwrap().ticks();
        assert_eq!(o3[0], 24.0);
        assert_eq!(o3[9], 60.0);
        assert!((o3[1] - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_linspace_edge_cases() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert_eq!(linspace(0.0, 1.0, 2), vec![0.0, 1.0]);
    }

    // ==========================================================================
    // LABELS
    // ==========================================================================

    #[test]
    fn test_pollutant_parsing_accepts_lowercase_ozone() {
        assert_eq!("o3_6mDM8h".parse::<Pollutant>().unwrap(), Pollutant::O3);
        assert_eq!("O3_6mDM8h".parse::<Pollutant>().unwrap(), Pollutant::O3);
        assert!(matches!("pm25".parse::<Pollutant>(), Err(Error::UnknownPollutant(_))));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Pollutant::Pm25.label(), "PM₂.₅");
        assert_eq!(Pollutant::O3.label(), "O₃");
        assert_eq!(OutcomeKind::Exposure.label(), "Exposure");
        assert_eq!(OutcomeKind::Mort.label(), "MORT");
        assert_eq!(OutcomeKind::DalysRate.label(), "Rate of DALYs");
        assert_eq!("dalys_rate".parse::<OutcomeKind>().unwrap(), OutcomeKind::DalysRate);
    }
}
