//! Emission sectors, multipliers and scenario keys
//!
//! Every emission scenario scales five sectors independently by a multiplier
//! drawn from `{0.0, 0.2, ..., 1.4}`. A scenario is addressed by a string key
//! built in the fixed order RES, IND, TRA, AGR, ENE:
//!
//! ```text
//! RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0
//! ```
//!
//! Multipliers are stored as a step index (0..=7) rather than a float, so a
//! key can never pick up floating-point drift such as `0.6000000000000001`
//! or lose its decimal (`1` instead of `1.0`).

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of multiplier steps per sector (0.0 through 1.4)
pub const STEPS: u8 = 8;

/// Distance between two neighbouring multipliers
pub const STEP_SIZE: f64 = 0.2;

/// Number of distinct scenario keys (8^5)
pub const KEY_COUNT: usize = 32_768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Res,
    Ind,
    Tra,
    Agr,
    Ene,
}

impl Sector {
    /// Key order
    pub const ALL: [Sector; 5] = [Sector::Res, Sector::Ind, Sector::Tra, Sector::Agr, Sector::Ene];

    pub fn code(self) -> &'static str {
        match self {
            Sector::Res => "RES",
            Sector::Ind => "IND",
            Sector::Tra => "TRA",
            Sector::Agr => "AGR",
            Sector::Ene => "ENE",
        }
    }

    /// Control title shown next to the slider
    pub fn title(self) -> &'static str {
        match self {
            Sector::Res => "Fractional residential emissions",
            Sector::Ind => "Fractional industrial emissions",
            Sector::Tra => "Fractional land transport emissions",
            Sector::Agr => "Fractional agricultural emissions",
            Sector::Ene => "Fractional power generation emissions",
        }
    }

    /// Query parameter name (`res`, `ind`, ...)
    pub fn param(self) -> &'static str {
        match self {
            Sector::Res => "res",
            Sector::Ind => "ind",
            Sector::Tra => "tra",
            Sector::Agr => "agr",
            Sector::Ene => "ene",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One sector multiplier, snapped to the 0.2 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multiplier(u8);

impl Multiplier {
    pub const MIN: Multiplier = Multiplier(0);
    pub const MAX: Multiplier = Multiplier(STEPS - 1);
    /// 1.0, today's emissions
    pub const BASELINE: Multiplier = Multiplier(5);

    pub fn from_step(step: u8) -> Option<Self> {
        (step < STEPS).then_some(Multiplier(step))
    }

    /// Snap a raw control value to the nearest step.
    ///
    /// Out-of-range values clamp to the ends of the domain the way a range
    /// input does. NaN and infinities are rejected.
    pub fn snap(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidMultiplier(value.to_string()));
        }
        let step = (value / STEP_SIZE).round().clamp(0.0, (STEPS - 1) as f64);
        Ok(Multiplier(step as u8))
    }

    pub fn step(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        self.0 as f64 * STEP_SIZE
    }

    /// Canonical one-decimal label, e.g. `"1.0"`
    pub fn label(self) -> String {
        // Integer arithmetic keeps 0.6 as "0.6" rather than 0.6000000000000001
        let tenths = self.0 as u32 * 2;
        format!("{}.{}", tenths / 10, tenths % 10)
    }

    fn parse_label(s: &str) -> Option<Self> {
        let (whole, frac) = s.split_once('.')?;
        if whole.len() != 1 || frac.len() != 1 {
            return None;
        }
        let tenths = whole.parse::<u8>().ok()? * 10 + frac.parse::<u8>().ok()?;
        if tenths % 2 != 0 {
            return None;
        }
        Multiplier::from_step(tenths / 2)
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Multiplier::BASELINE
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Identifier of one emission scenario column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenarioKey {
    multipliers: [Multiplier; 5],
}

impl ScenarioKey {
    pub fn new(multipliers: [Multiplier; 5]) -> Self {
        Self { multipliers }
    }

    /// Snap five raw control values (RES, IND, TRA, AGR, ENE order)
    pub fn from_values(values: [f64; 5]) -> Result<Self> {
        let mut multipliers = [Multiplier::BASELINE; 5];
        for (slot, value) in multipliers.iter_mut().zip(values) {
            *slot = Multiplier::snap(value)?;
        }
        Ok(Self { multipliers })
    }

    pub fn get(&self, sector: Sector) -> Multiplier {
        self.multipliers[sector.index()]
    }

    pub fn multipliers(&self) -> [Multiplier; 5] {
        self.multipliers
    }

    /// Every possible key, in lexicographic step order
    pub fn all() -> impl Iterator<Item = ScenarioKey> {
        (0..KEY_COUNT).map(|n| {
            let mut multipliers = [Multiplier::MIN; 5];
            let mut rest = n;
            for slot in multipliers.iter_mut().rev() {
                *slot = Multiplier((rest % STEPS as usize) as u8);
                rest /= STEPS as usize;
            }
            ScenarioKey { multipliers }
        })
    }

    /// Number of sectors whose multiplier differs from `other`
    pub fn distance(&self, other: &ScenarioKey) -> usize {
        self.multipliers
            .iter()
            .zip(other.multipliers())
            .filter(|(a, b)| **a != *b)
            .count()
    }

    /// Keys that move exactly one sector away from the default scenario
    pub fn single_sector_variants() -> impl Iterator<Item = ScenarioKey> {
        let baseline = ScenarioKey::default();
        ScenarioKey::all().filter(move |key| key.distance(&baseline) == 1)
    }
}

impl Default for ScenarioKey {
    /// `RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0`
    fn default() -> Self {
        Self { multipliers: [Multiplier::BASELINE; 5] }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sector) in Sector::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{}{}", sector.code(), self.multipliers[i])?;
        }
        Ok(())
    }
}

impl FromStr for ScenarioKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidScenarioKey(s.to_string());
        let mut parts = s.split('_');
        let mut multipliers = [Multiplier::BASELINE; 5];
        for (slot, sector) in multipliers.iter_mut().zip(Sector::ALL) {
            let part = parts.next().ok_or_else(invalid)?;
            let label = part.strip_prefix(sector.code()).ok_or_else(invalid)?;
            *slot = Multiplier::parse_label(label).ok_or_else(invalid)?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { multipliers })
    }
}

impl Serialize for ScenarioKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScenarioKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // SNAPPING
    // ==========================================================================
    //
    // Slider values arrive as floats. Whatever the representation ("1",
    // "1.0", 0.6000000000000001), the label must come out with exactly one
    // decimal so it matches the column names in the data files.
    // ==========================================================================

    #[test]
    fn test_integer_and_float_snap_to_same_label() {
        assert_eq!(Multiplier::snap(1.0).unwrap().label(), "1.0");
        assert_eq!(Multiplier::snap(1_f64).unwrap().label(), "1.0");
        assert_eq!(Multiplier::snap(0.0).unwrap().label(), "0.0");
    }

    #[test]
    fn test_float_drift_is_absorbed() {
        assert_eq!(Multiplier::snap(0.2 * 3.0).unwrap().label(), "0.6");
        assert_eq!(Multiplier::snap(0.6000000000000001).unwrap().label(), "0.6");
        assert_eq!(Multiplier::snap(1.4000000000000001).unwrap().label(), "1.4");
        assert_eq!(Multiplier::snap(0.19999).unwrap().label(), "0.2");
    }

    #[test]
    fn test_labels_cover_domain() {
        let labels: Vec<String> = (0..STEPS).map(|s| Multiplier::from_step(s).unwrap().label()).collect();
        assert_eq!(labels, vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0", "1.2", "1.4"]);
        assert!(Multiplier::from_step(STEPS).is_none());
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(Multiplier::snap(-0.5).unwrap(), Multiplier::MIN);
        assert_eq!(Multiplier::snap(3.0).unwrap(), Multiplier::MAX);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(Multiplier::snap(f64::NAN), Err(Error::InvalidMultiplier(_))));
        assert!(Multiplier::snap(f64::INFINITY).is_err());
    }

    // ==========================================================================
    // KEY DERIVATION
    // ==========================================================================

    #[test]
    fn test_default_key() {
        assert_eq!(ScenarioKey::default().to_string(), "RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0");
        let key = ScenarioKey::from_values([1.0; 5]).unwrap();
        assert_eq!(key, ScenarioKey::default());
    }

    #[test]
    fn test_all_zero_key_has_decimals() {
        let key = ScenarioKey::from_values([0.0; 5]).unwrap();
        assert_eq!(key.to_string(), "RES0.0_IND0.0_TRA0.0_AGR0.0_ENE0.0");
    }

    #[test]
    fn test_residential_change_only_touches_res_field() {
        let key = ScenarioKey::from_values([0.6, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(key.to_string(), "RES0.6_IND1.0_TRA1.0_AGR1.0_ENE1.0");
        assert_eq!(key.get(Sector::Res).label(), "0.6");
        assert_eq!(key.get(Sector::Ene), Multiplier::BASELINE);
    }

    #[test]
    fn test_field_order_is_fixed() {
        let key = ScenarioKey::from_values([0.0, 0.2, 0.4, 0.6, 0.8]).unwrap();
        assert_eq!(key.to_string(), "RES0.0_IND0.2_TRA0.4_AGR0.6_ENE0.8");
    }

    #[test]
    fn test_parse_round_trip() {
        let text = "RES0.4_IND1.2_TRA0.0_AGR1.4_ENE0.8";
        let key: ScenarioKey = text.parse().unwrap();
        assert_eq!(key.to_string(), text);
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in [
            "RES1_IND1.0_TRA1.0_AGR1.0_ENE1.0",
            "RES1.0_IND1.0_TRA1.0_AGR1.0",
            "IND1.0_RES1.0_TRA1.0_AGR1.0_ENE1.0",
            "RES0.3_IND1.0_TRA1.0_AGR1.0_ENE1.0",
            "RES1.6_IND1.0_TRA1.0_AGR1.0_ENE1.0",
            "RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0_X",
            "scenario_variable",
        ] {
            assert!(bad.parse::<ScenarioKey>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_all_keys_unique_and_complete() {
        let keys: std::collections::HashSet<ScenarioKey> = ScenarioKey::all().collect();
        assert_eq!(keys.len(), KEY_COUNT);
        assert!(keys.contains(&ScenarioKey::default()));
        assert_eq!(ScenarioKey::all().next().unwrap().to_string(), "RES0.0_IND0.0_TRA0.0_AGR0.0_ENE0.0");
        assert_eq!(ScenarioKey::all().last().unwrap().to_string(), "RES1.4_IND1.4_TRA1.4_AGR1.4_ENE1.4");
    }

    #[test]
    fn test_single_sector_variants() {
        let variants: Vec<ScenarioKey> = ScenarioKey::single_sector_variants().collect();
        // 5 sectors x 7 non-baseline steps
        assert_eq!(variants.len(), 35);
        assert!(!variants.contains(&ScenarioKey::default()));
        let res06 = ScenarioKey::from_values([0.6, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!(variants.contains(&res06));
        let two_moved = ScenarioKey::from_values([0.6, 0.6, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(two_moved.distance(&ScenarioKey::default()), 2);
        assert!(!variants.contains(&two_moved));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ScenarioKey::default()).unwrap();
        assert_eq!(json, "\"RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0\"");
        let back: ScenarioKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ScenarioKey::default());
    }
}
