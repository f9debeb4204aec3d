//! Sequential color mapping for choropleth fills
//!
//! The palette is ColorBrewer YlOrRd with nine stops, reversed so that the
//! lowest values get the lightest yellow and the highest the darkest red.
//! Values are mapped onto the palette with the same linear binning a
//! `LinearColorMapper` uses: `[low, high]` is split into nine equal bins,
//! anything below `low` takes the first color and anything at or above
//! `high` takes the last.

use serde::Serialize;
use std::fmt;

/// ColorBrewer YlOrRd, darkest first
pub const YL_OR_RD_9: [Rgb; 9] = [
    Rgb(0x80, 0x00, 0x26),
    Rgb(0xbd, 0x00, 0x26),
    Rgb(0xe3, 0x1a, 0x1c),
    Rgb(0xfc, 0x4e, 0x2a),
    Rgb(0xfd, 0x8d, 0x3c),
    Rgb(0xfe, 0xb2, 0x4c),
    Rgb(0xfe, 0xd9, 0x76),
    Rgb(0xff, 0xed, 0xa0),
    Rgb(0xff, 0xff, 0xcc),
];

/// Fill for regions without a value
pub const NAN_COLOR: Rgb = Rgb(0x80, 0x80, 0x80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    palette: Vec<Rgb>,
    low: f64,
    high: f64,
    nan_color: Rgb,
}

impl ColorMapper {
    pub fn new(palette: Vec<Rgb>, low: f64, high: f64) -> Self {
        Self { palette, low, high, nan_color: NAN_COLOR }
    }

    /// Reversed YlOrRd9 over `[low, high]`
    pub fn yl_or_rd(low: f64, high: f64) -> Self {
        let mut palette = YL_OR_RD_9.to_vec();
        palette.reverse();
        Self::new(palette, low, high)
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn color(&self, value: f64) -> Rgb {
        if value.is_nan() || self.palette.is_empty() {
            return self.nan_color;
        }
        let n = self.palette.len();
        let span = self.high - self.low;
        if span <= 0.0 {
            return if value < self.low { self.palette[0] } else { self.palette[n - 1] };
        }
        let bin = ((value - self.low) * n as f64 / span).floor();
        let idx = if bin < 0.0 { 0 } else { (bin as usize).min(n - 1) };
        self.palette[idx]
    }

    pub fn colors(&self, values: &[f64]) -> Vec<Rgb> {
        values.iter().map(|&v| self.color(v)).collect()
    }
}
