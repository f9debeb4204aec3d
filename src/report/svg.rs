//! SVG rendering of one choropleth panel
//!
//! Layout of the 600×400 panel:
//!
//! ```text
//! +--------------------------------------------+
//! | title                                      |
//! |  +--------------------------------+  +-+   |
//! |  |                                |  | | 90|
//! |  |        map (aspect kept)       |  | | 80|
//! |  |                                |  | | ..|
//! |  +--------------------------------+  +-+  0|
//! +--------------------------------------------+
//! ```
//!
//! No axes or grid lines are drawn. Every region path carries its index in
//! `data-idx` and a `<title>` hover text; the `<svg>` root carries the
//! projection parameters so the page script can turn the cursor position
//! back into lon/lat.

use crate::color::Rgb;
use crate::plot::{Plot, FILL_ALPHA};
use crate::store::{DataSource, RegionRecord};
use rayon::prelude::*;
use std::fmt::Write as _;

const TITLE_HEIGHT: f64 = 32.0;
const MARGIN: f64 = 10.0;
const COLOR_BAR_WIDTH: f64 = 16.0;
/// Room for the color bar and its labels
const COLOR_BAR_SPACE: f64 = 90.0;
const LINE_COLOR: &str = "grey";
const LINE_WIDTH: f64 = 0.5;

/// Linear lon/lat → pixel mapping with equal x/y scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub min_x: f64,
    pub max_y: f64,
}

impl Projection {
    /// Fit all regions into the box `[x, y, width, height]`, centred
    pub fn fit(regions: &[RegionRecord], area: [f64; 4]) -> Self {
        let [ax, ay, aw, ah] = area;
        let bounds = regions.iter().filter_map(RegionRecord::bounds).reduce(|a, b| {
            [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])]
        });
        let Some([min_x, min_y, max_x, max_y]) = bounds else {
            return Self { scale: 1.0, offset_x: ax, offset_y: ay, min_x: 0.0, max_y: 0.0 };
        };

        let dx = (max_x - min_x).max(f64::EPSILON);
        let dy = (max_y - min_y).max(f64::EPSILON);
        let scale = (aw / dx).min(ah / dy);
        Self {
            scale,
            offset_x: ax + (aw - dx * scale) / 2.0,
            offset_y: ay + (ah - dy * scale) / 2.0,
            min_x,
            max_y,
        }
    }

    pub fn project(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.offset_x + (p[0] - self.min_x) * self.scale,
            self.offset_y + (self.max_y - p[1]) * self.scale,
        ]
    }
}

/// SVG path data for a region, one subpath per ring
pub fn region_path(region: &RegionRecord, projection: &Projection) -> String {
    let mut d = String::new();
    for ring in region.geometry.iter().flatten() {
        for (i, point) in ring.iter().enumerate() {
            let [x, y] = projection.project(*point);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{}{:.1},{:.1}", cmd, x, y);
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

pub fn map_area(plot: &Plot) -> [f64; 4] {
    [
        MARGIN,
        TITLE_HEIGHT,
        plot.width as f64 - COLOR_BAR_SPACE - 2.0 * MARGIN,
        plot.height as f64 - TITLE_HEIGHT - MARGIN,
    ]
}

/// Render a full panel for the column currently bound in `source`
pub fn panel(plot: &Plot, source: &DataSource) -> String {
    let regions = source.table().regions();
    let projection = Projection::fit(regions, map_area(plot));
    let values = source.values();
    let colors: Vec<Rgb> = plot.mapper.colors(&values);
    let outcome = plot.outcome.as_str();

    let paths: Vec<String> = regions
        .par_iter()
        .enumerate()
        .map(|(i, region)| {
            let hover = plot
                .tooltip(&region.location, values[i])
                .iter()
                .map(|row| format!("{}: {}", row.label, row.value))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                r#"<path class="region" data-idx="{}" d="{}" fill="{}" fill-opacity="{}" fill-rule="evenodd" stroke="{}" stroke-width="{}"><title>{}</title></path>"#,
                i,
                region_path(region, &projection),
                colors[i],
                FILL_ALPHA,
                LINE_COLOR,
                LINE_WIDTH,
                xml_escape(&hover)
            )
        })
        .collect();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="panel-{outcome}" class="panel" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-outcome="{outcome}" data-scale="{scale}" data-ox="{ox}" data-oy="{oy}" data-minx="{minx}" data-maxy="{maxy}">
<rect width="{w}" height="{h}" fill="white"/>
<text id="title-{outcome}" class="panel-title" x="{tx}" y="20" font-size="13" font-family="Helvetica, Arial, sans-serif" font-weight="bold">{title}</text>
<g class="regions">{paths}</g>
{bar}
</svg>"#,
        outcome = outcome,
        w = plot.width,
        h = plot.height,
        scale = projection.scale,
        ox = projection.offset_x,
        oy = projection.offset_y,
        minx = projection.min_x,
        maxy = projection.max_y,
        tx = MARGIN,
        title = xml_escape(&plot.title),
        paths = paths.join("\n"),
        bar = color_bar(plot),
    )
}

/// Vertical color bar with the fixed ticks, `0,0` labels
pub fn color_bar(plot: &Plot) -> String {
    let top = TITLE_HEIGHT + MARGIN;
    let bottom = plot.height as f64 - MARGIN * 2.0;
    let height = bottom - top;
    let x = plot.width as f64 - COLOR_BAR_SPACE + MARGIN;
    let palette = plot.mapper.palette();
    let step = height / palette.len() as f64;

    let mut out = String::from(r#"<g class="color-bar">"#);
    for (i, color) in palette.iter().enumerate() {
        // Lowest color at the bottom
        let y = bottom - step * (i + 1) as f64;
        let _ = write!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="{}" height="{:.1}" fill="{}"/>"#,
            x, y, COLOR_BAR_WIDTH, step, color
        );
    }

    let span = plot.spec.high - plot.spec.low;
    for (tick, label) in plot.ticks.iter().zip(plot.tick_labels()) {
        let frac = if span > 0.0 { (tick - plot.spec.low) / span } else { 0.0 };
        let y = bottom - frac * height;
        let _ = write!(
            out,
            r##"<line x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="#444" stroke-width="1"/><text x="{tx:.1}" y="{ty:.1}" font-size="10" font-family="Helvetica, Arial, sans-serif" fill="#444">{label}</text>"##,
            x1 = x + COLOR_BAR_WIDTH,
            x2 = x + COLOR_BAR_WIDTH + 4.0,
            y = y,
            tx = x + COLOR_BAR_WIDTH + 12.0,
            ty = y + 3.5,
            label = label
        );
    }
    out.push_str("</g>");
    out
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeKind;
    use crate::testutil;

    fn attr(svg: &str, name: &str) -> f64 {
        let start = svg.find(&format!(" {}=\"", name)).unwrap() + name.len() + 3;
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end].parse().unwrap()
    }

    #[test]
    fn test_cursor_attributes_invert_projection() {
        // The page script turns cursor pixels back into lon/lat from these attributes
        let dash = testutil::dashboard();
        let (plot, source) = dash.plot(OutcomeKind::Exposure).unwrap();
        let svg = panel(plot, source);
        let proj = Projection {
            scale: attr(&svg, "data-scale"),
            offset_x: attr(&svg, "data-ox"),
            offset_y: attr(&svg, "data-oy"),
            min_x: attr(&svg, "data-minx"),
            max_y: attr(&svg, "data-maxy"),
        };

        let [px, py] = proj.project([116.5, 39.5]);
        let lon = proj.min_x + (px - proj.offset_x) / proj.scale;
        let lat = proj.max_y - (py - proj.offset_y) / proj.scale;
        assert!((lon - 116.5).abs() < 1e-9);
        assert!((lat - 39.5).abs() < 1e-9);
        assert!(proj.scale > 0.0);
    }

    #[test]
    fn test_projection_keeps_inside_area() {
        let (store, _) = testutil::store_and_aggregate();
        let regions = store.get("PM2_5_DRY_exposure_mean").unwrap().table().regions();
        let area = [10.0, 32.0, 480.0, 358.0];
        let proj = Projection::fit(regions, area);
        // Extent is 114..118 x 36..42, taller than wide
        let top_left = proj.project([114.0, 42.0]);
        let bottom_right = proj.project([118.0, 36.0]);
        assert!((top_left[1] - 32.0).abs() < 1e-9);
        assert!((bottom_right[1] - 390.0).abs() < 1e-9);
        assert!(top_left[0] >= 10.0 && bottom_right[0] <= 490.0);
        // North is up
        assert!(top_left[1] < bottom_right[1]);
    }

    #[test]
    fn test_projection_without_geometry() {
        let proj = Projection::fit(&[], [0.0, 0.0, 100.0, 100.0]);
        assert_eq!(proj.scale, 1.0);
    }

    #[test]
    fn test_region_path_has_subpath_per_ring() {
        let (store, _) = testutil::store_and_aggregate();
        let regions = store.get("PM2_5_DRY_exposure_mean").unwrap().table().regions();
        let proj = Projection::fit(regions, [0.0, 0.0, 400.0, 400.0]);
        let d = region_path(&regions[1], &proj);
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }

    #[test]
    fn test_panel_contains_regions_title_and_ticks() {
        let dash = testutil::dashboard();
        let (plot, source) = dash.plot(OutcomeKind::Mort).unwrap();
        let svg = panel(plot, source);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"id="panel-mort""#));
        assert_eq!(svg.matches(r#"class="region""#).count(), 3);
        assert!(svg.contains("MORT from PM₂.₅ in China = 150,000 deaths"));
        assert!(svg.contains("State: Beijing&#10;MORT: 12,288 deaths"));
        assert!(svg.contains(">150,000</text>"));
        assert!(svg.contains(">16,667</text>"));
        assert!(!svg.contains("axis"));
    }

    #[test]
    fn test_color_bar_has_nine_stops_and_ten_ticks() {
        let dash = testutil::dashboard();
        let (plot, _) = dash.plot(OutcomeKind::Exposure).unwrap();
        let bar = color_bar(plot);
        assert_eq!(bar.matches("<rect").count(), 9);
        assert_eq!(bar.matches("<text").count(), 10);
        assert!(bar.contains("#ffffcc"));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape(r#"a<b & "c""#), "a&lt;b &amp; &quot;c&quot;");
    }
}
