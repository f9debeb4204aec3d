//! HTML page with the emission controls and the choropleth panels
//!
//! The same page backs the static report and the interactive `serve` UI.
//! The static report shows the controls disabled at the rendered scenario;
//! `serve` enables them and appends its update script.

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::report::{svg, to_io_error};
use crate::scenario::Sector;
use std::io::{self, Write};

/// Cursor readout shared by both page flavours. Turns the mouse position
/// back into lon/lat using the projection stored on each `<svg>`.
const HOVER_SCRIPT: &str = r#"
    const tooltip = document.getElementById('tooltip');
    document.querySelectorAll('svg.panel').forEach(svg => {
        const d = svg.dataset;
        svg.addEventListener('mousemove', event => {
            const target = event.target.closest('path.region');
            if (!target) { tooltip.classList.remove('visible'); return; }
            const box = svg.getBoundingClientRect();
            const px = (event.clientX - box.left) * (svg.viewBox.baseVal.width / box.width);
            const py = (event.clientY - box.top) * (svg.viewBox.baseVal.height / box.height);
            const lon = parseFloat(d.minx) + (px - parseFloat(d.ox)) / parseFloat(d.scale);
            const lat = parseFloat(d.maxy) - (py - parseFloat(d.oy)) / parseFloat(d.scale);
            const hover = target.querySelector('title').textContent;
            tooltip.textContent = hover + '\n(Lon, Lat): (' + lon.toFixed(2) + ', ' + lat.toFixed(2) + ')';
            tooltip.style.left = (event.pageX + 12) + 'px';
            tooltip.style.top = (event.pageY + 12) + 'px';
            tooltip.classList.add('visible');
        });
        svg.addEventListener('mouseleave', () => tooltip.classList.remove('visible'));
    });
"#;

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard) -> io::Result<()> {
    let html = page(dashboard, false, "").map_err(to_io_error)?;
    writer.write_all(html.as_bytes())
}

/// Five labelled range inputs in RES, IND, TRA, AGR, ENE order
pub fn controls(dashboard: &Dashboard, interactive: bool) -> String {
    let key = dashboard.key();
    Sector::ALL
        .iter()
        .map(|&sector| {
            let label = key.get(sector).label();
            format!(
                r#"<div class="control">
                <label for="ctl-{param}">{title}: <span class="control-value" id="val-{param}">{label}</span></label>
                <input type="range" id="ctl-{param}" name="{param}" min="0" max="1.4" step="0.2" value="{label}"{disabled}>
            </div>"#,
                param = sector.param(),
                title = sector.title(),
                label = label,
                disabled = if interactive { "" } else { " disabled" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

/// Render the complete document
pub fn page(dashboard: &Dashboard, interactive: bool, extra_script: &str) -> Result<String> {
    let panels = dashboard
        .panels()?
        .into_iter()
        .map(|(plot, source)| format!(r#"<div class="panel-card">{}</div>"#, svg::panel(plot, source)))
        .collect::<Vec<_>>()
        .join("\n            ");

    let mode = if interactive { "Interactive" } else { "Snapshot" };

    Ok(format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>China Emission Scenarios - {pollutant}</title>
    <style>
        :root {{
            --bg: #fafafa;
            --card: #ffffff;
            --border: #d0d7de;
            --text: #1f2328;
            --dim: #656d76;
            --accent: #bd0026;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1300px; margin: 0 auto; padding: 2rem; }}
        .header {{
            margin-bottom: 1.5rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 1.75rem; font-weight: 700; color: var(--accent); }}
        .subtitle {{ color: var(--dim); font-size: 0.95rem; }}
        .scenario-key {{ font-family: 'SF Mono', 'Fira Code', monospace; }}

        /* Controls */
        .controls {{ display: flex; flex-direction: column; gap: 0.5rem; margin-bottom: 1.5rem; max-width: 480px; }}
        .control label {{ display: block; font-size: 0.875rem; color: var(--dim); }}
        .control input {{ width: 100%; }}
        .control-value {{ color: var(--text); font-weight: 600; }}

        /* Panels */
        .panels {{ display: flex; flex-wrap: wrap; gap: 1rem; }}
        .panel-card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 0.5rem;
        }}
        .notices {{ color: var(--accent); font-size: 0.875rem; margin-bottom: 1rem; min-height: 1.2rem; }}

        /* Tooltip */
        .tooltip {{
            position: absolute;
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 6px;
            padding: 0.5rem 0.75rem;
            font-size: 0.8rem;
            white-space: pre;
            pointer-events: none;
            opacity: 0;
            transition: opacity 0.1s;
            z-index: 1000;
            box-shadow: 0 4px 12px rgba(0,0,0,0.15);
        }}
        .tooltip.visible {{ opacity: 1; }}

        .footer {{
            margin-top: 2rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            color: var(--dim);
            font-size: 0.8rem;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">Air quality under emission scenarios</div>
            <div class="subtitle">{mode} &middot; scenario <span class="scenario-key" id="scenario-key">{key}</span></div>
        </div>

        <div class="controls">
            {controls}
        </div>

        <div class="notices" id="notices"></div>

        <div class="panels">
            {panels}
        </div>

        <div class="footer">Generated {generated} by aqmap</div>
    </div>

    <div class="tooltip" id="tooltip"></div>

    <script>
    {hover}
    {extra}
    </script>
</body>
</html>
"#,
        pollutant = dashboard.pollutant(),
        mode = mode,
        key = dashboard.key(),
        controls = controls(dashboard, interactive),
        panels = panels,
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        hover = HOVER_SCRIPT,
        extra = extra_script,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ControlValues;
    use crate::testutil;

    #[test]
    fn test_static_page_has_disabled_controls_and_two_panels() {
        let dash = testutil::dashboard();
        let html = page(&dash, false, "").unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches(r#"type="range""#).count(), 5);
        assert_eq!(html.matches(" disabled>").count(), 5);
        assert_eq!(html.matches(r#"<svg xmlns"#).count(), 2);
        assert!(html.contains("Fractional power generation emissions"));
        assert!(html.contains("RES1.0_IND1.0_TRA1.0_AGR1.0_ENE1.0"));
        assert!(html.contains("Exposure from PM₂.₅ in China = 23.5 μg/m³"));
    }

    #[test]
    fn test_controls_follow_selection() {
        let mut dash = testutil::dashboard();
        dash.apply(ControlValues { res: 0.6, ..ControlValues::default() }).unwrap();
        let html = controls(&dash, true);
        assert!(html.contains(r#"id="ctl-res" name="res" min="0" max="1.4" step="0.2" value="0.6">"#));
        assert!(html.contains(r#"id="ctl-ene" name="ene" min="0" max="1.4" step="0.2" value="1.0">"#));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_controls_keep_key_order() {
        let dash = testutil::dashboard();
        let html = controls(&dash, false);
        let positions: Vec<usize> = ["ctl-res", "ctl-ind", "ctl-tra", "ctl-agr", "ctl-ene"]
            .iter()
            .map(|id| html.find(id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_extra_script_is_embedded() {
        let dash = testutil::dashboard();
        let html = page(&dash, true, "console.log('live');").unwrap();
        assert!(html.contains("console.log('live');"));
        assert!(html.contains("Interactive"));
    }
}
