//! CSV report: one row per panel and region, long format

use crate::dashboard::Dashboard;
use crate::report::{to_io_error, Snapshot};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard) -> io::Result<()> {
    let snapshot = Snapshot::from_dashboard(dashboard).map_err(to_io_error)?;

    writeln!(writer, "scenario,table,location,value,units,color")?;
    for panel in &snapshot.panels {
        for region in &panel.regions {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                snapshot.key,
                escape(&panel.table),
                escape(&region.location),
                region.value.map(|v| v.to_string()).unwrap_or_default(),
                escape(&panel.units),
                region.color
            )?;
        }
    }
    Ok(())
}

fn escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
