//! JSON report: the full dashboard snapshot

use crate::dashboard::Dashboard;
use crate::report::{to_io_error, Snapshot};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard) -> io::Result<()> {
    let snapshot = Snapshot::from_dashboard(dashboard).map_err(to_io_error)?;
    serde_json::to_writer_pretty(&mut *writer, &snapshot)?;
    writeln!(writer)
}
