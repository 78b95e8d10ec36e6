use std::io;

use super::RunReport;

/// Render the full run report as pretty-printed JSON.
pub fn render(report: &RunReport) -> io::Result<String> {
    serde_json::to_string_pretty(report).map_err(io::Error::other)
}
