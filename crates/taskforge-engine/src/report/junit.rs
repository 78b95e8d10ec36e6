use std::fmt::Write as _;

use crate::result::TaskStatus;

use super::RunReport;

/// Render the run as a JUnit XML document.
///
/// One `<testsuite>` holds every task; `classname` carries the task's
/// environment. Skipped tasks get a `<skipped/>` element so JUnit consumers
/// count them correctly.
pub fn render(report: &RunReport) -> String {
    let tests = report.summary.total;
    let failures = report.summary.failed;
    let time = report.duration_ms as f64 / 1000.0;

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuites name=\"taskforge\" tests=\"{tests}\" failures=\"{failures}\" time=\"{time:.3}\">"
    );
    let _ = writeln!(
        xml,
        "  <testsuite name=\"taskforge\" tests=\"{tests}\" failures=\"{failures}\" time=\"{time:.3}\">"
    );

    for result in &report.results {
        let name = escape(&result.name);
        let classname = escape(&result.environment.to_string());
        let case_time = result.duration_ms as f64 / 1000.0;
        match result.status {
            TaskStatus::Failed => {
                let message = escape(result.error.as_deref().unwrap_or("task failed"));
                let _ = writeln!(
                    xml,
                    "    <testcase name=\"{name}\" classname=\"{classname}\" time=\"{case_time:.3}\">"
                );
                let _ = writeln!(xml, "      <failure message=\"{message}\">{message}</failure>");
                xml.push_str("    </testcase>\n");
            }
            TaskStatus::Skipped => {
                let _ = writeln!(
                    xml,
                    "    <testcase name=\"{name}\" classname=\"{classname}\" time=\"{case_time:.3}\">"
                );
                xml.push_str("      <skipped/>\n");
                xml.push_str("    </testcase>\n");
            }
            _ => {
                let _ = writeln!(
                    xml,
                    "    <testcase name=\"{name}\" classname=\"{classname}\" time=\"{case_time:.3}\"/>"
                );
            }
        }
    }

    xml.push_str("  </testsuite>\n");
    xml.push_str("</testsuites>\n");
    xml
}

/// Escape XML special characters for attribute and text content.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
