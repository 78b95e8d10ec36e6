use std::fmt::Write as _;

use super::RunReport;

/// Render a self-contained HTML report: summary panel plus a results table.
pub fn render(report: &RunReport) -> String {
    let summary = &report.summary;
    let verdict = if summary.success { "SUCCESS" } else { "FAILURE" };
    let verdict_class = if summary.success { "pass" } else { "fail" };

    let mut rows = String::new();
    for result in &report.results {
        let _ = writeln!(
            rows,
            "      <tr><td>{name}</td><td>{env}</td><td><span class=\"badge {status}\">{status}</span></td><td>{dur} ms</td></tr>",
            name = escape(&result.name),
            env = result.environment,
            status = result.status,
            dur = result.duration_ms,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>taskforge report</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; color: #222; }}
    .panel {{ border: 1px solid #ddd; border-radius: 6px; padding: 1rem 1.5rem; margin-bottom: 1.5rem; }}
    .verdict.pass {{ color: #1a7f37; }}
    .verdict.fail {{ color: #cf222e; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ text-align: left; padding: 0.4rem 0.8rem; border-bottom: 1px solid #eee; }}
    .badge {{ padding: 0.1rem 0.5rem; border-radius: 4px; font-size: 0.85em; }}
    .badge.passed {{ background: #dafbe1; color: #1a7f37; }}
    .badge.failed {{ background: #ffebe9; color: #cf222e; }}
    .badge.skipped {{ background: #eaeef2; color: #57606a; }}
  </style>
</head>
<body>
  <h1>taskforge report</h1>
  <div class="panel">
    <h2 class="verdict {verdict_class}">{verdict}</h2>
    <p>{total} tasks &middot; {passed} passed &middot; {failed} failed &middot; {skipped} skipped</p>
    <p>pass rate {pass_rate:.1}% &middot; duration {duration} ms</p>
  </div>
  <table>
    <thead>
      <tr><th>Task</th><th>Environment</th><th>Status</th><th>Duration</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#,
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        pass_rate = summary.pass_rate,
        duration = summary.duration_ms,
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
