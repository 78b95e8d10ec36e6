use super::RunSummary;

/// Print the human-readable run summary to stdout.
///
/// Always printed after a run, independent of which file artifacts were
/// written.
pub fn print_summary(summary: &RunSummary) {
    let verdict = if summary.success { "SUCCESS" } else { "FAILURE" };
    println!();
    println!("==== run summary ====");
    println!(
        "total: {}  passed: {}  failed: {}  skipped: {}",
        summary.total, summary.passed, summary.failed, summary.skipped
    );
    println!(
        "pass rate: {:.1}%  duration: {:.3}s",
        summary.pass_rate,
        summary.duration_ms as f64 / 1000.0
    );
    println!("result: {verdict}");
}
