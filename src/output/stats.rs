//! Request statistics report

use crate::http::StatsSnapshot;

/// Formats HTTP counters for display after a command
///
/// # Arguments
///
/// * `stats` - Snapshot taken from the shared client
///
/// # Returns
///
/// A multi-line plain-text report
pub fn format_http_stats(stats: &StatsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("HTTP statistics\n");
    out.push_str(&format!("  Requests:     {}\n", stats.requests));
    out.push_str(&format!("  Successful:   {}\n", stats.successes));
    out.push_str(&format!("  Not found:    {}\n", stats.not_found));
    out.push_str(&format!("  Retries:      {}\n", stats.retries));
    out.push_str(&format!("  Errors:       {}\n", stats.errors));
    out.push_str(&format!(
        "  Error rate:   {:.2}%\n",
        stats.error_rate()
    ));
    out.push_str(&format!(
        "  Received:     {:.1} KiB\n",
        stats.bytes_received as f64 / 1024.0
    ));
    if let Some(latency) = stats.average_latency() {
        out.push_str(&format!(
            "  Avg latency:  {:.0} ms\n",
            latency.as_secs_f64() * 1000.0
        ));
    }

    out
}
