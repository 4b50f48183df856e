use std::fmt::Write;

use crate::orchestrator::SuiteReport;
use crate::stats::{Bin, Stats};

/// Widest histogram bar, in characters.
pub const BAR_WIDTH: usize = 40;

pub fn ns_to_ms(ns: u64) -> f64 {
    ns as f64 / 1_000_000.0
}

/// Column header matching [`format_stats_row`].
pub fn header_row() -> String {
    format!(
        "{:<30} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Strategy", "n", "min ms", "avg ms", "p50 ms", "p90 ms", "p99 ms", "p99.9 ms", "max ms"
    )
}

pub fn format_stats_row(label: &str, stats: &Stats) -> String {
    format!(
        "{:<30} {:>6} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
        label,
        stats.count,
        ns_to_ms(stats.minimum),
        ns_to_ms(stats.average),
        ns_to_ms(stats.p50),
        ns_to_ms(stats.p90),
        ns_to_ms(stats.p99),
        ns_to_ms(stats.p999),
        ns_to_ms(stats.maximum),
    )
}

/// One line per bin: the bin's lower edge in ms, a bar scaled so the fullest bin spans
/// `width` characters, and the raw count.
pub fn render_histogram(bins: &[Bin], width: usize) -> Vec<String> {
    let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0);
    bins.iter()
        .map(|bin| {
            let len = if tallest == 0 { 0 } else { bin.count * width / tallest };
            format!(
                "{:>10.3} ms |{:<width$}| {}",
                bin.range.start / 1_000_000.0,
                "#".repeat(len),
                bin.count,
                width = width
            )
        })
        .collect()
}

/// Full text report: summary table sorted by p99, then optionally each strategy's histogram.
pub fn render_report(report: &SuiteReport, with_histograms: bool) -> String {
    let mut out = String::new();
    let rows = report.sorted_by_p99();

    writeln!(out, "Hand-off Latency Results").ok();
    writeln!(out, "========================").ok();
    writeln!(out, "Elapsed:               {} s", report.elapsed_secs()).ok();
    writeln!(out, "Strategies:            {}", rows.len()).ok();
    writeln!(out).ok();
    writeln!(out, "{}", header_row()).ok();
    for (strategy, samples) in &rows {
        writeln!(out, "{}", format_stats_row(strategy.label(), samples.stats())).ok();
    }

    if with_histograms {
        for (strategy, samples) in &rows {
            writeln!(out).ok();
            writeln!(out, "{} ({})", strategy.label(), strategy.as_name()).ok();
            for line in render_histogram(samples.bins(), BAR_WIDTH) {
                writeln!(out, "{line}").ok();
            }
        }
    }
    out
}
