use std::fmt::Write;

use crate::charts;
use crate::metrics;
use crate::models::{DateRange, KpiSummary};
use crate::source::SheetData;
use crate::table::{format_currency, format_percent};

fn range_label(range: &DateRange) -> String {
    match (range.from, range.to) {
        (None, None) => "all time".to_string(),
        (Some(from), None) => format!("since {}", from.format("%Y-%m-%d")),
        (None, Some(to)) => format!("through {}", to.format("%Y-%m-%d")),
        (Some(from), Some(to)) => {
            format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
        }
    }
}

fn write_kpi_section(output: &mut String, kpis: &KpiSummary) {
    let _ = writeln!(output, "## Team KPIs");
    let _ = writeln!(
        output,
        "- Cash collected: {}",
        format_currency(kpis.cash_collected)
    );
    let _ = writeln!(
        output,
        "- Revenue generated: {}",
        format_currency(kpis.revenue_generated)
    );
    let _ = writeln!(output, "- Calls due: {}", kpis.calls_due);
    let _ = writeln!(output, "- Calls taken: {}", kpis.calls_taken);
    let _ = writeln!(output, "- Calls closed: {}", kpis.calls_closed);
    let _ = writeln!(output, "- Show rate: {}", format_percent(kpis.show_rate));
    let _ = writeln!(output, "- Close rate: {}", format_percent(kpis.close_rate));
}

/// Assembles the full markdown sales report for a window: team KPIs, both
/// rollups, the outcome mix, and the daily trends.
pub fn build_report(sheet: &SheetData, range: &DateRange) -> String {
    let kpis = metrics::compute_kpis(&sheet.calls, range);
    let closers = metrics::compute_closer_metrics(&sheet.calls, range);
    let sdrs = metrics::compute_sdr_metrics(&sheet.calls, range);
    let outcomes = charts::outcome_breakdown(&sheet.calls, range);
    let show_trend = charts::show_rate_trend(&sheet.calls, range);
    let lead_trend = charts::lead_applications_trend(&sheet.leads, range);

    let mut output = String::new();
    let _ = writeln!(output, "# Sales Operations Report");
    let _ = writeln!(output, "Window: {}", range_label(range));
    let _ = writeln!(output);

    write_kpi_section(&mut output, &kpis);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Closers");
    if closers.is_empty() {
        let _ = writeln!(output, "No closer activity in this window.");
    } else {
        for closer in &closers {
            let _ = writeln!(
                output,
                "- {}: {} taken, {} closed ({}), revenue {}, commission {}",
                closer.name,
                closer.calls,
                closer.closes,
                format_percent(closer.close_rate),
                format_currency(closer.revenue),
                format_currency(closer.commission)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Setters");
    if sdrs.is_empty() {
        let _ = writeln!(output, "No setter activity in this window.");
    } else {
        for sdr in &sdrs {
            let _ = writeln!(
                output,
                "- {}: {} due, {} shows ({}), commission {}",
                sdr.name,
                sdr.calls_due,
                sdr.shows,
                format_percent(sdr.show_rate),
                format_currency(sdr.commission)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Outcome Mix");
    if outcomes.is_empty() {
        let _ = writeln!(output, "No calls recorded in this window.");
    } else {
        for slice in &outcomes {
            let _ = writeln!(output, "- {}: {}", slice.label, slice.value as usize);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Show Rate by Day");
    if show_trend.is_empty() {
        let _ = writeln!(output, "No dated calls in this window.");
    } else {
        for point in &show_trend {
            let _ = writeln!(output, "- {}: {}", point.date, format_percent(point.rate));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Lead Applications by Day");
    if lead_trend.is_empty() {
        let _ = writeln!(output, "No lead applications in this window.");
    } else {
        for point in &lead_trend {
            let _ = writeln!(output, "- {}: {}", point.date, point.count);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallRecord;

    fn sheet() -> SheetData {
        SheetData {
            calls: vec![
                CallRecord {
                    prospect_name: "John Doe".to_string(),
                    call_outcome: "Closed".to_string(),
                    cash_collected: "$1,000".to_string(),
                    revenue_generated: "$3,000".to_string(),
                    setter_name: "Ava".to_string(),
                    closer_name: "Joey".to_string(),
                    date_taken: "2026-01-05".to_string(),
                },
                CallRecord {
                    call_outcome: "No Show".to_string(),
                    setter_name: "Ava".to_string(),
                    closer_name: "Joey".to_string(),
                    date_taken: "2026-01-06".to_string(),
                    ..CallRecord::default()
                },
            ],
            leads: Vec::new(),
        }
    }

    #[test]
    fn report_covers_every_section() {
        let report = build_report(&sheet(), &DateRange::default());
        for heading in [
            "# Sales Operations Report",
            "## Team KPIs",
            "## Closers",
            "## Setters",
            "## Outcome Mix",
            "## Show Rate by Day",
            "## Lead Applications by Day",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("Window: all time"));
    }

    #[test]
    fn report_lines_carry_formatted_figures() {
        let report = build_report(&sheet(), &DateRange::default());
        assert!(report.contains("Cash collected: $1,000.00"));
        assert!(report.contains("Show rate: 50.0%"));
        assert!(report.contains("Joey: 1 taken, 1 closed (100.0%)"));
        assert!(report.contains("commission $100.00"));
        assert!(report.contains("No lead applications in this window."));
    }

    #[test]
    fn empty_sheet_report_says_so_instead_of_erroring() {
        let report = build_report(&SheetData::default(), &DateRange::default());
        assert!(report.contains("No closer activity in this window."));
        assert!(report.contains("No calls recorded in this window."));
    }

    #[test]
    fn bounded_window_is_labeled() {
        let range = DateRange::parse(Some("2026-01-01"), Some("2026-01-31")).unwrap();
        let report = build_report(&sheet(), &range);
        assert!(report.contains("Window: 2026-01-01 to 2026-01-31"));
    }
}
