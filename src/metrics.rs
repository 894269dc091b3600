use std::collections::HashMap;

use crate::models::{parse_call_date, CallRecord, CloserMetric, DateRange, KpiSummary, SdrMetric};

/// Keeps records inside the closed interval, preserving input order.
///
/// With no bounds set this is the identity. With any bound set, records whose
/// date fails to parse are silently dropped: an active filter can only keep a
/// record it can actually place in time.
pub fn filter_records(records: &[CallRecord], range: &DateRange) -> Vec<CallRecord> {
    if range.is_unbounded() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            let Some(taken_at) = parse_call_date(&record.date_taken) else {
                return false;
            };
            if let Some(from) = range.from {
                if taken_at < from {
                    return false;
                }
            }
            if let Some(to) = range.to {
                if taken_at > to {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Strips currency noise ("$", ",", whitespace) and parses what is left.
/// Anything unparseable, including the empty string, counts as zero.
pub fn parse_money(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// A call was due unless it was cancelled or rescheduled.
pub fn is_due(outcome: &str) -> bool {
    outcome != "Cancelled" && outcome != "Rescheduled"
}

/// A call was taken if it was due and the prospect showed.
pub fn is_taken(outcome: &str) -> bool {
    is_due(outcome) && outcome != "No Show"
}

/// Exact match on purpose: "closed" or "Closed Won" are not closes here.
pub fn is_closed(outcome: &str) -> bool {
    outcome == "Closed"
}

pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

pub fn compute_kpis(records: &[CallRecord], range: &DateRange) -> KpiSummary {
    let filtered = filter_records(records, range);

    let cash_collected = filtered
        .iter()
        .map(|r| parse_money(&r.cash_collected))
        .sum();
    let revenue_generated = filtered
        .iter()
        .map(|r| parse_money(&r.revenue_generated))
        .sum();

    let calls_due = filtered.iter().filter(|r| is_due(&r.call_outcome)).count();
    let calls_taken = filtered
        .iter()
        .filter(|r| is_taken(&r.call_outcome))
        .count();
    let calls_closed = filtered
        .iter()
        .filter(|r| is_closed(&r.call_outcome))
        .count();

    KpiSummary {
        cash_collected,
        revenue_generated,
        calls_due,
        calls_taken,
        calls_closed,
        show_rate: rate(calls_taken, calls_due),
        close_rate: rate(calls_closed, calls_taken),
    }
}

#[derive(Default)]
struct CloserStats {
    calls: usize,
    closes: usize,
    revenue: f64,
    cash_collected: f64,
}

/// Rolls filtered records up per closer. Records with a blank closer name are
/// skipped. Output keeps first-appearance order among the filtered records.
pub fn compute_closer_metrics(records: &[CallRecord], range: &DateRange) -> Vec<CloserMetric> {
    let filtered = filter_records(records, range);

    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, CloserStats> = HashMap::new();

    for record in &filtered {
        let name = record.closer_name.trim();
        if name.is_empty() {
            continue;
        }
        if !stats.contains_key(name) {
            order.push(name.to_string());
        }
        let entry = stats.entry(name.to_string()).or_default();

        let outcome = record.call_outcome.as_str();
        if is_taken(outcome) {
            entry.calls += 1;
            entry.cash_collected += parse_money(&record.cash_collected);
        }
        if is_closed(outcome) {
            entry.closes += 1;
            entry.revenue += parse_money(&record.revenue_generated);
        }
    }

    order
        .into_iter()
        .map(|name| {
            let s = stats.remove(&name).unwrap_or_default();
            CloserMetric {
                close_rate: rate(s.closes, s.calls),
                commission: s.cash_collected * 0.10,
                name,
                calls: s.calls,
                closes: s.closes,
                revenue: s.revenue,
                cash_collected: s.cash_collected,
            }
        })
        .collect()
}

#[derive(Default)]
struct SdrStats {
    calls_due: usize,
    calls_taken: usize,
    cash_collected: f64,
}

/// Rolls filtered records up per setter, in first-appearance order.
///
/// Cash is accumulated for every record attributed to the setter, whether or
/// not the call was due or taken; commission is 5% of that total. That is how
/// setter payouts have always been computed upstream, so it stays.
pub fn compute_sdr_metrics(records: &[CallRecord], range: &DateRange) -> Vec<SdrMetric> {
    let filtered = filter_records(records, range);

    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, SdrStats> = HashMap::new();

    for record in &filtered {
        let name = record.setter_name.trim();
        if name.is_empty() {
            continue;
        }
        if !stats.contains_key(name) {
            order.push(name.to_string());
        }
        let entry = stats.entry(name.to_string()).or_default();

        let outcome = record.call_outcome.as_str();
        if is_due(outcome) {
            entry.calls_due += 1;
        }
        if is_taken(outcome) {
            entry.calls_taken += 1;
        }
        entry.cash_collected += parse_money(&record.cash_collected);
    }

    order
        .into_iter()
        .map(|name| {
            let s = stats.remove(&name).unwrap_or_default();
            SdrMetric {
                show_rate: rate(s.calls_taken, s.calls_due),
                commission: s.cash_collected * 0.05,
                name,
                calls_due: s.calls_due,
                shows: s.calls_taken,
                cash_collected: s.cash_collected,
            }
        })
        .collect()
}
