use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::metrics::{filter_records, is_closed, is_due, is_taken, parse_money, rate};
use crate::models::{
    parse_call_date, BreakdownSlice, CallRecord, CountPoint, DateRange, LeadRecord, RevenuePoint,
    TrendPoint, WeekdayCount,
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Revenue per closer for the main dashboard chart. Blank closers land in a
/// synthesized "Unknown" bucket; only positive revenue contributes.
pub fn revenue_by_closer(records: &[CallRecord], range: &DateRange) -> Vec<RevenuePoint> {
    sum_revenue(&filter_records(records, range), true)
}

/// Revenue per closer for the closer screen. Unlike the dashboard series,
/// blank/"Unknown" closers are left out entirely. The screens have always
/// disagreed on this and downstream consumers rely on each variant as-is.
pub fn revenue_by_named_closer(records: &[CallRecord], range: &DateRange) -> Vec<RevenuePoint> {
    sum_revenue(&filter_records(records, range), false)
}

fn sum_revenue(filtered: &[CallRecord], include_unknown: bool) -> Vec<RevenuePoint> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for record in filtered {
        let closer = if record.closer_name.is_empty() {
            "Unknown"
        } else {
            record.closer_name.as_str()
        };
        if !include_unknown && closer == "Unknown" {
            continue;
        }
        let revenue = parse_money(&record.revenue_generated);
        if revenue <= 0.0 {
            continue;
        }
        if !totals.contains_key(closer) {
            order.push(closer.to_string());
        }
        *totals.entry(closer.to_string()).or_insert(0.0) += revenue;
    }

    order
        .into_iter()
        .map(|closer| {
            let revenue = totals.remove(&closer).unwrap_or(0.0);
            RevenuePoint { closer, revenue }
        })
        .collect()
}

/// Counts records per raw outcome string, with blank outcomes shown as
/// "Unknown".
pub fn outcome_breakdown(records: &[CallRecord], range: &DateRange) -> Vec<BreakdownSlice> {
    let filtered = filter_records(records, range);

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, f64> = HashMap::new();

    for record in &filtered {
        let outcome = if record.call_outcome.is_empty() {
            "Unknown"
        } else {
            record.call_outcome.as_str()
        };
        if !counts.contains_key(outcome) {
            order.push(outcome.to_string());
        }
        *counts.entry(outcome.to_string()).or_insert(0.0) += 1.0;
    }

    order
        .into_iter()
        .map(|label| {
            let value = counts.remove(&label).unwrap_or(0.0);
            BreakdownSlice { label, value }
        })
        .collect()
}

/// Lead-source mix. The sheet does not carry a source column yet; every lead
/// comes in through the YouTube funnel, so this is a single fixed bucket.
pub fn lead_source_breakdown() -> Vec<BreakdownSlice> {
    vec![BreakdownSlice {
        label: "YouTube".to_string(),
        value: 100.0,
    }]
}

/// Per-day show rate (taken / due), bucketed by UTC calendar day, ascending.
pub fn show_rate_trend(records: &[CallRecord], range: &DateRange) -> Vec<TrendPoint> {
    daily_rate_trend(records, range, |outcome| {
        (is_due(outcome), is_taken(outcome))
    })
}

/// Per-day close rate (closed / taken), bucketed by UTC calendar day,
/// ascending.
pub fn close_rate_trend(records: &[CallRecord], range: &DateRange) -> Vec<TrendPoint> {
    daily_rate_trend(records, range, |outcome| {
        (is_taken(outcome), is_closed(outcome))
    })
}

fn daily_rate_trend(
    records: &[CallRecord],
    range: &DateRange,
    classify: impl Fn(&str) -> (bool, bool),
) -> Vec<TrendPoint> {
    let filtered = filter_records(records, range);

    let mut days: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
    for record in &filtered {
        let Some(taken_at) = parse_call_date(&record.date_taken) else {
            continue;
        };
        let bucket = days.entry(taken_at.date_naive()).or_insert((0, 0));
        let (denominator, numerator) = classify(&record.call_outcome);
        if denominator {
            bucket.0 += 1;
        }
        if numerator {
            bucket.1 += 1;
        }
    }

    let mut buckets: Vec<(NaiveDate, (usize, usize))> = days.into_iter().collect();
    buckets.sort_by_key(|(date, _)| *date);
    buckets
        .into_iter()
        .map(|(date, (denominator, numerator))| TrendPoint {
            date: short_date_label(date),
            rate: rate(numerator, denominator),
        })
        .collect()
}

/// Lead applications per UTC calendar day, ascending. Rows whose
/// "Submitted At" cannot be parsed have no day to land in and are skipped.
pub fn lead_applications_trend(leads: &[LeadRecord], range: &DateRange) -> Vec<CountPoint> {
    let mut days: HashMap<NaiveDate, usize> = HashMap::new();

    for lead in leads {
        let Some(submitted_at) = parse_call_date(&lead.submitted_at) else {
            continue;
        };
        if let Some(from) = range.from {
            if submitted_at < from {
                continue;
            }
        }
        if let Some(to) = range.to {
            if submitted_at > to {
                continue;
            }
        }
        *days.entry(submitted_at.date_naive()).or_insert(0) += 1;
    }

    let mut buckets: Vec<(NaiveDate, usize)> = days.into_iter().collect();
    buckets.sort_by_key(|(date, _)| *date);
    buckets
        .into_iter()
        .map(|(date, count)| CountPoint {
            date: short_date_label(date),
            count,
        })
        .collect()
}

/// Calls taken per weekday. All seven buckets are always emitted, Sun..Sat,
/// even when zero.
pub fn calls_by_weekday(records: &[CallRecord], range: &DateRange) -> Vec<WeekdayCount> {
    let filtered = filter_records(records, range);

    let mut counts = [0usize; 7];
    for record in &filtered {
        if !is_taken(&record.call_outcome) {
            continue;
        }
        if let Some(taken_at) = parse_call_date(&record.date_taken) {
            counts[taken_at.weekday().num_days_from_sunday() as usize] += 1;
        }
    }

    WEEKDAYS
        .into_iter()
        .zip(counts)
        .map(|(day, calls)| WeekdayCount { day, calls })
        .collect()
}

fn short_date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}
