use std::collections::HashMap;

use crate::metrics::{filter_records, is_closed, is_due, is_taken, parse_money, rate};
use crate::models::{parse_call_date, CallRecord, DateRange, TableRow};

#[derive(Default)]
struct SetterStats {
    calls_due: usize,
    calls_taken: usize,
}

#[derive(Default)]
struct CloserStats {
    calls_taken: usize,
    calls_closed: usize,
    revenue: f64,
}

/// Projects filtered records into display rows, one per record in order.
///
/// The per-row setter show rate, closer close rate, and closer average deal
/// size are computed over the whole filtered set, so every row for the same
/// actor shows the same figure.
pub fn compute_table_rows(records: &[CallRecord], range: &DateRange) -> Vec<TableRow> {
    let filtered = filter_records(records, range);

    let mut setters: HashMap<String, SetterStats> = HashMap::new();
    let mut closers: HashMap<String, CloserStats> = HashMap::new();

    for record in &filtered {
        let setter = setters.entry(display_name(&record.setter_name)).or_default();
        let closer = closers.entry(display_name(&record.closer_name)).or_default();

        let outcome = record.call_outcome.as_str();
        if is_due(outcome) {
            setter.calls_due += 1;
        }
        if is_taken(outcome) {
            setter.calls_taken += 1;
            closer.calls_taken += 1;
        }
        if is_closed(outcome) {
            closer.calls_closed += 1;
            closer.revenue += parse_money(&record.revenue_generated);
        }
    }

    filtered
        .iter()
        .map(|record| {
            let setter_name = display_name(&record.setter_name);
            let closer_name = display_name(&record.closer_name);

            let setter = &setters[&setter_name];
            let closer = &closers[&closer_name];

            let avg_deal_size = if closer.calls_closed > 0 {
                closer.revenue / closer.calls_closed as f64
            } else {
                0.0
            };

            TableRow {
                prospect: or_na(&record.prospect_name),
                source: "Youtube".to_string(),
                date_taken: table_date(&record.date_taken),
                setter: setter_name,
                closer: closer_name,
                outcome: or_na(&record.call_outcome),
                cash_collected: format_currency(parse_money(&record.cash_collected)),
                setter_show_rate: format_percent(rate(setter.calls_taken, setter.calls_due)),
                closer_close_rate: format_percent(rate(closer.calls_closed, closer.calls_taken)),
                avg_deal_size: format_currency(avg_deal_size),
            }
        })
        .collect()
}

fn display_name(raw: &str) -> String {
    if raw.is_empty() {
        "Unknown".to_string()
    } else {
        raw.to_string()
    }
}

fn or_na(raw: &str) -> String {
    if raw.is_empty() {
        "N/A".to_string()
    } else {
        raw.to_string()
    }
}

fn table_date(raw: &str) -> String {
    if raw.is_empty() {
        return "N/A".to_string();
    }
    match parse_call_date(raw) {
        Some(taken_at) => taken_at.format("%-m/%-d/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// `$1,234.50` style: dollar sign, thousands separators, exactly two
/// decimals.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// One decimal place with a trailing percent sign.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        date: &str,
        outcome: &str,
        setter: &str,
        closer: &str,
        cash: &str,
        revenue: &str,
    ) -> CallRecord {
        CallRecord {
            prospect_name: "Divyesh".to_string(),
            call_outcome: outcome.to_string(),
            cash_collected: cash.to_string(),
            revenue_generated: revenue.to_string(),
            setter_name: setter.to_string(),
            closer_name: closer.to_string(),
            date_taken: date.to_string(),
        }
    }

    #[test]
    fn currency_formatting_adds_separators_and_two_decimals() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-250.0), "-$250.00");
    }

    #[test]
    fn percent_formatting_keeps_one_decimal() {
        assert_eq!(format_percent(33.333), "33.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn one_row_per_filtered_record_in_order() {
        let records = vec![
            record("2026-01-06", "Closed", "Ava", "Mike", "$1000", "$2000"),
            record("2026-01-05", "No Show", "Ava", "Mike", "", ""),
        ];
        let rows = compute_table_rows(&records, &DateRange::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date_taken, "1/6/2026");
        assert_eq!(rows[1].date_taken, "1/5/2026");
    }

    #[test]
    fn actor_rates_are_computed_over_the_whole_filtered_set() {
        let records = vec![
            record("2026-01-05", "Closed", "Ava", "Mike", "$1000", "$2000"),
            record("2026-01-06", "No Show", "Ava", "Mike", "", ""),
        ];
        let rows = compute_table_rows(&records, &DateRange::default());
        // Ava: 2 due, 1 taken; Mike: 1 taken, 1 closed, $2000 closed revenue
        for row in &rows {
            assert_eq!(row.setter_show_rate, "50.0%");
            assert_eq!(row.closer_close_rate, "100.0%");
            assert_eq!(row.avg_deal_size, "$2,000.00");
        }
        assert_eq!(rows[0].cash_collected, "$1,000.00");
        assert_eq!(rows[1].cash_collected, "$0.00");
    }

    #[test]
    fn blank_fields_fall_back_to_placeholders() {
        let mut bare = record("", "", "", "", "", "");
        bare.prospect_name = String::new();
        let rows = compute_table_rows(&[bare], &DateRange::default());
        let row = &rows[0];
        assert_eq!(row.prospect, "N/A");
        assert_eq!(row.outcome, "N/A");
        assert_eq!(row.date_taken, "N/A");
        assert_eq!(row.setter, "Unknown");
        assert_eq!(row.closer, "Unknown");
    }

    #[test]
    fn avg_deal_size_is_zero_without_closes() {
        let records = vec![record("2026-01-05", "No Show", "Ava", "Mike", "", "")];
        let rows = compute_table_rows(&records, &DateRange::default());
        assert_eq!(rows[0].avg_deal_size, "$0.00");
    }
}
