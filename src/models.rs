use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// One call row from the tracking sheet. Monetary fields arrive as loosely
/// formatted strings ("$1,000", "3000", "") and stay that way until the
/// metrics layer parses them.
#[derive(Debug, Clone, Default)]
pub struct CallRecord {
    pub prospect_name: String,
    pub call_outcome: String,
    pub cash_collected: String,
    pub revenue_generated: String,
    pub setter_name: String,
    pub closer_name: String,
    pub date_taken: String,
}

/// One lead-application row from the second sheet.
#[derive(Debug, Clone, Default)]
pub struct LeadRecord {
    pub submitted_at: String,
}

/// Inclusive date window. Either bound may be open; both absent means no
/// filtering at all.
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Builds a range from CLI-style bounds. Accepts RFC 3339 or a plain
    /// `YYYY-MM-DD`; a date-only `to` extends to the end of that day so the
    /// interval stays inclusive.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> anyhow::Result<Self> {
        let from = from
            .map(|raw| parse_bound(raw, false).with_context(|| format!("invalid --from: {raw}")))
            .transpose()?;
        let to = to
            .map(|raw| parse_bound(raw, true).with_context(|| format!("invalid --to: {raw}")))
            .transpose()?;
        Ok(Self { from, to })
    }
}

fn parse_bound(raw: &str, end_of_day: bool) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    let naive = time.context("invalid time of day")?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Parses the sheet's free-form call timestamps, trying the shapes the form
/// actually produces in order of how often they show up.
pub fn parse_call_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in ["%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

/// Aggregate KPIs over a filtered record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSummary {
    pub cash_collected: f64,
    pub revenue_generated: f64,
    pub calls_due: usize,
    pub calls_taken: usize,
    pub calls_closed: usize,
    pub show_rate: f64,
    pub close_rate: f64,
}

/// Per-closer rollup. Commission is 10% of cash collected on taken calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CloserMetric {
    pub name: String,
    pub calls: usize,
    pub closes: usize,
    pub close_rate: f64,
    pub revenue: f64,
    pub cash_collected: f64,
    pub commission: f64,
}

/// Per-setter rollup. Commission is 5% of all cash attributed to the setter.
#[derive(Debug, Clone, PartialEq)]
pub struct SdrMetric {
    pub name: String,
    pub calls_due: usize,
    pub shows: usize,
    pub show_rate: f64,
    pub cash_collected: f64,
    pub commission: f64,
}

/// Revenue summed per closer name.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenuePoint {
    pub closer: String,
    pub revenue: f64,
}

/// One slice of a categorical breakdown (outcomes, lead sources).
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownSlice {
    pub label: String,
    pub value: f64,
}

/// One day of a rate trend, already relabeled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub rate: f64,
}

/// One day of a count trend (lead applications).
#[derive(Debug, Clone, PartialEq)]
pub struct CountPoint {
    pub date: String,
    pub count: usize,
}

/// Calls taken per weekday; all seven days are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub calls: usize,
}

/// One row of the detailed calls table, pre-formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub prospect: String,
    pub source: String,
    pub date_taken: String,
    pub setter: String,
    pub closer: String,
    pub outcome: String,
    pub cash_collected: String,
    pub setter_show_rate: String,
    pub closer_close_rate: String,
    pub avg_deal_size: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn call_dates_parse_in_common_sheet_shapes() {
        assert!(parse_call_date("2026-04-28").is_some());
        assert!(parse_call_date("4/28/2026").is_some());
        assert!(parse_call_date("04/28/2026 15:30:00").is_some());
        assert!(parse_call_date("2026-04-28T10:00:00Z").is_some());
        assert!(parse_call_date("").is_none());
        assert!(parse_call_date("next Tuesday").is_none());
    }

    #[test]
    fn range_parse_extends_date_only_upper_bound() {
        let range = DateRange::parse(Some("2026-01-01"), Some("2026-01-31")).unwrap();
        assert_eq!(range.from.unwrap().hour(), 0);
        let to = range.to.unwrap();
        assert_eq!((to.hour(), to.minute(), to.second()), (23, 59, 59));
    }

    #[test]
    fn range_parse_rejects_garbage_bounds() {
        assert!(DateRange::parse(Some("not a date"), None).is_err());
    }

    #[test]
    fn absent_bounds_mean_unbounded() {
        let range = DateRange::parse(None, None).unwrap();
        assert!(range.is_unbounded());
    }
}
