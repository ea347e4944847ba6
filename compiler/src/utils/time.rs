//! Time utility functions

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};

/// Calendar date at UTC midnight
pub fn date_to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Start of the UTC day containing `instant`
pub fn start_of_utc_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    date_to_utc_midnight(instant.date_naive())
}

/// Half-open `[start, end)` bounds of the UTC day containing `instant`.
///
/// Returns `None` only at the very end of chrono's representable range.
pub fn utc_day_bounds(instant: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_utc_day(instant);
    let end = start.checked_add_days(Days::new(1))?;
    Some((start, end))
}

/// Format an instant as RFC 3339 UTC with millisecond precision
pub fn to_iso_millis(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
