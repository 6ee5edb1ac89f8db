//! Day-offset ("D-day") arithmetic on local calendar dates.

use chrono::NaiveDate;

/// Signed number of calendar days from `today` to `local_date`.
///
/// Both sides are dates, so there is no time-of-day to round: an event at
/// 23:59 tomorrow and one at 00:01 tomorrow are both `1`.
pub fn days_until(local_date: NaiveDate, today: NaiveDate) -> i64 {
    local_date.signed_duration_since(today).num_days()
}

/// Badge text for a day offset: `D-Day`, `D-3` (upcoming) or `D+2` (past).
pub fn dday_label(day_offset: i64) -> String {
    match day_offset {
        0 => "D-Day".to_string(),
        n if n > 0 => format!("D-{}", n),
        n => format!("D+{}", n.unsigned_abs()),
    }
}
