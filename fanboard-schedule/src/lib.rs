//! fanboard Schedule - Date and Calendar Arithmetic
//!
//! Pure, synchronous functions that turn UTC schedule records into
//! display-ready values: fixed-offset localization, day offsets ("D-day"),
//! upcoming and today lists, and month-view calendar grids.
//!
//! All day arithmetic compares local calendar dates, never millisecond
//! differences. Malformed timestamps are reported per record and never
//! replaced with a fallback instant.

pub mod dday;
pub mod grid;
pub mod localize;
pub mod upcoming;

pub use dday::{days_until, dday_label};
pub use grid::{build_month_grid, days_in_month, MonthCursor};
pub use localize::{
    fixed_offset, format_local_time, local_today, localize_event, localize_instant,
    parse_timestamp, to_local, today_in,
};
pub use upcoming::{localize_events, todays_events, upcoming};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fanboard_core::{
    DataLayerConfig, DatedEvents, LocalizedInstant, MonthGrid, ScheduleEvent, ScheduleResult,
    WeekStart,
};

// ============================================================================
// SCHEDULE MATH
// ============================================================================

/// The schedule operations bound to one display offset and week convention.
///
/// Screens build this once from the [`DataLayerConfig`] so every view uses
/// the same offset and the same grid convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleMath {
    offset: FixedOffset,
    offset_minutes: i32,
    week_start: WeekStart,
    upcoming_limit: usize,
}

impl ScheduleMath {
    /// Create with an explicit offset and week start.
    ///
    /// Returns `InvalidOffset` if the offset is a full day or more.
    pub fn new(offset_minutes: i32, week_start: WeekStart) -> ScheduleResult<Self> {
        Ok(Self {
            offset: fixed_offset(offset_minutes)?,
            offset_minutes,
            week_start,
            upcoming_limit: fanboard_core::DEFAULT_UPCOMING_LIMIT,
        })
    }

    /// Create from the data-layer configuration.
    pub fn from_config(config: &DataLayerConfig) -> ScheduleResult<Self> {
        let mut math = Self::new(config.utc_offset_minutes, config.week_start)?;
        math.upcoming_limit = config.upcoming_limit;
        Ok(math)
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn upcoming_limit(&self) -> usize {
        self.upcoming_limit
    }

    /// Localize a timestamp in this offset.
    pub fn to_local(&self, timestamp_utc: &str) -> ScheduleResult<LocalizedInstant> {
        to_local(timestamp_utc, self.offset_minutes)
    }

    /// Local calendar date at `now_utc`.
    pub fn today_at(&self, now_utc: DateTime<Utc>) -> NaiveDate {
        now_utc.with_timezone(&self.offset).date_naive()
    }

    /// Local calendar date now.
    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    pub fn days_until(&self, local_date: NaiveDate, today: NaiveDate) -> i64 {
        days_until(local_date, today)
    }

    /// Upcoming events, limited to `limit` entries.
    pub fn upcoming(
        &self,
        events: &[ScheduleEvent],
        today: NaiveDate,
        limit: usize,
    ) -> ScheduleResult<DatedEvents> {
        upcoming(events, self.offset_minutes, today, limit)
    }

    /// Upcoming events, limited to the configured panel length.
    pub fn upcoming_default(
        &self,
        events: &[ScheduleEvent],
        today: NaiveDate,
    ) -> ScheduleResult<DatedEvents> {
        self.upcoming(events, today, self.upcoming_limit)
    }

    /// Events on `today`, ordered by local time.
    pub fn todays_events(
        &self,
        events: &[ScheduleEvent],
        today: NaiveDate,
    ) -> ScheduleResult<DatedEvents> {
        todays_events(events, self.offset_minutes, today)
    }

    /// Month grid under this instance's week convention.
    pub fn build_month_grid(
        &self,
        year: i32,
        month: u32,
        events: &[ScheduleEvent],
    ) -> ScheduleResult<MonthGrid> {
        build_month_grid(year, month, events, self.offset_minutes, self.week_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fanboard_core::ScheduleError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_config_defaults() {
        let math = ScheduleMath::from_config(&DataLayerConfig::default()).unwrap();
        assert_eq!(math.offset_minutes(), 540);
        assert_eq!(math.week_start(), WeekStart::Sunday);
        assert_eq!(math.upcoming_limit(), 4);
    }

    #[test]
    fn test_new_rejects_bad_offset() {
        assert_eq!(
            ScheduleMath::new(-1440, WeekStart::Sunday).unwrap_err(),
            ScheduleError::InvalidOffset { minutes: -1440 }
        );
    }

    #[test]
    fn test_today_at_applies_offset() {
        let math = ScheduleMath::new(540, WeekStart::Sunday).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 16, 30, 0).unwrap();
        assert_eq!(math.today_at(now), date(2026, 1, 9));
    }

    #[test]
    fn test_upcoming_default_uses_configured_limit() {
        let config = DataLayerConfig::default().with_upcoming_limit(2);
        let math = ScheduleMath::from_config(&config).unwrap();
        let events: Vec<_> = (10..15)
            .map(|d| ScheduleEvent::new(format!("e{d}").as_str(), format!("2026-03-{d}T00:00:00Z")))
            .collect();
        let result = math.upcoming_default(&events, date(2026, 3, 1)).unwrap();
        assert_eq!(result.day_offsets(), vec![9, 10]);
    }

    #[test]
    fn test_build_month_grid_uses_week_start() {
        let math = ScheduleMath::new(540, WeekStart::Monday).unwrap();
        let grid = math.build_month_grid(2026, 1, &[]).unwrap();
        assert_eq!(grid.week_start, WeekStart::Monday);
        assert_eq!(grid.leading_blanks, 3);
    }

    #[test]
    fn test_end_to_end_dday_panel() {
        let math = ScheduleMath::new(540, WeekStart::Sunday).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 20, 0, 0).unwrap();
        let today = math.today_at(now);
        let events = vec![
            ScheduleEvent::new("birthday", "2026-01-08T16:30:00Z"),
            ScheduleEvent::new("concert", "2026-01-12T10:00:00Z"),
        ];
        let panel = math.upcoming(&events, today, 10).unwrap();
        let labels: Vec<String> = panel.entries.iter().map(|e| dday_label(e.day_offset)).collect();
        assert_eq!(labels, vec!["D-Day", "D-3"]);
        assert_eq!(format_local_time(&panel.entries[0].instant), "01:30");
    }
}
