//! Month-view calendar layout.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use fanboard_core::{DayCell, MonthGrid, ScheduleError, ScheduleEvent, ScheduleResult, WeekStart};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::localize::{fixed_offset, localize_event};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn first_of_month(year: i32, month: u32) -> ScheduleResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ScheduleError::InvalidMonth { year, month })
}

/// Length of a month, taken as the day before the first of the next month.
/// December is always 31 days, which also covers the last representable year.
pub fn days_in_month(year: i32, month: u32) -> ScheduleResult<u32> {
    first_of_month(year, month)?;
    if month == 12 {
        return Ok(31);
    }

    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .ok_or(ScheduleError::InvalidMonth { year, month })
}

/// Lay out one month: leading blanks up to the weekday of the 1st, then one
/// cell per day.
///
/// Each day gets the first event (in input order) whose local date falls on
/// it. Later events on the same day are not shown; records with unparsable
/// timestamps are skipped and listed in `rejected`.
pub fn build_month_grid(
    year: i32,
    month: u32,
    events: &[ScheduleEvent],
    offset_minutes: i32,
    week_start: WeekStart,
) -> ScheduleResult<MonthGrid> {
    let first = first_of_month(year, month)?;
    let length = days_in_month(year, month)?;
    fixed_offset(offset_minutes)?;

    let mut rejected = Vec::new();
    let mut by_date: HashMap<NaiveDate, &ScheduleEvent> = HashMap::new();
    for event in events {
        match localize_event(event, offset_minutes) {
            Ok(instant) => {
                let local = instant.local_date;
                if local.year() == year && local.month() == month {
                    by_date.entry(local).or_insert(event);
                }
            }
            Err(err) => {
                warn!(event_id = ?event.id, error = %err, "skipping schedule record");
                rejected.push(err);
            }
        }
    }

    let days = (1..=length)
        .filter_map(|day| first.with_day(day))
        .map(|date| DayCell {
            date,
            event: by_date.get(&date).map(|event| (*event).clone()),
        })
        .collect();

    Ok(MonthGrid {
        year,
        month,
        week_start,
        leading_blanks: week_start.column_of(first.weekday()),
        days,
        rejected,
    })
}

// ============================================================================
// MONTH NAVIGATION
// ============================================================================

/// The month currently shown by a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> ScheduleResult<Self> {
        first_of_month(year, month)?;
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).saturating_sub(1) % 12]
    }

    /// The previous month, wrapping January back into December.
    pub fn prev(&self) -> ScheduleResult<Self> {
        if self.month == 1 {
            let year = self
                .year
                .checked_sub(1)
                .ok_or(ScheduleError::InvalidMonth { year: self.year, month: 0 })?;
            Self::new(year, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The next month, wrapping December into January.
    pub fn next(&self) -> ScheduleResult<Self> {
        if self.month == 12 {
            let year = self
                .year
                .checked_add(1)
                .ok_or(ScheduleError::InvalidMonth { year: self.year, month: 13 })?;
            Self::new(year, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Lay out this month with [`build_month_grid`].
    pub fn grid(
        &self,
        events: &[ScheduleEvent],
        offset_minutes: i32,
        week_start: WeekStart,
    ) -> ScheduleResult<MonthGrid> {
        build_month_grid(self.year, self.month, events, offset_minutes, week_start)
    }
}
