//! Day-offset views over a list of schedule events.
//!
//! Every function here localizes records one at a time: a record whose
//! timestamp does not parse is reported in `DatedEvents::rejected` and the
//! rest of the list is still produced.

use chrono::NaiveDate;
use fanboard_core::{DatedEvent, DatedEvents, ScheduleEvent, ScheduleResult};
use tracing::warn;

use crate::dday::days_until;
use crate::localize::{fixed_offset, localize_event};

/// Localize every event against `today`, keeping input order.
pub fn localize_events(
    events: &[ScheduleEvent],
    offset_minutes: i32,
    today: NaiveDate,
) -> ScheduleResult<DatedEvents> {
    fixed_offset(offset_minutes)?;

    let mut dated = DatedEvents::default();
    for event in events {
        match localize_event(event, offset_minutes) {
            Ok(instant) => dated.entries.push(DatedEvent {
                event: event.clone(),
                day_offset: days_until(instant.local_date, today),
                instant,
            }),
            Err(err) => {
                warn!(event_id = ?event.id, error = %err, "skipping schedule record");
                dated.rejected.push(err);
            }
        }
    }
    Ok(dated)
}

/// Events from today onward, soonest first, at most `limit` of them.
///
/// Past events are dropped, not clamped to today. Events on the same day keep
/// their input order.
pub fn upcoming(
    events: &[ScheduleEvent],
    offset_minutes: i32,
    today: NaiveDate,
    limit: usize,
) -> ScheduleResult<DatedEvents> {
    let mut dated = localize_events(events, offset_minutes, today)?;
    dated.entries.retain(|entry| entry.day_offset >= 0);
    // sort_by_key is stable
    dated.entries.sort_by_key(|entry| entry.day_offset);
    dated.entries.truncate(limit);
    Ok(dated)
}

/// Events on today's local date, ordered by local time of day.
pub fn todays_events(
    events: &[ScheduleEvent],
    offset_minutes: i32,
    today: NaiveDate,
) -> ScheduleResult<DatedEvents> {
    let mut dated = localize_events(events, offset_minutes, today)?;
    dated.entries.retain(|entry| entry.day_offset == 0);
    dated.entries.sort_by_key(|entry| entry.instant.local_time);
    Ok(dated)
}
