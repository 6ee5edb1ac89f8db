//! Property tests for schedule arithmetic over generated records.

use chrono::Datelike;
use fanboard_core::WeekStart;
use fanboard_schedule::{
    build_month_grid, days_until, local_today, to_local, todays_events, upcoming, ScheduleMath,
};
use fanboard_test_utils::{assertions, fixtures, generators};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Upcoming lists hold no past events and stay within the limit.
    #[test]
    fn prop_upcoming_sorted_and_bounded(
        events in generators::arb_events(40),
        offset in generators::arb_offset_minutes(),
        now in generators::arb_timestamp(),
        limit in 1usize..10,
    ) {
        let today = local_today(now, offset).unwrap();
        let result = upcoming(&events, offset, today, limit).unwrap();
        prop_assert!(result.len() <= limit);
        prop_assert!(result.entries.iter().all(|e| e.day_offset >= 0));
        assertions::assert_sorted_by_day(&result);
        prop_assert!(result.rejected.is_empty());
    }

    /// Day offsets agree with the localized calendar date, whatever the time of day.
    #[test]
    fn prop_day_offset_matches_local_dates(
        event in generators::arb_event(),
        offset in generators::arb_offset_minutes(),
        now in generators::arb_timestamp(),
    ) {
        let today = local_today(now, offset).unwrap();
        let instant = to_local(&event.timestamp_utc, offset).unwrap();
        let result = upcoming(std::slice::from_ref(&event), offset, today, 1).unwrap();
        let expected = days_until(instant.local_date, today);
        if expected >= 0 {
            prop_assert_eq!(result.day_offsets(), vec![expected]);
        } else {
            prop_assert!(result.is_empty());
        }
    }

    /// Today's list is exactly the events on the local date, sorted by time.
    #[test]
    fn prop_todays_events_share_date(
        events in generators::arb_events(40),
        offset in generators::arb_offset_minutes(),
        now in generators::arb_timestamp(),
    ) {
        let today = local_today(now, offset).unwrap();
        let result = todays_events(&events, offset, today).unwrap();
        prop_assert!(result.entries.iter().all(|e| e.instant.local_date == today));
        prop_assert!(result
            .entries
            .windows(2)
            .all(|w| w[0].instant.local_time <= w[1].instant.local_time));
    }

    /// Grids have the right shape, and every annotated cell holds an event
    /// that localizes to that cell's date.
    #[test]
    fn prop_grid_cells_match_events(
        (year, month) in generators::arb_year_month(),
        events in generators::arb_events(40),
        offset in generators::arb_offset_minutes(),
        week_start in generators::arb_week_start(),
    ) {
        let grid = build_month_grid(year, month, &events, offset, week_start).unwrap();
        assertions::assert_grid_well_formed(&grid);
        for cell in grid.annotated() {
            let event = cell.event.as_ref().unwrap();
            let instant = to_local(&event.timestamp_utc, offset).unwrap();
            prop_assert_eq!(instant.local_date, cell.date);
        }
    }

    /// Bad records are reported, never placed on a fallback date.
    #[test]
    fn prop_malformed_records_rejected(
        good in generators::arb_events(10),
        bad in prop::collection::vec(generators::arb_malformed_event(), 1..5),
        offset in generators::arb_offset_minutes(),
        now in generators::arb_timestamp(),
    ) {
        let today = local_today(now, offset).unwrap();
        let mut events = good.clone();
        events.extend(bad.iter().cloned());
        let result = upcoming(&events, offset, today, usize::MAX).unwrap();
        prop_assert_eq!(result.rejected.len(), bad.len());
        prop_assert!(result.len() <= good.len());
    }
}

#[test]
fn test_fixture_month_in_both_conventions() {
    let events = fixtures::sample_events();
    for (week_start, blanks) in [(WeekStart::Sunday, 4), (WeekStart::Monday, 3)] {
        let math = ScheduleMath::new(540, week_start).unwrap();
        let grid = math.build_month_grid(2026, 1, &events).unwrap();
        assert_eq!(grid.leading_blanks, blanks);
        assert_eq!(grid.days.len(), 31);
        assert_eq!(grid.weeks().len(), 5);
    }
}

#[test]
fn test_fixture_today_list() {
    let math = ScheduleMath::from_config(&fixtures::default_config()).unwrap();
    let today = math.today_at(fixtures::reference_now());
    assert_eq!(today.day(), 9);

    let todays = math.todays_events(&fixtures::sample_events(), today).unwrap();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays.entries[0].event.title, "Birthday");
}
