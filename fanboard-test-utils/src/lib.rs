//! fanboard Test Utilities
//!
//! Shared test infrastructure for the fanboard workspace:
//! - Proptest generators for schedule records, offsets and months
//! - An in-memory, call-counting mock fetcher
//! - Fixtures covering current and legacy document shapes
//! - Assertions for derived calendar values and error variants

pub use fanboard_core::{
    ConfigError, DataLayerConfig, DatedEvents, DecodeError, EventId, FanboardError, FetchError,
    KeyError, MonthGrid, ResourceStatus, ScheduleError, ScheduleEvent, WeekStart,
};
pub use fanboard_storage::{ResourceFetcher, ResourceKey};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

// ============================================================================
// MOCK FETCHER
// ============================================================================

/// In-memory fetcher keyed by location.
///
/// Counts every call and can hold fetches back on a gate so tests can pile
/// up concurrent requests while the first fetch is still in flight.
#[derive(Debug, Default)]
pub struct MockFetcher {
    documents: HashMap<String, Result<Vec<u8>, FetchError>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `location`.
    pub fn with_document(mut self, location: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(location.into(), Ok(body.into()));
        self
    }

    /// Fail every fetch of `location` with `err`.
    pub fn with_failure(mut self, location: impl Into<String>, err: FetchError) -> Self {
        self.documents.insert(location.into(), Err(err));
        self
    }

    /// Block each fetch until a permit is added to `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Locations fetched, in call order.
    pub fn requested_locations(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    async fn fetch(&self, key: &ResourceKey, location: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());

        if let Some(gate) = &self.gate {
            // Permits are consumed, so each release lets exactly one fetch through.
            let permit = gate.acquire().await.map_err(|e| FetchError::Transport {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            permit.forget();
        }

        match self.documents.get(location) {
            Some(outcome) => outcome.clone(),
            None => Err(FetchError::NotFound {
                key: key.to_string(),
                location: location.to_string(),
            }),
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for schedule inputs.

    use super::*;
    use proptest::prelude::*;

    /// Generate an instant between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
        })
    }

    /// Generate an RFC 3339 UTC timestamp string.
    pub fn arb_timestamp_string() -> impl Strategy<Value = String> {
        arb_timestamp().prop_map(|ts| ts.to_rfc3339())
    }

    /// Generate a valid display offset in minutes (strictly inside one day).
    pub fn arb_offset_minutes() -> impl Strategy<Value = i32> {
        prop_oneof![
            Just(540),
            Just(0),
            Just(-300),
            Just(330),
            Just(345),
            -1439i32..=1439,
        ]
    }

    /// Generate a (year, month) pair.
    pub fn arb_year_month() -> impl Strategy<Value = (i32, u32)> {
        (1990i32..2100, 1u32..=12)
    }

    pub fn arb_week_start() -> impl Strategy<Value = WeekStart> {
        prop_oneof![Just(WeekStart::Sunday), Just(WeekStart::Monday)]
    }

    /// Generate a schedule record with a valid timestamp.
    pub fn arb_event() -> impl Strategy<Value = ScheduleEvent> {
        (
            any::<u32>(),
            arb_timestamp_string(),
            "[A-Za-z ]{0,16}",
            prop_oneof![Just("birthday"), Just("broadcast"), Just("release"), Just("")],
        )
            .prop_map(|(id, ts, title, category)| {
                ScheduleEvent::new(u64::from(id), ts)
                    .with_title(title)
                    .with_category(category)
            })
    }

    /// Generate a schedule record whose timestamp cannot be parsed.
    pub fn arb_malformed_event() -> impl Strategy<Value = ScheduleEvent> {
        (
            any::<u32>(),
            prop_oneof![
                Just(String::new()),
                Just("soon".to_string()),
                Just("2026-13-40T99:00:00Z".to_string()),
                "[a-z]{1,8}",
            ],
        )
            .prop_map(|(id, ts)| ScheduleEvent::new(u64::from(id), ts))
    }

    pub fn arb_events(max: usize) -> impl Strategy<Value = Vec<ScheduleEvent>> {
        prop::collection::vec(arb_event(), 0..max)
    }

    /// Generate a configuration that passes validation.
    pub fn arb_valid_config() -> impl Strategy<Value = DataLayerConfig> {
        (
            prop_oneof![
                Just("/data/{key}.json".to_string()),
                Just("static/{key}".to_string()),
                Just("https://cdn.example.com/v1/{key}.json".to_string()),
            ],
            arb_offset_minutes(),
            arb_week_start(),
            1usize..20,
            proptest::option::of(1u64..60_000),
        )
            .prop_map(|(template, offset, week_start, limit, timeout_ms)| {
                let mut config = DataLayerConfig::new()
                    .with_path_template(template)
                    .with_utc_offset_minutes(offset)
                    .with_week_start(week_start)
                    .with_upcoming_limit(limit);
                config.fetch_timeout_ms = timeout_ms;
                config
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built documents and values for common scenarios.

    use super::*;
    use chrono::TimeZone;
    use std::path::Path;

    /// A `schedules` document in the current field naming.
    pub const SCHEDULES_JSON: &str = r#"[
        { "id": "birthday-2026", "timestampUtc": "2026-01-08T15:00:00Z", "title": "Birthday", "category": "birthday" },
        { "id": "live-0112", "timestampUtc": "2026-01-12T10:00:00Z", "title": "Live stream", "category": "broadcast" },
        { "id": "album-3", "timestampUtc": "2026-01-20T00:00:00Z", "title": "3rd album", "category": "release" },
        { "id": "fanmeet", "timestampUtc": "2026-02-14T05:30:00Z", "title": "Fan meeting", "description": "Seoul" },
        { "id": "past-show", "timestampUtc": "2025-12-24T11:00:00Z", "title": "Christmas show" }
    ]"#;

    /// A `schedules` document using older field names and numeric ids.
    pub const LEGACY_SCHEDULES_JSON: &str = r#"[
        { "id": 1, "date": "2026-01-09T03:00:00Z", "title": "Radio", "type": "broadcast", "desc": "Guest spot" },
        { "id": 2, "isoDate": "2026-01-10", "title": "Pop-up store", "type": "goods" },
        { "date": "2026-01-11T12:00:00", "title": "Untimed" }
    ]"#;

    /// A `schedules` document with unusable timestamps (text, null, number,
    /// missing) among valid records.
    pub const MIXED_SCHEDULES_JSON: &str = r#"[
        { "id": "ok-1", "timestampUtc": "2026-01-10T00:00:00Z" },
        { "id": "broken", "timestampUtc": "next week" },
        { "id": "null-stamp", "timestampUtc": null },
        { "id": "numeric-stamp", "timestampUtc": 1767890000 },
        { "id": "no-stamp", "title": "TBA" },
        { "id": "ok-2", "timestampUtc": "2026-01-11T00:00:00Z" }
    ]"#;

    /// The instant most schedule tests treat as "now": 2026-01-08 20:00 UTC,
    /// which is already 2026-01-09 05:00 at UTC+9.
    pub fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 8, 20, 0, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Default configuration: UTC+9, Sunday-start grid, four upcoming items.
    pub fn default_config() -> DataLayerConfig {
        DataLayerConfig::default()
    }

    pub fn sample_events() -> Vec<ScheduleEvent> {
        serde_json::from_str(SCHEDULES_JSON).unwrap_or_default()
    }

    pub fn legacy_events() -> Vec<ScheduleEvent> {
        serde_json::from_str(LEGACY_SCHEDULES_JSON).unwrap_or_default()
    }

    /// Fetcher serving the sample documents under the default template.
    pub fn sample_fetcher() -> MockFetcher {
        MockFetcher::new()
            .with_document("/data/schedules.json", SCHEDULES_JSON)
            .with_document("/data/legacy.json", LEGACY_SCHEDULES_JSON)
            .with_document("/data/mixed.json", MIXED_SCHEDULES_JSON)
            .with_document("/data/malformed.json", "{ \"schedules\": [")
    }

    /// Write `body` to `<root>/data/<key>.json`, the layout `FsFetcher`
    /// reads under the default template.
    pub fn write_document(root: &Path, key: &str, body: &str) -> std::io::Result<()> {
        let dir = root.join("data");
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(format!("{key}.json")), body)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for derived calendar values and error variants.

    use super::*;
    use chrono::Datelike;

    /// Assert that entries are in ascending day-offset order.
    #[track_caller]
    pub fn assert_sorted_by_day(events: &DatedEvents) {
        let offsets = events.day_offsets();
        assert!(
            offsets.windows(2).all(|w| w[0] <= w[1]),
            "Expected ascending day offsets, got: {:?}",
            offsets
        );
    }

    /// Assert that a grid has one cell per day of its month, in order, and
    /// that the leading blanks fit in one week row.
    #[track_caller]
    pub fn assert_grid_well_formed(grid: &MonthGrid) {
        assert!(grid.leading_blanks < 7, "Too many leading blanks: {}", grid.leading_blanks);
        assert!((28..=31).contains(&grid.days.len()), "Bad month length: {}", grid.days.len());
        for (i, cell) in grid.days.iter().enumerate() {
            assert_eq!(cell.date.year(), grid.year);
            assert_eq!(cell.date.month(), grid.month);
            assert_eq!(cell.date.day() as usize, i + 1, "Days out of order at index {}", i);
        }
        assert_eq!(
            grid.cell_count(),
            grid.leading_blanks as usize + grid.days.len()
        );
    }

    /// Assert that a result failed with a fetch error.
    #[track_caller]
    pub fn assert_fetch_error<T: std::fmt::Debug>(result: &Result<T, FanboardError>) {
        match result {
            Err(FanboardError::Fetch(_)) => {}
            other => panic!("Expected Fetch error, got: {:?}", other),
        }
    }

    /// Assert that a result failed with a decode error.
    #[track_caller]
    pub fn assert_decode_error<T: std::fmt::Debug>(result: &Result<T, FanboardError>) {
        match result {
            Err(FanboardError::Decode(_)) => {}
            other => panic!("Expected Decode error, got: {:?}", other),
        }
    }

    /// Assert that a record was rejected for the given event id.
    #[track_caller]
    pub fn assert_rejected(events: &DatedEvents, event_id: &str) {
        let found = events.rejected.iter().any(|err| {
            matches!(
                err,
                ScheduleError::InvalidTimestamp { event_id: Some(id), .. } if id == event_id
            )
        });
        assert!(found, "Expected {:?} to be rejected, got: {:?}", event_id, events.rejected);
    }
}
