//! Schedule records and the display structures derived from them.
//!
//! `ScheduleEvent` is the external shape read from the `schedules` resource.
//! Everything else here is derived and ephemeral: produced by the schedule
//! arithmetic for one render and never persisted.

use crate::{ScheduleError, WeekStart};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// SCHEDULE EVENT
// ============================================================================

/// Opaque event identifier.
///
/// Source documents use both strings and integers for ids; both are kept as
/// their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EventId(s),
            RawId::Signed(n) => EventId(n.to_string()),
            RawId::Unsigned(n) => EventId(n.to_string()),
        })
    }
}

/// A schedule record as published in the `schedules` resource.
///
/// Only `timestamp_utc` is interpreted; the display strings pass through
/// untouched. Field aliases cover the names used by older documents
/// (`date`/`isoDate`, `type`, `desc`).
///
/// Decoding is lenient per field: a missing, null or non-string timestamp
/// still yields a record, so the bad value is rejected later by the schedule
/// arithmetic instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawScheduleEvent")]
pub struct ScheduleEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    /// ISO 8601 instant, interpreted as UTC when it carries no offset.
    pub timestamp_utc: String,
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Wire shape of a record. Each accepted field name is its own slot so
/// documents carrying both a current and a legacy name still decode.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheduleEvent {
    #[serde(default)]
    id: Option<LenientText>,
    #[serde(default)]
    timestamp_utc: Option<LenientText>,
    #[serde(default)]
    iso_date: Option<LenientText>,
    #[serde(default)]
    date: Option<LenientText>,
    #[serde(default)]
    title: Option<LenientText>,
    #[serde(default)]
    description: Option<LenientText>,
    #[serde(default)]
    desc: Option<LenientText>,
    #[serde(default)]
    category: Option<LenientText>,
    #[serde(default, rename = "type")]
    kind: Option<LenientText>,
}

impl From<RawScheduleEvent> for ScheduleEvent {
    fn from(raw: RawScheduleEvent) -> Self {
        let pick = |current: Option<LenientText>, legacy: [Option<LenientText>; 2]| {
            std::iter::once(current)
                .chain(legacy)
                .flatten()
                .map(|text| text.0)
                .find(|text| !text.is_empty())
                .unwrap_or_default()
        };

        Self {
            id: raw.id.map(|text| text.0).filter(|id| !id.is_empty()).map(EventId),
            timestamp_utc: pick(raw.timestamp_utc, [raw.iso_date, raw.date]),
            title: pick(raw.title, [None, None]),
            description: pick(raw.description, [raw.desc, None]),
            category: pick(raw.category, [raw.kind, None]),
        }
    }
}

/// Any JSON value read as text: strings as-is, numbers and booleans as
/// their literal, containers as empty.
struct LenientText(String);

impl<'de> Deserialize<'de> for LenientText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawText {
            Text(String),
            Flag(bool),
            Signed(i64),
            Unsigned(u64),
            Float(f64),
            Other(IgnoredAny),
        }

        Ok(LenientText(match RawText::deserialize(deserializer)? {
            RawText::Text(s) => s,
            RawText::Flag(b) => b.to_string(),
            RawText::Signed(n) => n.to_string(),
            RawText::Unsigned(n) => n.to_string(),
            RawText::Float(n) => n.to_string(),
            RawText::Other(_) => String::new(),
        }))
    }
}

impl ScheduleEvent {
    /// Create an event with an id and timestamp and empty display strings.
    pub fn new(id: impl Into<EventId>, timestamp_utc: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            timestamp_utc: timestamp_utc.into(),
            title: String::new(),
            description: String::new(),
            category: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Id as a plain string, for error reporting.
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.as_str().to_string())
    }
}

// ============================================================================
// DERIVED VALUES
// ============================================================================

/// An instant shifted into a fixed display offset.
///
/// `local_date` and `local_time` are read from the shifted instant, never
/// from the UTC fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedInstant {
    /// The instant before shifting.
    pub utc: DateTime<Utc>,
    /// Offset that was applied, in minutes east of UTC.
    pub offset_minutes: i32,
    /// Calendar date after applying the offset.
    pub local_date: NaiveDate,
    /// Time of day after applying the offset.
    pub local_time: NaiveTime,
}

/// An event paired with its localized instant and day offset from "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedEvent {
    pub event: ScheduleEvent,
    pub instant: LocalizedInstant,
    /// Local calendar days from today; 0 = today, negative = past.
    pub day_offset: i64,
}

/// A derived event list plus the records that could not be localized.
///
/// Invalid records are reported individually instead of failing the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatedEvents {
    pub entries: Vec<DatedEvent>,
    pub rejected: Vec<ScheduleError>,
}

impl DatedEvents {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Day offsets in list order.
    pub fn day_offsets(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.day_offset).collect()
    }
}

// ============================================================================
// CALENDAR GRID
// ============================================================================

/// One day of a month grid with at most one attached event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub event: Option<ScheduleEvent>,
}

/// Month-view layout: `leading_blanks` empty cells, then one cell per day.
///
/// There is no trailing padding; renderers that want full weeks can use
/// [`MonthGrid::weeks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    /// Month number, 1-12.
    pub month: u32,
    pub week_start: WeekStart,
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
    /// Events skipped because their timestamp could not be localized.
    pub rejected: Vec<ScheduleError>,
}

impl MonthGrid {
    /// Number of day cells, equal to the length of the month.
    pub fn days_in_month(&self) -> usize {
        self.days.len()
    }

    /// Leading blanks plus day cells.
    pub fn cell_count(&self) -> usize {
        self.leading_blanks as usize + self.days.len()
    }

    /// Cell for day-of-month `day` (1-based).
    pub fn day(&self, day: u32) -> Option<&DayCell> {
        let index = usize::try_from(day).ok()?.checked_sub(1)?;
        self.days.get(index)
    }

    /// Cells that carry an event.
    pub fn annotated(&self) -> impl Iterator<Item = &DayCell> {
        self.days.iter().filter(|cell| cell.event.is_some())
    }

    /// Rows of seven columns; blanks (leading and trailing) are `None`.
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell>>> {
        let blanks = std::iter::repeat(None).take(self.leading_blanks as usize);
        let cells: Vec<Option<&DayCell>> = blanks.chain(self.days.iter().map(Some)).collect();

        cells
            .chunks(7)
            .map(|chunk| {
                let mut row = chunk.to_vec();
                row.resize(7, None);
                row
            })
            .collect()
    }
}
