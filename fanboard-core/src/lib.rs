//! fanboard Core - Shared Types
//!
//! Data structures shared by the resource cache and the schedule arithmetic:
//! schedule records, derived calendar values, resource lifecycle states, the
//! error taxonomy and the data-layer configuration.
//! This crate contains no I/O.

pub mod config;
pub mod enums;
pub mod error;
pub mod event;

pub use config::{
    DataLayerConfig, DEFAULT_PATH_TEMPLATE, DEFAULT_UPCOMING_LIMIT, DEFAULT_UTC_OFFSET_MINUTES,
    KEY_PLACEHOLDER,
};
pub use enums::{ResourceStatus, WeekStart, WeekStartParseError};
pub use error::{
    ConfigError, DecodeError, FanboardError, FanboardResult, FetchError, KeyError, ScheduleError,
    ScheduleResult,
};
pub use event::{
    DatedEvent, DatedEvents, DayCell, EventId, LocalizedInstant, MonthGrid, ScheduleEvent,
};

// ============================================================================
// PROPERTY TESTS
// ============================================================================
