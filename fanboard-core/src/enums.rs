//! Enum types shared across the fanboard crates

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CALENDAR CONVENTIONS
// ============================================================================

/// First column of a calendar week.
///
/// The grid generator takes this from configuration once and carries it on
/// every [`crate::MonthGrid`] it builds, so two grids produced with different
/// conventions can always be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Sunday is column 0 (the calendar screen's layout).
    #[default]
    Sunday,
    /// Monday is column 0 (ISO 8601).
    Monday,
}

impl WeekStart {
    /// Column index (0-6) of `weekday` under this convention.
    pub fn column_of(&self, weekday: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => weekday.num_days_from_sunday(),
            WeekStart::Monday => weekday.num_days_from_monday(),
        }
    }

    /// The weekday shown in column 0.
    pub fn first_weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeekStart {
    type Err = WeekStartParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            _ => Err(WeekStartParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid week start string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekStartParseError(pub String);

impl fmt::Display for WeekStartParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid week start: {}", self.0)
    }
}

impl std::error::Error for WeekStartParseError {}

// ============================================================================
// RESOURCE LIFECYCLE
// ============================================================================

/// Lifecycle of a cached resource key.
///
/// `Unrequested -> Pending -> (Ready | Failed)`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    /// No consumer has asked for the key yet.
    Unrequested,
    /// The single fetch for the key is in flight.
    Pending,
    /// The resource was fetched and decoded.
    Ready,
    /// The fetch or decode failed; the failure is permanent.
    Failed,
}

impl ResourceStatus {
    /// True for `Ready` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceStatus::Ready | ResourceStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Unrequested => "Unrequested",
            ResourceStatus::Pending => "Pending",
            ResourceStatus::Ready => "Ready",
            ResourceStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
