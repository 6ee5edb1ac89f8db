//! Error types for fanboard operations

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while retrieving the raw bytes of a resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure fetching {key}: {reason}")]
    Transport { key: String, reason: String },

    #[error("Fetching {key} returned non-success status {status}")]
    Status { key: String, status: u16 },

    #[error("Resource {key} not found at {location}")]
    NotFound { key: String, location: String },

    #[error("Fetching {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },
}

impl FetchError {
    /// Key of the resource whose fetch failed.
    pub fn key(&self) -> &str {
        match self {
            Self::Transport { key, .. }
            | Self::Status { key, .. }
            | Self::NotFound { key, .. }
            | Self::Timeout { key, .. } => key,
        }
    }
}

/// Errors raised while decoding a fetched resource body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Resource {key} is not valid JSON for the requested shape: {reason}")]
    InvalidJson { key: String, reason: String },
}

/// Errors raised by the schedule and calendar arithmetic.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleError {
    #[error("Invalid timestamp {value:?} (event {event_id:?}): {reason}")]
    InvalidTimestamp {
        event_id: Option<String>,
        value: String,
        reason: String,
    },

    #[error("Invalid calendar month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid UTC offset of {minutes} minutes")]
    InvalidOffset { minutes: i32 },
}

/// Errors raised when a resource key is rejected before any fetch happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Resource key must not be empty")]
    Empty,

    #[error("Invalid resource key {key:?}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Resource key {key} is registered as {registered}, requested as {requested}")]
    TypeMismatch {
        key: String,
        registered: &'static str,
        requested: &'static str,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for all fanboard errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FanboardError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for fanboard operations.
pub type FanboardResult<T> = Result<T, FanboardError>;

/// Result type alias for the schedule arithmetic.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_status() {
        let err = FetchError::Status {
            key: "schedules".to_string(),
            status: 404,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("schedules"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_fetch_error_key() {
        let err = FetchError::Timeout {
            key: "goods".to_string(),
            after: Duration::from_secs(5),
        };
        assert_eq!(err.key(), "goods");
    }

    #[test]
    fn test_schedule_error_display_invalid_timestamp() {
        let err = ScheduleError::InvalidTimestamp {
            event_id: Some("7".to_string()),
            value: "not-a-date".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid timestamp"));
        assert!(msg.contains("not-a-date"));
    }

    #[test]
    fn test_key_error_display_type_mismatch() {
        let err = KeyError::TypeMismatch {
            key: "schedules".to_string(),
            registered: "Vec<ScheduleEvent>",
            requested: "Value",
        };
        let msg = format!("{}", err);
        assert!(msg.contains("schedules"));
        assert!(msg.contains("Vec<ScheduleEvent>"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "path_template".to_string(),
            value: "/data/x.json".to_string(),
            reason: "must contain {key}".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("path_template"));
        assert!(msg.contains("must contain"));
    }

    #[test]
    fn test_fanboard_error_from_variants() {
        let fetch = FanboardError::from(FetchError::Transport {
            key: "k".to_string(),
            reason: "reset".to_string(),
        });
        assert!(matches!(fetch, FanboardError::Fetch(_)));

        let decode = FanboardError::from(DecodeError::InvalidJson {
            key: "k".to_string(),
            reason: "eof".to_string(),
        });
        assert!(matches!(decode, FanboardError::Decode(_)));

        let schedule = FanboardError::from(ScheduleError::InvalidOffset { minutes: 5000 });
        assert!(matches!(schedule, FanboardError::Schedule(_)));

        let key = FanboardError::from(KeyError::Empty);
        assert!(matches!(key, FanboardError::Key(_)));

        let config = FanboardError::from(ConfigError::Parse {
            reason: "bad toml".to_string(),
        });
        assert!(matches!(config, FanboardError::Config(_)));
    }
}
