//! Configuration types

use crate::{ConfigError, WeekStart};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder substituted with the resource key in [`DataLayerConfig::path_template`].
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Default location template for resources.
pub const DEFAULT_PATH_TEMPLATE: &str = "/data/{key}.json";

/// Default display offset: UTC+09:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 540;

/// Default number of entries in the upcoming-events panel.
pub const DEFAULT_UPCOMING_LIMIT: usize = 4;

/// Minutes in a day; offsets must stay strictly inside (-1440, 1440).
const MINUTES_PER_DAY: i32 = 24 * 60;

/// Configuration of the data-access layer.
///
/// Every field has a default, so a TOML document only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayerConfig {
    /// Location template; `{key}` is replaced by the resource key.
    pub path_template: String,
    /// Fixed offset applied to every UTC timestamp before deriving dates.
    pub utc_offset_minutes: i32,
    /// Calendar column convention used by the month grid.
    pub week_start: WeekStart,
    /// Default length of the upcoming-events list.
    pub upcoming_limit: usize,
    /// Optional fetch deadline in milliseconds. `None` waits forever.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            path_template: DEFAULT_PATH_TEMPLATE.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            week_start: WeekStart::Sunday,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            fetch_timeout_ms: None,
        }
    }
}

impl DataLayerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document, falling back to defaults for missing fields.
    /// The parsed config is validated before it is returned.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the resource location template.
    pub fn with_path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = template.into();
        self
    }

    /// Set the display offset in minutes east of UTC.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Set the calendar week start.
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    /// Set the default upcoming-events limit.
    pub fn with_upcoming_limit(mut self, limit: usize) -> Self {
        self.upcoming_limit = limit;
        self
    }

    /// Set the fetch timeout, rounded up to whole milliseconds.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.fetch_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    /// Fetch timeout as a `Duration`, if configured.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - path_template contains `{key}` exactly once
    /// - utc_offset_minutes is strictly less than one day in magnitude
    /// - upcoming_limit > 0
    /// - fetch_timeout_ms, when set, is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_template.matches(KEY_PLACEHOLDER).count() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "path_template".to_string(),
                value: self.path_template.clone(),
                reason: format!("must contain {} exactly once", KEY_PLACEHOLDER),
            });
        }

        if self.utc_offset_minutes.unsigned_abs() >= MINUTES_PER_DAY.unsigned_abs() {
            return Err(ConfigError::InvalidValue {
                field: "utc_offset_minutes".to_string(),
                value: self.utc_offset_minutes.to_string(),
                reason: "offset must be less than 24 hours".to_string(),
            });
        }

        if self.upcoming_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upcoming_limit".to_string(),
                value: "0".to_string(),
                reason: "upcoming_limit must be greater than 0".to_string(),
            });
        }

        if self.fetch_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "fetch_timeout_ms must be positive".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
