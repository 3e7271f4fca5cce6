use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Settings shared by the parsers.
///
/// - `page_size` is the size applied when a schema paging suffix names a page
///   without an explicit size (`x:3`, `x:3/?`).
/// - `first_day_of_week` anchors the `ThisWeek()` relative-date function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default page size for paged schema members
    pub page_size: usize,
    /// Day a week starts on
    pub first_day_of_week: Weekday,
}

impl Default for Config {
    fn default() -> Self {
        Self { page_size: 20, first_day_of_week: Weekday::Mon }
    }
}

impl Config {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: default configuration with another default page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Convenience: default configuration with weeks starting on `first_day_of_week`.
    pub fn with_first_day_of_week(first_day_of_week: Weekday) -> Self {
        Self {
            first_day_of_week,
            ..Self::default()
        }
    }

    /// Load a configuration from JSON; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
