//! Types shared across resource models

use serde::{Deserialize, Serialize};

/// Generate a fresh XID (human-assignable external identifier).
///
/// XIDs are stable across export/import, unlike the server-assigned
/// numeric id. Freshly generated ones are plain UUID v4 strings.
pub fn new_xid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A duration expressed as a count of calendar/clock periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub periods: u32,
    #[serde(rename = "type")]
    pub period_type: PeriodType,
}

impl TimePeriod {
    pub fn new(periods: u32, period_type: PeriodType) -> Self {
        Self {
            periods,
            period_type,
        }
    }

    pub fn seconds(periods: u32) -> Self {
        Self::new(periods, PeriodType::Seconds)
    }

    pub fn minutes(periods: u32) -> Self {
        Self::new(periods, PeriodType::Minutes)
    }

    pub fn hours(periods: u32) -> Self {
        Self::new(periods, PeriodType::Hours)
    }

    pub fn years(periods: u32) -> Self {
        Self::new(periods, PeriodType::Years)
    }
}

/// Unit for a [`TimePeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

/// Alarm level attached to events raised by a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmLevel {
    #[default]
    None,
    Information,
    Important,
    Warning,
    Urgent,
    Critical,
    LifeSafety,
    DoNotLog,
}

/// Historical-value purge configuration for a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSettings {
    #[serde(rename = "override")]
    pub override_defaults: bool,
    pub frequency: TimePeriod,
}

impl Default for PurgeSettings {
    fn default() -> Self {
        Self {
            override_defaults: false,
            frequency: TimePeriod::years(1),
        }
    }
}
