//! Duration values and unit conversion.
//!
//! Every conversion goes through milliseconds. The length of a day and a
//! week depends on [`DurationCalculationMode`]: in `Working` mode a day is
//! `hours_per_day` hours, in `Calendar` mode it is 24 hours.

use crate::error::DurationParseError;
use crate::preferences::{CalendarPreferences, DurationCalculationMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
pub(crate) const MS_PER_HOUR: f64 = 3_600_000.0;
pub(crate) const MS_PER_CALENDAR_DAY: f64 = 24.0 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 7] = [
        DurationUnit::Milliseconds,
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
        DurationUnit::Weeks,
        DurationUnit::Months,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Milliseconds => "milliseconds",
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
            DurationUnit::Months => "months",
        }
    }

    /// Short suffix used when formatting a [`Duration`] (`3d`, `1.5h`).
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DurationUnit::Milliseconds => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
            DurationUnit::Hours => "h",
            DurationUnit::Days => "d",
            DurationUnit::Weeks => "w",
            DurationUnit::Months => "mo",
        }
    }

    /// Length of one unit in milliseconds under the given preferences.
    pub fn millis(&self, prefs: &CalendarPreferences) -> f64 {
        let working = prefs.duration_calculation_mode == DurationCalculationMode::Working;
        match self {
            DurationUnit::Milliseconds => 1.0,
            DurationUnit::Seconds => MS_PER_SECOND,
            DurationUnit::Minutes => MS_PER_MINUTE,
            DurationUnit::Hours => MS_PER_HOUR,
            DurationUnit::Days if working => prefs.hours_per_day * MS_PER_HOUR,
            DurationUnit::Days => MS_PER_CALENDAR_DAY,
            DurationUnit::Weeks if working => prefs.hours_per_week * MS_PER_HOUR,
            DurationUnit::Weeks => 7.0 * MS_PER_CALENDAR_DAY,
            DurationUnit::Months => prefs.days_per_month * prefs.hours_per_day * MS_PER_HOUR,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => DurationUnit::Milliseconds,
            "s" | "sec" | "second" | "seconds" => DurationUnit::Seconds,
            "m" | "min" | "minute" | "minutes" => DurationUnit::Minutes,
            "h" | "hr" | "hour" | "hours" => DurationUnit::Hours,
            "d" | "day" | "days" => DurationUnit::Days,
            "w" | "wk" | "week" | "weeks" => DurationUnit::Weeks,
            "mo" | "mon" | "month" | "months" => DurationUnit::Months,
            "" => return Err(DurationParseError::MissingUnit),
            other => return Err(DurationParseError::UnknownUnit(other.to_string())),
        };
        Ok(unit)
    }
}

/// An amount of time in a specific unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duration {
    pub value: f64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }

    pub fn milliseconds(value: f64) -> Self {
        Self::new(value, DurationUnit::Milliseconds)
    }

    pub fn hours(value: f64) -> Self {
        Self::new(value, DurationUnit::Hours)
    }

    pub fn days(value: f64) -> Self {
        Self::new(value, DurationUnit::Days)
    }

    pub fn weeks(value: f64) -> Self {
        Self::new(value, DurationUnit::Weeks)
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    pub fn to_millis(&self, prefs: &CalendarPreferences) -> f64 {
        self.value * self.unit.millis(prefs)
    }

    pub fn from_millis(millis: f64, unit: DurationUnit, prefs: &CalendarPreferences) -> Self {
        Self::new(millis / unit.millis(prefs), unit)
    }

    pub fn convert_to(self, unit: DurationUnit, prefs: &CalendarPreferences) -> Self {
        convert_duration(self, unit, prefs)
    }
}

/// Converts `duration` into `to_unit`.
///
/// Same-unit conversion returns the input untouched so repeated calls never
/// accumulate floating point drift. No rounding happens here.
pub fn convert_duration(
    duration: Duration,
    to_unit: DurationUnit,
    prefs: &CalendarPreferences,
) -> Duration {
    if duration.unit == to_unit {
        return duration;
    }
    Duration::from_millis(duration.to_millis(prefs), to_unit, prefs)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.abbreviation())
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parses `"3d"`, `"1.5 h"`, `"2 weeks"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let number = number.trim();
        if number.is_empty() {
            return Err(DurationParseError::MissingValue);
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationParseError::InvalidValue(number.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(DurationParseError::InvalidValue(number.to_string()));
        }
        Ok(Self::new(value, unit.parse()?))
    }
}
