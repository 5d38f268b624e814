use crate::duration::DurationUnit;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Whether a day of duration means configured working hours or 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationCalculationMode {
    #[default]
    Working,
    Calendar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarPreferences {
    pub hours_per_day: f64,
    pub hours_per_week: f64,
    pub days_per_month: f64,
    pub duration_calculation_mode: DurationCalculationMode,
}

impl Default for CalendarPreferences {
    fn default() -> Self {
        Self {
            hours_per_day: 8.0,
            hours_per_week: 40.0,
            days_per_month: 20.0,
            duration_calculation_mode: DurationCalculationMode::Working,
        }
    }
}

impl CalendarPreferences {
    pub fn calendar_mode() -> Self {
        Self {
            duration_calculation_mode: DurationCalculationMode::Calendar,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("hours_per_day", self.hours_per_day),
            ("hours_per_week", self.hours_per_week),
            ("days_per_month", self.days_per_month),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.hours_per_day > 24.0 {
            return Err(ConfigError::DayTooLong(self.hours_per_day));
        }
        Ok(())
    }
}

/// Which quantity stays fixed when assignments change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingType {
    #[default]
    FixedUnits,
    FixedDuration,
    FixedWork,
}

impl SchedulingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingType::FixedUnits => "fixed_units",
            SchedulingType::FixedDuration => "fixed_duration",
            SchedulingType::FixedWork => "fixed_work",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        [
            SchedulingType::FixedUnits,
            SchedulingType::FixedDuration,
            SchedulingType::FixedWork,
        ]
        .into_iter()
        .find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePreferences {
    pub new_tasks_start_today: bool,
    pub duration_entered_in: DurationUnit,
    pub scheduling_rule: SchedulingType,
    pub effort_driven: bool,
    pub honor_required_dates: bool,
    pub work_unit: DurationUnit,
    pub auto_link_tasks: bool,
}

impl Default for SchedulePreferences {
    fn default() -> Self {
        Self {
            new_tasks_start_today: true,
            duration_entered_in: DurationUnit::Days,
            scheduling_rule: SchedulingType::FixedUnits,
            effort_driven: false,
            honor_required_dates: true,
            work_unit: DurationUnit::Hours,
            auto_link_tasks: false,
        }
    }
}

/// Project-level configuration handed to the scheduling core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub calendar: CalendarPreferences,
    pub schedule: SchedulePreferences,
}

impl ProjectSettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: ProjectSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calendar.validate()
    }
}
