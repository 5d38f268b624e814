use crate::error::CalendarError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A per-resource working calendar.
///
/// Each day contributes either the regular `hours_per_day`, zero on a
/// non-working weekday, or the hours of an explicit exception for that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkCalendarConfig", into = "WorkCalendarConfig")]
pub struct WorkCalendar {
    hours_per_day: f64,
    non_working_days: HashSet<Weekday>,
    exceptions: HashMap<NaiveDate, f64>,
}

/// A date whose working hours differ from the regular week.
/// Zero hours marks a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarException {
    pub date: NaiveDate,
    #[serde(default)]
    pub working_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    hours_per_day: f64,
    working_days: Vec<Weekday>,
    #[serde(default)]
    exceptions: Vec<CalendarException>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::standard()
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Monday to Friday, eight hours a day, no exceptions.
    pub fn standard() -> Self {
        Self {
            hours_per_day: 8.0,
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
            exceptions: HashMap::new(),
        }
    }

    pub fn new<I>(hours_per_day: f64, working_days: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self::check_hours_per_day(hours_per_day)?;
        let working: HashSet<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working.contains(day))
            .collect();
        Ok(Self {
            hours_per_day,
            non_working_days,
            exceptions: HashMap::new(),
        })
    }

    /// Works the first `days` weekdays starting from Monday.
    pub fn with_working_days_per_week(hours_per_day: f64, days: u32) -> Result<Self, CalendarError> {
        if !(1..=7).contains(&days) {
            return Err(CalendarError::WorkingDaysOutOfRange(days));
        }
        Self::new(
            hours_per_day,
            Self::ALL_WEEKDAYS.into_iter().take(days as usize),
        )
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let mut calendar = Self::new(config.hours_per_day, config.working_days.iter().copied())?;
        for exception in &config.exceptions {
            calendar.add_exception(exception.date, exception.working_hours)?;
        }
        Ok(calendar)
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    fn check_hours_per_day(hours: f64) -> Result<(), CalendarError> {
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(CalendarError::InvalidHoursPerDay(hours));
        }
        Ok(())
    }

    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day
    }

    pub fn working_days_per_week(&self) -> u32 {
        (Self::ALL_WEEKDAYS.len() - self.non_working_days.len()) as u32
    }

    /// Hours in a regular week, ignoring exceptions.
    pub fn weekly_hours(&self) -> f64 {
        self.hours_per_day * f64::from(self.working_days_per_week())
    }

    /// Exceptions sorted by date.
    pub fn exceptions(&self) -> Vec<CalendarException> {
        let mut exceptions: Vec<CalendarException> = self
            .exceptions
            .iter()
            .map(|(&date, &working_hours)| CalendarException {
                date,
                working_hours,
            })
            .collect();
        exceptions.sort_by_key(|e| e.date);
        exceptions
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.exceptions.insert(date, 0.0);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        for &date in dates {
            self.add_holiday(date);
        }
    }

    /// Overrides the working hours of a single date (e.g. a half day).
    pub fn add_exception(&mut self, date: NaiveDate, working_hours: f64) -> Result<(), CalendarError> {
        if !working_hours.is_finite() || !(0.0..=24.0).contains(&working_hours) {
            return Err(CalendarError::InvalidExceptionHours(working_hours));
        }
        self.exceptions.insert(date, working_hours);
        Ok(())
    }

    pub fn remove_exception(&mut self, date: NaiveDate) -> bool {
        self.exceptions.remove(&date).is_some()
    }

    /// Add the same holiday for every year in the range.
    /// Dates that do not exist in a year (Feb 29) are skipped.
    pub fn add_recurring_holiday(&mut self, month: u32, day: u32, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.add_holiday(date);
            }
        }
    }

    pub fn set_working_days(&mut self, days: Vec<Weekday>) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    /// Working hours available on `date`.
    pub fn working_hours_on(&self, date: NaiveDate) -> f64 {
        if let Some(&hours) = self.exceptions.get(&date) {
            return hours;
        }
        if self.non_working_days.contains(&date.weekday()) {
            0.0
        } else {
            self.hours_per_day
        }
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.working_hours_on(date) > 0.0
    }

    /// Find the next available date after a given date.
    /// Stops at the last representable date.
    pub fn next_available(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from;
        while let Some(next) = current.succ_opt() {
            current = next;
            if self.is_available(current) {
                break;
            }
        }
        current
    }

    /// Sum of working hours from `start` to `end`, both inclusive.
    pub fn working_hours_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| self.working_hours_on(day))
            .sum()
    }

    pub fn available_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_available(*day))
            .collect()
    }

    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        self.available_days_in_range(start, end).len() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(hours_per_day: f64, working_days: I, exceptions: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = CalendarException>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut exceptions: Vec<CalendarException> = exceptions.into_iter().collect();
        exceptions.sort_by_key(|e| e.date);
        exceptions.dedup_by_key(|e| e.date);

        Self {
            hours_per_day,
            working_days: working,
            exceptions,
        }
    }

    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn exceptions(&self) -> &[CalendarException] {
        &self.exceptions
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day));
        WorkCalendarConfig::new(calendar.hours_per_day, working, calendar.exceptions())
    }
}

impl From<WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: WorkCalendar) -> Self {
        WorkCalendarConfig::from(&calendar)
    }
}

impl TryFrom<WorkCalendarConfig> for WorkCalendar {
    type Error = CalendarError;

    fn try_from(config: WorkCalendarConfig) -> Result<Self, Self::Error> {
        WorkCalendar::from_config(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn standard_week_skips_weekends() {
        let cal = WorkCalendar::standard();
        // 2026-02-14 is a Saturday
        assert_eq!(cal.working_hours_on(d(2026, 2, 13)), 8.0);
        assert_eq!(cal.working_hours_on(d(2026, 2, 14)), 0.0);
        assert_eq!(cal.next_available(d(2026, 2, 13)), d(2026, 2, 16));
        assert_eq!(cal.working_days_per_week(), 5);
    }

    #[test]
    fn next_available_stops_at_the_last_date() {
        let cal = WorkCalendar::standard();
        assert_eq!(cal.next_available(NaiveDate::MAX), NaiveDate::MAX);
    }

    #[test]
    fn exceptions_override_the_week() {
        let mut cal = WorkCalendar::standard();
        cal.add_holiday(d(2026, 2, 16));
        cal.add_exception(d(2026, 2, 17), 4.0).unwrap();
        cal.add_exception(d(2026, 2, 14), 6.0).unwrap();
        assert!(!cal.is_available(d(2026, 2, 16)));
        assert_eq!(cal.working_hours_on(d(2026, 2, 17)), 4.0);
        assert_eq!(cal.working_hours_on(d(2026, 2, 14)), 6.0);
        assert!(cal.add_exception(d(2026, 2, 18), 25.0).is_err());
    }

    #[test]
    fn working_hours_between_is_inclusive() {
        let cal = WorkCalendar::standard();
        // Thu through Tue: Thu, Fri, Mon, Tue
        assert_eq!(cal.working_hours_between(d(2026, 2, 12), d(2026, 2, 17)), 32.0);
        assert_eq!(cal.working_hours_between(d(2026, 2, 17), d(2026, 2, 12)), 0.0);
        assert_eq!(cal.count_available_days(d(2026, 2, 12), d(2026, 2, 17)), 4);
    }

    #[test]
    fn working_days_per_week_counts_from_monday() {
        let cal = WorkCalendar::with_working_days_per_week(10.0, 4).unwrap();
        assert!(!cal.is_available(d(2026, 2, 13))); // Friday
        assert_eq!(cal.working_hours_on(d(2026, 2, 12)), 10.0);
        assert_eq!(cal.weekly_hours(), 40.0);
        assert_eq!(
            WorkCalendar::with_working_days_per_week(8.0, 0),
            Err(CalendarError::WorkingDaysOutOfRange(0))
        );
    }

    #[test]
    fn rejects_empty_week_and_bad_hours() {
        assert_eq!(
            WorkCalendar::new(8.0, Vec::new()),
            Err(CalendarError::NoWorkingDays)
        );
        assert!(WorkCalendar::new(0.0, [Weekday::Mon]).is_err());
        let mut cal = WorkCalendar::standard();
        assert!(cal.set_working_days(Vec::new()).is_err());
    }

    #[test]
    fn recurring_holiday_skips_missing_dates() {
        let mut cal = WorkCalendar::standard();
        cal.add_recurring_holiday(2, 29, 2027, 2028);
        assert_eq!(cal.exceptions().len(), 1);
        assert_eq!(cal.exceptions()[0].date, d(2028, 2, 29));
    }

    #[test]
    fn config_and_serde_round_trip() {
        let mut cal = WorkCalendar::new(7.5, [Weekday::Sat, Weekday::Mon, Weekday::Tue]).unwrap();
        cal.add_holiday(d(2026, 12, 25));
        cal.add_exception(d(2026, 12, 24), 3.0).unwrap();

        let config = cal.to_config();
        assert_eq!(
            config.working_days(),
            &[Weekday::Mon, Weekday::Tue, Weekday::Sat]
        );
        assert_eq!(WorkCalendar::from_config(&config).unwrap(), cal);

        let json = serde_json::to_string(&cal).unwrap();
        let back: WorkCalendar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cal);
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"{"hours_per_day":8.0,"working_days":[]}"#;
        assert!(serde_json::from_str::<WorkCalendar>(json).is_err());
    }
}
