//! Finish dates from durations and durations from date pairs.

use crate::calendar::WorkCalendar;
use crate::duration::{Duration, DurationUnit};
use crate::preferences::{CalendarPreferences, DurationCalculationMode};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::warn;

/// `None` when `millis` is not finite or does not fit a `TimeDelta`.
pub(crate) fn millis_delta(millis: f64) -> Option<TimeDelta> {
    if !millis.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds(millis.round() as i64)
}

/// Same date at 00:00 local time.
pub fn midnight(date_time: NaiveDateTime) -> NaiveDateTime {
    date_time.date().and_time(NaiveTime::MIN)
}

fn elapsed_millis(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64
}

/// Applies the day floor: a task never shows less than one day.
fn floor_days(duration: Duration) -> Duration {
    if duration.unit == DurationUnit::Days {
        Duration::days(duration.value.round().max(1.0))
    } else {
        duration
    }
}

/// `start` plus `duration`.
///
/// A duration that is not a finite number leaves `start` unchanged. A finish
/// beyond the representable range saturates at the earliest or latest date.
pub fn calculate_finish_date(
    start: NaiveDateTime,
    duration: Duration,
    prefs: &CalendarPreferences,
) -> NaiveDateTime {
    if duration.is_zero() {
        return start;
    }
    let millis = duration.to_millis(prefs);
    if !millis.is_finite() {
        warn!(%start, ?duration, "non-finite duration, keeping start date");
        return start;
    }
    millis_delta(millis)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or_else(|| {
            warn!(%start, ?duration, "finish date out of range, saturating");
            if millis > 0.0 {
                NaiveDateTime::MAX
            } else {
                NaiveDateTime::MIN
            }
        })
}

/// Duration between two dates expressed in `unit`.
///
/// Day results are rounded and clamped to at least one day, which also
/// covers `start == end` and inverted ranges. Other units are returned as is.
pub fn calculate_duration(
    start: NaiveDateTime,
    end: NaiveDateTime,
    unit: DurationUnit,
    prefs: &CalendarPreferences,
) -> Duration {
    floor_days(Duration::from_millis(
        elapsed_millis(start, end),
        unit,
        prefs,
    ))
}

/// Conversion preferences where a day is one of the calendar's working days.
pub fn calendar_preferences(
    calendar: &WorkCalendar,
    prefs: &CalendarPreferences,
) -> CalendarPreferences {
    CalendarPreferences {
        hours_per_day: calendar.hours_per_day(),
        hours_per_week: calendar.weekly_hours(),
        days_per_month: prefs.days_per_month,
        duration_calculation_mode: DurationCalculationMode::Working,
    }
}

/// Working time between `start` and `end` (both days inclusive) under
/// `calendar`. Non-working days and holidays contribute nothing.
pub fn calculate_duration_with_calendar(
    start: NaiveDateTime,
    end: NaiveDateTime,
    unit: DurationUnit,
    prefs: &CalendarPreferences,
    calendar: &WorkCalendar,
) -> Duration {
    let hours = calendar.working_hours_between(start.date(), end.date());
    let working_prefs = calendar_preferences(calendar, prefs);
    floor_days(Duration::hours(hours).convert_to(unit, &working_prefs))
}

/// Walks forward from `start` one day at a time, spending each day's
/// working hours, and returns midnight of the day on which the budget runs
/// out.
///
/// Once past the last calendar exception the walk skips whole weeks. A
/// duration that is not a finite number finishes on the start day, and a
/// finish past the last representable date stops there.
pub fn calculate_finish_date_with_calendar(
    start: NaiveDateTime,
    duration: Duration,
    prefs: &CalendarPreferences,
    calendar: &WorkCalendar,
) -> NaiveDateTime {
    let working_prefs = calendar_preferences(calendar, prefs);
    let mut remaining = duration.convert_to(DurationUnit::Hours, &working_prefs).value;
    let mut day = start.date();
    if !remaining.is_finite() {
        warn!(%start, ?duration, "non-finite duration, finishing on start day");
        return day.and_time(NaiveTime::MIN);
    }
    if remaining <= 0.0 {
        return day.and_time(NaiveTime::MIN);
    }

    let last_exception = calendar.exceptions().last().map(|e| e.date);
    let weekly_hours = calendar.weekly_hours();
    let mut skipped = false;
    loop {
        if !skipped && last_exception.is_none_or(|last| day > last) {
            skipped = true;
            let whole_weeks = ((remaining / weekly_hours).ceil() - 1.0).max(0.0);
            if whole_weeks >= 1.0 {
                let days = whole_weeks * 7.0;
                match day.checked_add_days(Days::new(days as u64)) {
                    Some(next) => {
                        day = next;
                        remaining -= whole_weeks * weekly_hours;
                    }
                    None => return NaiveDate::MAX.and_time(NaiveTime::MIN),
                }
            }
        }
        remaining -= calendar.working_hours_on(day);
        if remaining <= 0.0 {
            return day.and_time(NaiveTime::MIN);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => return day.and_time(NaiveTime::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn finish_date_uses_working_day_length() {
        let prefs = CalendarPreferences::default();
        let finish = calculate_finish_date(dt(2026, 2, 12, 9), Duration::days(1.0), &prefs);
        assert_eq!(finish, dt(2026, 2, 12, 17));
    }

    #[test]
    fn finish_date_in_calendar_mode_adds_full_days() {
        let prefs = CalendarPreferences::calendar_mode();
        let finish = calculate_finish_date(dt(2026, 2, 12, 9), Duration::days(2.0), &prefs);
        assert_eq!(finish, dt(2026, 2, 14, 9));
    }

    #[test]
    fn midnight_drops_time_of_day() {
        assert_eq!(midnight(dt(2026, 2, 12, 23)), dt(2026, 2, 12, 0));
    }

    #[test]
    fn zero_duration_keeps_start() {
        let prefs = CalendarPreferences::default();
        let start = dt(2026, 2, 12, 9);
        assert_eq!(calculate_finish_date(start, Duration::hours(0.0), &prefs), start);
    }

    #[test]
    fn day_durations_are_floored_at_one() {
        let prefs = CalendarPreferences::default();
        let start = dt(2026, 2, 12, 9);
        assert_eq!(
            calculate_duration(start, start, DurationUnit::Days, &prefs).value,
            1.0
        );
        assert_eq!(
            calculate_duration(start, dt(2026, 2, 10, 9), DurationUnit::Days, &prefs).value,
            1.0
        );
        assert_eq!(
            calculate_duration(start, dt(2026, 2, 12, 21), DurationUnit::Days, &prefs).value,
            2.0
        );
    }

    #[test]
    fn other_units_are_not_floored() {
        let prefs = CalendarPreferences::default();
        let start = dt(2026, 2, 12, 9);
        let hours = calculate_duration(start, dt(2026, 2, 12, 7), DurationUnit::Hours, &prefs);
        assert_eq!(hours.value, -2.0);
        let zero = calculate_duration(start, start, DurationUnit::Minutes, &prefs);
        assert_eq!(zero.value, 0.0);
    }

    #[test]
    fn calendar_duration_skips_weekend() {
        let prefs = CalendarPreferences::default();
        let cal = WorkCalendar::standard();
        // Thu 12th to Tue 17th: four working days
        let d = calculate_duration_with_calendar(
            dt(2026, 2, 12, 0),
            dt(2026, 2, 17, 0),
            DurationUnit::Days,
            &prefs,
            &cal,
        );
        assert_eq!(d.value, 4.0);
        let h = calculate_duration_with_calendar(
            dt(2026, 2, 12, 0),
            dt(2026, 2, 17, 0),
            DurationUnit::Hours,
            &prefs,
            &cal,
        );
        assert_eq!(h.value, 32.0);
    }

    #[test]
    fn calendar_finish_lands_after_weekend() {
        let prefs = CalendarPreferences::default();
        let cal = WorkCalendar::standard();
        let start = dt(2026, 2, 12, 9);
        let finish = calculate_finish_date_with_calendar(start, Duration::days(3.0), &prefs, &cal);
        assert_eq!(finish, dt(2026, 2, 16, 0));
        let same_day =
            calculate_finish_date_with_calendar(start, Duration::hours(4.0), &prefs, &cal);
        assert_eq!(same_day, midnight(start));
    }

    #[test]
    fn calendar_finish_honors_holidays_and_short_days() {
        let prefs = CalendarPreferences::default();
        let mut cal = WorkCalendar::standard();
        cal.add_holiday(NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
        cal.add_exception(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(), 4.0)
            .unwrap();
        // Thu 8h, Fri 8h, Mon off, Tue 4h, last 4h on Wed
        let finish = calculate_finish_date_with_calendar(
            dt(2026, 2, 12, 0),
            Duration::hours(24.0),
            &prefs,
            &cal,
        );
        assert_eq!(finish, dt(2026, 2, 18, 0));
    }

    #[test]
    fn whole_weeks_are_skipped_after_the_last_exception() {
        let prefs = CalendarPreferences::default();
        let mut cal = WorkCalendar::standard();
        cal.add_holiday(NaiveDate::from_ymd_opt(2026, 2, 13).unwrap());
        // Thu 8h, Fri off, 52 full weeks, last 8h on Mon 15th the next year
        let finish = calculate_finish_date_with_calendar(
            dt(2026, 2, 12, 0),
            Duration::hours(8.0 + 52.0 * 40.0 + 8.0),
            &prefs,
            &cal,
        );
        assert_eq!(finish, dt(2027, 2, 15, 0));
    }

    #[test]
    fn calendar_finish_survives_unusable_durations() {
        let prefs = CalendarPreferences::default();
        let cal = WorkCalendar::standard();
        let start = dt(2026, 2, 12, 9);
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let finish =
                calculate_finish_date_with_calendar(start, Duration::days(value), &prefs, &cal);
            assert_eq!(finish, dt(2026, 2, 12, 0));
        }
        let finish =
            calculate_finish_date_with_calendar(start, Duration::days(1.0e12), &prefs, &cal);
        assert_eq!(finish, NaiveDate::MAX.and_time(NaiveTime::MIN));
    }

    #[test]
    fn finish_date_saturates_instead_of_overflowing() {
        let prefs = CalendarPreferences::default();
        let start = dt(2026, 2, 12, 9);
        assert_eq!(
            calculate_finish_date(start, Duration::weeks(1.0e9), &prefs),
            NaiveDateTime::MAX
        );
        assert_eq!(
            calculate_finish_date(start, Duration::weeks(-1.0e9), &prefs),
            NaiveDateTime::MIN
        );
        assert_eq!(calculate_finish_date(start, Duration::days(f64::NAN), &prefs), start);
        assert_eq!(
            calculate_finish_date(start, Duration::hours(f64::INFINITY), &prefs),
            start
        );
    }
}
