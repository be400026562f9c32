use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::collections::HashSet;

// Workday window and lunch break, minutes from midnight.
const WORK_START_MIN: u32 = 8 * 60 + 30;
const WORK_END_MIN: u32 = 17 * 60 + 30;
const LUNCH_START_MIN: u32 = 12 * 60;
const LUNCH_END_MIN: u32 = 13 * 60;

fn at(day: NaiveDate, minutes_from_midnight: u32) -> NaiveDateTime {
    day.and_hms_opt(minutes_from_midnight / 60, minutes_from_midnight % 60, 0)
        .expect("wall-clock constant out of range")
}

pub fn is_working_day(day: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&day)
}

/// Working hours contained in `[start, end)`, skipping weekends and holidays,
/// clipping each day to the workday window and subtracting the lunch break
/// where it overlaps. Rounded to the nearest half hour.
pub fn leave_hours(start: NaiveDateTime, end: NaiveDateTime, holidays: &HashSet<NaiveDate>) -> f64 {
    if end <= start {
        return 0.0;
    }

    let mut total_minutes: i64 = 0;
    let mut day = start.date();
    let last = end.date();

    while day <= last {
        if is_working_day(day, holidays) {
            let seg_start = start.max(at(day, WORK_START_MIN));
            let seg_end = end.min(at(day, WORK_END_MIN));

            if seg_end > seg_start {
                let mut minutes = (seg_end - seg_start).num_minutes();

                let lunch_start = seg_start.max(at(day, LUNCH_START_MIN));
                let lunch_end = seg_end.min(at(day, LUNCH_END_MIN));
                if lunch_end > lunch_start {
                    minutes -= (lunch_end - lunch_start).num_minutes();
                }

                if minutes > 0 {
                    total_minutes += minutes;
                }
            }
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    round_to_half(total_minutes as f64 / 60.0)
}

/// Raw elapsed hours for overtime, rounded to a tenth. No business calendar:
/// overtime is by definition outside the workday window.
pub fn overtime_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    if end <= start {
        return 0.0;
    }
    let minutes = (end - start).num_minutes() as f64;
    (minutes / 60.0 * 10.0).round() / 10.0
}

fn round_to_half(hours: f64) -> f64 {
    (hours * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn no_holidays() -> HashSet<NaiveDate> {
        HashSet::new()
    }

    #[test]
    fn full_workday_is_eight_hours() {
        // 08:30-17:30 minus the lunch hour
        let hours = leave_hours(dt("2026-01-05 08:30"), dt("2026-01-05 17:30"), &no_holidays());
        assert_eq!(hours, 8.0);
    }

    #[test]
    fn weekend_interval_is_zero() {
        // 2026-01-03 is a Saturday
        let hours = leave_hours(dt("2026-01-03 09:00"), dt("2026-01-03 17:00"), &no_holidays());
        assert_eq!(hours, 0.0);
    }

    #[test]
    fn holiday_interval_is_zero() {
        let holidays: HashSet<_> = [d("2026-01-06")].into_iter().collect();
        let hours = leave_hours(dt("2026-01-06 08:30"), dt("2026-01-06 17:30"), &holidays);
        assert_eq!(hours, 0.0);
    }

    #[test]
    fn lunch_overlap_is_subtracted() {
        let hours = leave_hours(dt("2026-01-05 11:00"), dt("2026-01-05 14:00"), &no_holidays());
        assert_eq!(hours, 2.0);
    }

    #[test]
    fn morning_ending_inside_lunch_counts_to_noon() {
        let hours = leave_hours(dt("2026-01-05 09:00"), dt("2026-01-05 12:30"), &no_holidays());
        assert_eq!(hours, 3.0);
    }

    #[test]
    fn spans_weekend_and_holiday() {
        // Mon 13:00 -> Wed 10:00 with Tue as a holiday:
        // Mon 13:00-17:30 (4.5) + Wed 08:30-10:00 (1.5)
        let holidays: HashSet<_> = [d("2026-01-06")].into_iter().collect();
        let hours = leave_hours(dt("2026-01-05 13:00"), dt("2026-01-07 10:00"), &holidays);
        assert_eq!(hours, 6.0);

        // Fri 16:00 -> Mon 10:00 skips Sat/Sun entirely
        let hours = leave_hours(dt("2026-01-02 16:00"), dt("2026-01-05 10:00"), &no_holidays());
        assert_eq!(hours, 3.0);
    }

    #[test]
    fn reversed_or_empty_interval_is_zero() {
        assert_eq!(
            leave_hours(dt("2026-01-05 17:00"), dt("2026-01-05 09:00"), &no_holidays()),
            0.0
        );
        assert_eq!(
            leave_hours(dt("2026-01-05 09:00"), dt("2026-01-05 09:00"), &no_holidays()),
            0.0
        );
    }

    #[test]
    fn result_is_always_a_half_hour_multiple() {
        for (start, end) in [
            ("2026-01-05 08:30", "2026-01-05 08:40"),
            ("2026-01-05 08:30", "2026-01-05 09:45"),
            ("2026-01-05 10:10", "2026-01-07 15:25"),
        ] {
            let hours = leave_hours(dt(start), dt(end), &no_holidays());
            assert_eq!((hours * 2.0).fract(), 0.0, "{start}..{end} -> {hours}");
        }
    }

    #[test]
    fn outside_workday_window_is_zero() {
        let hours = leave_hours(dt("2026-01-05 18:00"), dt("2026-01-05 22:00"), &no_holidays());
        assert_eq!(hours, 0.0);
    }

    #[test]
    fn overtime_is_raw_elapsed_time() {
        assert_eq!(overtime_hours(dt("2026-01-03 18:00"), dt("2026-01-03 21:30")), 3.5);
        assert_eq!(overtime_hours(dt("2026-01-03 18:00"), dt("2026-01-03 18:20")), 0.3);
        assert_eq!(overtime_hours(dt("2026-01-03 21:00"), dt("2026-01-03 18:00")), 0.0);
    }
}
