//! Zone-free calendar primitives. Everything here is pure
//! arithmetic over `(year, month, day)` — no timezone, no instant.

use chrono::{Datelike, NaiveDate, Weekday};

/// Gregorian leap-year rule.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `year`-`month` (1-indexed month).
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Same as `days_in_month` — the last day of the month is its day count.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    days_in_month(year, month)
}

/// `weekday` is 0 (Sunday) .. 6 (Saturday), matching the cron DOW
/// convention used throughout this crate. Returns the sorted day
/// numbers (length 4 or 5) on which that weekday falls in `year`-`month`.
#[must_use]
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: u32) -> Vec<u32> {
    let target = cron_dow_to_chrono(weekday);
    let days = days_in_month(year, month);
    let mut out = Vec::with_capacity(5);
    for day in 1..=days {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if date.weekday() == target {
                out.push(day);
            }
        }
    }
    out
}

/// Last element of `nth_weekday_of_month`.
#[must_use]
pub fn last_weekday_of_month(year: i32, month: u32, weekday: u32) -> u32 {
    nth_weekday_of_month(year, month, weekday)
        .last()
        .copied()
        .unwrap_or(days_in_month(year, month))
}

/// The day-of-month for the `n`th (1-indexed) occurrence of `weekday` in
/// `year`-`month`, if that occurrence exists (months have at most 5).
#[must_use]
pub fn nth_occurrence_day(year: i32, month: u32, weekday: u32, n: u8) -> Option<u32> {
    let days = nth_weekday_of_month(year, month, weekday);
    let idx = usize::from(n.saturating_sub(1));
    days.get(idx).copied()
}

/// Maps the cron convention (0 = Sunday .. 6 = Saturday) to
/// `chrono::Weekday`.
#[must_use]
pub fn cron_dow_to_chrono(weekday: u32) -> Weekday {
    match weekday % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Inverse of `cron_dow_to_chrono`: 0 = Sunday .. 6 = Saturday.
#[must_use]
pub fn chrono_to_cron_dow(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}
