//! Occurrence search — the centerpiece. Operates entirely
//! in the zoned wall-clock tuple (`crate::timestamp::WallClock`);
//! zone/DST resolution happens once, at the edges, in `crate::lib`.

use crate::calendar::{chrono_to_cron_dow, days_in_month, last_weekday_of_month, nth_occurrence_day};
use crate::error::CronError;
use crate::schema::{CronOptions, CronSchema, DowMark, ExpandedField};
use crate::timestamp::WallClock;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Find the next (`Forward`) or previous (`Backward`) wall-clock tuple
/// satisfying `schema`, strictly after/before `start`.
pub fn search(
    schema: &CronSchema,
    start: WallClock,
    opts: &CronOptions,
    direction: Direction,
) -> Result<WallClock, CronError> {
    let mut candidate = initial_candidate(schema, start, direction);
    let start_year = candidate.year;

    loop {
        let span = candidate.year.abs_diff(start_year);
        if span > opts.max_years_between_matches {
            return Err(CronError::BadDate);
        }

        if schema.has_year {
            let cur = year_as_u32(candidate.year);
            if !schema.year.contains(cur) {
                match next_domain_value(&schema.year, cur, direction) {
                    Some(y) => {
                        candidate.year = i32::try_from(y).unwrap_or(candidate.year);
                        reset_month_day_time(&mut candidate, direction);
                        continue;
                    }
                    None => return Err(CronError::BadDate),
                }
            }
        }

        if !schema.month.contains(candidate.month) {
            match next_domain_value(&schema.month, candidate.month, direction) {
                Some(m) => {
                    candidate.month = m;
                    reset_day_time(&mut candidate, direction);
                    continue;
                }
                None => {
                    candidate.year = step_year(candidate.year, direction);
                    reset_month_day_time(&mut candidate, direction);
                    continue;
                }
            }
        }

        if !day_matches(schema, candidate.year, candidate.month, candidate.day, opts) {
            match next_valid_day(schema, candidate.year, candidate.month, candidate.day, opts, direction) {
                Some(d) => {
                    candidate.day = d;
                    reset_time(&mut candidate, direction);
                    continue;
                }
                None => {
                    bump_month(&mut candidate, direction);
                    continue;
                }
            }
        }

        if !schema.hour.contains(candidate.hour) {
            match next_domain_value(&schema.hour, candidate.hour, direction) {
                Some(h) => {
                    candidate.hour = h;
                    reset_minute_second(&mut candidate, direction);
                    continue;
                }
                None => {
                    bump_day(&mut candidate, direction);
                    continue;
                }
            }
        }

        if !schema.minute.contains(candidate.minute) {
            match next_domain_value(&schema.minute, candidate.minute, direction) {
                Some(m) => {
                    candidate.minute = m;
                    reset_second(&mut candidate, direction);
                    continue;
                }
                None => {
                    bump_hour(&mut candidate, direction);
                    continue;
                }
            }
        }

        if schema.has_seconds && !schema.second.contains(candidate.second) {
            match next_domain_value(&schema.second, candidate.second, direction) {
                Some(s) => {
                    candidate.second = s;
                    continue;
                }
                None => {
                    bump_minute(&mut candidate, direction);
                    continue;
                }
            }
        }

        if !schema.has_seconds {
            candidate.second = 0;
        }
        return Ok(candidate);
    }
}

fn year_as_u32(year: i32) -> u32 {
    u32::try_from(year).unwrap_or(0)
}

/// Like [`search`], but rejects a candidate whose zone realization
/// doesn't round-trip back to the same wall-clock tuple — i.e. one that
/// falls inside a DST spring-forward gap — and keeps searching past it
/// instead of accepting the shifted instant. `realize` converts a
/// candidate to the wall-clock tuple its actual zoned instant reads
/// back as (identity for a real wall time; shifted for a gap).
///
/// A fall-back fold realizes to the same tuple (the earlier of the two
/// ambiguous instants is still read back as that same wall time), so
/// this only ever rejects gap candidates, never fold ones.
pub fn search_realized<F>(
    schema: &CronSchema,
    start: WallClock,
    opts: &CronOptions,
    direction: Direction,
    mut realize: F,
) -> Result<WallClock, CronError>
where
    F: FnMut(WallClock) -> Result<WallClock, CronError>,
{
    let mut candidate = start;
    loop {
        candidate = search(schema, candidate, opts, direction)?;
        if realize(candidate)? == candidate {
            return Ok(candidate);
        }
    }
}

/// Day-of-month/day-of-week union (classic Vixie) vs. intersection,
/// with `L`/`#n`/`Ld` resolved per side.
fn day_matches(schema: &CronSchema, year: i32, month: u32, day: u32, opts: &CronOptions) -> bool {
    let dom_unconstrained = schema.day_of_month.is_unconstrained();
    let dow_unconstrained = schema.day_of_week.is_unconstrained();

    if dom_unconstrained && dow_unconstrained {
        return true;
    }
    let dom_match = dom_matches(&schema.day_of_month, year, month, day);
    if dom_unconstrained {
        return dow_matches(&schema.day_of_week, year, month, day);
    }
    let dow_match = dow_matches(&schema.day_of_week, year, month, day);
    if dow_unconstrained {
        return dom_match;
    }

    let union = opts.day_or && !opts.implement_cron_bug;
    if union {
        dom_match || dow_match
    } else {
        dom_match && dow_match
    }
}

fn dom_matches(field: &ExpandedField, year: i32, month: u32, day: u32) -> bool {
    if field.includes_last_day && day == days_in_month(year, month) {
        return true;
    }
    field.contains(day)
}

fn dow_matches(field: &ExpandedField, year: i32, month: u32, day: u32) -> bool {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return false;
    };
    let weekday = chrono_to_cron_dow(date.weekday());
    if field.contains(weekday) {
        return true;
    }
    field.dow_marks.iter().any(|mark| match mark {
        DowMark::Nth(d, n) => {
            *d == weekday && nth_occurrence_day(year, month, weekday, *n) == Some(day)
        }
        DowMark::Last(d) => *d == weekday && last_weekday_of_month(year, month, weekday) == day,
    })
}

fn next_valid_day(
    schema: &CronSchema,
    year: i32,
    month: u32,
    day: u32,
    opts: &CronOptions,
    direction: Direction,
) -> Option<u32> {
    let days = days_in_month(year, month);
    match direction {
        Direction::Forward => ((day + 1)..=days)
            .find(|&d| day_matches(schema, year, month, d, opts)),
        Direction::Backward => (1..day)
            .rev()
            .find(|&d| day_matches(schema, year, month, d, opts)),
    }
}

fn next_domain_value(field: &ExpandedField, current: u32, direction: Direction) -> Option<u32> {
    match direction {
        Direction::Forward => first_after(&field.values, current),
        Direction::Backward => last_before(&field.values, current),
    }
}

fn first_after(values: &BTreeSet<u32>, current: u32) -> Option<u32> {
    values.range((current + 1)..).next().copied()
}

fn last_before(values: &BTreeSet<u32>, current: u32) -> Option<u32> {
    if current == 0 {
        return None;
    }
    values.range(..current).next_back().copied()
}

fn step_year(year: i32, direction: Direction) -> i32 {
    match direction {
        Direction::Forward => year + 1,
        Direction::Backward => year - 1,
    }
}

fn initial_candidate(schema: &CronSchema, start: WallClock, direction: Direction) -> WallClock {
    let mut wc = start;
    if schema.has_seconds {
        bump_second(&mut wc, direction);
    } else {
        wc.second = 0;
        bump_minute(&mut wc, direction);
    }
    wc
}

/// Step `wc` forward by exactly one schema-resolution unit (one second
/// if `has_seconds`, one minute otherwise). Used by `crate::matcher` to
/// build the "t + 1 unit" probe for its `get_prev`-based match check.
#[must_use]
pub fn step_forward_one_unit(wc: WallClock, has_seconds: bool) -> WallClock {
    let mut out = wc;
    if has_seconds {
        bump_second(&mut out, Direction::Forward);
    } else {
        out.second = 0;
        bump_minute(&mut out, Direction::Forward);
    }
    out
}

fn bump_second(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            if wc.second >= 59 {
                bump_minute(wc, direction);
                return;
            }
            wc.second += 1;
        }
        Direction::Backward => {
            if wc.second == 0 {
                bump_minute(wc, direction);
                return;
            }
            wc.second -= 1;
        }
    }
}

fn bump_minute(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            if wc.minute >= 59 {
                bump_hour(wc, direction);
                return;
            }
            wc.minute += 1;
        }
        Direction::Backward => {
            if wc.minute == 0 {
                bump_hour(wc, direction);
                return;
            }
            wc.minute -= 1;
        }
    }
    reset_second(wc, direction);
}

fn bump_hour(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            if wc.hour >= 23 {
                bump_day(wc, direction);
                return;
            }
            wc.hour += 1;
        }
        Direction::Backward => {
            if wc.hour == 0 {
                bump_day(wc, direction);
                return;
            }
            wc.hour -= 1;
        }
    }
    reset_minute_second(wc, direction);
}

fn bump_day(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            let days = days_in_month(wc.year, wc.month);
            if wc.day >= days {
                bump_month(wc, direction);
                return;
            }
            wc.day += 1;
        }
        Direction::Backward => {
            if wc.day <= 1 {
                bump_month(wc, direction);
                return;
            }
            wc.day -= 1;
        }
    }
    reset_time(wc, direction);
}

fn bump_month(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            if wc.month >= 12 {
                wc.year += 1;
                wc.month = 1;
            } else {
                wc.month += 1;
            }
            wc.day = 1;
        }
        Direction::Backward => {
            if wc.month <= 1 {
                wc.year -= 1;
                wc.month = 12;
            } else {
                wc.month -= 1;
            }
            wc.day = days_in_month(wc.year, wc.month);
        }
    }
    reset_time(wc, direction);
}

fn reset_month_day_time(wc: &mut WallClock, direction: Direction) {
    wc.month = match direction {
        Direction::Forward => 1,
        Direction::Backward => 12,
    };
    reset_day_time(wc, direction);
}

fn reset_day_time(wc: &mut WallClock, direction: Direction) {
    wc.day = match direction {
        Direction::Forward => 1,
        Direction::Backward => days_in_month(wc.year, wc.month),
    };
    reset_time(wc, direction);
}

fn reset_time(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            wc.hour = 0;
            wc.minute = 0;
            wc.second = 0;
        }
        Direction::Backward => {
            wc.hour = 23;
            wc.minute = 59;
            wc.second = 59;
        }
    }
}

fn reset_minute_second(wc: &mut WallClock, direction: Direction) {
    match direction {
        Direction::Forward => {
            wc.minute = 0;
            wc.second = 0;
        }
        Direction::Backward => {
            wc.minute = 59;
            wc.second = 59;
        }
    }
}

fn reset_second(wc: &mut WallClock, direction: Direction) {
    wc.second = match direction {
        Direction::Forward => 0,
        Direction::Backward => 59,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{expand::{expand_field, ExpandCtx}, lexer::tokenize, normalize::normalize, token::Field};

    fn build_schema(expr: &str) -> CronSchema {
        let raw = tokenize(expr, false).unwrap();
        let ctx = ExpandCtx {
            hash_id: b"",
            expand_from_start_time: false,
            start_value: 0,
        };
        let has_seconds = raw.second.is_some();
        let has_year = raw.year.is_some();
        CronSchema {
            minute: normalize(Field::Minute, expand_field(&raw.minute, Field::Minute, &ctx).unwrap()).unwrap(),
            hour: normalize(Field::Hour, expand_field(&raw.hour, Field::Hour, &ctx).unwrap()).unwrap(),
            day_of_month: normalize(
                Field::DayOfMonth,
                expand_field(&raw.day_of_month, Field::DayOfMonth, &ctx).unwrap(),
            )
            .unwrap(),
            month: normalize(Field::Month, expand_field(&raw.month, Field::Month, &ctx).unwrap()).unwrap(),
            day_of_week: normalize(
                Field::DayOfWeek,
                expand_field(&raw.day_of_week, Field::DayOfWeek, &ctx).unwrap(),
            )
            .unwrap(),
            second: raw.second.as_ref().map_or_else(
                || ExpandedField::wildcard_of(0, 59),
                |t| normalize(Field::Second, expand_field(t, Field::Second, &ctx).unwrap()).unwrap(),
            ),
            year: raw.year.as_ref().map_or_else(
                || ExpandedField::wildcard_of(1970, 2099),
                |t| normalize(Field::Year, expand_field(t, Field::Year, &ctx).unwrap()).unwrap(),
            ),
            has_seconds,
            has_year,
        }
    }

    #[test]
    fn every_five_minutes() {
        let schema = build_schema("*/5 * * * *");
        let start = WallClock::new(2019, 11, 5, 15, 56, 35);
        let next = search(&schema, start, &CronOptions::default(), Direction::Forward).unwrap();
        assert_eq!(next, WallClock::new(2019, 11, 5, 16, 0, 0));
    }

    #[test]
    fn leap_year_sequence() {
        let schema = build_schema("0 0 * * *");
        let opts = CronOptions::default();
        let mut cur = WallClock::new(1996, 2, 27, 0, 0, 0);
        cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
        assert_eq!(cur, WallClock::new(1996, 2, 28, 0, 0, 0));
        cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
        assert_eq!(cur, WallClock::new(1996, 2, 29, 0, 0, 0));
        cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
        assert_eq!(cur, WallClock::new(1996, 3, 1, 0, 0, 0));
    }

    #[test]
    fn vixie_union_by_default() {
        let schema = build_schema("0 16 */2 * sat");
        let opts = CronOptions::default();
        let mut cur = WallClock::new(2023, 5, 2, 0, 0, 0);
        let mut days = Vec::new();
        for _ in 0..4 {
            cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
            days.push(cur.day);
        }
        assert_eq!(days, vec![3, 5, 6, 7]);
    }

    #[test]
    fn vixie_bug_forces_intersection() {
        let schema = build_schema("0 16 */2 * sat");
        let mut opts = CronOptions::default();
        opts.implement_cron_bug = true;
        let mut cur = WallClock::new(2023, 5, 2, 0, 0, 0);
        let mut days = Vec::new();
        for _ in 0..4 {
            cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
            days.push((cur.month, cur.day));
        }
        assert_eq!(days, vec![(5, 13), (5, 27), (6, 3), (6, 17)]);
    }

    #[test]
    fn last_friday_of_month() {
        let schema = build_schema("0 0 * * L5");
        let opts = CronOptions::default();
        let mut cur = WallClock::new(1987, 1, 15, 0, 0, 0);
        cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
        assert_eq!(cur, WallClock::new(1987, 1, 30, 0, 0, 0));
        cur = search(&schema, cur, &opts, Direction::Forward).unwrap();
        assert_eq!((cur.month, cur.day), (2, 27));
    }

    #[test]
    fn sparse_multi_year_search() {
        let schema = build_schema("0 13 8 1,4,7,10 wed");
        let mut opts = CronOptions::default();
        opts.day_or = false;
        opts.max_years_between_matches = 5;
        let start = WallClock::new(2020, 9, 24, 0, 0, 0);
        let found = search(&schema, start, &opts, Direction::Forward).unwrap();
        assert_eq!(found, WallClock::new(2025, 1, 8, 13, 0, 0));

        opts.max_years_between_matches = 1;
        assert_eq!(
            search(&schema, start, &opts, Direction::Forward),
            Err(CronError::BadDate)
        );
    }

    #[test]
    fn backward_search_mirrors_forward() {
        let schema = build_schema("*/1 * * * *");
        let start = WallClock::new(2010, 8, 25, 0, 0, 0);
        let prev = search(&schema, start, &CronOptions::default(), Direction::Backward).unwrap();
        assert_eq!(prev, WallClock::new(2010, 8, 24, 23, 59, 0));
    }
}
