//! Bounded lazy iteration between two instants.

use crate::engine::{self, Direction};
use crate::error::CronError;
use crate::matcher;
use crate::schema::{CronOptions, CronSchema};
use crate::timestamp::WallClock;

type Realize = Box<dyn FnMut(WallClock) -> Result<WallClock, CronError>>;

/// A finite, lazy sequence of wall-clock tuples satisfying `schema`
/// between `start` and `stop`. Direction is inferred from their
/// ordering: forward when `start <= stop`, backward otherwise.
///
/// `realize` is consulted the same way `Croniter::resolve` consults it
/// (see `crate::lib`): a candidate whose zone realization doesn't round
/// -trip back to the same wall-clock tuple fell in a DST gap and is
/// skipped rather than emitted. Pass `Ok` identity when no zone is in
/// play (e.g. `crate::matcher::is_match_range`).
pub struct WallClockRange {
    schema: CronSchema,
    opts: CronOptions,
    direction: Direction,
    stop: WallClock,
    inclusive_stop: bool,
    realize: Realize,
    next: Option<WallClock>,
}

impl WallClockRange {
    #[must_use]
    pub fn new<F>(
        schema: &CronSchema,
        opts: &CronOptions,
        start: WallClock,
        stop: WallClock,
        exclude_ends: bool,
        realize: F,
    ) -> Self
    where
        F: FnMut(WallClock) -> Result<WallClock, CronError> + 'static,
    {
        let direction = if start <= stop {
            Direction::Forward
        } else {
            Direction::Backward
        };
        let inclusive_stop = !exclude_ends;
        let mut realize: Realize = Box::new(realize);

        let first = if !exclude_ends && matcher::is_match(schema, opts, start) {
            Some(start)
        } else {
            engine::search_realized(schema, start, opts, direction, &mut *realize).ok()
        };
        let next = first.filter(|&wc| in_bound(wc, stop, direction, inclusive_stop));

        Self {
            schema: schema.clone(),
            opts: opts.clone(),
            direction,
            stop,
            inclusive_stop,
            realize,
            next,
        }
    }
}

impl Iterator for WallClockRange {
    type Item = WallClock;

    fn next(&mut self) -> Option<WallClock> {
        let current = self.next.take()?;
        let advanced =
            engine::search_realized(&self.schema, current, &self.opts, self.direction, &mut *self.realize).ok();
        self.next = advanced.filter(|&wc| in_bound(wc, self.stop, self.direction, self.inclusive_stop));
        Some(current)
    }
}

fn in_bound(wc: WallClock, stop: WallClock, direction: Direction, inclusive: bool) -> bool {
    match (direction, inclusive) {
        (Direction::Forward, true) => wc <= stop,
        (Direction::Forward, false) => wc < stop,
        (Direction::Backward, true) => wc >= stop,
        (Direction::Backward, false) => wc > stop,
    }
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
            second: crate::schema::ExpandedField::wildcard_of(0, 59),
            year: crate::schema::ExpandedField::wildcard_of(1970, 2099),
            has_seconds: false,
            has_year: false,
        }
    }

    #[test]
    fn includes_both_ends_by_default() {
        let schema = build_schema("0 0 * * *");
        let opts = CronOptions::default();
        let start = WallClock::new(2016, 12, 2, 0, 0, 0);
        let stop = WallClock::new(2016, 12, 10, 0, 0, 0);
        let days: Vec<u32> = WallClockRange::new(&schema, &opts, start, stop, false, |wc| Ok(wc))
            .map(|wc| wc.day)
            .collect();
        assert_eq!(days.len(), 9);
        assert_eq!(days.first().copied(), Some(2));
        assert_eq!(days.last().copied(), Some(10));
    }

    #[test]
    fn excludes_ends_when_asked() {
        let schema = build_schema("0 0 * * *");
        let opts = CronOptions::default();
        let start = WallClock::new(2016, 12, 2, 0, 0, 0);
        let stop = WallClock::new(2016, 12, 10, 0, 0, 0);
        let days: Vec<u32> = WallClockRange::new(&schema, &opts, start, stop, true, |wc| Ok(wc))
            .map(|wc| wc.day)
            .collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days.first().copied(), Some(3));
        assert_eq!(days.last().copied(), Some(9));
    }

    #[test]
    fn reverse_is_mirror_image() {
        let schema = build_schema("0 0 * * *");
        let opts = CronOptions::default();
        let start = WallClock::new(2016, 12, 2, 0, 0, 0);
        let stop = WallClock::new(2016, 12, 10, 0, 0, 0);
        let fwd: Vec<WallClock> = WallClockRange::new(&schema, &opts, start, stop, false, |wc| Ok(wc)).collect();
        let mut rev: Vec<WallClock> = WallClockRange::new(&schema, &opts, stop, start, false, |wc| Ok(wc)).collect();
        rev.reverse();
        assert_eq!(fwd, rev);
    }
}
