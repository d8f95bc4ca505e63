//! Conversions between a wall-clock record and zoned instants,
//! including the documented DST gap/fold behavior.

use crate::calendar::days_in_month;
use crate::error::CronError;
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike};

/// A caller-zone-agnostic `(year, month, day, hour, minute, second)`
/// tuple. This is the representation the occurrence engine (§4.6)
/// mutates field-by-field; it is only converted to/from a real instant
/// at the boundary (construction, and after each candidate is settled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallClock {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallClock {
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    fn naive(self) -> Result<NaiveDateTime, CronError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, self.second))
            .ok_or_else(|| CronError::BadCron("invalid calendar date".into()))
    }

    fn from_naive(naive: NaiveDateTime) -> Self {
        Self {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
        }
    }
}

/// Read the wall-clock tuple out of a zoned instant, in that instant's
/// own zone.
#[must_use]
pub fn to_wall<TZ: TimeZone>(instant: &DateTime<TZ>) -> WallClock {
    WallClock {
        year: instant.year(),
        month: instant.month(),
        day: instant.day(),
        hour: instant.hour(),
        minute: instant.minute(),
        second: instant.second(),
    }
}

/// How many one-minute probes to take when resolving a spring-forward
/// gap before giving up. DST gaps are at most a couple of hours in any
/// IANA zone; this bound is generous.
const GAP_SEARCH_MINUTES: i64 = 6 * 60;

/// Realize a wall-clock tuple as an instant in `tz`, applying the
/// documented gap/fold rule:
/// - spring-forward gap: first valid instant at/after the requested wall
///   time;
/// - fall-back fold: the earlier (chronologically first) of the two
///   candidate instants.
pub fn from_wall<TZ: TimeZone>(wall: WallClock, tz: &TZ) -> Result<DateTime<TZ>, CronError> {
    let naive = wall.naive()?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier),
        LocalResult::None => resolve_gap(naive, tz),
    }
}

/// A wall time that falls inside a spring-forward gap has no instant of
/// its own. The documented rule is to shift it forward by
/// exactly the width of the gap, preserving its minute-within-the-hour
/// rather than snapping to whatever wall-clock value happens to be
/// first after the gap — e.g. Europe/Paris `02:01` on the day the clocks
/// jump from 02:00 to 03:00 resolves to `03:01`, not `03:00`.
fn resolve_gap<TZ: TimeZone>(start: NaiveDateTime, tz: &TZ) -> Result<DateTime<TZ>, CronError> {
    let before = probe_valid(start, tz, -1)?;
    let after = probe_valid(start, tz, 1)?;
    let shift = after.offset().fix().local_minus_utc() - before.offset().fix().local_minus_utc();
    let shifted = start + Duration::seconds(i64::from(shift));
    match tz.from_local_datetime(&shifted) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(CronError::BadCron(
            "timezone transition gap exceeded search bound".into(),
        )),
    }
}

/// Step away from `start` one minute at a time (in `direction`, ±1)
/// until landing on a wall time that actually exists, to read off the
/// UTC offset in effect just outside the gap on that side.
fn probe_valid<TZ: TimeZone>(
    start: NaiveDateTime,
    tz: &TZ,
    direction: i64,
) -> Result<DateTime<TZ>, CronError> {
    let mut probe = start;
    for _ in 0..GAP_SEARCH_MINUTES {
        probe += Duration::minutes(direction);
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => return Ok(dt),
            LocalResult::None => {}
        }
    }
    Err(CronError::BadCron(
        "timezone transition gap exceeded search bound".into(),
    ))
}

/// Add (or subtract, for negative `delta`) whole minutes to the
/// wall-clock tuple, carrying into hour/day/month/year as needed. Pure
/// calendar arithmetic; DST is resolved later by `from_wall`.
#[must_use]
pub fn add_minutes(wall: WallClock, delta: i64) -> WallClock {
    shift(wall, Duration::minutes(delta))
}

#[must_use]
pub fn add_hours(wall: WallClock, delta: i64) -> WallClock {
    shift(wall, Duration::hours(delta))
}

#[must_use]
pub fn add_days(wall: WallClock, delta: i64) -> WallClock {
    shift(wall, Duration::days(delta))
}

fn shift(wall: WallClock, delta: Duration) -> WallClock {
    let Ok(naive) = wall.naive() else {
        return wall;
    };
    WallClock::from_naive(naive + delta)
}

/// Add whole months, clamping the day into the resulting month's range
/// (e.g. Jan 31 + 1 month -> Feb 28/29, never Mar 3).
#[must_use]
pub fn add_months(wall: WallClock, delta: i64) -> WallClock {
    let total = i64::from(wall.month) - 1 + delta;
    let year = wall.year + i32::try_from(total.div_euclid(12)).unwrap_or(0);
    let month = u32::try_from(total.rem_euclid(12)).unwrap_or(0) + 1;
    let day = wall.day.min(days_in_month(year, month));
    WallClock {
        year,
        month,
        day,
        ..wall
    }
}

/// Add whole years, clamping Feb 29 to Feb 28 when landing on a
/// non-leap year.
#[must_use]
pub fn add_years(wall: WallClock, delta: i64) -> WallClock {
    let year = wall.year + i32::try_from(delta).unwrap_or(0);
    let day = wall.day.min(days_in_month(year, wall.month));
    WallClock { year, day, ..wall }
}
