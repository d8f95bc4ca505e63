//! Point-in-time and interval predicates built atop the occurrence
//! engine.

use crate::engine::{self, Direction};
use crate::schema::{CronOptions, CronSchema};
use crate::timestamp::WallClock;

/// True iff `t` itself satisfies `schema` at the schema's own
/// resolution (minute or second). Implemented as the spec prescribes:
/// step one unit past `t`, search backward, and check the result lands
/// exactly back on `t`. Expressions with no predecessor (e.g. a sparse
/// multi-year schedule near the `max_years_between_matches` bound)
/// report no match rather than propagating `BadDate`.
#[must_use]
pub fn is_match(schema: &CronSchema, opts: &CronOptions, t: WallClock) -> bool {
    let truncated = if schema.has_seconds {
        t
    } else {
        WallClock { second: 0, ..t }
    };
    let probe = step_forward_one_unit(truncated, schema.has_seconds);
    matches!(
        engine::search(schema, probe, opts, Direction::Backward),
        Ok(found) if found == truncated
    )
}

/// True iff any instant in the closed interval `[start, end]` (or
/// `[end, start]` if given in reverse) satisfies `schema`.
#[must_use]
pub fn is_match_range(schema: &CronSchema, opts: &CronOptions, start: WallClock, end: WallClock) -> bool {
    crate::range::WallClockRange::new(schema, opts, start, end, false, Ok)
        .next()
        .is_some()
}

fn step_forward_one_unit(wc: WallClock, has_seconds: bool) -> WallClock {
    engine::step_forward_one_unit(wc, has_seconds)
}
