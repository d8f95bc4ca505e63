//! Cron expression engine: parsing, field expansion, and timezone-aware
//! occurrence search.
//!
//! Example:
//! ```
//! use chrono::{DateTime, Utc};
//! use chrono_tz::Europe::Lisbon;
//! use core::str::FromStr;
//! use croniter_rs::parse;
//!
//! if let Ok(next) = parse("*/5 * * * *", &DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap()) {
//!     println!("when: {}", next);
//! }
//!
//! // use a custom timezone
//! assert!(parse("*/5 * * * *", &DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap().with_timezone(&Lisbon)).is_ok());
//!
//! // second/year fields, L/#n/H, and a stateful cursor
//! use croniter_rs::{Croniter, CronOptions};
//! let start = DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap();
//! let mut cursor = Croniter::new("0 0 L * *", &start, CronOptions::default()).unwrap();
//! assert!(cursor.get_next().is_ok());
//! ```

pub mod calendar;
pub mod engine;
pub mod error;
pub mod expand;
pub mod hash;
pub mod lexer;
pub mod matcher;
pub mod normalize;
pub mod range;
pub mod schema;
pub mod timestamp;
pub mod token;

pub use error::CronError;
pub use schema::{CronOptions, RetType};
pub use timestamp::WallClock;

use chrono::{DateTime, Datelike, TimeZone};
use engine::Direction;
use schema::{CronSchema, ExpandedField};
use std::collections::BTreeSet;
use token::Field;

/// Parse `cron` against `dt` and return the next matching instant, in
/// `dt`'s own timezone. A thin, option-free convenience wrapper around
/// [`Croniter`] for the common case of a one-shot "what's next" query,
/// supporting the full grammar (5/6/7 fields, `L`, `#n`, `H`/`R`,
/// DST-aware stepping).
///
/// # Errors
/// See [`CronError`].
pub fn parse<TZ: TimeZone>(cron: &str, dt: &DateTime<TZ>) -> Result<DateTime<TZ>, CronError> {
    Croniter::new(cron, dt, CronOptions::default())?.get_next()
}

/// Expand `cron` into its per-field value domains without anchoring it
/// to a particular instant. Mirrors `croniter.expand()`'s introspection
/// role: useful for validating an expression or inspecting what it
/// resolves to.
///
/// # Errors
/// See [`CronError`].
pub fn expand(cron: &str, opts: &CronOptions) -> Result<CronSchema, CronError> {
    let start = WallClock::new(1970, 1, 1, 0, 0, 0);
    build_schema(cron, opts, start)
}

/// True iff `cron` parses under the default options. `implement_cron_bug`
/// and `day_or` don't affect parseability, so this always checks with
/// defaults.
#[must_use]
pub fn is_valid(cron: &str) -> bool {
    expand(cron, &CronOptions::default()).is_ok()
}

/// A lazy, finite sequence of instants satisfying `cron` between
/// `start` and `stop` (spec's `croniter_range`). Traverses forward when
/// `start <= stop`, backward otherwise; `start`'s and `stop`'s
/// timezones must agree since both are the same `TZ`.
///
/// # Errors
/// See [`CronError`].
pub fn croniter_range<TZ: TimeZone>(
    cron: &str,
    start: &DateTime<TZ>,
    stop: &DateTime<TZ>,
    opts: &CronOptions,
    exclude_ends: bool,
) -> Result<impl Iterator<Item = DateTime<TZ>>, CronError> {
    let start_wall = timestamp::to_wall(start);
    let stop_wall = timestamp::to_wall(stop);
    let schema = build_schema(cron, opts, start_wall)?;
    let tz = start.timezone();
    let realize_tz = tz.clone();
    Ok(range::WallClockRange::new(
        &schema,
        opts,
        start_wall,
        stop_wall,
        exclude_ends,
        move |wc| timestamp::from_wall(wc, &realize_tz).map(|dt| timestamp::to_wall(&dt)),
    )
    .filter_map(move |wc| timestamp::from_wall(wc, &tz).ok()))
}

/// `croniter_range`, shaped by `opts.ret_type` the way spec.md §4.9
/// documents: an instant when `RetType::DateTime`, a fractional-second
/// Unix timestamp when `RetType::Float`.
///
/// # Errors
/// See [`CronError`].
pub fn croniter_range_values<TZ: TimeZone>(
    cron: &str,
    start: &DateTime<TZ>,
    stop: &DateTime<TZ>,
    opts: &CronOptions,
    exclude_ends: bool,
) -> Result<impl Iterator<Item = CronValue<TZ>>, CronError> {
    let ret_type = opts.ret_type;
    Ok(
        croniter_range(cron, start, stop, opts, exclude_ends)?.map(move |dt| match ret_type {
            RetType::DateTime => CronValue::DateTime(dt),
            RetType::Float => CronValue::Timestamp(datetime_to_timestamp(&dt)),
        }),
    )
}

/// True iff `t` satisfies `cron` at the expression's own resolution
/// (spec's `match`): builds the expanded form anchored at `t` and
/// checks it directly, the same way [`parse`] builds one anchored at
/// `dt` for `get_next`.
///
/// # Errors
/// See [`CronError`].
pub fn cron_match<TZ: TimeZone>(cron: &str, t: &DateTime<TZ>, opts: &CronOptions) -> Result<bool, CronError> {
    let wall = timestamp::to_wall(t);
    let schema = build_schema(cron, opts, wall)?;
    Ok(matcher::is_match(&schema, opts, wall))
}

/// True iff any instant in `[start, end]` (or `[end, start]`, given in
/// reverse) satisfies `cron` (spec's `match_range`).
///
/// # Errors
/// See [`CronError`].
pub fn cron_match_range<TZ: TimeZone>(
    cron: &str,
    start: &DateTime<TZ>,
    end: &DateTime<TZ>,
    opts: &CronOptions,
) -> Result<bool, CronError> {
    let start_wall = timestamp::to_wall(start);
    let end_wall = timestamp::to_wall(end);
    let schema = build_schema(cron, opts, start_wall)?;
    Ok(matcher::is_match_range(&schema, opts, start_wall, end_wall))
}

/// Convert an instant to a Unix timestamp with sub-second precision,
/// the representation `CronOptions { ret_type: RetType::Float, .. }`
/// callers want back from range/cursor emission.
#[must_use]
pub fn datetime_to_timestamp<TZ: TimeZone>(dt: &DateTime<TZ>) -> f64 {
    let secs = dt.timestamp() as f64;
    let nanos = f64::from(dt.timestamp_subsec_nanos());
    secs + nanos / 1_000_000_000.0
}

/// The shape `CronOptions::ret_type` selects for an emitted match
/// (spec.md §4.9): a zoned instant, or a fractional-second Unix
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum CronValue<TZ: TimeZone> {
    DateTime(DateTime<TZ>),
    Timestamp(f64),
}

/// A stateful occurrence cursor: wraps a parsed, expanded
/// expression and a "current" wall-clock tuple in a fixed timezone, and
/// steps it forward/backward on demand.
pub struct Croniter<TZ: TimeZone> {
    schema: CronSchema,
    opts: CronOptions,
    tz: TZ,
    cur: WallClock,
    initial: bool,
}

impl<TZ: TimeZone> Croniter<TZ> {
    /// Parse `cron` and anchor a cursor at `start_time`.
    ///
    /// # Errors
    /// See [`CronError`].
    pub fn new(cron: &str, start_time: &DateTime<TZ>, opts: CronOptions) -> Result<Self, CronError> {
        let tz = start_time.timezone();
        let cur = timestamp::to_wall(start_time);
        let schema = build_schema(cron, &opts, cur)?;
        Ok(Self {
            schema,
            opts,
            tz,
            cur,
            initial: true,
        })
    }

    /// The least instant strictly after the cursor's current position
    /// matching the expression, except that a freshly constructed (or
    /// force-`set_current`) cursor whose start time itself matches
    /// returns that start time once. Mutates the cursor to the returned
    /// instant.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn get_next(&mut self) -> Result<DateTime<TZ>, CronError> {
        self.advance(Direction::Forward)
    }

    /// Mirror of [`Self::get_next`], searching backward.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn get_prev(&mut self) -> Result<DateTime<TZ>, CronError> {
        self.advance(Direction::Backward)
    }

    /// `get_next` without mutating the cursor (`update_current = false`
    /// in spec terms).
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn peek_next(&self) -> Result<DateTime<TZ>, CronError> {
        self.peek(Direction::Forward)
    }

    /// `get_prev` without mutating the cursor.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn peek_prev(&self) -> Result<DateTime<TZ>, CronError> {
        self.peek(Direction::Backward)
    }

    /// [`Self::get_next`], shaped by `opts.ret_type` (spec.md §4.9):
    /// a [`CronValue::DateTime`] or, with `RetType::Float`, a
    /// [`CronValue::Timestamp`].
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn get_next_value(&mut self) -> Result<CronValue<TZ>, CronError> {
        self.get_next().map(|dt| self.shape_value(dt))
    }

    /// Mirror of [`Self::get_next_value`], searching backward.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn get_prev_value(&mut self) -> Result<CronValue<TZ>, CronError> {
        self.get_prev().map(|dt| self.shape_value(dt))
    }

    /// [`Self::peek_next`], shaped by `opts.ret_type`.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn peek_next_value(&self) -> Result<CronValue<TZ>, CronError> {
        self.peek_next().map(|dt| self.shape_value(dt))
    }

    /// [`Self::peek_prev`], shaped by `opts.ret_type`.
    ///
    /// # Errors
    /// [`CronError::BadDate`] if no match exists within
    /// `max_years_between_matches` years.
    pub fn peek_prev_value(&self) -> Result<CronValue<TZ>, CronError> {
        self.peek_prev().map(|dt| self.shape_value(dt))
    }

    fn shape_value(&self, dt: DateTime<TZ>) -> CronValue<TZ> {
        match self.opts.ret_type {
            RetType::DateTime => CronValue::DateTime(dt),
            RetType::Float => CronValue::Timestamp(datetime_to_timestamp(&dt)),
        }
    }

    /// The cursor's current position as an instant.
    ///
    /// # Errors
    /// [`CronError::BadCron`] if the wall-clock tuple no longer denotes
    /// a valid calendar date (can't happen through normal use of this
    /// API; guards against a cursor built from invalid raw fields).
    pub fn get_current(&self) -> Result<DateTime<TZ>, CronError> {
        timestamp::from_wall(self.cur, &self.tz)
    }

    /// Move the cursor to `t`. With `force = true`, this unconditionally
    /// overwrites the position and re-arms the "initial" flag so the
    /// next `get_next`/`get_prev` may return `t` itself if it matches —
    /// the same behavior as a freshly constructed cursor. Without
    /// `force`, moves that would go backward in time are rejected.
    ///
    /// # Errors
    /// [`CronError::BadCron`] if `!force` and `t` precedes the cursor's
    /// current position.
    pub fn set_current(&mut self, t: &DateTime<TZ>, force: bool) -> Result<(), CronError> {
        let wc = timestamp::to_wall(t);
        if !force && wc < self.cur {
            return Err(CronError::BadCron(
                "set_current: non-monotonic move requires force".into(),
            ));
        }
        self.cur = wc;
        if force {
            self.initial = true;
        }
        Ok(())
    }

    /// A lazy, unbounded-length iterator of successive `get_next` calls.
    /// Each item can independently fail with [`CronError::BadDate`] once
    /// the search runs past `max_years_between_matches`; the iterator
    /// itself never ends on its own (consumers bound it, e.g. with
    /// `take` or by stopping on the first `Err`).
    pub fn all_next(&mut self) -> impl Iterator<Item = Result<DateTime<TZ>, CronError>> + '_ {
        std::iter::from_fn(move || Some(self.get_next()))
    }

    /// Mirror of [`Self::all_next`], searching backward.
    pub fn all_prev(&mut self) -> impl Iterator<Item = Result<DateTime<TZ>, CronError>> + '_ {
        std::iter::from_fn(move || Some(self.get_prev()))
    }

    /// [`Self::all_next`], shaped by `opts.ret_type`.
    pub fn all_next_values(&mut self) -> impl Iterator<Item = Result<CronValue<TZ>, CronError>> + '_ {
        std::iter::from_fn(move || Some(self.get_next_value()))
    }

    /// [`Self::all_prev`], shaped by `opts.ret_type`.
    pub fn all_prev_values(&mut self) -> impl Iterator<Item = Result<CronValue<TZ>, CronError>> + '_ {
        std::iter::from_fn(move || Some(self.get_prev_value()))
    }

    fn advance(&mut self, direction: Direction) -> Result<DateTime<TZ>, CronError> {
        let wc = self.resolve(direction)?;
        self.initial = false;
        self.cur = wc;
        timestamp::from_wall(wc, &self.tz)
    }

    fn peek(&self, direction: Direction) -> Result<DateTime<TZ>, CronError> {
        let wc = self.resolve(direction)?;
        timestamp::from_wall(wc, &self.tz)
    }

    fn resolve(&self, direction: Direction) -> Result<WallClock, CronError> {
        if self.initial && matcher::is_match(&self.schema, &self.opts, self.cur) {
            return Ok(self.cur);
        }
        let tz = &self.tz;
        engine::search_realized(&self.schema, self.cur, &self.opts, direction, |wc| {
            timestamp::from_wall(wc, tz).map(|dt| timestamp::to_wall(&dt))
        })
    }
}

/// `@keyword` substitution happens before tokenization proper: a
/// standalone `@yearly`/`@monthly`/... expression expands to its literal
/// (or, with a `hash_id`, hashed) 5-field form.
fn substitute_keyword(cron: &str, hashed: bool) -> String {
    let trimmed = cron.trim();
    if trimmed.starts_with('@') && trimmed.split_whitespace().count() == 1 {
        if let Some(expanded) = lexer::expand_keyword(trimmed, hashed) {
            return expanded.to_string();
        }
    }
    cron.to_string()
}

fn build_schema(cron: &str, opts: &CronOptions, start: WallClock) -> Result<CronSchema, CronError> {
    let expr = substitute_keyword(cron, opts.hash_id.is_some());
    let raw = lexer::tokenize(&expr, opts.second_at_beginning)?;
    let hash_id: &[u8] = opts.hash_id.as_deref().unwrap_or(b"");
    let start_weekday = calendar::chrono_to_cron_dow(
        chrono::NaiveDate::from_ymd_opt(start.year, start.month, start.day)
            .map_or(chrono::Weekday::Sun, |d| d.weekday()),
    );

    let ctx = |value: u32| expand::ExpandCtx {
        hash_id,
        expand_from_start_time: opts.expand_from_start_time,
        start_value: value,
    };

    let field = |tokens: &[token::FieldToken], f: Field, start_value: u32| -> Result<ExpandedField, CronError> {
        normalize::normalize(f, expand::expand_field(tokens, f, &ctx(start_value))?)
    };

    let minute = field(&raw.minute, Field::Minute, start.minute)?;
    let hour = field(&raw.hour, Field::Hour, start.hour)?;
    let day_of_month = field(&raw.day_of_month, Field::DayOfMonth, start.day)?;
    let month = field(&raw.month, Field::Month, start.month)?;
    let day_of_week = field(&raw.day_of_week, Field::DayOfWeek, start_weekday)?;

    let has_seconds = raw.second.is_some();
    let second = match &raw.second {
        Some(tokens) => field(tokens, Field::Second, start.second)?,
        None => ExpandedField::wildcard_of(0, 59),
    };

    let has_year = raw.year.is_some();
    let year = match &raw.year {
        Some(tokens) => field(tokens, Field::Year, u32::try_from(start.year).unwrap_or(0))?,
        None => ExpandedField::wildcard_of(1970, 2099),
    };

    Ok(CronSchema {
        minute,
        hour,
        day_of_month,
        month,
        day_of_week,
        second,
        year,
        has_seconds,
        has_year,
    })
}

/// Parse a single field's token list against an explicit `(min, max)`
/// range, outside the full 5/6/7-field schema machinery. Useful for
/// ad-hoc validation of one field in isolation.
///
/// # Errors
/// See [`CronError`].
pub fn parse_field(field: &str, min: u32, max: u32) -> Result<BTreeSet<u32>, CronError> {
    let cron_field = field_for_range(min, max)?;
    let tokens = lexer::tokenize_field(field, cron_field)?;
    let expanded = expand::expand_field(
        &tokens,
        cron_field,
        &expand::ExpandCtx {
            hash_id: b"",
            expand_from_start_time: false,
            start_value: min,
        },
    )?;
    Ok(expanded.values)
}

fn field_for_range(min: u32, max: u32) -> Result<Field, CronError> {
    match (min, max) {
        (0, 59) => Ok(Field::Minute),
        (0, 23) => Ok(Field::Hour),
        (1, 31) => Ok(Field::DayOfMonth),
        (1, 12) => Ok(Field::Month),
        (0, 6 | 7) => Ok(Field::DayOfWeek),
        (1970, 2099) => Ok(Field::Year),
        _ => Err(CronError::BadTypeRange),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core::str::FromStr;

    #[test]
    fn parse_every_5_minutes_rounds_up() {
        let dt = DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap();
        let next = parse("*/5 * * * *", &dt).unwrap();
        assert_eq!(next, DateTime::<Utc>::from_str("2021-12-02T14:05:00+0000").unwrap());
    }

    #[test]
    fn leap_year_feb_29_next_occurrence() {
        let dt = Utc.timestamp_opt(1_893_456_000, 0).unwrap();
        let next = parse("0 0 29 2 *", &dt).unwrap();
        assert_eq!(next.timestamp(), 1_961_625_600);
    }

    #[test]
    fn invalid_weekday_alias_is_rejected() {
        let dt = DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap();
        assert!(parse("* * * * */Fri", &dt).is_err());
    }

    #[test]
    fn is_valid_rejects_bad_expression() {
        assert!(is_valid("*/5 * * * *"));
        assert!(!is_valid("* * * * */Fri"));
    }

    #[test]
    fn cursor_honors_initial_match() {
        let dt = DateTime::<Utc>::from_str("2021-12-02T14:05:00+0000").unwrap();
        let mut cursor = Croniter::new("*/5 * * * *", &dt, CronOptions::default()).unwrap();
        assert_eq!(cursor.get_next().unwrap(), dt);
        assert_eq!(
            cursor.get_next().unwrap(),
            DateTime::<Utc>::from_str("2021-12-02T14:10:00+0000").unwrap()
        );
    }

    #[test]
    fn keyword_expansion_roundtrips() {
        assert!(is_valid("@daily"));
        assert!(is_valid("@hourly"));
        let schema = expand("@daily", &CronOptions::default()).unwrap();
        assert!(schema.minute.values.contains(&0));
        assert!(schema.hour.values.contains(&0));
    }

    #[test]
    fn croniter_range_mirrors_forward_and_backward() {
        let start = DateTime::<Utc>::from_str("2016-12-02T00:00:00+0000").unwrap();
        let stop = DateTime::<Utc>::from_str("2016-12-10T00:00:00+0000").unwrap();
        let fwd: Vec<_> = croniter_range("0 0 * * *", &start, &stop, &CronOptions::default(), false)
            .unwrap()
            .collect();
        assert_eq!(fwd.len(), 9);
        assert_eq!(fwd.first().copied(), Some(start));
        assert_eq!(fwd.last().copied(), Some(stop));
    }

    #[test]
    fn cron_match_checks_the_instant_itself() {
        let matching = DateTime::<Utc>::from_str("2021-12-02T14:05:00+0000").unwrap();
        let off_minute = DateTime::<Utc>::from_str("2021-12-02T14:06:00+0000").unwrap();
        let opts = CronOptions::default();
        assert!(cron_match("*/5 * * * *", &matching, &opts).unwrap());
        assert!(!cron_match("*/5 * * * *", &off_minute, &opts).unwrap());
    }

    #[test]
    fn cron_match_range_detects_interior_match() {
        let start = DateTime::<Utc>::from_str("2021-12-01T00:00:00+0000").unwrap();
        let end = DateTime::<Utc>::from_str("2021-12-31T00:00:00+0000").unwrap();
        let opts = CronOptions::default();
        assert!(cron_match_range("0 12 15 * *", &start, &end, &opts).unwrap());
        assert!(!cron_match_range("0 12 15 1 *", &start, &end, &opts).unwrap());
    }

    #[test]
    fn ret_type_float_shapes_cursor_and_range_output() {
        let dt = DateTime::<Utc>::from_str("2021-12-02T14:02:29+0000").unwrap();
        let opts = CronOptions {
            ret_type: RetType::Float,
            ..CronOptions::default()
        };
        let mut cursor = Croniter::new("*/5 * * * *", &dt, opts.clone()).unwrap();
        let next = cursor.get_next().unwrap();
        match next {
            CronValue::Timestamp(ts) => assert!((ts - 1_638_453_900.0).abs() < 1.0),
            CronValue::DateTime(_) => panic!("expected a timestamp"),
        }

        let stop = DateTime::<Utc>::from_str("2021-12-02T14:20:00+0000").unwrap();
        let values: Vec<_> = croniter_range_values("*/5 * * * *", &dt, &stop, &opts, false)
            .unwrap()
            .collect();
        assert!(values.iter().all(|v| matches!(v, CronValue::Timestamp(_))));
    }
}
