use core::fmt;
use core::num;
use std::error::Error;

/// Everything that can go wrong turning cron text into matches, or
/// searching for one. See the module docs for which call sites raise
/// which variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    /// An alphabetic token that isn't a recognized alias (`jan`..`dec`,
    /// `sun`..`sat`) or hash/random placeholder (`H`, `R`).
    NotAlpha,
    /// A structural or range problem in the expression text: wrong field
    /// count, dangling separators, out-of-range or inverted literals,
    /// `?` used outside DOM/DOW, zero step, etc.
    BadCron(String),
    /// No instant satisfying the expression was found within
    /// `max_years_between_matches` years of the cursor.
    BadDate,
    /// `croniter_range`/`match_range` was given a `start`/`stop` pair
    /// whose representations don't agree (e.g. one is a wall-clock
    /// instant and the other a raw float timestamp).
    BadTypeRange,
    /// A combination the engine refuses to resolve unambiguously, such
    /// as a literal day-of-week mixed with its own `#n`/`L` modifier.
    UnsupportedSyntax(String),
    /// A caller-supplied value has the wrong shape, e.g. `hash_id` that
    /// is neither raw bytes nor UTF-8 text.
    TypeError(String),
    ParseIntError(num::ParseIntError),
    TryFromIntError(num::TryFromIntError),
}

impl fmt::Display for CronError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAlpha => write!(f, "unrecognized alphabetic token in cron expression"),
            Self::BadCron(msg) => write!(f, "invalid cron expression: {msg}"),
            Self::BadDate => write!(
                f,
                "no matching instant found within max_years_between_matches"
            ),
            Self::BadTypeRange => write!(f, "croniter_range: start and stop types must match"),
            Self::UnsupportedSyntax(msg) => write!(f, "unsupported cron syntax: {msg}"),
            Self::TypeError(msg) => write!(f, "invalid type: {msg}"),
            Self::ParseIntError(err) => err.fmt(f),
            Self::TryFromIntError(err) => err.fmt(f),
        }
    }
}

impl Error for CronError {}

impl From<num::ParseIntError> for CronError {
    #[must_use]
    fn from(err: num::ParseIntError) -> Self {
        Self::ParseIntError(err)
    }
}

impl From<num::TryFromIntError> for CronError {
    #[must_use]
    fn from(err: num::TryFromIntError) -> Self {
        Self::TryFromIntError(err)
    }
}
