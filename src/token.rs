//! Field range table and the per-element token shapes a field's
//! comma-separated list expands into.

/// Positional field index, independent of where it actually landed in
/// the user's text (that's `second_at_beginning`'s job, resolved in
/// `crate::lexer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Second,
    Year,
}

impl Field {
    /// `(min, max)` legal range, closed interval. Day-of-week is stored
    /// canonically 0-6 after 7 (alternate Sunday) is folded in.
    #[must_use]
    pub const fn range(self) -> (u32, u32) {
        match self {
            Self::Minute | Self::Second => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 7),
            Self::Year => (1970, 2099),
        }
    }

    /// Index used for hash-seed derivation (`crate::hash`) and schema
    /// array position; stable across schema lengths so that `H` draws
    /// the same value regardless of whether seconds/year are present.
    #[must_use]
    pub const fn hash_index(self) -> u8 {
        match self {
            Self::Minute => 0,
            Self::Hour => 1,
            Self::DayOfMonth => 2,
            Self::Month => 3,
            Self::DayOfWeek => 4,
            Self::Second => 5,
            Self::Year => 6,
        }
    }
}

/// One comma-separated element of a field's token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldToken {
    /// `*`
    Star,
    /// `?` — DOM/DOW only, meaning "no constraint, defer to the other".
    Question,
    /// A bare literal, already alias-resolved.
    Value(u32),
    /// `a-b`. `a > b` is only legal on month/weekday (wraps modulo the
    /// field size); elsewhere it's a `BadCron`.
    Range(u32, u32),
    /// `base/step`, where `base` is `*`, a literal, or a range.
    Step { base: StepBase, step: u32 },
    /// `L` in day-of-month: last day of the month.
    Last,
    /// `d#n` in day-of-week: the nth (1..=5) occurrence of weekday `d`.
    NthWeekday(u32, u8),
    /// `Ld` / `L<d>` in day-of-week: the last occurrence of weekday `d`.
    LastWeekday(u32),
    /// `H`, `H(a-b)`, `H/s`, `H(a-b)/s` — deterministic hash draw.
    Hash {
        range: Option<(u32, u32)>,
        step: Option<u32>,
    },
    /// `R`, `R(a-b)` — non-deterministic draw, resolved once at
    /// expansion time.
    Random { range: Option<(u32, u32)> },
}

/// The base a step applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBase {
    Star,
    Value(u32),
    Range(u32, u32),
}
