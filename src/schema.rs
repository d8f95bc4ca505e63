//! The normalized, per-field value domain
//! and the schema/options that carry it through the occurrence engine.

use std::collections::BTreeSet;

/// A day-of-week modifier attached to one weekday value. Spec §3/§4.4:
/// literal weekdays and `#n`/`L` modifiers on the *same* weekday cannot
/// mix; modifiers on distinct weekdays union freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DowMark {
    /// `d#n`: the nth (1..=5) occurrence of weekday `d` in the month.
    Nth(u32, u8),
    /// `Ld`: the last occurrence of weekday `d` in the month.
    Last(u32),
}

impl DowMark {
    #[must_use]
    pub const fn weekday(self) -> u32 {
        match self {
            Self::Nth(d, _) | Self::Last(d) => d,
        }
    }
}

/// The canonical per-field value domain produced by `crate::expand` and
/// `crate::normalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedField {
    /// Sorted, deduplicated set of legal values. Empty iff `wildcard` is
    /// set and no modifiers are present (wildcard carries no explicit
    /// values because the domain is the full range).
    pub values: BTreeSet<u32>,
    /// Set when the enumerated set covers the field's full legal range
    /// and no modifiers (`L`, `#n`, `Ld`) are attached. Enables fast
    /// matching and DOM/DOW tie-breaking.
    pub wildcard: bool,
    /// Day-of-month only: `L` (last day of month) was present.
    pub includes_last_day: bool,
    /// Day-of-week only: `#n`/`Ld` modifiers, alongside any plain
    /// literal weekdays already folded into `values`.
    pub dow_marks: Vec<DowMark>,
    /// Day-of-week only: a bare `*`/`?` token was present among the
    /// field's elements. Used by `crate::normalize` to tell "literal `5`
    /// unioned with `*`" (fine, collapses to wildcard) apart from
    /// "literal `5` used alongside its own `#n`/`L`" (rejected).
    pub(crate) had_wildcard_token: bool,
}

impl ExpandedField {
    #[must_use]
    pub fn wildcard_of(min: u32, max: u32) -> Self {
        Self {
            values: (min..=max).collect(),
            wildcard: true,
            includes_last_day: false,
            dow_marks: Vec::new(),
            had_wildcard_token: true,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            values: BTreeSet::new(),
            wildcard: false,
            includes_last_day: false,
            dow_marks: Vec::new(),
            had_wildcard_token: false,
        }
    }

    /// True if this field places no constraint at all (full wildcard,
    /// no `L`/`#n`/`Ld` modifiers) — used for DOM/DOW union semantics.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.wildcard && !self.includes_last_day && self.dow_marks.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }
}

/// The expanded, immutable form of a parsed cron expression — shared by
/// every cursor built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchema {
    pub minute: ExpandedField,
    pub hour: ExpandedField,
    pub day_of_month: ExpandedField,
    pub month: ExpandedField,
    pub day_of_week: ExpandedField,
    pub second: ExpandedField,
    pub year: ExpandedField,
    pub has_seconds: bool,
    pub has_year: bool,
}

/// How a caller wants emitted instants represented. The engine itself
/// only ever works in the zoned wall-clock tuple ("Dynamic
/// typing of inputs" design note); this only governs the façade's
/// return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetType {
    DateTime,
    Float,
}

/// Façade options. Constructed with `Default` and
/// overridden field-by-field to keep `parse()`'s surface small.
#[derive(Debug, Clone)]
pub struct CronOptions {
    pub ret_type: RetType,
    pub day_or: bool,
    pub max_years_between_matches: u32,
    pub implement_cron_bug: bool,
    pub expand_from_start_time: bool,
    pub second_at_beginning: bool,
    pub hash_id: Option<Vec<u8>>,
}

impl Default for CronOptions {
    fn default() -> Self {
        Self {
            ret_type: RetType::DateTime,
            day_or: true,
            max_years_between_matches: 50,
            implement_cron_bug: false,
            expand_from_start_time: false,
            second_at_beginning: false,
            hash_id: None,
        }
    }
}
