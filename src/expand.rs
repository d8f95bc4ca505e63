//! Token list -> `ExpandedField`. Ranges, steps, wraps, `L`,
//! `#n`/`Ld`, and `H`/`R` are all resolved here; deduplication and the
//! final wildcard/union bookkeeping happen in `crate::normalize`.

use crate::error::CronError;
use crate::hash;
use crate::schema::{DowMark, ExpandedField};
use crate::token::{Field, FieldToken, StepBase};
use std::collections::BTreeSet;

/// Context carried through expansion: the hash seed and, when
/// `expand_from_start_time` is set, the cursor's own value for this
/// field (so `*/n` steps align to the start time instead of the field
/// minimum).
pub struct ExpandCtx<'a> {
    pub hash_id: &'a [u8],
    pub expand_from_start_time: bool,
    pub start_value: u32,
}

pub fn expand_field(
    tokens: &[FieldToken],
    field: Field,
    ctx: &ExpandCtx<'_>,
) -> Result<ExpandedField, CronError> {
    let (min, max) = field.range();
    let mut values = BTreeSet::new();
    let mut includes_last_day = false;
    let mut dow_marks = Vec::new();
    let mut had_wildcard_token = false;

    for token in tokens {
        match token {
            FieldToken::Star | FieldToken::Question => {
                had_wildcard_token = true;
                values.extend(min..=max);
            }
            FieldToken::Value(v) => {
                values.insert(canonical(field, *v));
            }
            FieldToken::Range(a, b) => {
                for v in range_values(*a, *b, min, max) {
                    values.insert(canonical(field, v));
                }
            }
            FieldToken::Step { base, step } => {
                if *step == 0 {
                    return Err(CronError::BadCron("step value cannot be zero".into()));
                }
                let raw = match base {
                    StepBase::Star => {
                        let start = ctx.expand_from_start_time.then_some(ctx.start_value);
                        star_step_values(min, max, *step, start)
                    }
                    StepBase::Value(v) => range_values(*v, max, min, max)
                        .into_iter()
                        .step_by(*step as usize)
                        .collect(),
                    StepBase::Range(a, b) => range_values(*a, *b, min, max)
                        .into_iter()
                        .step_by(*step as usize)
                        .collect(),
                };
                for v in raw {
                    values.insert(canonical(field, v));
                }
            }
            FieldToken::Last => {
                if field != Field::DayOfMonth {
                    return Err(CronError::BadCron(
                        "'L' is only valid in the day-of-month field".into(),
                    ));
                }
                includes_last_day = true;
            }
            FieldToken::NthWeekday(d, n) => {
                if field != Field::DayOfWeek {
                    return Err(CronError::BadCron(
                        "'#n' is only valid in the day-of-week field".into(),
                    ));
                }
                dow_marks.push(DowMark::Nth(*d, *n));
            }
            FieldToken::LastWeekday(d) => {
                if field != Field::DayOfWeek {
                    return Err(CronError::BadCron(
                        "'L<weekday>' is only valid in the day-of-week field".into(),
                    ));
                }
                dow_marks.push(DowMark::Last(*d));
            }
            FieldToken::Hash { range, step } => {
                let (lo, hi) = resolve_hash_range(*range, min, max)?;
                match step {
                    None => {
                        let v = hash::draw(ctx.hash_id, field.hash_index(), lo, hi);
                        values.insert(canonical(field, v));
                    }
                    Some(s) => {
                        if *s == 0 {
                            return Err(CronError::BadCron("H step cannot be zero".into()));
                        }
                        let offset = hash::draw_offset(ctx.hash_id, field.hash_index(), lo, hi, *s);
                        let mut cur = lo + offset;
                        while cur <= hi {
                            values.insert(canonical(field, cur));
                            cur += *s;
                        }
                    }
                }
            }
            FieldToken::Random { range } => {
                let (lo, hi) = resolve_hash_range(*range, min, max)?;
                let v = hash::draw_random(lo, hi);
                values.insert(canonical(field, v));
            }
        }
    }

    Ok(ExpandedField {
        values,
        wildcard: false,
        includes_last_day,
        dow_marks,
        had_wildcard_token,
    })
}

fn resolve_hash_range(
    range: Option<(u32, u32)>,
    min: u32,
    max: u32,
) -> Result<(u32, u32), CronError> {
    match range {
        None => Ok((min, max)),
        Some((lo, hi)) => {
            if lo < min || hi > max {
                return Err(CronError::BadCron(
                    "H/R range falls outside the field's legal range".into(),
                ));
            }
            Ok((lo, hi))
        }
    }
}

/// `0`/`7` both mean Sunday on the wire; stored canonically as `0..=6`.
fn canonical(field: Field, v: u32) -> u32 {
    if field == Field::DayOfWeek {
        v % 7
    } else {
        v
    }
}

/// Enumerate `a..=b`, wrapping through `max`/`min` when `a > b` (legal
/// only for month/weekday fields — callers have already checked that).
fn range_values(a: u32, b: u32, min: u32, max: u32) -> Vec<u32> {
    if a <= b {
        (a..=b).collect()
    } else {
        let mut out: Vec<u32> = (a..=max).collect();
        out.extend(min..=b);
        out
    }
}

/// `*/step`, optionally aligned to `start_value` instead of `min`
/// (`expand_from_start_time`).
fn star_step_values(min: u32, max: u32, step: u32, start_value: Option<u32>) -> Vec<u32> {
    let base = match start_value {
        Some(sv) if sv >= min => min + ((sv - min) % step),
        _ => min,
    };
    let mut out = Vec::new();
    let mut cur = base;
    while cur <= max {
        out.push(cur);
        cur += step;
    }
    out
}
