//! Domain normalization: wildcard collapsing and the
//! day-of-week union/reject rules for `#n`/`L<d>` modifiers.

use crate::error::CronError;
use crate::schema::ExpandedField;
use crate::token::Field;

/// Finish an `ExpandedField` produced by `crate::expand`: decide the
/// "effectively wildcard" bit and, for day-of-week, validate the
/// literal/modifier mixing rule.
pub fn normalize(field: Field, mut expanded: ExpandedField) -> Result<ExpandedField, CronError> {
    let (min, max) = field.range();
    let full_range = max - min + 1;

    if field == Field::DayOfWeek {
        validate_dow_marks(&expanded)?;
    }

    expanded.wildcard = expanded.values.len() as u32 == full_range
        && expanded.values.iter().copied().min() == Some(min)
        && expanded.values.iter().copied().max() == Some(max)
        && !expanded.includes_last_day
        && expanded.dow_marks.is_empty();

    Ok(expanded)
}

/// Modifiers on a weekday that *also* appears as a plain
/// literal in the same field are rejected, unless that literal only got
/// there via a bare `*`/`?` (which simply collapses the whole field to
/// wildcard instead). Modifiers on distinct weekdays union freely with
/// any literals.
fn validate_dow_marks(expanded: &ExpandedField) -> Result<(), CronError> {
    if expanded.had_wildcard_token || expanded.dow_marks.is_empty() {
        return Ok(());
    }
    for mark in &expanded.dow_marks {
        if expanded.values.contains(&mark.weekday()) {
            return Err(CronError::UnsupportedSyntax(format!(
                "day-of-week {} is used both as a literal and with a '#n'/'L' modifier",
                mark.weekday()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::expand::{expand_field, ExpandCtx};
    use crate::lexer::tokenize;

    fn ctx() -> ExpandCtx<'static> {
        ExpandCtx {
            hash_id: b"",
            expand_from_start_time: false,
            start_value: 0,
        }
    }

    #[test]
    fn collapses_full_range_to_wildcard() {
        let schema = tokenize("30-59,0-29 * * * *", false).unwrap();
        let f = normalize(
            Field::Minute,
            expand_field(&schema.minute, Field::Minute, &ctx()).unwrap(),
        )
        .unwrap();
        assert!(f.wildcard);
    }

    #[test]
    fn distinct_weekday_modifiers_union() {
        let schema = tokenize("0 0 * * 1,5#2", false).unwrap();
        let f = normalize(
            Field::DayOfWeek,
            expand_field(&schema.day_of_week, Field::DayOfWeek, &ctx()).unwrap(),
        )
        .unwrap();
        assert!(f.values.contains(&1));
        assert_eq!(f.dow_marks.len(), 1);
    }

    #[test]
    fn same_weekday_modifier_and_literal_rejected() {
        let schema = tokenize("0 0 * * 5,5#2", false).unwrap();
        let result = normalize(
            Field::DayOfWeek,
            expand_field(&schema.day_of_week, Field::DayOfWeek, &ctx()).unwrap(),
        );
        assert!(matches!(result, Err(CronError::UnsupportedSyntax(_))));
    }

    #[test]
    fn literal_with_star_collapses_to_wildcard_without_error() {
        let schema = tokenize("0 0 * * 5,*", false).unwrap();
        let f = normalize(
            Field::DayOfWeek,
            expand_field(&schema.day_of_week, Field::DayOfWeek, &ctx()).unwrap(),
        )
        .unwrap();
        assert!(f.wildcard);
    }
}
