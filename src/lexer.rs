//! Tokenization: field-count validation, `@keyword` and alias
//! expansion, and per-field token lists.

use crate::error::CronError;
use crate::token::{Field, FieldToken, StepBase};

/// Raw (still un-expanded) per-field token lists, in canonical field
/// order regardless of where seconds/year landed in the source text.
#[derive(Debug, Clone, Default)]
pub struct RawSchema {
    pub minute: Vec<FieldToken>,
    pub hour: Vec<FieldToken>,
    pub day_of_month: Vec<FieldToken>,
    pub month: Vec<FieldToken>,
    pub day_of_week: Vec<FieldToken>,
    pub second: Option<Vec<FieldToken>>,
    pub year: Option<Vec<FieldToken>>,
}

/// Expand a whole-expression `@keyword` into its 5-field literal. `hash`
/// selects the `H`-based form used when the caller supplied a
/// `hash_id`: without one, these degrade to their classic
/// literal schedules.
#[must_use]
pub fn expand_keyword(word: &str, hash: bool) -> Option<&'static str> {
    match word.to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => Some(if hash { "H H H H *" } else { "0 0 1 1 *" }),
        "@monthly" => Some(if hash { "H H H * *" } else { "0 0 1 * *" }),
        "@weekly" => Some(if hash { "H H * * H" } else { "0 0 * * 0" }),
        "@daily" => Some(if hash { "H H * * *" } else { "0 0 * * *" }),
        "@hourly" => Some(if hash { "H * * * *" } else { "0 * * * *" }),
        "@midnight" => Some(if hash { "H H(0-2) * * *" } else { "0 0 * * *" }),
        _ => None,
    }
}

/// Tokenize a full cron expression (after `@keyword` substitution has
/// already happened, if any) into a `RawSchema`.
pub fn tokenize(expr: &str, second_at_beginning: bool) -> Result<RawSchema, CronError> {
    let raw_fields: Vec<&str> = expr.split_whitespace().collect();
    let layout = field_layout(raw_fields.len(), second_at_beginning)?;

    let mut out = RawSchema::default();
    for (position, field) in layout.iter().enumerate() {
        let Some(raw) = raw_fields.get(position) else {
            return Err(CronError::BadCron("missing field".into()));
        };
        let tokens = tokenize_field(raw, *field)?;
        match field {
            Field::Minute => out.minute = tokens,
            Field::Hour => out.hour = tokens,
            Field::DayOfMonth => out.day_of_month = tokens,
            Field::Month => out.month = tokens,
            Field::DayOfWeek => out.day_of_week = tokens,
            Field::Second => out.second = Some(tokens),
            Field::Year => out.year = Some(tokens),
        }
    }
    Ok(out)
}

/// Maps source-text position -> `Field`, for the three legal schema
/// lengths.
fn field_layout(len: usize, second_at_beginning: bool) -> Result<Vec<Field>, CronError> {
    use Field::{DayOfMonth, DayOfWeek, Hour, Minute, Month, Second, Year};
    let layout = match (len, second_at_beginning) {
        (5, _) => vec![Minute, Hour, DayOfMonth, Month, DayOfWeek],
        (6, false) => vec![Minute, Hour, DayOfMonth, Month, DayOfWeek, Second],
        (6, true) => vec![Second, Minute, Hour, DayOfMonth, Month, DayOfWeek],
        (7, false) => vec![Minute, Hour, DayOfMonth, Month, DayOfWeek, Second, Year],
        (7, true) => vec![Second, Minute, Hour, DayOfMonth, Month, DayOfWeek, Year],
        _ => {
            return Err(CronError::BadCron(
                "cron expression must have 5, 6, or 7 fields".into(),
            ));
        }
    };
    Ok(layout)
}

pub(crate) fn tokenize_field(raw: &str, field: Field) -> Result<Vec<FieldToken>, CronError> {
    if raw.is_empty() {
        return Err(CronError::BadCron("empty field".into()));
    }
    if raw == "?" {
        if !matches!(field, Field::DayOfMonth | Field::DayOfWeek) {
            return Err(CronError::BadCron(
                "'?' is only allowed in day-of-month or day-of-week".into(),
            ));
        }
        return Ok(vec![FieldToken::Question]);
    }
    if raw.contains('?') {
        return Err(CronError::BadCron(
            "'?' cannot be combined with other values".into(),
        ));
    }

    let elements: Vec<&str> = raw.split(',').filter(|s| !s.is_empty()).collect();
    if elements.is_empty() {
        return Err(CronError::BadCron("empty field".into()));
    }
    elements
        .into_iter()
        .map(|element| tokenize_element(element, field))
        .collect()
}

fn tokenize_element(tok: &str, field: Field) -> Result<FieldToken, CronError> {
    let tok = tok.trim();

    if tok == "*" {
        return Ok(FieldToken::Star);
    }

    if field == Field::DayOfMonth && tok.eq_ignore_ascii_case("l") {
        return Ok(FieldToken::Last);
    }

    if starts_with_ci(tok, "H") {
        return parse_hash(tok);
    }
    if starts_with_ci(tok, "R") {
        return parse_random(tok);
    }

    if field == Field::DayOfWeek {
        if let Some(rest) = strip_prefix_ci(tok, "L") {
            if !rest.is_empty() {
                let d = parse_value(rest, field)?;
                return Ok(FieldToken::LastWeekday(canonical_dow(d)));
            }
        }
        if let Some(rest) = strip_suffix_ci(tok, "L") {
            if !rest.is_empty() {
                let d = parse_value(rest, field)?;
                return Ok(FieldToken::LastWeekday(canonical_dow(d)));
            }
        }
        if let Some(hash_pos) = tok.find('#') {
            let (d_str, n_str) = (&tok[..hash_pos], &tok[hash_pos + 1..]);
            let d = parse_value(d_str, field)?;
            let n: u8 = n_str
                .parse()
                .map_err(|_| CronError::BadCron("invalid nth-weekday marker".into()))?;
            if !(1..=5).contains(&n) {
                return Err(CronError::BadCron(
                    "nth-weekday marker must be between 1 and 5".into(),
                ));
            }
            return Ok(FieldToken::NthWeekday(canonical_dow(d), n));
        }
    }

    if let Some(slash) = tok.find('/') {
        let (base_str, step_str) = (&tok[..slash], &tok[slash + 1..]);
        if step_str.contains('/') {
            return Err(CronError::BadCron("multiple '/' in step expression".into()));
        }
        let step: u32 = step_str
            .parse()
            .map_err(|_| CronError::BadCron("invalid step value".into()))?;
        if step == 0 {
            return Err(CronError::BadCron("step value cannot be zero".into()));
        }
        let base = if base_str == "*" {
            StepBase::Star
        } else if base_str.contains('-') {
            let (a, b) = parse_range(base_str, field)?;
            StepBase::Range(a, b)
        } else {
            StepBase::Value(parse_value(base_str, field)?)
        };
        return Ok(FieldToken::Step { base, step });
    }

    if tok.contains('-') {
        let (a, b) = parse_range(tok, field)?;
        return Ok(FieldToken::Range(a, b));
    }

    Ok(FieldToken::Value(parse_value(tok, field)?))
}

fn parse_hash(tok: &str) -> Result<FieldToken, CronError> {
    let rest = &tok[1..];
    let (range_part, step_part) = match rest.find('/') {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };
    let range = parse_paren_range(range_part)?;
    let step = match step_part {
        None => None,
        Some(s) => {
            let v: u32 = s
                .parse()
                .map_err(|_| CronError::BadCron("invalid H step".into()))?;
            if v == 0 {
                return Err(CronError::BadCron("H step cannot be zero".into()));
            }
            Some(v)
        }
    };
    Ok(FieldToken::Hash { range, step })
}

fn parse_random(tok: &str) -> Result<FieldToken, CronError> {
    let rest = &tok[1..];
    let range = parse_paren_range(rest)?;
    Ok(FieldToken::Random { range })
}

fn parse_paren_range(part: &str) -> Result<Option<(u32, u32)>, CronError> {
    if part.is_empty() {
        return Ok(None);
    }
    let Some(inner) = part.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
        return Err(CronError::BadCron("expected '(a-b)' range".into()));
    };
    let parts: Vec<&str> = inner.split('-').collect();
    if parts.len() != 2 {
        return Err(CronError::BadCron("invalid '(a-b)' range syntax".into()));
    }
    let a: u32 = parts[0]
        .parse()
        .map_err(|_| CronError::BadCron("invalid range start".into()))?;
    let b: u32 = parts[1]
        .parse()
        .map_err(|_| CronError::BadCron("invalid range end".into()))?;
    if a > b {
        return Err(CronError::BadCron(
            "Range end must be greater than range begin".into(),
        ));
    }
    Ok(Some((a, b)))
}

fn parse_range(tok: &str, field: Field) -> Result<(u32, u32), CronError> {
    let parts: Vec<&str> = tok.split('-').collect();
    if parts.len() != 2 {
        return Err(CronError::BadCron("invalid range syntax".into()));
    }
    let a = parse_value(parts[0], field)?;
    let b = parse_value(parts[1], field)?;
    let wraps_allowed = matches!(field, Field::Month | Field::DayOfWeek);
    if a > b && !wraps_allowed {
        return Err(CronError::BadCron(
            "Range end must be greater than range begin".into(),
        ));
    }
    Ok((a, b))
}

fn parse_value(raw: &str, field: Field) -> Result<u32, CronError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CronError::BadCron("empty value".into()));
    }
    let value = if let Ok(n) = raw.parse::<u32>() {
        n
    } else if let Some(alias) = resolve_alias(field, raw) {
        alias
    } else if raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(CronError::NotAlpha);
    } else {
        return Err(CronError::BadCron(format!("invalid value '{raw}'")));
    };
    let (min, max) = field.range();
    if value < min || value > max {
        return Err(CronError::BadCron(format!(
            "value '{value}' out of range ({min}-{max})"
        )));
    }
    Ok(value)
}

fn resolve_alias(field: Field, raw: &str) -> Option<u32> {
    match field {
        Field::Month => month_alias(raw),
        Field::DayOfWeek => weekday_alias(raw),
        _ => None,
    }
}

fn month_alias(raw: &str) -> Option<u32> {
    let month = match raw.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_alias(raw: &str) -> Option<u32> {
    let day = match raw.to_ascii_lowercase().as_str() {
        "sun" => 0,
        "mon" => 1,
        "tue" => 2,
        "wed" => 3,
        "thu" => 4,
        "fri" => 5,
        "sat" => 6,
        _ => return None,
    };
    Some(day)
}

/// Fold the alternate Sunday (7) into canonical 0.
fn canonical_dow(d: u32) -> u32 {
    d % 7
}

fn starts_with_ci(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    starts_with_ci(s, prefix).then(|| &s[prefix.len()..])
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let len = s.len();
    (len >= suffix.len() && s[len - suffix.len()..].eq_ignore_ascii_case(suffix))
        .then(|| &s[..len - suffix.len()])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_field_counts() {
        assert!(tokenize("* * * *", false).is_err());
        assert!(tokenize("* * * * * * * *", false).is_err());
    }

    #[test]
    fn second_at_beginning_moves_seconds() {
        let schema = tokenize("30 * * * * *", true).unwrap();
        assert_eq!(schema.second, Some(vec![FieldToken::Value(30)]));
    }

    #[test]
    fn question_mark_only_on_dom_dow() {
        assert!(tokenize("? * * * *", false).is_err());
        assert!(tokenize("* * ? * ?", false).is_ok());
    }

    #[test]
    fn keyword_tables_match_spec() {
        assert_eq!(expand_keyword("@daily", false), Some("0 0 * * *"));
        assert_eq!(expand_keyword("@daily", true), Some("H H * * *"));
        assert_eq!(expand_keyword("@midnight", true), Some("H H(0-2) * * *"));
        assert_eq!(expand_keyword("@unknown", false), None);
    }

    #[test]
    fn nth_and_last_weekday_tokens() {
        let schema = tokenize("0 0 * * 5#3", false).unwrap();
        assert_eq!(schema.day_of_week, vec![FieldToken::NthWeekday(5, 3)]);
        let schema = tokenize("0 0 * * 5L", false).unwrap();
        assert_eq!(schema.day_of_week, vec![FieldToken::LastWeekday(5)]);
        let schema = tokenize("0 0 * * L5", false).unwrap();
        assert_eq!(schema.day_of_week, vec![FieldToken::LastWeekday(5)]);
    }

    #[test]
    fn wrap_around_month_range() {
        let schema = tokenize("0 0 1 Nov-Mar *", false).unwrap();
        assert_eq!(schema.month, vec![FieldToken::Range(11, 3)]);
    }

    #[test]
    fn invalid_reverse_range_on_minute() {
        assert!(tokenize("50-10 * * * *", false).is_err());
    }

    #[test]
    fn hash_and_random_tokens() {
        let schema = tokenize("H(30-59)/10 H * * *", false).unwrap();
        assert_eq!(
            schema.minute,
            vec![FieldToken::Hash {
                range: Some((30, 59)),
                step: Some(10)
            }]
        );
        let schema = tokenize("R(0-5) * * * *", false).unwrap();
        assert_eq!(
            schema.minute,
            vec![FieldToken::Random {
                range: Some((0, 5))
            }]
        );
    }
}
