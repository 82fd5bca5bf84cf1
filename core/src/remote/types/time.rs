//! Temporal operations
//!
//! Instants are `chrono::DateTime<Utc>`, durations are
//! `chrono::TimeDelta`. Construction normalizes the way `java.time`
//! does: nano adjustments carry into seconds with floor semantics, and
//! decomposition returns `(seconds, nanos)` with `0 <= nanos < 10^9`.
//!
//! Instant strings are RFC 3339; duration strings follow the ISO-8601
//! `PnDTnHnMn.nS` grammar.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, TimeDelta, Utc};
use num_traits::ToPrimitive;

use crate::error::{ArithmeticCause, EvalError, Result};
use crate::schema::TimeUnit;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn overflow() -> EvalError {
    EvalError::Arithmetic(ArithmeticCause::Overflow)
}

/* ===================== Instants ===================== */

pub fn instant_from_seconds(seconds: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(overflow)
}

/// Instant from epoch seconds plus a nano adjustment (floor carry, as
/// in `Instant.ofEpochSecond(sec, nanoAdj)`)
pub fn instant_from_longs(seconds: i64, nanos: i64) -> Result<DateTime<Utc>> {
    let carry = nanos.div_euclid(NANOS_PER_SECOND);
    let subsec = nanos.rem_euclid(NANOS_PER_SECOND);
    let seconds = seconds.checked_add(carry).ok_or_else(overflow)?;
    DateTime::from_timestamp(seconds, subsec as u32).ok_or_else(overflow)
}

pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(overflow)
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EvalError::Parse(format!("invalid instant {s:?}: {e}")))
}

/// Decompose into `(epoch seconds, nano of second)`, nanos in `[0, 10^9)`
pub fn instant_to_longs(instant: &DateTime<Utc>) -> (i64, i64) {
    (instant.timestamp(), instant.timestamp_subsec_nanos() as i64)
}

/// Truncate toward negative infinity to a whole number of `unit`s
pub fn truncate_instant(instant: &DateTime<Utc>, unit: TimeUnit) -> Result<DateTime<Utc>> {
    let (seconds, nanos) = instant_to_longs(instant);
    let total = seconds as i128 * NANOS_PER_SECOND as i128 + nanos as i128;
    let step = unit.nanos() as i128;
    let truncated = total.div_euclid(step) * step;
    let seconds = i64::try_from(truncated.div_euclid(NANOS_PER_SECOND as i128))
        .map_err(|_| overflow())?;
    let subsec = truncated.rem_euclid(NANOS_PER_SECOND as i128) as u32;
    DateTime::from_timestamp(seconds, subsec).ok_or_else(overflow)
}

pub fn instant_plus(instant: &DateTime<Utc>, delta: &TimeDelta) -> Result<DateTime<Utc>> {
    instant.checked_add_signed(*delta).ok_or_else(overflow)
}

pub fn instant_minus(instant: &DateTime<Utc>, delta: &TimeDelta) -> Result<DateTime<Utc>> {
    instant.checked_sub_signed(*delta).ok_or_else(overflow)
}

/* ===================== Durations ===================== */

/// Duration from whole seconds plus a nano adjustment (floor carry)
pub fn duration_from_longs(seconds: i64, nano_adjustment: i64) -> Result<TimeDelta> {
    let carry = nano_adjustment.div_euclid(NANOS_PER_SECOND);
    let subsec = nano_adjustment.rem_euclid(NANOS_PER_SECOND);
    let seconds = seconds.checked_add(carry).ok_or_else(overflow)?;
    timedelta_from_parts(seconds, subsec)
}

pub fn duration_from_seconds(seconds: i64) -> Result<TimeDelta> {
    TimeDelta::try_seconds(seconds).ok_or_else(overflow)
}

/// Duration from a decimal number of seconds: the decimal is scaled by
/// 10^9, truncated to whole nanoseconds and split into
/// `(seconds, nanos)`
pub fn duration_from_decimal_seconds(seconds: &BigDecimal) -> Result<TimeDelta> {
    let scaled = seconds * BigDecimal::from(NANOS_PER_SECOND);
    let total = scaled
        .with_scale_round(0, RoundingMode::Down)
        .to_i128()
        .ok_or_else(overflow)?;
    let whole = i64::try_from(total.div_euclid(NANOS_PER_SECOND as i128)).map_err(|_| overflow())?;
    let subsec = total.rem_euclid(NANOS_PER_SECOND as i128) as i64;
    timedelta_from_parts(whole, subsec)
}

/// `amount` multiples of `unit`
pub fn duration_from_amount(amount: i64, unit: TimeUnit) -> Result<TimeDelta> {
    let total = amount as i128 * unit.nanos() as i128;
    let whole = i64::try_from(total.div_euclid(NANOS_PER_SECOND as i128)).map_err(|_| overflow())?;
    let subsec = total.rem_euclid(NANOS_PER_SECOND as i128) as i64;
    timedelta_from_parts(whole, subsec)
}

/// Decompose into `(seconds, nanos)` with `0 <= nanos < 10^9`
pub fn duration_to_longs(delta: &TimeDelta) -> (i64, i64) {
    let seconds = delta.num_seconds();
    let nanos = delta.subsec_nanos() as i64;
    if nanos < 0 {
        (seconds - 1, nanos + NANOS_PER_SECOND)
    } else {
        (seconds, nanos)
    }
}

pub fn duration_plus(left: &TimeDelta, right: &TimeDelta) -> Result<TimeDelta> {
    left.checked_add(right).ok_or_else(overflow)
}

pub fn duration_minus(left: &TimeDelta, right: &TimeDelta) -> Result<TimeDelta> {
    left.checked_sub(right).ok_or_else(overflow)
}

fn timedelta_from_parts(seconds: i64, subsec_nanos: i64) -> Result<TimeDelta> {
    let whole = TimeDelta::try_seconds(seconds).ok_or_else(overflow)?;
    whole
        .checked_add(&TimeDelta::nanoseconds(subsec_nanos))
        .ok_or_else(overflow)
}

/* ===================== ISO-8601 duration parsing ===================== */

/// Parse an ISO-8601 duration: `[+-]PnDTnHnMn.nS`
///
/// Every component is optional but at least one must be present, the
/// day component precedes `T`, and the seconds component accepts up to
/// nine fraction digits. A leading sign negates the whole duration.
pub fn parse_duration(s: &str) -> Result<TimeDelta> {
    let parse_err = |msg: &str| EvalError::Parse(format!("invalid duration {s:?}: {msg}"));

    let mut rest = s;
    let negative = if let Some(r) = rest.strip_prefix('-') {
        rest = r;
        true
    } else {
        if let Some(r) = rest.strip_prefix('+') {
            rest = r;
        }
        false
    };
    rest = rest
        .strip_prefix(['P', 'p'])
        .ok_or_else(|| parse_err("missing P designator"))?;

    let mut total = TimeDelta::zero();
    let mut seen = false;

    // Day component, before the time designator
    if let Some((digits, tail)) = take_digits(rest) {
        let tail = tail
            .strip_prefix(['D', 'd'])
            .ok_or_else(|| parse_err("expected D designator"))?;
        let days: i64 = digits.parse().map_err(|_| parse_err("day overflow"))?;
        total = add_component(total, days, 86_400)?;
        seen = true;
        rest = tail;
    }

    if let Some(time) = rest.strip_prefix(['T', 't']) {
        rest = time;
        let mut allowed = ["H", "M", "S"].as_slice();
        while !rest.is_empty() {
            let (digits, tail) =
                take_digits(rest).ok_or_else(|| parse_err("expected a number"))?;
            let value: i64 = digits.parse().map_err(|_| parse_err("component overflow"))?;
            // Fraction is only legal on the seconds component
            if let Some(frac_tail) = tail.strip_prefix('.') {
                let (frac, after) =
                    take_digits(frac_tail).ok_or_else(|| parse_err("expected fraction digits"))?;
                if frac.len() > 9 {
                    return Err(parse_err("more than nine fraction digits"));
                }
                let after = after
                    .strip_prefix(['S', 's'])
                    .ok_or_else(|| parse_err("expected S designator"))?;
                if !after.is_empty() {
                    return Err(parse_err("trailing input"));
                }
                let mut nanos: i64 = frac.parse().map_err(|_| parse_err("fraction overflow"))?;
                nanos *= 10_i64.pow(9 - frac.len() as u32);
                total = add_component(total, value, 1)?;
                total = total
                    .checked_add(&TimeDelta::nanoseconds(nanos))
                    .ok_or_else(overflow)?;
                seen = true;
                rest = after;
                break;
            }
            let designator = tail.get(..1).ok_or_else(|| parse_err("missing designator"))?;
            let (factor, remaining_allowed): (i64, &[&str]) =
                match (designator.to_ascii_uppercase().as_str(), allowed) {
                    ("H", ["H", "M", "S"]) => (3_600, &["M", "S"]),
                    ("M", ["H", "M", "S"] | ["M", "S"]) => (60, &["S"]),
                    ("S", _) => (1, &[]),
                    _ => return Err(parse_err("misordered or repeated designator")),
                };
            total = add_component(total, value, factor)?;
            seen = true;
            allowed = remaining_allowed;
            rest = &tail[1..];
            if allowed.is_empty() {
                break;
            }
        }
    }

    if !seen {
        return Err(parse_err("no components"));
    }
    if !rest.is_empty() {
        return Err(parse_err("trailing input"));
    }
    Ok(if negative { -total } else { total })
}

fn take_digits(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some((&s[..end], &s[end..]))
    }
}

fn add_component(total: TimeDelta, value: i64, seconds_per_unit: i64) -> Result<TimeDelta> {
    let seconds = value.checked_mul(seconds_per_unit).ok_or_else(overflow)?;
    total
        .checked_add(&TimeDelta::try_seconds(seconds).ok_or_else(overflow)?)
        .ok_or_else(overflow)
}
