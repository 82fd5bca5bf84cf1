//! Tests for instant and duration operators

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};

use super::helpers::{eval_err, eval_typed};
use crate::error::EvalError;
use crate::remote::builders::{
    duration_between_instants, duration_from_amount, duration_from_big_decimal,
    duration_from_long, duration_from_longs, duration_from_string, duration_minus,
    duration_plus, duration_to_long, duration_to_longs, instant_from_long, instant_from_longs,
    instant_from_milli, instant_from_string, instant_minus_duration, instant_plus_duration,
    instant_to_tuple, instant_truncate, remote,
};
use crate::schema::TimeUnit;

fn instant(seconds: i64, nanos: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, nanos).unwrap()
}

/* ===================== Instant construction ===================== */

#[test]
fn test_instant_from_long() {
    let expr = instant_from_long(remote(&1_000i64));
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(1_000, 0));
}

#[test]
fn test_instant_from_longs_roundtrip() {
    // InstantToTuple(InstantFromLongs(s, n)) == (s, n) for 0 <= n < 10^9
    let expr = instant_to_tuple(instant_from_longs(
        remote(&1_000i64),
        remote(&123_456_789i64),
    ));
    assert_eq!(eval_typed::<(i64, i64)>(&expr), (1_000, 123_456_789));
}

#[test]
fn test_instant_from_longs_carries_nano_overflow() {
    // 1.5 * 10^9 nanos carries one whole second
    let expr = instant_to_tuple(instant_from_longs(
        remote(&10i64),
        remote(&1_500_000_000i64),
    ));
    assert_eq!(eval_typed::<(i64, i64)>(&expr), (11, 500_000_000));
}

#[test]
fn test_instant_from_milli() {
    let expr = instant_from_milli(remote(&1_500i64));
    assert_eq!(
        eval_typed::<DateTime<Utc>>(&expr),
        instant(1, 500_000_000)
    );
}

#[test]
fn test_instant_from_string() {
    let expr = instant_from_string(remote(&"1970-01-01T00:16:40Z".to_string()));
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(1_000, 0));
}

#[test]
fn test_instant_from_invalid_string_fails() {
    let err = eval_err(&instant_from_string(remote(&"not-a-time".to_string())));
    assert!(matches!(err, EvalError::Parse(_)));
}

/* ===================== Instant arithmetic ===================== */

#[test]
fn test_instant_plus_duration() {
    let expr = instant_plus_duration(
        instant_from_long(remote(&1_000i64)),
        duration_from_long(remote(&60i64)),
    );
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(1_060, 0));
}

#[test]
fn test_instant_minus_duration() {
    let expr = instant_minus_duration(
        instant_from_long(remote(&1_000i64)),
        duration_from_long(remote(&400i64)),
    );
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(600, 0));
}

#[test]
fn test_instant_truncate_to_minutes() {
    let expr = instant_truncate(
        instant_from_longs(remote(&1_000i64), remote(&123_456_789i64)),
        remote(&TimeUnit::Minutes),
    );
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(960, 0));
}

#[test]
fn test_instant_truncate_to_seconds_drops_nanos() {
    let expr = instant_truncate(
        instant_from_longs(remote(&1_000i64), remote(&123_456_789i64)),
        remote(&TimeUnit::Seconds),
    );
    assert_eq!(eval_typed::<DateTime<Utc>>(&expr), instant(1_000, 0));
}

/* ===================== Duration construction ===================== */

#[test]
fn test_duration_from_longs_roundtrip() {
    // DurationToLongs(DurationFromLongs(s, n)) == (s, n) after
    // normalization
    let expr = duration_to_longs(duration_from_longs(
        remote(&90i64),
        remote(&500_000_000i64),
    ));
    assert_eq!(eval_typed::<(i64, i64)>(&expr), (90, 500_000_000));
}

#[test]
fn test_duration_from_longs_normalizes_negative_adjustment() {
    // 10 seconds minus half a second
    let expr = duration_to_longs(duration_from_longs(
        remote(&10i64),
        remote(&-500_000_000i64),
    ));
    assert_eq!(eval_typed::<(i64, i64)>(&expr), (9, 500_000_000));
}

#[test]
fn test_duration_from_string() {
    let expr = duration_from_string(remote(&"PT1H30M".to_string()));
    assert_eq!(
        eval_typed::<TimeDelta>(&expr),
        TimeDelta::seconds(5_400)
    );
}

#[test]
fn test_duration_from_string_with_days_and_fraction() {
    let expr = duration_from_string(remote(&"P1DT2H3M4.5S".to_string()));
    let expected = TimeDelta::seconds(86_400 + 7_200 + 180 + 4)
        + TimeDelta::nanoseconds(500_000_000);
    assert_eq!(eval_typed::<TimeDelta>(&expr), expected);
}

#[test]
fn test_duration_from_negative_string() {
    let expr = duration_from_string(remote(&"-PT30S".to_string()));
    assert_eq!(eval_typed::<TimeDelta>(&expr), TimeDelta::seconds(-30));
}

#[test]
fn test_duration_from_invalid_string_fails() {
    assert!(matches!(
        eval_err(&duration_from_string(remote(&"P".to_string()))),
        EvalError::Parse(_)
    ));
    assert!(matches!(
        eval_err(&duration_from_string(remote(&"PT1M2H".to_string()))),
        EvalError::Parse(_)
    ));
}

#[test]
fn test_duration_from_big_decimal_splits_nanos() {
    let seconds: BigDecimal = "1.5".parse().unwrap();
    let expr = duration_to_longs(duration_from_big_decimal(remote(&seconds)));
    assert_eq!(eval_typed::<(i64, i64)>(&expr), (1, 500_000_000));
}

#[test]
fn test_duration_from_amount() {
    let expr = duration_from_amount(remote(&90i64), remote(&TimeUnit::Minutes));
    assert_eq!(eval_typed::<TimeDelta>(&expr), TimeDelta::seconds(5_400));
}

#[test]
fn test_duration_between_instants() {
    let expr = duration_between_instants(
        instant_from_long(remote(&1_000i64)),
        instant_from_long(remote(&1_060i64)),
    );
    assert_eq!(eval_typed::<TimeDelta>(&expr), TimeDelta::seconds(60));
}

/* ===================== Duration arithmetic ===================== */

#[test]
fn test_duration_plus_and_minus() {
    let plus = duration_plus(
        duration_from_long(remote(&40i64)),
        duration_from_long(remote(&20i64)),
    );
    assert_eq!(eval_typed::<TimeDelta>(&plus), TimeDelta::seconds(60));

    let minus = duration_minus(
        duration_from_long(remote(&40i64)),
        duration_from_long(remote(&20i64)),
    );
    assert_eq!(eval_typed::<TimeDelta>(&minus), TimeDelta::seconds(20));
}

#[test]
fn test_duration_to_long_is_whole_seconds() {
    let expr = duration_to_long(duration_from_longs(
        remote(&90i64),
        remote(&900_000_000i64),
    ));
    assert_eq!(eval_typed::<i64>(&expr), 90);
}
