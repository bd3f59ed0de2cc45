//! Pure cell parsers. Every function takes one raw cell and returns
//! `Ok(None)` for an empty cell, `Ok(Some(v))` for a value, or a
//! [`ValueError`] describing why the text is not acceptable.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static CURRENCY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,]").expect("valid regex"));

/// Days between 0001-01-01 (CE day 1) and 1970-01-01, the Date32 epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("not a currency amount")]
    NotCurrency,
    #[error("not a number")]
    NotNumber,
    #[error("not an integer")]
    NotInteger,
    #[error("does not match date format {0:?}")]
    BadDate(String),
}

/// Parse a currency amount such as `"$16,067,035.00"` into a float.
///
/// - empty or whitespace-only → `Ok(None)`
/// - already numeric (`"1234"`, `"1234.5"`, `"-3"`) → that number
/// - every `$` and `,` is removed before parsing, so thousands
///   separators are accepted wherever they appear
/// - anything left that is not a number (`"abc"`, a lone `"$"`) → `NotCurrency`
pub fn parse_currency(raw: &str) -> Result<Option<f64>, ValueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = CURRENCY_NOISE.replace_all(trimmed, "");
    let digits = digits.trim();
    if digits.is_empty() {
        return Err(ValueError::NotCurrency);
    }
    digits
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ValueError::NotCurrency)
}

pub fn parse_float(raw: &str) -> Result<Option<f64>, ValueError> {
    let v = raw.trim();
    if v.is_empty() {
        return Ok(None);
    }
    v.parse::<f64>().map(Some).map_err(|_| ValueError::NotNumber)
}

/// Integers; `"6.0"` is accepted as 6, `"6.5"` is not.
pub fn parse_int(raw: &str) -> Result<Option<i64>, ValueError> {
    let v = raw.trim();
    if v.is_empty() {
        return Ok(None);
    }
    if let Ok(i) = v.parse::<i64>() {
        return Ok(Some(i));
    }
    v.parse::<f64>()
        .ok()
        .and_then(integral_f64_to_i64)
        .map(Some)
        .ok_or(ValueError::NotInteger)
}

/// A whole float inside the `i64` range, converted without saturating.
pub fn integral_f64_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// `"130 mins"` → 130. A bare `"130"` is accepted too.
pub fn parse_suffixed_int(raw: &str, suffix: &str) -> Result<Option<i64>, ValueError> {
    let v = raw.trim_start();
    parse_int(v.strip_suffix(suffix).unwrap_or(v))
}

/// Parse a month-precision date (`"June, 1962"` with `"%B, %Y"`) to the
/// first day of that month. Full and abbreviated month names are accepted.
pub fn parse_month_date(raw: &str, format: &str) -> Result<Option<NaiveDate>, ValueError> {
    let v = raw.trim();
    if v.is_empty() {
        return Ok(None);
    }
    let with_day = format!("1 {}", v);
    let with_day_format = format!("%d {}", format);
    NaiveDate::parse_from_str(&with_day, &with_day_format)
        .map(Some)
        .map_err(|_| ValueError::BadDate(format.to_string()))
}

/// Date → days since 1970-01-01, the Arrow `Date32` representation.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Days since 1970-01-01 → date.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_edge_cases() {
        assert_eq!(parse_currency(""), Ok(None));
        assert_eq!(parse_currency("   "), Ok(None));
        assert_eq!(parse_currency("1234"), Ok(Some(1234.0)));
        assert_eq!(parse_currency("1234.5"), Ok(Some(1234.5)));
        assert_eq!(parse_currency("-3"), Ok(Some(-3.0)));
        assert_eq!(parse_currency("$16,067,035.00"), Ok(Some(16_067_035.0)));
        assert_eq!(parse_currency(" $1,000.00 "), Ok(Some(1000.0)));
        assert_eq!(parse_currency("$"), Err(ValueError::NotCurrency));
        assert_eq!(parse_currency("abc"), Err(ValueError::NotCurrency));
        assert_eq!(parse_currency("$12 million"), Err(ValueError::NotCurrency));
    }

    #[test]
    fn suffixed_int_strips_the_suffix() {
        assert_eq!(parse_suffixed_int("110 mins", " mins"), Ok(Some(110)));
        assert_eq!(parse_suffixed_int("1200 mins", " mins"), Ok(Some(1200)));
        assert_eq!(parse_suffixed_int("", " mins"), Ok(None));
        assert_eq!(parse_suffixed_int("110", " mins"), Ok(Some(110)));
        assert_eq!(
            parse_suffixed_int("long mins", " mins"),
            Err(ValueError::NotInteger)
        );
    }

    #[test]
    fn ints_accept_integral_floats_only() {
        assert_eq!(parse_int("-6"), Ok(Some(-6)));
        assert_eq!(parse_int("6.0"), Ok(Some(6)));
        assert_eq!(parse_int("6.5"), Err(ValueError::NotInteger));
        assert_eq!(parse_int(" "), Ok(None));
    }

    #[test]
    fn ints_out_of_range_are_rejected_not_clamped() {
        assert_eq!(parse_int("1e300"), Err(ValueError::NotInteger));
        assert_eq!(parse_int("-1e300"), Err(ValueError::NotInteger));
        assert_eq!(parse_int("9223372036854775808.0"), Err(ValueError::NotInteger));
        assert_eq!(parse_int("inf"), Err(ValueError::NotInteger));
        assert_eq!(parse_int("1e3"), Ok(Some(1000)));
        assert_eq!(integral_f64_to_i64(-9_223_372_036_854_775_808.0), Some(i64::MIN));
    }

    #[test]
    fn month_dates_land_on_the_first() {
        let d = parse_month_date("June, 1962", "%B, %Y").unwrap().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1962, 6, 1).unwrap());
        let d = parse_month_date("Dec, 2006", "%B, %Y").unwrap().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2006, 12, 1).unwrap());
        assert!(parse_month_date("1962-06", "%B, %Y").is_err());
        assert_eq!(parse_month_date("", "%B, %Y"), Ok(None));
    }

    #[test]
    fn date32_days_round_trip() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        let d = NaiveDate::from_ymd_opt(1962, 10, 1).unwrap();
        assert_eq!(days_to_date(date_to_days(d)), Some(d));
        assert!(date_to_days(d) < 0);
    }
}
