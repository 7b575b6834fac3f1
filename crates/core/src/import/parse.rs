//! Cell parsers for the lenient import formats.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::types::Parsed;

/// Date formats accepted in order of preference. Day-first beats
/// month-first for ambiguous slash dates, matching the field data.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
];

/// Spreadsheet day-count serials are relative to this epoch (the
/// conventional 1900-system epoch, adjusted for the phantom leap day).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values at or below this threshold are not treated as dates.
const SERIAL_MIN: i64 = 10_000;

/// Parses a date cell: ISO, the common slash/dash orderings, or a
/// spreadsheet day-count serial.
#[must_use]
pub fn parse_date(raw: &str) -> Parsed<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return Parsed::Missing;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Parsed::Value(date);
        }
    }

    if let Some(serial) = parse_serial(s) {
        let (y, m, d) = SERIAL_EPOCH;
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|epoch| u64::try_from(serial).ok().map(|n| (epoch, n)))
            .and_then(|(epoch, n)| epoch.checked_add_days(Days::new(n)))
        {
            return Parsed::Value(date);
        }
    }

    Parsed::Invalid(s.to_string())
}

/// A numeric cell large enough to be a day-count serial rather than a
/// year or a reading typo.
fn parse_serial(s: &str) -> Option<i64> {
    let n = s
        .parse::<i64>()
        .ok()
        .or_else(|| s.parse::<Decimal>().ok().and_then(|d| d.trunc().to_i64()))?;
    (n > SERIAL_MIN).then_some(n)
}

/// Parses an integer cell, accepting decimal notation (`"3500.0"`).
#[must_use]
pub fn parse_int(raw: &str) -> Parsed<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return Parsed::Missing;
    }

    let value = s
        .parse::<i64>()
        .ok()
        .or_else(|| s.parse::<Decimal>().ok().and_then(|d| d.trunc().to_i64()));

    match value.and_then(|n| i32::try_from(n).ok()) {
        Some(n) => Parsed::Value(n),
        None => Parsed::Invalid(s.to_string()),
    }
}

/// Parses a monetary cell.
#[must_use]
pub fn parse_decimal(raw: &str) -> Parsed<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return Parsed::Missing;
    }

    match s.parse::<Decimal>() {
        Ok(value) => Parsed::Value(value),
        Err(_) => Parsed::Invalid(s.to_string()),
    }
}

/// Parses a payment-flag cell against the fixed truthy/falsey vocabulary.
#[must_use]
pub fn parse_bool(raw: &str) -> Parsed<bool> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return Parsed::Missing;
    }

    match s.as_str() {
        "1" | "true" | "yes" | "y" | "paid" => Parsed::Value(true),
        "0" | "false" | "no" | "n" | "unpaid" => Parsed::Value(false),
        _ => Parsed::Invalid(raw.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2025-09-01", 2025, 9, 1)]
    #[case("01/09/2025", 2025, 9, 1)]
    #[case("2025/09/01", 2025, 9, 1)]
    #[case("01-09-2025", 2025, 9, 1)]
    fn test_parse_date_formats(#[case] raw: &str, #[case] y: i32, #[case] m: u32, #[case] d: u32) {
        assert_eq!(parse_date(raw), Parsed::Value(date(y, m, d)));
    }

    #[test]
    fn test_parse_date_day_first_wins_when_ambiguous() {
        assert_eq!(parse_date("03/04/2025"), Parsed::Value(date(2025, 4, 3)));
    }

    #[test]
    fn test_parse_date_serial() {
        // 45901 days past the 1899-12-30 epoch.
        assert_eq!(parse_date("45901"), Parsed::Value(date(2025, 9, 1)));
        // Spreadsheets hand over serials with a decimal tail.
        assert_eq!(parse_date("45901.0"), Parsed::Value(date(2025, 9, 1)));
    }

    #[test]
    fn test_small_numbers_are_not_serials() {
        assert_eq!(parse_date("2025"), Parsed::Invalid("2025".to_string()));
    }

    #[test]
    fn test_parse_date_missing_and_invalid() {
        assert_eq!(parse_date("  "), Parsed::Missing);
        assert_eq!(
            parse_date("next tuesday"),
            Parsed::Invalid("next tuesday".to_string())
        );
    }

    #[rstest]
    #[case("3500", 3500)]
    #[case("3500.0", 3500)]
    #[case(" 42 ", 42)]
    #[case("-1", -1)]
    fn test_parse_int(#[case] raw: &str, #[case] expected: i32) {
        assert_eq!(parse_int(raw), Parsed::Value(expected));
    }

    #[test]
    fn test_parse_int_rejects_garbage_and_overflow() {
        assert_eq!(parse_int("abc"), Parsed::Invalid("abc".to_string()));
        assert_eq!(
            parse_int("99999999999"),
            Parsed::Invalid("99999999999".to_string())
        );
        assert_eq!(parse_int(""), Parsed::Missing);
    }

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case("yes", true)]
    #[case("y", true)]
    #[case("Paid", true)]
    #[case("0", false)]
    #[case("no", false)]
    #[case("unpaid", false)]
    fn test_parse_bool_vocabulary(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_bool(raw), Parsed::Value(expected));
    }

    #[test]
    fn test_parse_bool_unknown_token_is_invalid() {
        assert_eq!(parse_bool("maybe"), Parsed::Invalid("maybe".to_string()));
        assert_eq!(parse_bool(""), Parsed::Missing);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_decimal("1500.25"),
            Parsed::Value("1500.25".parse().unwrap())
        );
        assert_eq!(parse_decimal("x"), Parsed::Invalid("x".to_string()));
        assert_eq!(parse_decimal(" "), Parsed::Missing);
    }
}
