//! Month-scoped invoice-number format.
//!
//! An invoice number is `"<YYYYMM>-<SEQ>"`: a six-digit year-month prefix,
//! one hyphen, and a zero-padded sequence number scoped to that month. The
//! sequence itself is allocated by the database layer (a per-month counter
//! row updated in the same transaction as the insert); this module owns the
//! textual format and its parse.

use gridbill_shared::BillingMonth;

/// Highest suffix representable in the four-digit sequence field.
pub const MAX_SUFFIX: u32 = 9999;

/// A parsed invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceNumber {
    /// The month the number is scoped to.
    pub month: BillingMonth,
    /// The sequence suffix, 1-based.
    pub suffix: u32,
}

/// Formats an invoice number, e.g. `"202509-0001"`.
#[must_use]
pub fn format_number(month: BillingMonth, suffix: u32) -> String {
    format!("{}-{suffix:04}", month.compact())
}

/// Parses an invoice number of the form `"YYYYMM-SEQ"`.
///
/// Strict: six ASCII digits, one hyphen, a 1-4 digit nonzero suffix. Used
/// to validate caller-supplied numbers on import and to keep the per-month
/// counter ahead of them.
#[must_use]
pub fn parse_number(s: &str) -> Option<InvoiceNumber> {
    let (prefix, suffix) = s.split_once('-')?;
    if prefix.len() != 6 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if suffix.is_empty() || suffix.len() > 4 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = prefix[..4].parse().ok()?;
    let month: u32 = prefix[4..].parse().ok()?;
    let suffix: u32 = suffix.parse().ok()?;
    if suffix == 0 {
        return None;
    }

    Some(InvoiceNumber {
        month: BillingMonth::new(year, month)?,
        suffix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn month(y: i32, m: u32) -> BillingMonth {
        BillingMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_format_pads_suffix() {
        assert_eq!(format_number(month(2025, 9), 1), "202509-0001");
        assert_eq!(format_number(month(2025, 12), 437), "202512-0437");
        assert_eq!(format_number(month(2026, 1), 9999), "202601-9999");
    }

    #[test]
    fn test_parse_round_trip() {
        let parsed = parse_number("202509-0001").unwrap();
        assert_eq!(parsed.month, month(2025, 9));
        assert_eq!(parsed.suffix, 1);
        assert_eq!(format_number(parsed.month, parsed.suffix), "202509-0001");
    }

    #[test]
    fn test_parse_accepts_short_suffix() {
        // Imported legacy numbers are not always zero-padded.
        let parsed = parse_number("202509-7").unwrap();
        assert_eq!(parsed.suffix, 7);
    }

    #[rstest]
    #[case("")]
    #[case("202509")]
    #[case("202509-")]
    #[case("202509-00001")]
    #[case("202509-0000")]
    #[case("2025090001")]
    #[case("20259-0001")]
    #[case("202513-0001")]
    #[case("2025o9-0001")]
    #[case("202509-01a")]
    #[case("INV-202509-0001")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        assert!(parse_number(input).is_none());
    }
}
