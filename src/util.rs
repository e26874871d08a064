// Utility helpers for parsing and formatting.
//
// This module centralizes all the "dirty" number/date handling so the rest of
// the code can work with plain `f64`, `i32` and `NaiveDate` values.
use crate::types::FieldValue;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

// `.` or `,` followed by exactly three digits and a word boundary.
static THOUSANDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,](\d{3})\b").expect("valid thousands regex"));
// Trailing decimal comma with one or two digits.
static DECIMAL_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\d{1,2})$").expect("valid decimal comma regex"));
// Standalone four-digit run, e.g. the `2030` in `15 de marzo de 2030`.
static YEAR_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("valid year token regex"));

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

/// Convert a loosely formatted cell into `f64`.
///
/// - Missing and null cells are `0`.
/// - Numeric cells are returned as-is (non-finite values become `0`).
/// - Anything else goes through [`parse_number_str`].
///
/// Never panics and never returns NaN.
pub fn to_number(value: Option<&FieldValue>) -> f64 {
    match value {
        None | Some(FieldValue::Null) => 0.0,
        Some(FieldValue::Number(n)) if n.is_finite() => *n,
        Some(FieldValue::Number(_)) => 0.0,
        Some(other) => parse_number_str(&other.to_string()),
    }
}

/// Parse a string that may use Colombian (`1.500.000,50`) or programmatic
/// (`1500000.50`) separators.
///
/// - Strips whitespace and `$` signs.
/// - A `.`/`,` followed by exactly three digits at a word boundary is a
///   thousands separator and is removed.
/// - A trailing `,` with one or two digits is a decimal comma.
/// - The longest leading float prefix is parsed (`"12 m2"` is `12`).
///
/// Returns `0` when nothing parseable remains. Note `"1.234"` reads as `1234`.
pub fn parse_number_str(s: &str) -> f64 {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    if compact.is_empty() {
        return 0.0;
    }
    let no_thousands = THOUSANDS_RE.replace_all(&compact, "$1");
    let normalized = DECIMAL_COMMA_RE.replace(&no_thousands, ".$1");
    leading_float(&normalized)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// Longest prefix of `s` that reads as a decimal float, in the spirit of
// JavaScript's `parseFloat`.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Upstream dates show up as `YYYY-MM-DD`, ISO datetimes or `DD/MM/YYYY`.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Calendar year carried by a cell, or `0` when none can be read.
///
/// Dates and parseable date strings use their year. Other text uses a leading
/// all-digit `YYYY` (`"2023-Q4"`), else the first standalone four-digit run
/// (`"15-03-2030"`, `"1/2030"`). Numbers only count when they look like a year.
pub fn year_of(value: Option<&FieldValue>) -> i32 {
    match value {
        None | Some(FieldValue::Null) => 0,
        Some(FieldValue::Date(d)) => d.year(),
        Some(FieldValue::Number(n)) if n.is_finite() => plausible_year(n.trunc()),
        Some(FieldValue::Number(_)) => 0,
        Some(other) => {
            let text = other.to_string();
            if let Some(d) = parse_date_safe(Some(&text)) {
                return d.year();
            }
            let text = text.trim();
            let head: String = text.chars().take(4).collect();
            if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
                return head.parse::<i32>().map(|y| plausible_year(y as f64)).unwrap_or(0);
            }
            YEAR_TOKEN_RE
                .captures(text)
                .and_then(|c| c[1].parse::<i32>().ok())
                .map(|y| plausible_year(y as f64))
                .unwrap_or(0)
        }
    }
}

fn plausible_year(y: f64) -> i32 {
    if (MIN_YEAR as f64..=MAX_YEAR as f64).contains(&y) {
        y as i32
    } else {
        0
    }
}

pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    // Zero denominators yield 0 rather than NaN/inf.
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let n = if n.is_finite() { n } else { 0.0 };
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => group_thousands(int_part),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

// Comma-group a plain digit string too long for `u128`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fraction rendered as a percentage with two decimals (`0.5` -> `50.00%`).
pub fn format_pct(fraction: f64) -> String {
    format!("{}%", format_number(fraction * 100.0, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn missing_and_null_are_zero() {
        assert_eq!(to_number(None), 0.0);
        assert_eq!(to_number(Some(&FieldValue::Null)), 0.0);
        assert_eq!(to_number(Some(&text(""))), 0.0);
        assert_eq!(to_number(Some(&text("   "))), 0.0);
    }

    #[test]
    fn colombian_thousands_and_decimal_comma() {
        assert_eq!(parse_number_str("1.500.000"), 1_500_000.0);
        assert_eq!(parse_number_str("1.500.000,75"), 1_500_000.75);
        assert_eq!(parse_number_str("12,5"), 12.5);
        assert_eq!(parse_number_str("$ 2.000"), 2000.0);
        assert_eq!(parse_number_str(" 3 400 "), 3400.0);
    }

    #[test]
    fn programmatic_values_are_untouched() {
        assert_eq!(parse_number_str("1234.56"), 1234.56);
        assert_eq!(parse_number_str("1,234.56"), 1234.56);
        assert_eq!(parse_number_str("-42"), -42.0);
        assert_eq!(parse_number_str("1e3"), 1000.0);
    }

    #[test]
    fn ambiguous_three_digit_group_reads_as_thousands() {
        assert_eq!(parse_number_str("1.234"), 1234.0);
        // Numeric cells never go through the string heuristics.
        assert_eq!(to_number(Some(&FieldValue::Number(1.234))), 1.234);
    }

    #[test]
    fn garbage_never_yields_nan() {
        for s in ["abc", "-", ".", "N/A", "NaN", "inf", "--5"] {
            let v = parse_number_str(s);
            assert_eq!(v, 0.0, "input {:?}", s);
        }
        assert_eq!(to_number(Some(&FieldValue::Number(f64::NAN))), 0.0);
    }

    #[test]
    fn leading_prefix_like_parse_float() {
        assert_eq!(parse_number_str("12 m2"), 12.0);
        assert_eq!(parse_number_str("45%"), 45.0);
        assert_eq!(parse_number_str(".5"), 0.5);
    }

    #[test]
    fn integers_round_trip_through_strings() {
        for n in [0i64, 7, 42, 999, 1000, 123456, -77, 9_007_199_254] {
            assert_eq!(parse_number_str(&n.to_string()), n as f64);
        }
    }

    #[test]
    fn year_of_reads_dates_and_prefixes() {
        let d = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        assert_eq!(year_of(Some(&FieldValue::Date(d))), 2021);
        assert_eq!(year_of(Some(&text("2022-11-30"))), 2022);
        assert_eq!(year_of(Some(&text("30/11/2019"))), 2019);
        assert_eq!(year_of(Some(&text("2020-06-01T00:00:00.000Z"))), 2020);
        assert_eq!(year_of(Some(&text("2024"))), 2024);
        assert_eq!(year_of(Some(&text("pendiente"))), 0);
        assert_eq!(year_of(None), 0);
    }

    #[test]
    fn year_of_ignores_day_first_and_free_text_heads() {
        assert_eq!(year_of(Some(&text("15-03-2030"))), 2030);
        assert_eq!(year_of(Some(&text("03-15-2030"))), 2030);
        assert_eq!(year_of(Some(&text("15 de marzo de 2030"))), 2030);
        assert_eq!(year_of(Some(&text("1/2030"))), 2030);
        assert_eq!(year_of(Some(&text("2023-Q4"))), 2023);
        assert_eq!(year_of(Some(&text("lote 12345"))), 0);
        assert_eq!(year_of(Some(&text("15/3"))), 0);
    }

    #[test]
    fn year_of_rejects_implausible_numbers() {
        assert_eq!(year_of(Some(&FieldValue::Number(2024.0))), 2024);
        assert_eq!(year_of(Some(&FieldValue::Number(1_893_456_000_000.0))), 0);
        assert_eq!(year_of(Some(&FieldValue::Number(15.0))), 0);
        assert_eq!(year_of(Some(&FieldValue::Number(f64::INFINITY))), 0);
    }

    #[test]
    fn ratio_guards_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1_500_700.0, 2), "1,500,700.00");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(3.0, 0), "3");
        assert_eq!(format_pct(0.5), "50.00%");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn formats_amounts_beyond_i64() {
        assert_eq!(format_number(1e20, 2), "100,000,000,000,000,000,000.00");
        let huge = format_number(1e40, 0);
        assert!(huge.starts_with("10,000,000,000,000,000,"));
        assert_eq!(huge.matches(',').count(), 13);
        assert_eq!(format_number(f64::NAN, 2), "0.00");
    }
}
