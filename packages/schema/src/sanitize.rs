//! Locale-tolerant text and number sanitizing.
//!
//! Vote files come out of spreadsheets and GIS tools configured for
//! Brazilian Portuguese as often as for English, so the same column may
//! hold `"1.234,56"`, `"1,234.56"` or a plain JSON number. These helpers
//! never fail: anything unusable collapses to an empty string or `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Whole numbers written with `.` as a thousands separator (`"1.250"`,
/// `"12.345.678"`).
static DOTTED_THOUSANDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]{1,3}(\.[0-9]{3})+$").expect("valid regex"));

/// Literal values that mean "no data" in pandas/GIS exports.
const NULL_SENTINELS: &[&str] = &["nan", "none", "null"];

fn is_null_sentinel(s: &str) -> bool {
    NULL_SENTINELS.iter().any(|n| s.eq_ignore_ascii_case(n))
}

/// Converts any scalar to a trimmed string.
///
/// `None`, JSON `null` and the literals `"nan"`, `"none"` and `"null"`
/// (any case) become the empty string.
#[must_use]
pub fn sanitize_text(value: Option<&Value>) -> String {
    let s = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    };
    if is_null_sentinel(&s) {
        return String::new();
    }
    s
}

/// Parses a property value as a floating-point number.
///
/// JSON numbers are returned verbatim so already-correct coordinates such
/// as `-3.7397117` are never run through the separator heuristics of
/// [`parse_number_str`]. Strings are parsed with those heuristics. Every
/// other value yields `None`.
#[must_use]
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

/// Parses a free-form numeric string.
///
/// - Embedded spaces are removed.
/// - With both `,` and `.` present, whichever appears last is the decimal
///   point and the other is a thousands separator.
/// - With only `,` present, it is the decimal point.
/// - Otherwise the string is parsed as-is.
///
/// Returns `None` for empty strings, null sentinels and anything that
/// still fails to parse.
#[must_use]
pub fn parse_number_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_null_sentinel(trimmed) {
        return None;
    }

    let s = trimmed.replace(' ', "");
    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        (None, _) => s,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a vote count.
///
/// Counts are whole numbers, so a string like `"1.250"` is read as one
/// thousand two hundred fifty rather than one and a quarter. Anything
/// else goes through [`parse_number`]. Missing, unparseable, negative
/// and non-finite values all become `0.0`.
#[must_use]
pub fn parse_count(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::String(s)) => {
            let compact = s.trim().replace(' ', "");
            if DOTTED_THOUSANDS_RE.is_match(&compact) {
                compact.replace('.', "").parse::<f64>().ok()
            } else {
                parse_number_str(s)
            }
        }
        other => parse_number(other),
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sentinels_collapse_to_empty() {
        assert_eq!(sanitize_text(Some(&json!("NaN"))), "");
        assert_eq!(sanitize_text(Some(&json!("None"))), "");
        assert_eq!(sanitize_text(Some(&json!(" null "))), "");
        assert_eq!(sanitize_text(Some(&Value::Null)), "");
        assert_eq!(sanitize_text(None), "");
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(sanitize_text(Some(&json!("  João  "))), "João");
    }

    #[test]
    fn scalars_are_stringified() {
        assert_eq!(sanitize_text(Some(&json!(42))), "42");
        assert_eq!(sanitize_text(Some(&json!(true))), "true");
    }

    #[test]
    fn brazilian_thousands_and_decimal() {
        assert!(approx(parse_number(Some(&json!("1.234,56"))).unwrap(), 1234.56));
    }

    #[test]
    fn international_thousands_and_decimal() {
        assert!(approx(parse_number(Some(&json!("1,234.56"))).unwrap(), 1234.56));
    }

    #[test]
    fn comma_only_is_decimal() {
        assert!(approx(parse_number(Some(&json!("1234,56"))).unwrap(), 1234.56));
        assert!(approx(parse_number(Some(&json!("-3,73"))).unwrap(), -3.73));
    }

    #[test]
    fn dot_only_is_left_alone() {
        assert!(approx(parse_number(Some(&json!("1234.56"))).unwrap(), 1234.56));
        assert!(approx(parse_number(Some(&json!("-3.7397117"))).unwrap(), -3.739_711_7));
    }

    #[test]
    fn numbers_pass_through_verbatim() {
        let v = parse_number(Some(&json!(-3.739_711_7))).unwrap();
        assert!((v - -3.739_711_7).abs() < f64::EPSILON);
        assert!(approx(parse_number(Some(&json!(1250))).unwrap(), 1250.0));
    }

    #[test]
    fn embedded_spaces_are_removed() {
        assert!(approx(parse_number(Some(&json!(" 1 234,5 "))).unwrap(), 1234.5));
    }

    #[test]
    fn unparseable_is_none() {
        assert!(parse_number(Some(&json!(""))).is_none());
        assert!(parse_number(Some(&json!("null"))).is_none());
        assert!(parse_number(Some(&json!("abc"))).is_none());
        assert!(parse_number(Some(&json!("inf"))).is_none());
        assert!(parse_number(Some(&json!([1, 2]))).is_none());
        assert!(parse_number(None).is_none());
    }

    #[test]
    fn counts_read_dotted_thousands() {
        assert!(approx(parse_count(Some(&json!("1.250"))), 1250.0));
        assert!(approx(parse_count(Some(&json!("12.345.678"))), 12_345_678.0));
        assert!(approx(parse_count(Some(&json!("1.234,56"))), 1234.56));
        assert!(approx(parse_count(Some(&json!("12.5"))), 12.5));
    }

    #[test]
    fn counts_never_go_negative() {
        assert!(approx(parse_count(Some(&json!(-5))), 0.0));
        assert!(approx(parse_count(Some(&json!("garbage"))), 0.0));
        assert!(approx(parse_count(None), 0.0));
    }
}
