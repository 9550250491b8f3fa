// Utility functions: lenient coercions shared by the parser and the download step
use chrono::{DateTime, Utc};
use std::num::IntErrorKind;

/// Parses an HTTP-date such as a `Last-Modified` header value into `DateTime<Utc>`.
pub fn parse_http_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(date_str.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Permissive boolean: `1`, `true`, `yes` and `on` (any case, surrounding
/// whitespace ignored) are true. Everything else, absence included, is false.
pub fn coerce_bool(raw: Option<&str>) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    let value = raw.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Longest leading decimal number of `text`, or `0.0` when there is none.
pub fn coerce_f64(raw: Option<&str>) -> f64 {
    raw.map(|text| numeric_prefix(text.trim(), true))
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Longest leading integer of `text` (`"12.7"` gives 12), or `0` when there is none.
/// Out-of-range values clamp to `i64::MIN`/`i64::MAX`.
pub fn coerce_i64(raw: Option<&str>) -> i64 {
    let Some(prefix) = raw.map(|text| numeric_prefix(text.trim(), false)) else {
        return 0;
    };
    match prefix.parse::<i64>() {
        Ok(value) => value,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}

fn numeric_prefix(text: &str, allow_fraction: bool) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    end = digits_from(end);
    let mut has_digits = end > int_start;

    if !allow_fraction {
        return if has_digits { &text[..end] } else { "" };
    }

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &text[..end]
}
