//! Display formatting for weights and timestamps.

use chrono::{DateTime, Utc};

/// Timestamp pattern used in ticket lists, e.g. `12 Jun 2024 08:30`.
pub const LIST_TIMESTAMP_FORMAT: &str = "%d %b %Y %H:%M";

/// Timestamp pattern used in the edit form, e.g. `12-Jun-2024 08:30`.
pub const FORM_TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M";

const MAX_FRACTION_DIGITS: usize = 3;

/// Format a weight the way the weighbridge office reads numbers: `.` groups
/// thousands, `,` separates decimals, at most three decimals and no trailing
/// zeros.
///
/// ```
/// use weighbridge_core::format::format_weight;
///
/// assert_eq!(format_weight(50.0), "50");
/// assert_eq!(format_weight(1500.0), "1.500");
/// assert_eq!(format_weight(-12.5), "-12,5");
/// ```
pub fn format_weight(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    let is_zero = integer.chars().all(|c| c == '0') && fraction.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }

    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(digit);
    }

    if !fraction.is_empty() {
        out.push(',');
        out.push_str(fraction);
    }

    out
}

/// Format a timestamp with a chrono pattern.
pub fn format_timestamp(timestamp: DateTime<Utc>, pattern: &str) -> String {
    timestamp.format(pattern).to_string()
}

/// Parse user-typed weight text. Blank, malformed or non-finite input
/// (`NaN`, `inf`) counts as zero.
pub fn parse_weight(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
        .unwrap_or(0.0)
}
