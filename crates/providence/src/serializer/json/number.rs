// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Textual form of doubles.
//!
//! Integral values print without a fraction (`1234.0` becomes `1234`).
//! Other values use the shortest digits that parse back to the same double,
//! in plain notation for `1e-3 <= |d| < 1e7` and scientific notation with an
//! upper-case `E` otherwise (`1.23456789012345E9`, `1.0E-5`).

/// Largest magnitude printed as a plain integer.
const INTEGRAL_LIMIT: f64 = 9.2e18;
const PLAIN_MIN: f64 = 1e-3;
const PLAIN_MAX: f64 = 1e7;

pub const NAN: &str = "NaN";
pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";

/// Format a double for JSON and debug output.
///
/// Non-finite values come out as `NaN`, `Infinity` and `-Infinity`; the
/// JSON writer quotes those.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return NAN.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { INFINITY } else { NEG_INFINITY }.to_string();
    }
    let abs = value.abs();
    if value.fract() == 0.0 && abs < INTEGRAL_LIMIT {
        return format!("{}", value as i64);
    }
    if (PLAIN_MIN..PLAIN_MAX).contains(&abs) {
        return format!("{value}");
    }
    let sci = format!("{value:E}");
    match sci.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => sci,
    }
}

/// Parse the special non-finite spellings.
pub fn parse_special(text: &str) -> Option<f64> {
    match text {
        NAN => Some(f64::NAN),
        INFINITY => Some(f64::INFINITY),
        NEG_INFINITY => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_values() {
        assert_eq!(format_double(1234.0), "1234");
        assert_eq!(format_double(0.0), "0");
        assert_eq!(format_double(-42.0), "-42");
        assert_eq!(format_double(1e15), "1000000000000000");
    }

    #[test]
    fn test_plain_range() {
        assert_eq!(format_double(0.5), "0.5");
        assert_eq!(format_double(-3.25), "-3.25");
        assert_eq!(format_double(0.001), "0.001");
        assert_eq!(format_double(1234567.5), "1234567.5");
    }

    #[test]
    fn test_scientific_range() {
        assert_eq!(format_double(1234567890.12345), "1.23456789012345E9");
        assert_eq!(format_double(0.00001), "1.0E-5");
        assert_eq!(format_double(-0.000125), "-1.25E-4");
        assert_eq!(format_double(1e20), "1.0E20");
    }

    #[test]
    fn test_roundtrip() {
        for v in [0.1, 1.0 / 3.0, 1234567890.12345, 6.02214076e23, -1.5e-9, 12.75] {
            let text = format_double(v);
            assert_eq!(text.parse::<f64>().expect("parse"), v, "{text}");
        }
    }

    #[test]
    fn test_special_values() {
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(parse_special("Infinity"), Some(f64::INFINITY));
        assert!(parse_special("NaN").is_some_and(f64::is_nan));
        assert_eq!(parse_special("nan"), None);
    }
}
