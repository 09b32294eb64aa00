//! Rounding of values and errors for display
//!
//! The error keeps one significant digit, two when its leading digit is 1.
//! The value is then rounded to the same decimal position.

/// Significant digits used when no error is available to derive them from
pub const DEFAULT_DIGITS: usize = 4;

fn magnitude(value: f64) -> i32 {
    value.abs().log10().floor() as i32
}

fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-decimals);
        (value / factor).round() * factor
    }
}

fn format_decimals(value: f64, decimals: i32) -> String {
    let rounded = round_to_decimals(value, decimals);
    format!("{:.*}", decimals.max(0) as usize, rounded)
}

/// Round to `digits` significant digits
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    round_to_decimals(value, digits as i32 - 1 - magnitude(value))
}

/// Format `value` with `digits` significant digits
pub fn digit_rounding(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1) as i32;
    if value == 0.0 {
        return format!("{:.*}", (digits - 1) as usize, 0.0);
    }
    format_decimals(value, digits - 1 - magnitude(value))
}

/// Format a value and its error with matched precision
///
/// With `digits` given, the value gets that many significant digits and the
/// error is rounded to the same decimal position. A zero or non-finite error
/// falls back to [`digit_rounding`] of the value.
pub fn error_rounding(value: f64, error: f64, digits: Option<usize>) -> (String, String) {
    if let Some(digits) = digits {
        let value_str = digit_rounding(value, digits);
        if !value.is_finite() || value == 0.0 || !error.is_finite() {
            return (value_str, error.to_string());
        }
        let decimals = digits.max(1) as i32 - 1 - magnitude(value);
        return (value_str, format_decimals(error, decimals));
    }

    if error == 0.0 || !error.is_finite() {
        return (digit_rounding(value, DEFAULT_DIGITS), error.abs().to_string());
    }

    let error = error.abs();
    let exponent = magnitude(error);
    let leading = (error / 10f64.powi(exponent)).floor();
    let significant = if leading < 2.0 { 2 } else { 1 };
    let decimals = significant - 1 - exponent;

    (format_decimals(value, decimals), format_decimals(error, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(1234.5, 2), 1200.0);
        assert_eq!(round_significant(0.012345, 3), 0.0123);
        assert_eq!(round_significant(0.0, 3), 0.0);
    }

    #[test]
    fn test_digit_rounding() {
        assert_eq!(digit_rounding(3.14159, 3), "3.14");
        assert_eq!(digit_rounding(1234.5, 2), "1200");
        assert_eq!(digit_rounding(0.0, 3), "0.00");
    }

    #[test]
    fn test_error_rounding() {
        assert_eq!(
            error_rounding(1.23456, 0.0123, None),
            ("1.235".to_string(), "0.012".to_string())
        );
        assert_eq!(
            error_rounding(9.876, 0.34, None),
            ("9.9".to_string(), "0.3".to_string())
        );
        assert_eq!(
            error_rounding(1234.0, 56.0, None),
            ("1230".to_string(), "60".to_string())
        );
        assert_eq!(
            error_rounding(2.5, 0.0, None),
            ("2.500".to_string(), "0".to_string())
        );
    }

    #[test]
    fn test_error_rounding_forced_digits() {
        assert_eq!(
            error_rounding(1.23456, 0.0123, Some(2)),
            ("1.2".to_string(), "0.0".to_string())
        );
    }
}
