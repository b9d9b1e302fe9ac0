//! Text conversion for numeric literals, shared by the infix formatter and the MathML writer.
//!
//! Reals are printed with [REAL_PRECISION] significant digits. The conversion goes through
//! `core::fmt`, so it never depends on a host locale: the decimal separator is always `.`.

use alloc::{format, string::String};
use num_traits::float::FloatCore;

/// Significant digits used when printing a double.
pub const REAL_PRECISION: usize = 15;

/// Splits a finite, non-zero value into its significant digits (at most [REAL_PRECISION], with
/// trailing zeros removed) and the decimal exponent of the first digit.
///
/// For example, 123.45 gives `("12345", 2)` and 0.0025 gives `("25", -3)`.
fn significant_digits(value: f64) -> (String, i32) {
    // `{:e}` with a precision always renders as `d.ddd...e[-]x`, correctly rounded
    let scientific = format!("{:.*e}", REAL_PRECISION - 1, FloatCore::abs(value));
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => (scientific.as_str(), "0"),
    };

    let mut digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }

    (digits, exponent.parse().unwrap_or(0))
}

/// Places a decimal point into `digits`, given the exponent of the first digit. No point is
/// added if the result is whole.
fn positional(digits: &str, exponent: i32) -> String {
    let mut result = String::new();

    if exponent < 0 {
        result.push_str("0.");
        for _ in 0..(-exponent - 1) {
            result.push('0');
        }
        result.push_str(digits);
    } else {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            result.push_str(digits);
            for _ in digits.len()..point {
                result.push('0');
            }
        } else {
            result.push_str(&digits[..point]);
            result.push('.');
            result.push_str(&digits[point..]);
        }
    }

    result
}

fn sign(value: f64) -> &'static str {
    if value.is_sign_negative() { "-" } else { "" }
}

/// Formats a real literal.
///
/// The result is always positional and always contains a `.`, so that it reads back as a real
/// rather than an integer or an e-notation literal: 2.0 prints as `2.0`, and 1.5e20 as
/// `150000000000000000000.0`. NaN and the infinities use the spellings of their constants.
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return format!("{}INF", sign(value));
    }
    if value == 0.0 {
        return format!("{}0.0", sign(value));
    }

    let (digits, exponent) = significant_digits(value);
    let mut result = format!("{}{}", sign(value), positional(&digits, exponent));
    if !result.contains('.') {
        result.push_str(".0");
    }
    result
}

/// Formats the mantissa of an e-notation literal. Unlike [format_real], this is always
/// positional and whole values carry no decimal point (`2` rather than `2.0`), since the
/// exponent that follows already marks the literal as a real.
pub fn format_mantissa(value: f64) -> String {
    if !value.is_finite() {
        return format_real(value);
    }
    if value == 0.0 {
        return format!("{}0", sign(value));
    }

    let (digits, exponent) = significant_digits(value);
    format!("{}{}", sign(value), positional(&digits, exponent))
}

/// Formats an e-notation literal, e.g. `1.5e3`.
pub fn format_real_with_exponent(mantissa: f64, exponent: i64) -> String {
    format!("{}e{}", format_mantissa(mantissa), exponent)
}

/// Formats a rational literal as `(numerator/denominator)`, with no spaces. The parentheses
/// keep it from being read as a division, whose operands could be split by a tighter operator.
pub fn format_rational(numerator: i64, denominator: i64) -> String {
    format!("({}/{})", numerator, denominator)
}

/// Moves the sign of a rational onto its numerator. Returns `None` if that would overflow.
///
/// The magnitudes are left alone, so `2/4` stays `2/4`; the literal's digits are part of its
/// identity.
pub fn normalize_rational_sign(numerator: i64, denominator: i64) -> Option<(i64, i64)> {
    if denominator < 0 {
        Some((numerator.checked_neg()?, denominator.checked_neg()?))
    } else {
        Some((numerator, denominator))
    }
}
