use crate::number::{format_mantissa, format_rational, format_real, format_real_with_exponent, normalize_rational_sign};

#[test]
fn test_format_real() {
    assert_eq!(format_real(2.0), "2.0");
    assert_eq!(format_real(0.1), "0.1");
    assert_eq!(format_real(-2.5), "-2.5");
    assert_eq!(format_real(123456.0), "123456.0");
    assert_eq!(format_real(0.001), "0.001");
    assert_eq!(format_real(1.0 / 3.0), "0.333333333333333");
    assert_eq!(format_real(0.0), "0.0");
    assert_eq!(format_real(-0.0), "-0.0");
}

#[test]
fn test_format_real_is_positional() {
    assert_eq!(format_real(1.5e20), "150000000000000000000.0");
    assert_eq!(format_real(1e15), "1000000000000000.0");
    assert_eq!(format_real(1e14), "100000000000000.0");
    assert_eq!(format_real(1e-5), "0.00001");
    assert_eq!(format_real(-2.25e-7), "-0.000000225");

    // Digits past the fifteenth are rounded away, not printed as zeros
    assert_eq!(format_real(123456789012345678.0), "123456789012346000.0");
}

#[test]
fn test_format_real_specials() {
    assert_eq!(format_real(f64::NAN), "NaN");
    assert_eq!(format_real(f64::INFINITY), "INF");
    assert_eq!(format_real(f64::NEG_INFINITY), "-INF");
}

#[test]
fn test_format_mantissa() {
    assert_eq!(format_mantissa(2.0), "2");
    assert_eq!(format_mantissa(-1.25), "-1.25");
    assert_eq!(format_mantissa(0.0), "0");
    assert_eq!(format_mantissa(-0.0), "-0");
    assert_eq!(format_mantissa(0.0625), "0.0625");
    assert_eq!(format_real_with_exponent(2.0, -3), "2e-3");
    assert_eq!(format_real_with_exponent(1.5, 3), "1.5e3");
}

#[test]
fn test_rationals() {
    assert_eq!(format_rational(-1, 2), "(-1/2)");
    assert_eq!(format_rational(3, 4), "(3/4)");
    assert_eq!(normalize_rational_sign(1, -2), Some((-1, 2)));
    assert_eq!(normalize_rational_sign(-1, -2), Some((1, 2)));
    assert_eq!(normalize_rational_sign(3, 4), Some((3, 4)));
    assert_eq!(normalize_rational_sign(i64::MIN, -1), None);
}
