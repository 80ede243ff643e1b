//! Saturating Decimal arithmetic for the infallible calculators.
//!
//! `Decimal`'s operators panic on overflow. Results that leave the 96-bit
//! range are pinned to `Decimal::MAX` / `Decimal::MIN` with the sign the exact
//! result would have had.

use rust_decimal::Decimal;

fn saturate(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

fn is_negative(d: Decimal) -> bool {
    d < Decimal::ZERO
}

pub fn sat_mul(a: Decimal, b: Decimal) -> Decimal {
    match a.checked_mul(b) {
        Some(product) => product,
        None => saturate(is_negative(a) != is_negative(b)),
    }
}

/// Division by zero yields zero; callers floor their denominators first.
pub fn sat_div(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    match a.checked_div(b) {
        Some(quotient) => quotient,
        None => saturate(is_negative(a) != is_negative(b)),
    }
}

pub fn sat_add(a: Decimal, b: Decimal) -> Decimal {
    match a.checked_add(b) {
        Some(sum) => sum,
        None => saturate(is_negative(a)),
    }
}

pub fn sat_sub(a: Decimal, b: Decimal) -> Decimal {
    match a.checked_sub(b) {
        Some(diff) => diff,
        None => saturate(is_negative(a)),
    }
}

/// Whether a value sits on either end of the representable range.
pub fn is_saturated(d: Decimal) -> bool {
    d == Decimal::MAX || d == Decimal::MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_in_range_matches_operators() {
        assert_eq!(sat_mul(dec!(1000), dec!(10)), dec!(10_000));
        assert_eq!(sat_div(dec!(1), dec!(4)), dec!(0.25));
        assert_eq!(sat_sub(dec!(500), dec!(9_500)), dec!(-9_000));
    }

    #[test]
    fn test_overflow_saturates_with_sign() {
        let big = dec!(100_000_000_000_000_000_000);
        assert_eq!(sat_mul(big, big), Decimal::MAX);
        assert_eq!(sat_mul(-big, big), Decimal::MIN);
        assert_eq!(sat_div(Decimal::MAX, dec!(0.5)), Decimal::MAX);
        assert_eq!(sat_add(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(sat_sub(Decimal::MIN, Decimal::ONE), Decimal::MIN);
        assert!(is_saturated(sat_mul(big, big)));
    }

    #[test]
    fn test_zero_divisor() {
        assert_eq!(sat_div(dec!(7), Decimal::ZERO), Decimal::ZERO);
    }
}
