//! Display formatting for amounts and percentages.
//!
//! Currency tags only choose a symbol; nothing here converts between
//! currencies.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Currency, Money, Percent};

const COMPACT_SCALES: [(Decimal, &str); 4] = [
    (dec!(1_000_000_000_000), "T"),
    (dec!(1_000_000_000), "B"),
    (dec!(1_000_000), "M"),
    (dec!(1_000), "K"),
];

/// Whole-unit amount with grouped thousands (`€1,234,567`), or compact
/// notation (`€10M`, `€2K`) when `compact` is set. Negative amounts put the
/// sign before the symbol.
pub fn format_money(amount: Money, currency: &Currency, compact: bool) -> String {
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    let abs = amount.abs();
    let body = if compact {
        compact_digits(abs)
    } else {
        group_thousands(&round_whole(abs).to_string())
    };
    if body == "0" {
        return format!("{}0", currency.symbol());
    }
    format!("{sign}{}{body}", currency.symbol())
}

/// Fixed-decimals percentage, e.g. `format_percent(dec!(0.1), 3)` is `"0.100%"`.
pub fn format_percent(value: Percent, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", decimals as usize, rounded)
}

fn round_whole(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn compact_digits(abs: Decimal) -> String {
    for (i, (scale, suffix)) in COMPACT_SCALES.iter().enumerate() {
        if abs < *scale {
            continue;
        }
        let scaled = round_whole(abs / *scale);
        // 999_999 rounds to 1000K; show it as 1M instead
        if scaled >= dec!(1000) && i > 0 {
            let (up_scale, up_suffix) = COMPACT_SCALES[i - 1];
            return format!("{}{up_suffix}", round_whole(abs / up_scale));
        }
        return format!("{}{suffix}", group_thousands(&scaled.to_string()));
    }
    let whole = round_whole(abs);
    if whole >= dec!(1000) {
        return "1K".to_string();
    }
    whole.to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
