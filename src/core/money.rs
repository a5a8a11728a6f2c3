//! Money helpers using `rust_decimal` for precision.
//!
//! Prices and totals are stored as `f64`; every sum and product goes through
//! `Decimal` and is rounded to two places before converting back. Arithmetic is checked:
//! a result outside `Decimal`'s range is an `InvalidAmount` error.

use crate::{
    entities::OrderItem,
    errors::{Error, Result},
};
use rust_decimal::prelude::*;

/// Rounding precision for monetary values
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest price or total accepted on input
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Whether `value` is a usable price or total: finite, non-negative and at most [`MAX_AMOUNT`].
#[must_use]
pub fn is_valid_amount(value: f64) -> bool {
    (0.0..=MAX_AMOUNT).contains(&value)
}

/// Converts a stored amount to `Decimal`. Non-finite input becomes zero.
#[must_use]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Rounds to cents and converts back to `f64` for storage/serialization.
#[must_use]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `price x quantity` for a single line.
pub fn line_total(price: f64, quantity: u32) -> Result<Decimal> {
    to_decimal(price)
        .checked_mul(Decimal::from(quantity))
        .ok_or(Error::InvalidAmount { amount: price })
}

/// `a + b`, failing instead of overflowing.
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(|| Error::InvalidAmount {
        amount: b.to_f64().unwrap_or(f64::INFINITY),
    })
}

/// Sum of all line totals.
pub fn items_total<'a, I>(items: I) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    items.into_iter().try_fold(Decimal::ZERO, |acc, item| {
        checked_add(acc, line_total(item.price, item.quantity)?)
    })
}

/// Whether two amounts agree within [`MONEY_TOLERANCE`].
#[must_use]
pub fn amounts_match(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= MONEY_TOLERANCE
}

/// Formats an amount with two decimals, e.g. `5000.00`.
#[must_use]
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", to_f64(to_decimal(value)))
}
