//! Money helpers shared by the tax engine, balances and late fees.

use rust_decimal::{Decimal, RoundingStrategy};

/// Divisor that turns a percent rate (`13`) into a fraction (`0.13`).
pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds to cents, sending midpoints away from zero.
///
/// Only stored or displayed amounts are rounded; intermediate sums keep
/// their full precision.
///
/// ```
/// use rust_decimal_macros::dec;
/// use invoice_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(37.375)), dec!(37.38));
/// assert_eq!(round_half_up(dec!(-1.305)), dec!(-1.31));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `rate` percent of `amount`, unrounded, or `None` if the result does not
/// fit in a [`Decimal`].
///
/// The rate is scaled down first, so a rate of at most 100 can never push a
/// representable amount out of range.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use invoice_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(200), dec!(13)), Some(dec!(26)));
/// assert_eq!(percent_of(Decimal::MAX, dec!(100)), Some(Decimal::MAX));
/// assert_eq!(percent_of(Decimal::MAX, dec!(200)), None);
/// ```
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Option<Decimal> {
    amount.checked_mul(rate.checked_div(ONE_HUNDRED)?)
}
