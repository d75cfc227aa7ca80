//! Money arithmetic
//!
//! All amounts are `rust_decimal::Decimal`; binary floating point never
//! touches a money value. Rounding is 2 decimal places, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// 固定税率 10%
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax on an already-discounted amount.
pub fn tax_on(discounted: Decimal) -> Decimal {
    round_money(discounted * TAX_RATE)
}
