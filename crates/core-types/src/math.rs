use crate::enums::Rounding;
use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer used only as the intermediate of `mul_div`.
    pub struct U256(4);
}

/// 100% expressed in basis points.
pub const MAX_BPS: u16 = 10_000;

/// Computes `value * numerator / denominator` without intermediate overflow.
///
/// The product is formed in 256 bits, so the only failure modes are a zero
/// denominator and a quotient that does not fit back into `u128`.
pub fn mul_div(
    value: u128,
    numerator: u128,
    denominator: u128,
    rounding: Rounding,
) -> Result<u128, CoreError> {
    if denominator == 0 {
        return Err(CoreError::Calculation("division by zero".to_string()));
    }

    let product = U256::from(value) * U256::from(numerator);
    let (quotient, remainder) = product.div_mod(U256::from(denominator));
    let quotient = match rounding {
        Rounding::Up if !remainder.is_zero() => quotient + U256::one(),
        _ => quotient,
    };

    if quotient > U256::from(u128::MAX) {
        return Err(CoreError::Calculation(format!(
            "{} * {} / {} overflows u128",
            value, numerator, denominator
        )));
    }
    Ok(quotient.low_u128())
}

/// Returns `bps` basis points of `amount`, rounded down.
pub fn bps_of(amount: u128, bps: u16) -> Result<u128, CoreError> {
    mul_div(amount, u128::from(bps), u128::from(MAX_BPS), Rounding::Down)
}

/// Converts an integer ratio into a `Decimal` for display and reporting.
pub fn ratio(numerator: u128, denominator: u128) -> Result<Decimal, CoreError> {
    let to_decimal = |value: u128| {
        Decimal::from_u128(value).ok_or_else(|| {
            CoreError::Calculation(format!("{} does not fit into a Decimal", value))
        })
    };
    to_decimal(numerator)?
        .checked_div(to_decimal(denominator)?)
        .ok_or_else(|| CoreError::Calculation("division by zero".to_string()))
}
