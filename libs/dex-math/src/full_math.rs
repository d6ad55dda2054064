use crate::MathError;
use alloy_primitives::U256;

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns (a * b) / denominator
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    to_u128(mul_div_u256(
        U256::from(a),
        U256::from(b),
        U256::from(denominator),
    )?)
}

/// Multiply and divide with 256-bit intermediate precision (rounds up)
/// Returns ceil((a * b) / denominator)
pub fn mul_div_rounding_up(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    to_u128(mul_div_rounding_up_u256(
        U256::from(a),
        U256::from(b),
        U256::from(denominator),
    )?)
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> Result<u128, MathError> {
    if b == 0 {
        return Err(MathError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    Ok((a - 1) / b + 1)
}

pub fn mul_div_u256(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    Ok(product / denominator)
}

pub fn mul_div_rounding_up_u256(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let result = product / denominator;
    if (product % denominator).is_zero() {
        Ok(result)
    } else {
        result.checked_add(U256::from(1u8)).ok_or(MathError::Overflow)
    }
}

pub fn div_rounding_up_u256(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let result = a / b;
    if (a % b).is_zero() {
        Ok(result)
    } else {
        Ok(result + U256::from(1u8))
    }
}

/// Narrows to u128, failing when the value does not fit.
pub fn to_u128(value: U256) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow)
}
