//! Conversions between token-amount prices and Q64.96 square-root prices.

use crate::full_math::mul_div_u256;
use crate::MathError;
use alloy_primitives::{U256, U512};
use dex_types::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, Q96};

/// Integer square root, rounded down (Newton's method).
pub fn sqrt(value: U512) -> U512 {
    if value < U512::from(2u8) {
        return value;
    }
    // 2^ceil(bits / 2) is never below the root
    let mut x = U512::from(1u8) << value.bit_len().div_ceil(2);
    loop {
        let y = (x + value / x) >> 1usize;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// `sqrt(amount1 / amount0) * 2^96`: the sqrt price of a pool holding
/// `amount1` of token1 per `amount0` of token0.
pub fn encode_sqrt_ratio_x96(amount1: u128, amount0: u128) -> Result<u128, MathError> {
    if amount0 == 0 {
        return Err(MathError::DivisionByZero);
    }
    let ratio_x192 = (U512::from(amount1) << 192usize) / U512::from(amount0);
    let root = sqrt(ratio_x192);
    let sqrt_price_x96 = u128::try_from(root).map_err(|_| MathError::SqrtPriceOutOfBounds)?;
    if !(MIN_SQRT_RATIO..MAX_SQRT_RATIO).contains(&sqrt_price_x96) {
        return Err(MathError::SqrtPriceOutOfBounds);
    }
    Ok(sqrt_price_x96)
}

/// Price of token0 in token1 as a Q96 number: `sqrt_price_x96^2 / 2^96`.
pub fn price_x96_from_sqrt_price(sqrt_price_x96: u128) -> Result<U256, MathError> {
    let sqrt_price = U256::from(sqrt_price_x96);
    mul_div_u256(sqrt_price, sqrt_price, U256::from(Q96))
}
