use crate::full_math::{mul_div, mul_div_u256, to_u128};
use crate::MathError;
use alloy_primitives::U256;
use dex_types::Q96;

fn sort_ratios(sqrt_ratio_a_x96: u128, sqrt_ratio_b_x96: u128) -> (u128, u128) {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    }
}

/// Calculate liquidity from token amounts for a price range
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount0: u128,
    amount1: u128,
) -> Result<u128, MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        // Current price below range - all token0
        get_liquidity_for_amount0(sqrt_ratio_lower, sqrt_ratio_upper, amount0)
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        // Current price in range - both tokens
        let liquidity0 = get_liquidity_for_amount0(sqrt_ratio_x96, sqrt_ratio_upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(sqrt_ratio_lower, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        // Current price above range - all token1
        get_liquidity_for_amount1(sqrt_ratio_lower, sqrt_ratio_upper, amount1)
    }
}

/// L = amount0 * sqrt_pa * sqrt_pb / (sqrt_pb - sqrt_pa)
fn get_liquidity_for_amount0(
    sqrt_ratio_lower: u128,
    sqrt_ratio_upper: u128,
    amount0: u128,
) -> Result<u128, MathError> {
    let intermediate = mul_div(sqrt_ratio_lower, sqrt_ratio_upper, Q96)?;
    mul_div(amount0, intermediate, sqrt_ratio_upper - sqrt_ratio_lower)
}

/// L = amount1 / (sqrt_pb - sqrt_pa)
fn get_liquidity_for_amount1(
    sqrt_ratio_lower: u128,
    sqrt_ratio_upper: u128,
    amount1: u128,
) -> Result<u128, MathError> {
    mul_div(amount1, Q96, sqrt_ratio_upper - sqrt_ratio_lower)
}

/// Get amounts from liquidity for a price range, rounded down
pub fn get_amounts_for_liquidity(
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
) -> Result<(u128, u128), MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= sqrt_ratio_lower {
        // Below range - all token0
        let amount0 = get_amount0_for_liquidity(sqrt_ratio_lower, sqrt_ratio_upper, liquidity)?;
        Ok((amount0, 0))
    } else if sqrt_ratio_x96 < sqrt_ratio_upper {
        // In range - both tokens
        let amount0 = get_amount0_for_liquidity(sqrt_ratio_x96, sqrt_ratio_upper, liquidity)?;
        let amount1 = get_amount1_for_liquidity(sqrt_ratio_lower, sqrt_ratio_x96, liquidity)?;
        Ok((amount0, amount1))
    } else {
        // Above range - all token1
        let amount1 = get_amount1_for_liquidity(sqrt_ratio_lower, sqrt_ratio_upper, liquidity)?;
        Ok((0, amount1))
    }
}

fn get_amount0_for_liquidity(
    sqrt_ratio_lower: u128,
    sqrt_ratio_upper: u128,
    liquidity: u128,
) -> Result<u128, MathError> {
    if sqrt_ratio_lower == 0 {
        return Err(MathError::DivisionByZero);
    }
    let amount = mul_div_u256(
        U256::from(liquidity) << 96usize,
        U256::from(sqrt_ratio_upper - sqrt_ratio_lower),
        U256::from(sqrt_ratio_upper),
    )? / U256::from(sqrt_ratio_lower);
    to_u128(amount)
}

fn get_amount1_for_liquidity(
    sqrt_ratio_lower: u128,
    sqrt_ratio_upper: u128,
    liquidity: u128,
) -> Result<u128, MathError> {
    mul_div(liquidity, sqrt_ratio_upper - sqrt_ratio_lower, Q96)
}

/// Add signed liquidity delta to unsigned liquidity
pub fn add_delta(liquidity: u128, delta: i128) -> Result<u128, MathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::LiquidityUnderflow)
    } else {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(MathError::LiquidityOverflow)
    }
}
