use crate::full_math::{
    div_rounding_up_u256, mul_div, mul_div_rounding_up, mul_div_rounding_up_u256, mul_div_u256,
    to_u128,
};
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

/// Calculate amount0 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_x = L * (sqrt_pb - sqrt_pa) / (sqrt_pa * sqrt_pb)
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_ratio_lower == 0 {
        return Err(MathError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << 96usize;
    let numerator2 = U256::from(sqrt_ratio_upper - sqrt_ratio_lower);
    let upper = U256::from(sqrt_ratio_upper);
    let lower = U256::from(sqrt_ratio_lower);

    let amount = if round_up {
        div_rounding_up_u256(mul_div_rounding_up_u256(numerator1, numerator2, upper)?, lower)?
    } else {
        mul_div_u256(numerator1, numerator2, upper)? / lower
    };
    to_u128(amount)
}

/// Calculate amount1 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_y = L * (sqrt_pb - sqrt_pa)
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_upper - sqrt_ratio_lower, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_upper - sqrt_ratio_lower, Q96)
    }
}
