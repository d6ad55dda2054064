use crate::storage::{get_config, get_position, get_state, set_position, set_state};
use crate::PoolError;
use alloy_primitives::Address;
use dex_env::Env;
use dex_math::{add_delta, get_amount0_delta, get_amount1_delta, get_sqrt_ratio_at_tick};
use dex_types::{
    is_valid_tick_range, MintCallbackClient, MintCallbackData, PoolState, PositionKey, TokenClient,
};

/// Mint (add) liquidity to a position
///
/// The owed amounts are computed rounding up, the position and active
/// liquidity are written, and then the invoker is called back to pay. The
/// pool's token balances must have grown by at least the owed amounts when
/// the callback returns.
pub fn mint(
    env: &Env,
    recipient: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
    data: MintCallbackData,
) -> Result<(u128, u128), PoolError> {
    if amount == 0 {
        return Err(PoolError::ZeroLiquidity);
    }

    let config = get_config(env)?;
    let mut state = get_state(env)?;

    if !is_valid_tick_range(tick_lower, tick_upper, config.tick_spacing) {
        return Err(PoolError::InvalidTickRange);
    }

    let (amount0, amount1) = amounts_owed(&state, tick_lower, tick_upper, amount)?;

    // Update position
    let position_key = PositionKey::new(recipient, tick_lower, tick_upper);
    let mut position = get_position(env, &position_key)?;
    position.liquidity = position
        .liquidity
        .checked_add(amount)
        .ok_or(PoolError::Math(dex_math::MathError::LiquidityOverflow))?;
    if position.liquidity > config.max_liquidity_per_tick {
        return Err(PoolError::LiquidityPerTickExceeded);
    }
    set_position(env, &position_key, &position)?;

    // Update liquidity if position is in range
    if state.tick >= tick_lower && state.tick < tick_upper {
        state.liquidity = add_delta(state.liquidity, to_i128(amount)?)?;
        set_state(env, &state)?;
    }

    // Collect payment through the minter's callback
    let pool = env.current_contract_address()?;
    let token0 = TokenClient::new(env, &config.token0);
    let token1 = TokenClient::new(env, &config.token1);
    let balance0_before = if amount0 > 0 { token0.balance(&pool)? } else { 0 };
    let balance1_before = if amount1 > 0 { token1.balance(&pool)? } else { 0 };

    let minter = env.invoker()?;
    MintCallbackClient::new(env, &minter).on_liquidity_callback(&amount0, &amount1, &data)?;

    if amount0 > 0 && token0.balance(&pool)? < checked_add(balance0_before, amount0)? {
        return Err(PoolError::InsufficientPayment0);
    }
    if amount1 > 0 && token1.balance(&pool)? < checked_add(balance1_before, amount1)? {
        return Err(PoolError::InsufficientPayment1);
    }

    env.events().publish(
        &["mint"],
        &(minter, recipient, tick_lower, tick_upper, amount, amount0, amount1),
    )?;
    tracing::debug!(%recipient, tick_lower, tick_upper, amount, amount0, amount1, "pool mint");

    Ok((amount0, amount1))
}

/// Token amounts owed for adding `amount` liquidity over the range at the
/// current price
fn amounts_owed(
    state: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> Result<(u128, u128), PoolError> {
    let sqrt_ratio_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_ratio_upper = get_sqrt_ratio_at_tick(tick_upper)?;

    let owed = if state.tick < tick_lower {
        // Price below range - all token0
        (
            get_amount0_delta(sqrt_ratio_lower, sqrt_ratio_upper, amount, true)?,
            0,
        )
    } else if state.tick < tick_upper {
        // Price in range - both tokens
        (
            get_amount0_delta(state.sqrt_price_x96, sqrt_ratio_upper, amount, true)?,
            get_amount1_delta(sqrt_ratio_lower, state.sqrt_price_x96, amount, true)?,
        )
    } else {
        // Price above range - all token1
        (
            0,
            get_amount1_delta(sqrt_ratio_lower, sqrt_ratio_upper, amount, true)?,
        )
    };
    Ok(owed)
}

fn to_i128(amount: u128) -> Result<i128, PoolError> {
    i128::try_from(amount).map_err(|_| PoolError::AmountOverflow)
}

fn checked_add(balance: i128, amount: u128) -> Result<i128, PoolError> {
    balance
        .checked_add(to_i128(amount)?)
        .ok_or(PoolError::AmountOverflow)
}
