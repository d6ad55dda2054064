use dex_env::{ContractError, Env};
use dex_math::encode_sqrt_ratio_x96;
use dex_types::PoolClient;

use crate::storage::{
    get_admin, get_price_state, require_pool_reference, set_price_state, PriceState,
};
use crate::LaunchError;

/// Set the pool's starting price, once
///
/// The price is recorded only after the pool accepted it.
pub fn initialize_pool(env: &Env, sqrt_price_x96: u128) -> Result<PriceState, LaunchError> {
    let reference = require_pool_reference(env)?;
    if get_price_state(env)?.initialized {
        return Err(LaunchError::AlreadyInitialized);
    }
    env.require_auth(&get_admin(env)?)?;

    PoolClient::new(env, &reference.pool)
        .initialize(&sqrt_price_x96)
        .map_err(|err| LaunchError::from_host_error(env, err))?;

    let state = PriceState {
        initialized: true,
        sqrt_price_x96,
    };
    set_price_state(env, &state)?;

    env.events()
        .publish(&["pool_initialized"], &(reference.pool, sqrt_price_x96))?;
    tracing::info!(pool = %reference.pool, sqrt_price_x96, "launch pool price initialized");
    Ok(state)
}

/// Set the starting price to `amount1 / amount0`, in pool token order.
pub fn initialize_pool_at_price(
    env: &Env,
    amount1: u128,
    amount0: u128,
) -> Result<PriceState, LaunchError> {
    let sqrt_price_x96 = encode_sqrt_ratio_x96(amount1, amount0)?;
    initialize_pool(env, sqrt_price_x96)
}
