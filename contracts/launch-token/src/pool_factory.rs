use dex_env::{ContractError, Env};
use dex_types::{sort_tokens, Fee, FeeTier, FactoryClient, PoolClient};

use crate::storage::{
    get_admin, get_config, get_pool_reference, set_pool_reference, PoolReference,
};
use crate::LaunchError;

/// Create the pool pairing this token with the reference asset
///
/// The pair is ordered by address before it goes to the factory, so the
/// recorded `token0` is always the lower address.
pub fn create_pool(env: &Env, fee: Fee) -> Result<PoolReference, LaunchError> {
    let config = get_config(env)?;
    if get_pool_reference(env)?.is_some() {
        return Err(LaunchError::AlreadyCreated);
    }
    if FeeTier::from_fee(fee).is_none() {
        return Err(LaunchError::InvalidFeeTier);
    }
    env.require_auth(&get_admin(env)?)?;

    let (token0, token1) = sort_tokens(env.current_contract_address()?, config.reference_asset);
    let pool = FactoryClient::new(env, &config.factory)
        .create_pool(&token0, &token1, &fee)
        .map_err(|err| LaunchError::from_host_error(env, err))?;

    // Spacing as configured by the factory
    let tick_spacing = PoolClient::new(env, &pool).tick_spacing()?;

    let reference = PoolReference {
        factory: config.factory,
        pool,
        token0,
        token1,
        fee,
        tick_spacing,
    };
    set_pool_reference(env, &reference)?;

    env.events()
        .publish(&["pool_created"], &(pool, token0, token1, fee, tick_spacing))?;
    tracing::info!(%pool, %token0, %token1, fee, tick_spacing, "launch pool created");
    Ok(reference)
}
