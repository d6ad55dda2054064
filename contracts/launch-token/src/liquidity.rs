use alloy_primitives::Address;
use dex_env::{ContractError, Env};
use dex_math::{
    get_amounts_for_liquidity, get_liquidity_for_amounts, get_sqrt_ratio_at_tick, MathError,
};
use dex_types::{
    is_valid_tick_range, MintCallbackData, PoolClient, PositionInfo, PositionKey, TokenClient,
};

use crate::guard::authorize_pool_caller;
use crate::ledger;
use crate::storage::{
    clear_pending_mint, get_balance, get_config, get_pending_mint, get_position,
    get_price_state, require_pool_reference, set_pending_mint, set_position, PendingMint,
    PoolReference,
};
use crate::LaunchError;

/// Add liquidity to the launch pool on behalf of the invoker
///
/// The invoker owns the position and pays both assets during the pool's
/// callback. The mirrored position is reconciled with the pool afterwards.
///
/// # Returns
/// (amount0, amount1) - Token amounts deposited
pub fn mint_liquidity(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> Result<(u128, u128), LaunchError> {
    let owner = env.invoker()?;
    let reference = require_pool_reference(env)?;
    if !get_price_state(env)?.initialized {
        return Err(LaunchError::PoolNotInitialized);
    }
    if !is_valid_tick_range(tick_lower, tick_upper, reference.tick_spacing) {
        return Err(LaunchError::InvalidTickRange);
    }
    if amount == 0 {
        return Err(LaunchError::InvalidLiquidityAmount);
    }
    if get_pending_mint(env)?.is_some() {
        return Err(LaunchError::MintInProgress);
    }

    set_pending_mint(env, &PendingMint::new(owner))?;
    let minted = mint_and_settle(env, &reference, owner, tick_lower, tick_upper, amount);
    clear_pending_mint(env)?;
    let (amount0, amount1) = minted?;

    // Mirror the position, then reconcile with the pool
    let key = PositionKey::new(owner, tick_lower, tick_upper);
    let mut position = get_position(env, &key)?;
    position.liquidity = position
        .liquidity
        .checked_add(amount)
        .ok_or(MathError::LiquidityOverflow)?;
    let pool_position = PoolClient::new(env, &reference.pool).positions(&owner, &tick_lower, &tick_upper)?;
    if pool_position.liquidity != position.liquidity {
        tracing::warn!(
            %owner,
            tick_lower,
            tick_upper,
            mirrored = position.liquidity,
            pool = pool_position.liquidity,
            "position drifted from the pool, adopting the pool's value"
        );
    }
    set_position(env, &key, &pool_position)?;

    env.events().publish(
        &["liquidity_minted"],
        &(owner, tick_lower, tick_upper, amount, amount0, amount1),
    )?;
    tracing::info!(%owner, tick_lower, tick_upper, amount, amount0, amount1, "liquidity minted");
    Ok((amount0, amount1))
}

fn mint_and_settle(
    env: &Env,
    reference: &PoolReference,
    owner: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> Result<(u128, u128), LaunchError> {
    let owed = PoolClient::new(env, &reference.pool)
        .mint(
            &owner,
            &tick_lower,
            &tick_upper,
            &amount,
            &MintCallbackData { payer: owner },
        )
        .map_err(|err| LaunchError::from_host_error(env, err))?;

    let pending = match get_pending_mint(env)? {
        Some(pending) if pending.settled => pending,
        _ => {
            tracing::warn!(pool = %reference.pool, "pool mint returned without settlement");
            return Err(LaunchError::SettlementMissing);
        }
    };
    // The amounts reported back must be the ones the payer was charged
    let charged = (pending.amount0, pending.amount1);
    if charged != owed {
        tracing::warn!(
            pool = %reference.pool,
            reported0 = owed.0,
            reported1 = owed.1,
            charged0 = charged.0,
            charged1 = charged.1,
            "pool reported amounts that differ from the settlement"
        );
        return Err(LaunchError::SettlementMismatch);
    }
    Ok(charged)
}

/// Pay the pool for a mint in progress
///
/// Only the recorded pool may call this, and only while a mint started by
/// [`mint_liquidity`] is waiting. Both legs are checked before either moves:
/// the launch asset is moved on the internal ledger, the reference asset via
/// `transfer_from` with this token as spender.
pub fn settle_callback(
    env: &Env,
    amount0_owed: u128,
    amount1_owed: u128,
    data: MintCallbackData,
) -> Result<(), LaunchError> {
    let reference = authorize_pool_caller(env)?;

    let mut pending = match get_pending_mint(env)? {
        Some(pending) if !pending.settled => pending,
        _ => {
            tracing::warn!(pool = %reference.pool, "liquidity callback without a pending mint");
            return Err(LaunchError::UnexpectedCallback);
        }
    };
    if data.payer != pending.payer {
        tracing::warn!(payer = %data.payer, expected = %pending.payer, "liquidity callback payer mismatch");
        return Err(LaunchError::PayerMismatch);
    }

    let this = env.current_contract_address()?;
    let (own_owed, reference_owed) = if reference.token0 == this {
        (amount0_owed, amount1_owed)
    } else {
        (amount1_owed, amount0_owed)
    };
    let own_owed = to_i128(own_owed)?;
    let reference_owed = to_i128(reference_owed)?;

    let payer = pending.payer;
    let reference_asset = TokenClient::new(env, &get_config(env)?.reference_asset);
    if reference_owed > 0 {
        if reference_asset.allowance(&payer, &this)? < reference_owed {
            return Err(LaunchError::InsufficientApproval);
        }
        if reference_asset.balance(&payer)? < reference_owed {
            return Err(LaunchError::TransferFailed);
        }
    }
    if get_balance(env, &payer)? < own_owed {
        return Err(LaunchError::TransferFailed);
    }

    if own_owed > 0 {
        ledger::move_balance(env, &payer, &reference.pool, own_owed)?;
    }
    if reference_owed > 0 {
        reference_asset
            .transfer_from(&this, &payer, &reference.pool, &reference_owed)
            .map_err(|err| {
                tracing::warn!(%err, "reference asset transfer failed");
                LaunchError::TransferFailed
            })?;
    }

    pending.settled = true;
    pending.amount0 = amount0_owed;
    pending.amount1 = amount1_owed;
    set_pending_mint(env, &pending)?;

    env.events().publish(
        &["settled"],
        &(payer, reference.pool, amount0_owed, amount1_owed),
    )?;
    tracing::debug!(%payer, amount0_owed, amount1_owed, "mint settled");
    Ok(())
}

/// Mirrored position of `owner` over the range.
pub fn position(
    env: &Env,
    owner: Address,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<PositionInfo, LaunchError> {
    get_position(env, &PositionKey::new(owner, tick_lower, tick_upper))
}

/// Liquidity the given amounts would buy over the range at the pool's
/// current price, rounded down.
pub fn liquidity_for_amounts(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    amount0: u128,
    amount1: u128,
) -> Result<u128, LaunchError> {
    let (sqrt_price_x96, sqrt_ratio_lower, sqrt_ratio_upper) =
        quote_ratios(env, tick_lower, tick_upper)?;
    Ok(get_liquidity_for_amounts(
        sqrt_price_x96,
        sqrt_ratio_lower,
        sqrt_ratio_upper,
        amount0,
        amount1,
    )?)
}

/// Token amounts backing `liquidity` over the range at the pool's current
/// price, rounded down.
pub fn amounts_for_liquidity(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> Result<(u128, u128), LaunchError> {
    let (sqrt_price_x96, sqrt_ratio_lower, sqrt_ratio_upper) =
        quote_ratios(env, tick_lower, tick_upper)?;
    Ok(get_amounts_for_liquidity(
        sqrt_price_x96,
        sqrt_ratio_lower,
        sqrt_ratio_upper,
        liquidity,
    )?)
}

fn quote_ratios(env: &Env, tick_lower: i32, tick_upper: i32) -> Result<(u128, u128, u128), LaunchError> {
    let reference = require_pool_reference(env)?;
    if !get_price_state(env)?.initialized {
        return Err(LaunchError::PoolNotInitialized);
    }
    if !is_valid_tick_range(tick_lower, tick_upper, reference.tick_spacing) {
        return Err(LaunchError::InvalidTickRange);
    }
    let slot0 = PoolClient::new(env, &reference.pool).slot0()?;
    Ok((
        slot0.sqrt_price_x96,
        get_sqrt_ratio_at_tick(tick_lower)?,
        get_sqrt_ratio_at_tick(tick_upper)?,
    ))
}

fn to_i128(amount: u128) -> Result<i128, LaunchError> {
    i128::try_from(amount).map_err(|_| LaunchError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LaunchConfig, LaunchToken, LaunchTokenClient};
    use dex_env::testutils::Address as _;
    use dex_factory::{DexFactory, DexFactoryClient};
    use dex_pool::DexPool;
    use wrapped_token::{WrappedToken, WrappedTokenClient};

    struct Setup {
        env: Env,
        user: Address,
        token: Address,
        pool: Address,
    }

    fn setup() -> Setup {
        let env = Env::default();
        let user = Address::generate(&env);
        env.set_source_account(&user);

        let pool_code_hash = env.deployer().upload_contract::<DexPool>();
        let factory = env.register(DexFactory);
        DexFactoryClient::new(&env, &factory)
            .initialize(&user, &pool_code_hash)
            .unwrap();
        let weth = env.register(WrappedToken);
        let weth_client = WrappedTokenClient::new(&env, &weth);
        weth_client.initialize(&user, "Wrapped Ether", "WETH", &18).unwrap();
        weth_client.mint(&user, &1_000_000).unwrap();

        let token = env.register(LaunchToken);
        let client = LaunchTokenClient::new(&env, &token);
        client
            .initialize(
                &user,
                &LaunchConfig {
                    name: "Unicorn".to_string(),
                    symbol: "UNI".to_string(),
                    decimals: 18,
                    initial_supply: 1_000_000,
                    factory,
                    reference_asset: weth,
                },
            )
            .unwrap();
        let pool = client.create_pool(&500).unwrap();
        client.initialize_pool(&(1u128 << 96)).unwrap();
        weth_client.approve(&user, &token, &1_000_000).unwrap();

        Setup {
            env,
            user,
            token,
            pool,
        }
    }

    fn set_pending(s: &Setup, pending: &PendingMint) {
        s.env
            .as_contract(&s.token, || set_pending_mint(&s.env, pending))
            .unwrap();
    }

    #[test]
    fn test_mint_rejected_while_pending() {
        let s = setup();
        set_pending(&s, &PendingMint::new(s.user));

        let result = LaunchTokenClient::new(&s.env, &s.token).mint_liquidity(&-20, &20, &1_000);
        assert_eq!(result, Err(LaunchError::MintInProgress));
    }

    #[test]
    fn test_pending_context_dropped_after_top_level_call() {
        let s = setup();
        let client = LaunchTokenClient::new(&s.env, &s.token);
        client.mint_liquidity(&-20, &20, &1_000).unwrap();

        let pending = s.env.as_contract(&s.token, || get_pending_mint(&s.env)).unwrap();
        assert_eq!(pending, None);
    }

    #[test]
    fn test_callback_payer_must_match_pending() {
        let s = setup();
        let other = Address::generate(&s.env);
        set_pending(&s, &PendingMint::new(s.user));

        s.env.set_source_account(&s.pool);
        let client = LaunchTokenClient::new(&s.env, &s.token);
        assert_eq!(
            client.on_liquidity_callback(&10, &10, &MintCallbackData { payer: other }),
            Err(LaunchError::PayerMismatch)
        );
    }

    #[test]
    fn test_callback_settles_pending_mint() {
        let s = setup();
        set_pending(&s, &PendingMint::new(s.user));

        // Run inside one top-level call so the pending context is still visible afterwards
        s.env.set_source_account(&s.pool);
        let settled = s
            .env
            .invoke_contract(&s.token, "on_liquidity_callback", |env| {
                settle_callback(env, 10, 20, MintCallbackData { payer: s.user })?;
                get_pending_mint(env)
            })
            .unwrap()
            .unwrap();

        assert!(settled.settled);
        assert_eq!((settled.amount0, settled.amount1), (10, 20));
        let token = TokenClient::new(&s.env, &s.token);
        let weth = TokenClient::new(&s.env, &get_reference_asset(&s));
        let (own, other) = if token.address < weth.address { (10, 20) } else { (20, 10) };
        assert_eq!(token.balance(&s.pool).unwrap(), own);
        assert_eq!(weth.balance(&s.pool).unwrap(), other);
    }

    #[test]
    fn test_settled_context_rejects_second_callback() {
        let s = setup();
        let mut pending = PendingMint::new(s.user);
        pending.settled = true;
        set_pending(&s, &pending);

        s.env.set_source_account(&s.pool);
        let client = LaunchTokenClient::new(&s.env, &s.token);
        assert_eq!(
            client.on_liquidity_callback(&10, &10, &MintCallbackData { payer: s.user }),
            Err(LaunchError::UnexpectedCallback)
        );
    }

    #[test]
    fn test_guard_runs_before_pending_checks() {
        let s = setup();
        // No pending context either, but the caller identity is checked first
        let client = LaunchTokenClient::new(&s.env, &s.token);
        assert_eq!(
            client.on_liquidity_callback(&10, &10, &MintCallbackData { payer: s.user }),
            Err(LaunchError::UnauthorizedCaller)
        );
    }

    fn get_reference_asset(s: &Setup) -> Address {
        LaunchTokenClient::new(&s.env, &s.token)
            .config()
            .unwrap()
            .reference_asset
    }
}
