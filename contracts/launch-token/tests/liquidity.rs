mod common;

use alloy_primitives::Address;
use common::{setup, Fixture, E18, INITIAL_SUPPLY, REFERENCE_BALANCE};
use dex_env::testutils::Address as _;
use dex_env::HostError;
use dex_types::{MintCallbackClient, MintCallbackData, PoolClient, TokenClient};
use launch_token::{LaunchError, LaunchTokenClient};
use wrapped_token::WrappedToken;
use test_case::test_case;

const LIQUIDITY: u128 = 10 * E18 as u128;

/// Balances of one account in both assets: (launch token, reference asset)
fn balances(f: &Fixture, id: &Address) -> (i128, i128) {
    (
        f.launch().balance(id).unwrap(),
        TokenClient::new(&f.env, &f.weth).balance(id).unwrap(),
    )
}

/// Splits pool-ordered amounts into (launch token, reference asset).
fn by_asset(f: &Fixture, amount0: u128, amount1: u128) -> (i128, i128) {
    let reference = f.launch().pool_reference().unwrap().unwrap();
    let (own, other) = if reference.token0 == f.token {
        (amount0, amount1)
    } else {
        (amount1, amount0)
    };
    (own as i128, other as i128)
}

// === Mint Tests ===

#[test]
fn test_mint_liquidity_in_range() {
    let f = setup();
    let pool = f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), 0);
    let (amount0, amount1) = f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    assert!(amount0 > 0 && amount1 > 0);

    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), LIQUIDITY);
    assert_eq!(
        f.launch().get_position(&f.user, &-20, &20).unwrap().liquidity,
        LIQUIDITY
    );

    let (own, reference) = by_asset(&f, amount0, amount1);
    assert_eq!(balances(&f, &pool), (own, reference));
    assert_eq!(
        balances(&f, &f.user),
        (INITIAL_SUPPLY - own, REFERENCE_BALANCE - reference)
    );
}

#[test]
fn test_repeated_mints_accumulate() {
    let f = setup();
    let pool = f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();

    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), 2 * LIQUIDITY);
    assert_eq!(
        f.launch().get_position(&f.user, &-20, &20).unwrap().liquidity,
        2 * LIQUIDITY
    );
    assert_eq!(
        PoolClient::new(&f.env, &pool).positions(&f.user, &-20, &20).unwrap(),
        f.launch().get_position(&f.user, &-20, &20).unwrap()
    );
}

#[test]
fn test_positions_are_keyed_by_owner_and_range() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    f.launch().mint_liquidity(&-100, &100, &LIQUIDITY).unwrap();

    let other = Address::generate(&f.env);
    assert_eq!(f.launch().get_position(&f.user, &-20, &20).unwrap().liquidity, LIQUIDITY);
    assert_eq!(f.launch().get_position(&f.user, &-100, &100).unwrap().liquidity, LIQUIDITY);
    assert_eq!(f.launch().get_position(&other, &-20, &20).unwrap().liquidity, 0);
}

#[test]
fn test_mint_by_other_holder() {
    let f = setup();
    let pool = f.bootstrap(500);
    let holder = Address::generate(&f.env);

    // fund the holder with both assets
    f.launch().transfer(&f.user, &holder, &(1_000 * E18)).unwrap();
    f.weth().mint(&holder, &(1_000 * E18)).unwrap();

    f.env.set_source_account(&holder);
    f.weth().approve(&holder, &f.token, &(1_000 * E18)).unwrap();
    let (amount0, amount1) = f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();

    let (own, reference) = by_asset(&f, amount0, amount1);
    assert_eq!(balances(&f, &holder), (1_000 * E18 - own, 1_000 * E18 - reference));
    assert_eq!(balances(&f, &pool), (own, reference));
    assert_eq!(f.launch().get_position(&holder, &-20, &20).unwrap().liquidity, LIQUIDITY);
    assert_eq!(f.launch().get_position(&f.user, &-20, &20).unwrap().liquidity, 0);
}

#[test]
fn test_mint_out_of_range_position() {
    let f = setup();
    let pool = f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    // Price below the range: only token0 is owed, nothing becomes active
    let (amount0, amount1) = f.launch().mint_liquidity(&100, &200, &LIQUIDITY).unwrap();
    assert!(amount0 > 0);
    assert_eq!(amount1, 0);
    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), 0);
    assert_eq!(f.launch().get_position(&f.user, &100, &200).unwrap().liquidity, LIQUIDITY);
}

#[test]
fn test_mint_events() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();

    let events = f.env.events().all();
    let topics: Vec<&str> = events
        .iter()
        .filter(|event| event.contract == f.token)
        .map(|event| event.topics[0].as_str())
        .collect();
    assert!(topics.contains(&"settled"));
    assert_eq!(topics.last(), Some(&"liquidity_minted"));
}

// === Precondition Tests ===

#[test]
fn test_mint_before_price_initialized() {
    let f = setup();
    f.launch().create_pool(&500).unwrap();
    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::PoolNotInitialized)
    );
}

#[test_case(20, -20 ; "inverted")]
#[test_case(0, 0 ; "empty")]
#[test_case(-15, 20 ; "lower not on spacing")]
#[test_case(-20, 25 ; "upper not on spacing")]
#[test_case(-443640, 0 ; "below min tick")]
#[test_case(0, 443640 ; "above max tick")]
fn test_mint_invalid_tick_range(tick_lower: i32, tick_upper: i32) {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    assert_eq!(
        f.launch().mint_liquidity(&tick_lower, &tick_upper, &LIQUIDITY),
        Err(LaunchError::InvalidTickRange)
    );
}

#[test]
fn test_mint_zero_liquidity() {
    let f = setup();
    f.bootstrap(500);
    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &0),
        Err(LaunchError::InvalidLiquidityAmount)
    );
}

// === Settlement Failure Tests ===

#[test]
fn test_mint_without_approval() {
    let f = setup();
    let pool = f.bootstrap(500);
    let before = balances(&f, &f.user);
    let events_before = f.env.events().all().len();

    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::InsufficientApproval)
    );

    assert_eq!(balances(&f, &f.user), before);
    assert_eq!(balances(&f, &pool), (0, 0));
    assert_eq!(f.launch().get_position(&f.user, &-20, &20).unwrap().liquidity, 0);
    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), 0);
    assert_eq!(
        PoolClient::new(&f.env, &pool).positions(&f.user, &-20, &20).unwrap().liquidity,
        0
    );
    assert_eq!(f.env.events().all().len(), events_before);
}

#[test]
fn test_mint_with_partial_approval() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(1);
    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::InsufficientApproval)
    );
    // the approval was not consumed
    assert_eq!(
        TokenClient::new(&f.env, &f.weth).allowance(&f.user, &f.token).unwrap(),
        1
    );
}

#[test]
fn test_mint_without_reference_balance() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    let sink = Address::generate(&f.env);
    f.weth().transfer(&f.user, &sink, &REFERENCE_BALANCE).unwrap();

    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::TransferFailed)
    );
    assert_eq!(f.launch().balance(&f.user).unwrap(), INITIAL_SUPPLY);
}

#[test]
fn test_mint_without_own_balance() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    let sink = Address::generate(&f.env);
    f.launch().transfer(&f.user, &sink, &INITIAL_SUPPLY).unwrap();

    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::TransferFailed)
    );
    assert_eq!(balances(&f, &f.user), (0, REFERENCE_BALANCE));
}

#[test]
fn test_failed_mint_can_be_retried() {
    let f = setup();
    let pool = f.bootstrap(500);
    assert_eq!(
        f.launch().mint_liquidity(&-20, &20, &LIQUIDITY),
        Err(LaunchError::InsufficientApproval)
    );

    f.approve_reference(REFERENCE_BALANCE);
    f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    assert_eq!(PoolClient::new(&f.env, &pool).liquidity().unwrap(), LIQUIDITY);
}

// === Callback Guard Tests ===

#[test]
fn test_callback_from_user_is_rejected() {
    let f = setup();
    f.bootstrap(500);
    let data = MintCallbackData { payer: f.user };
    assert_eq!(
        f.launch().on_liquidity_callback(&1000, &1000, &data),
        Err(LaunchError::UnauthorizedCaller)
    );
}

#[test_case(0, 0 ; "nothing owed")]
#[test_case(1000, 1000 ; "both owed")]
#[test_case(u128::MAX, 0 ; "huge amount")]
fn test_callback_from_stranger_is_rejected(amount0: u128, amount1: u128) {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    let stranger = Address::generate(&f.env);
    f.env.set_source_account(&stranger);

    let err = MintCallbackClient::new(&f.env, &f.token)
        .on_liquidity_callback(&amount0, &amount1, &MintCallbackData { payer: f.user })
        .unwrap_err();
    assert_eq!(
        err.contract_error::<LaunchError>(&f.token),
        Some(LaunchError::UnauthorizedCaller)
    );
    assert_eq!(balances(&f, &f.user), (INITIAL_SUPPLY, REFERENCE_BALANCE));
}

#[test]
fn test_callback_from_factory_is_rejected() {
    let f = setup();
    f.bootstrap(500);
    f.env.set_source_account(&f.factory);
    assert_eq!(
        f.launch()
            .on_liquidity_callback(&1000, &1000, &MintCallbackData { payer: f.user }),
        Err(LaunchError::UnauthorizedCaller)
    );
}

#[test]
fn test_callback_from_pool_outside_mint() {
    let f = setup();
    let pool = f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    // The pool passes the guard but has nothing to settle
    f.env.set_source_account(&pool);
    assert_eq!(
        f.launch()
            .on_liquidity_callback(&1000, &1000, &MintCallbackData { payer: f.user }),
        Err(LaunchError::UnexpectedCallback)
    );
    assert_eq!(balances(&f, &f.user), (INITIAL_SUPPLY, REFERENCE_BALANCE));
}

#[test]
fn test_callback_relayed_by_other_contract_is_rejected() {
    let f = setup();
    let pool = f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);
    let relay = f.env.register(WrappedToken);

    // Any contract may forward the call, but the token sees the relay as caller
    let relayed = f.env.invoke_contract(&relay, "relay", |env| {
        LaunchTokenClient::new(env, &f.token)
            .on_liquidity_callback(&1000, &1000, &MintCallbackData { payer: f.user })
    });
    assert_eq!(relayed, Err(LaunchError::UnauthorizedCaller));
    assert_ne!(relay, pool);

    // Nor can a stranger move the payer's approved reference balance
    let stranger = Address::generate(&f.env);
    f.env.set_source_account(&stranger);
    assert_eq!(
        TokenClient::new(&f.env, &f.weth).transfer(&f.user, &stranger, &REFERENCE_BALANCE),
        Err(HostError::NotAuthorized(f.user))
    );
    assert_eq!(balances(&f, &f.user), (INITIAL_SUPPLY, REFERENCE_BALANCE));
}

// === Quote Tests ===

#[test]
fn test_quotes_match_mint() {
    let f = setup();
    f.bootstrap(500);
    f.approve_reference(REFERENCE_BALANCE);

    let (quote0, quote1) = f.launch().amounts_for_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    let (amount0, amount1) = f.launch().mint_liquidity(&-20, &20, &LIQUIDITY).unwrap();
    // quotes round down, the pool rounds up
    assert!(amount0 - quote0 <= 1);
    assert!(amount1 - quote1 <= 1);

    let liquidity = f
        .launch()
        .liquidity_for_amounts(&-20, &20, &amount0, &amount1)
        .unwrap();
    assert!(liquidity.abs_diff(LIQUIDITY) <= LIQUIDITY / 1_000_000);
}

#[test]
fn test_quotes_require_initialized_pool() {
    let f = setup();
    f.launch().create_pool(&500).unwrap();
    assert_eq!(
        f.launch().liquidity_for_amounts(&-20, &20, &1, &1),
        Err(LaunchError::PoolNotInitialized)
    );
}
