#![allow(dead_code)]

use alloy_primitives::{Address, B256};
use dex_env::testutils::Address as _;
use dex_env::Env;
use dex_factory::{DexFactory, DexFactoryClient};
use dex_pool::DexPool;
use launch_token::{LaunchConfig, LaunchToken, LaunchTokenClient};
use wrapped_token::{WrappedToken, WrappedTokenClient};

pub const E18: i128 = 1_000_000_000_000_000_000;
pub const INITIAL_SUPPLY: i128 = 1_000_000 * E18;
pub const REFERENCE_BALANCE: i128 = 1_000 * E18;

/// sqrt(1) as Q64.96
pub const PRICE_ONE: u128 = 1 << 96;

pub struct Fixture {
    pub env: Env,
    /// Deployer of every contract, admin of the launch token
    pub user: Address,
    pub factory: Address,
    pub pool_code_hash: B256,
    pub weth: Address,
    pub token: Address,
}

impl Fixture {
    pub fn launch(&self) -> LaunchTokenClient<'_> {
        LaunchTokenClient::new(&self.env, &self.token)
    }

    pub fn weth(&self) -> WrappedTokenClient<'_> {
        WrappedTokenClient::new(&self.env, &self.weth)
    }

    /// Creates the pool at `fee` and prices it at 1.
    pub fn bootstrap(&self, fee: u32) -> Address {
        let pool = self.launch().create_pool(&fee).unwrap();
        self.launch().initialize_pool(&PRICE_ONE).unwrap();
        pool
    }

    /// Lets the launch token pull the user's reference asset.
    pub fn approve_reference(&self, amount: i128) {
        self.weth().approve(&self.user, &self.token, &amount).unwrap();
    }
}

pub fn launch_config(factory: Address, reference_asset: Address) -> LaunchConfig {
    LaunchConfig {
        name: "Unicorn".to_string(),
        symbol: "UNI".to_string(),
        decimals: 18,
        initial_supply: INITIAL_SUPPLY,
        factory,
        reference_asset,
    }
}

pub fn setup() -> Fixture {
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
    weth_client
        .initialize(&user, "Wrapped Ether", "WETH", &18)
        .unwrap();
    weth_client.mint(&user, &REFERENCE_BALANCE).unwrap();

    let token = env.register(LaunchToken);
    LaunchTokenClient::new(&env, &token)
        .initialize(&user, &launch_config(factory, weth))
        .unwrap();

    Fixture {
        env,
        user,
        factory,
        pool_code_hash,
        weth,
        token,
    }
}
