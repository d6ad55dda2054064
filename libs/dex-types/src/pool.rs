use alloy_primitives::{keccak256, Address, B256};
use dex_env::create2_address;
use serde::{Deserialize, Serialize};

use crate::Fee;

/// Orders two token addresses, lower address first.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Identifies a pool: an ordered token pair and a fee tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: Fee,
}

impl PoolKey {
    pub fn new(token_a: Address, token_b: Address, fee: Fee) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            token0,
            token1,
            fee,
        }
    }

    /// `keccak256(abi.encode(token0, token1, fee))`
    pub fn salt(&self) -> B256 {
        let mut encoded = [0u8; 96];
        encoded[12..32].copy_from_slice(self.token0.as_slice());
        encoded[44..64].copy_from_slice(self.token1.as_slice());
        encoded[92..96].copy_from_slice(&self.fee.to_be_bytes());
        keccak256(encoded)
    }
}

/// Address a factory deploys the pool for `(token_a, token_b, fee)` at.
pub fn compute_pool_address(
    factory: &Address,
    token_a: Address,
    token_b: Address,
    fee: Fee,
    pool_code_hash: &B256,
) -> Address {
    let key = PoolKey::new(token_a, token_b, fee);
    create2_address(factory, &key.salt(), pool_code_hash)
}

/// Pool configuration - immutable after creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Factory contract address
    pub factory: Address,
    /// Token0 address (lower address)
    pub token0: Address,
    /// Token1 address (higher address)
    pub token1: Address,
    /// Fee tier in hundredths of bps
    pub fee: Fee,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
    /// Maximum liquidity per tick
    pub max_liquidity_per_tick: u128,
}

/// Current pool state, written once the pool is initialized
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
    /// Total liquidity currently in range
    pub liquidity: u128,
}

impl PoolState {
    pub fn new(sqrt_price_x96: u128, tick: i32) -> Self {
        Self {
            sqrt_price_x96,
            tick,
            liquidity: 0,
        }
    }

    pub fn slot0(&self) -> Slot0 {
        Slot0 {
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
        }
    }
}

/// Current pool price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
}

/// Opaque data a pool hands back to the minter's callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintCallbackData {
    pub payer: Address,
}
