use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Position key for pool-level tracking
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

/// Position info, as stored by the pool and mirrored by position owners
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    /// Liquidity in this position
    pub liquidity: u128,
    /// Fee growth inside at last update (token0)
    pub fee_growth_inside_0_last_x128: u128,
    /// Fee growth inside at last update (token1)
    pub fee_growth_inside_1_last_x128: u128,
    /// Uncollected token0 fees
    pub tokens_owed_0: u128,
    /// Uncollected token1 fees
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }
}
