use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::LaunchError;

/// Largest supported number of decimals for the launch asset.
pub const MAX_DECIMALS: u32 = 18;

/// Deployment parameters of a launch token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    /// Minted to the admin on initialization
    pub initial_supply: i128,
    /// AMM factory that deploys the pool
    pub factory: Address,
    /// Wrapped base currency the launch asset is paired with
    pub reference_asset: Address,
}

impl LaunchConfig {
    /// Parses a configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), LaunchError> {
        let problem = if self.name.trim().is_empty() {
            Some("name is empty")
        } else if self.symbol.trim().is_empty() {
            Some("symbol is empty")
        } else if self.decimals > MAX_DECIMALS {
            Some("too many decimals")
        } else if self.initial_supply < 0 {
            Some("initial supply is negative")
        } else if self.factory == Address::ZERO || self.reference_asset == Address::ZERO {
            Some("zero address")
        } else if self.factory == self.reference_asset {
            Some("factory and reference asset are the same address")
        } else {
            None
        };

        match problem {
            Some(reason) => {
                tracing::warn!(reason, "rejected launch configuration");
                Err(LaunchError::InvalidConfig)
            }
            None => Ok(()),
        }
    }
}
