use crate::Env;

/// Test helpers for addresses.
pub trait Address {
    /// A fresh address no contract is registered at.
    fn generate(env: &Env) -> Self;
}

impl Address for alloy_primitives::Address {
    fn generate(env: &Env) -> Self {
        env.fresh_address()
    }
}
