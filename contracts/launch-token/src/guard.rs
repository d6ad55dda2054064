use dex_env::Env;

use crate::storage::{get_pool_reference, PoolReference};
use crate::LaunchError;

/// Admits the invoker only if it is the pool recorded by this token.
///
/// Before a pool is created nobody is admitted.
pub fn authorize_pool_caller(env: &Env) -> Result<PoolReference, LaunchError> {
    let caller = env.invoker()?;
    match get_pool_reference(env)? {
        Some(reference) if reference.pool == caller => Ok(reference),
        recorded => {
            let pool = recorded.map(|reference| reference.pool);
            tracing::warn!(%caller, ?pool, "rejected liquidity callback");
            Err(LaunchError::UnauthorizedCaller)
        }
    }
}
