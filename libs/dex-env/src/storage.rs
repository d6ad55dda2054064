use crate::{env::Slot, Env, HostError};
use serde::{de::DeserializeOwned, Serialize};

/// Lifetime class of a storage entry.
///
/// Instance and persistent entries live as long as the contract. Temporary
/// entries are dropped once the top-level invocation that wrote them
/// completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Tier {
    Instance,
    Persistent,
    Temporary,
}

/// Storage of the currently executing contract.
pub struct Storage<'a> {
    env: &'a Env,
}

impl<'a> Storage<'a> {
    pub(crate) fn new(env: &'a Env) -> Self {
        Self { env }
    }

    pub fn instance(&self) -> StorageTier<'a> {
        StorageTier::new(self.env, Tier::Instance)
    }

    pub fn persistent(&self) -> StorageTier<'a> {
        StorageTier::new(self.env, Tier::Persistent)
    }

    pub fn temporary(&self) -> StorageTier<'a> {
        StorageTier::new(self.env, Tier::Temporary)
    }
}

/// Keyed access to one storage tier. Keys and values are JSON encoded.
pub struct StorageTier<'a> {
    env: &'a Env,
    tier: Tier,
}

impl<'a> StorageTier<'a> {
    fn new(env: &'a Env, tier: Tier) -> Self {
        Self { env, tier }
    }

    pub fn has<K: Serialize>(&self, key: &K) -> Result<bool, HostError> {
        let key = encode(key)?;
        let slot = (self.env.current_contract_address()?, self.tier);
        Ok(self.has_raw(&slot, &key))
    }

    pub fn get<K: Serialize, V: DeserializeOwned>(&self, key: &K) -> Result<Option<V>, HostError> {
        let key = encode(key)?;
        let slot = (self.env.current_contract_address()?, self.tier);
        let raw = self.env.with_ledger(|ledger| {
            ledger
                .storage
                .get(&slot)
                .and_then(|entries| entries.get(&key).cloned())
        });
        raw.map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|err| HostError::Codec(err.to_string()))
        })
        .transpose()
    }

    pub fn set<K: Serialize, V: Serialize>(&self, key: &K, value: &V) -> Result<(), HostError> {
        let key = encode(key)?;
        let value = encode(value)?;
        let slot = (self.env.current_contract_address()?, self.tier);
        self.env
            .with_ledger_mut(|ledger| ledger.write(slot, key, Some(value)));
        Ok(())
    }

    pub fn remove<K: Serialize>(&self, key: &K) -> Result<(), HostError> {
        let key = encode(key)?;
        let slot = (self.env.current_contract_address()?, self.tier);
        if self.has_raw(&slot, &key) {
            self.env.with_ledger_mut(|ledger| ledger.write(slot, key, None));
        }
        Ok(())
    }

    fn has_raw(&self, slot: &Slot, key: &[u8]) -> bool {
        self.env.with_ledger(|ledger| {
            ledger
                .storage
                .get(slot)
                .is_some_and(|entries| entries.contains_key(key))
        })
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, HostError> {
    serde_json::to_vec(value).map_err(|err| HostError::Codec(err.to_string()))
}
