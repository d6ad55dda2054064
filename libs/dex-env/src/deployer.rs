use crate::{env::Installer, Contract, Env, HostError};
use alloy_primitives::{keccak256, Address, B256};
use std::any::type_name;

/// Deterministic deployment address: the last 20 bytes of
/// `keccak256(0xff ++ deployer ++ salt ++ code_hash)`.
pub fn create2_address(deployer: &Address, salt: &B256, code_hash: &B256) -> Address {
    let mut preimage = Vec::with_capacity(85);
    preimage.push(0xff);
    preimage.extend_from_slice(deployer.as_slice());
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(code_hash.as_slice());
    Address::from_slice(&keccak256(&preimage)[12..])
}

pub struct Deployer<'a> {
    env: &'a Env,
}

impl<'a> Deployer<'a> {
    pub(crate) fn new(env: &'a Env) -> Self {
        Self { env }
    }

    /// Uploads the code of `C` and returns its hash. Deploying the hash
    /// installs a fresh `C::default()`.
    pub fn upload_contract<C: Contract + Default>(&self) -> B256 {
        let code_hash = keccak256(type_name::<C>().as_bytes());
        self.env
            .with_ledger_mut(|ledger| ledger.upload(code_hash, install::<C> as Installer));
        tracing::debug!(%code_hash, contract = type_name::<C>(), "contract code uploaded");
        code_hash
    }

    /// Deploys on behalf of the currently executing contract.
    pub fn with_current_contract(&self, salt: B256) -> Result<DeployerWithAddress<'a>, HostError> {
        Ok(self.with_address(self.env.current_contract_address()?, salt))
    }

    /// Deploys on behalf of `deployer`, which must be the executing contract
    /// or have invoked it.
    pub fn with_address(&self, deployer: Address, salt: B256) -> DeployerWithAddress<'a> {
        DeployerWithAddress {
            env: self.env,
            deployer,
            salt,
        }
    }
}

pub struct DeployerWithAddress<'a> {
    env: &'a Env,
    deployer: Address,
    salt: B256,
}

impl DeployerWithAddress<'_> {
    pub fn deployed_address(&self, code_hash: &B256) -> Address {
        create2_address(&self.deployer, &self.salt, code_hash)
    }

    pub fn deploy(&self, code_hash: &B256) -> Result<Address, HostError> {
        if self.env.current_contract_address()? != self.deployer {
            self.env.require_auth(&self.deployer)?;
        }
        let installer = self
            .env
            .with_ledger(|ledger| ledger.code.get(code_hash).copied())
            .ok_or(HostError::UnknownCode(*code_hash))?;
        let address = self.deployed_address(code_hash);
        installer(self.env, &address)?;
        Ok(address)
    }
}

fn install<C: Contract + Default>(env: &Env, address: &Address) -> Result<(), HostError> {
    env.register_at(address, C::default())
}
