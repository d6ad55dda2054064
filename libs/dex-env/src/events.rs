use crate::{Env, HostError};
use alloy_primitives::Address;
use serde::Serialize;

/// An event published by a contract. Data is kept as its JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEvent {
    pub contract: Address,
    pub topics: Vec<String>,
    pub data: String,
}

pub struct Events<'a> {
    env: &'a Env,
}

impl<'a> Events<'a> {
    pub(crate) fn new(env: &'a Env) -> Self {
        Self { env }
    }

    /// Publishes an event from the currently executing contract.
    ///
    /// Events are part of the ledger state, so a failing invocation drops the
    /// events it published.
    pub fn publish<D: Serialize>(&self, topics: &[&str], data: &D) -> Result<(), HostError> {
        let contract = self.env.current_contract_address()?;
        let data = serde_json::to_string(data).map_err(|err| HostError::Codec(err.to_string()))?;
        tracing::trace!(%contract, ?topics, %data, "event");
        self.env.with_ledger_mut(|ledger| {
            ledger.publish(ContractEvent {
                contract,
                topics: topics.iter().map(|topic| topic.to_string()).collect(),
                data,
            })
        });
        Ok(())
    }

    /// Every event published so far, oldest first.
    pub fn all(&self) -> Vec<ContractEvent> {
        self.env.with_ledger(|ledger| ledger.events.clone())
    }
}
