use crate::{
    deployer::Deployer,
    events::{ContractEvent, Events},
    storage::{Storage, Tier},
    HostError,
};
use alloy_primitives::{keccak256, Address, B256};
use std::{
    any::{type_name, Any, TypeId},
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

/// Maximum nesting of contract invocations, the top-level call included.
pub const MAX_CALL_DEPTH: usize = 16;

pub(crate) type Installer = fn(&Env, &Address) -> Result<(), HostError>;

pub(crate) type Slot = (Address, Tier);

/// Host state shared by every contract.
///
/// Writes go through the methods below, which record how to undo them. An
/// invocation remembers the journal length it started at and a failure
/// unwinds back to it, so rolling back costs as much as the failed call
/// wrote rather than the size of the ledger.
#[derive(Default)]
pub(crate) struct Ledger {
    pub(crate) contracts: HashSet<Address>,
    pub(crate) exports: HashMap<(Address, TypeId), Rc<dyn Any>>,
    pub(crate) code: HashMap<B256, Installer>,
    pub(crate) storage: HashMap<Slot, BTreeMap<Vec<u8>, Vec<u8>>>,
    pub(crate) events: Vec<ContractEvent>,
    journal: Vec<Undo>,
}

/// The inverse of one ledger write.
enum Undo {
    Installed {
        address: Address,
        interfaces: Vec<TypeId>,
    },
    Uploaded {
        code_hash: B256,
        previous: Option<Installer>,
    },
    Stored {
        slot: Slot,
        key: Vec<u8>,
        previous: Option<Vec<u8>>,
    },
    Published,
}

impl Ledger {
    fn install(&mut self, address: Address, entries: Vec<(TypeId, Rc<dyn Any>)>) {
        self.contracts.insert(address);
        let interfaces = entries.iter().map(|(type_id, _)| *type_id).collect();
        for (type_id, implementation) in entries {
            self.exports.insert((address, type_id), implementation);
        }
        self.journal.push(Undo::Installed { address, interfaces });
    }

    pub(crate) fn upload(&mut self, code_hash: B256, installer: Installer) {
        let previous = self.code.insert(code_hash, installer);
        self.journal.push(Undo::Uploaded { code_hash, previous });
    }

    /// Sets `key` in `slot`, or removes it when `value` is `None`.
    pub(crate) fn write(&mut self, slot: Slot, key: Vec<u8>, value: Option<Vec<u8>>) {
        let entries = self.storage.entry(slot).or_default();
        let previous = match value {
            Some(value) => entries.insert(key.clone(), value),
            None => entries.remove(&key),
        };
        self.journal.push(Undo::Stored { slot, key, previous });
    }

    pub(crate) fn publish(&mut self, event: ContractEvent) {
        self.events.push(event);
        self.journal.push(Undo::Published);
    }

    fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    fn revert_to(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some(undo) = self.journal.pop() else {
                break;
            };
            match undo {
                Undo::Installed { address, interfaces } => {
                    self.contracts.remove(&address);
                    for type_id in interfaces {
                        self.exports.remove(&(address, type_id));
                    }
                }
                Undo::Uploaded { code_hash, previous } => match previous {
                    Some(installer) => {
                        self.code.insert(code_hash, installer);
                    }
                    None => {
                        self.code.remove(&code_hash);
                    }
                },
                Undo::Stored { slot, key, previous } => {
                    let entries = self.storage.entry(slot).or_default();
                    match previous {
                        Some(value) => {
                            entries.insert(key, value);
                        }
                        None => {
                            entries.remove(&key);
                        }
                    }
                }
                Undo::Published => {
                    self.events.pop();
                }
            }
        }
    }

    /// Ends a successful top-level invocation.
    fn commit(&mut self) {
        self.storage.retain(|(_, tier), _| *tier != Tier::Temporary);
        self.journal.clear();
    }
}

#[derive(Clone, Debug)]
struct Frame {
    contract: Address,
    invoker: Address,
}

#[derive(Default)]
struct Host {
    ledger: RefCell<Ledger>,
    frames: RefCell<Vec<Frame>>,
    source_account: Cell<Option<Address>>,
    nonce: Cell<u64>,
}

/// Handle to the host. Cloning is cheap and every clone sees the same ledger.
#[derive(Clone, Default)]
pub struct Env {
    host: Rc<Host>,
}

/// A contract implementation that can be registered with the host.
pub trait Contract: 'static {
    /// Publishes the interfaces other contracts may call on this instance.
    fn export(self: Rc<Self>, exports: &mut Exports);
}

/// Interfaces published by one contract, keyed by the trait object type.
#[derive(Default)]
pub struct Exports {
    entries: Vec<(TypeId, Rc<dyn Any>)>,
}

impl Exports {
    pub fn export<I: ?Sized + 'static>(&mut self, implementation: Rc<I>) -> &mut Self {
        self.entries
            .push((TypeId::of::<Rc<I>>(), Rc::new(implementation)));
        self
    }
}

impl Env {
    // === Registration ===

    /// Registers `contract` at a fresh address.
    pub fn register<C: Contract>(&self, contract: C) -> Address {
        let address = self.fresh_address();
        self.install(address, contract);
        address
    }

    pub fn register_at<C: Contract>(&self, address: &Address, contract: C) -> Result<(), HostError> {
        if self.is_registered(address) {
            return Err(HostError::ContractExists(*address));
        }
        self.install(*address, contract);
        Ok(())
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.with_ledger(|ledger| ledger.contracts.contains(address))
    }

    fn install<C: Contract>(&self, address: Address, contract: C) {
        let mut exports = Exports::default();
        Rc::new(contract).export(&mut exports);
        self.with_ledger_mut(|ledger| ledger.install(address, exports.entries));
        tracing::debug!(%address, contract = type_name::<C>(), "contract registered");
    }

    /// Looks up the implementation of interface `I` exported at `address`.
    pub fn interface<I: ?Sized + 'static>(&self, address: &Address) -> Result<Rc<I>, HostError> {
        self.with_ledger(|ledger| {
            let found = ledger
                .exports
                .get(&(*address, TypeId::of::<Rc<I>>()))
                .and_then(|entry| (**entry).downcast_ref::<Rc<I>>())
                .cloned();
            match found {
                Some(implementation) => Ok(implementation),
                None if ledger.contracts.contains(address) => Err(HostError::MissingInterface {
                    address: *address,
                    interface: type_name::<I>(),
                }),
                None => Err(HostError::MissingContract(*address)),
            }
        })
    }

    // === Invocation ===

    /// Runs `call` as an invocation of `function` on `contract`.
    ///
    /// The invoker seen by the callee is the calling contract, or the source
    /// account for a top-level call. Any error rolls the ledger back to where
    /// it stood before the call. Temporary storage is dropped when a top-level
    /// call completes.
    pub fn invoke_contract<T, E>(
        &self,
        contract: &Address,
        function: &'static str,
        call: impl FnOnce(&Env) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<HostError>,
    {
        let depth = self.host.frames.borrow().len();
        let invoker = match self.host.frames.borrow().last() {
            Some(frame) => frame.contract,
            None => self
                .host
                .source_account
                .get()
                .ok_or(HostError::MissingSourceAccount)?,
        };
        if depth >= MAX_CALL_DEPTH {
            return Err(HostError::CallDepthExceeded {
                depth: depth + 1,
                max: MAX_CALL_DEPTH,
            }
            .into());
        }
        if !self.is_registered(contract) {
            return Err(HostError::MissingContract(*contract).into());
        }

        let checkpoint = self.with_ledger(Ledger::checkpoint);
        self.host.frames.borrow_mut().push(Frame {
            contract: *contract,
            invoker,
        });
        let span = tracing::debug_span!("invoke", %contract, function, depth);
        let result = span.in_scope(|| call(self));
        self.host.frames.borrow_mut().pop();

        match &result {
            Ok(_) if depth == 0 => self.with_ledger_mut(Ledger::commit),
            Ok(_) => {}
            Err(_) => {
                self.with_ledger_mut(|ledger| ledger.revert_to(checkpoint));
                tracing::debug!(%contract, function, depth, "invocation failed, state rolled back");
            }
        }
        result
    }

    /// Runs `f` as if `contract` were executing, without a host invocation.
    /// Storage and events are scoped to `contract`; nothing is rolled back.
    #[cfg(any(test, feature = "testutils"))]
    pub fn as_contract<T>(&self, contract: &Address, f: impl FnOnce() -> T) -> T {
        self.host.frames.borrow_mut().push(Frame {
            contract: *contract,
            invoker: *contract,
        });
        let result = f();
        self.host.frames.borrow_mut().pop();
        result
    }

    /// Sets the account that signs top-level invocations.
    pub fn set_source_account(&self, account: &Address) {
        self.host.source_account.set(Some(*account));
    }

    pub fn source_account(&self) -> Option<Address> {
        self.host.source_account.get()
    }

    /// Number of invocations currently on the call stack.
    pub fn call_depth(&self) -> usize {
        self.host.frames.borrow().len()
    }

    // === Execution context ===

    /// Fails with [`HostError::NotExecuting`] outside of an invocation.
    pub fn current_contract_address(&self) -> Result<Address, HostError> {
        self.frame().map(|frame| frame.contract)
    }

    /// The contract or account that invoked the executing contract.
    pub fn invoker(&self) -> Result<Address, HostError> {
        self.frame().map(|frame| frame.invoker)
    }

    /// Succeeds when `address` is the direct invoker of the executing contract.
    pub fn require_auth(&self, address: &Address) -> Result<(), HostError> {
        if self.invoker()? == *address {
            Ok(())
        } else {
            Err(HostError::NotAuthorized(*address))
        }
    }

    pub fn storage(&self) -> Storage<'_> {
        Storage::new(self)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    pub fn deployer(&self) -> Deployer<'_> {
        Deployer::new(self)
    }

    // === Internals ===

    fn frame(&self) -> Result<Frame, HostError> {
        self.host
            .frames
            .borrow()
            .last()
            .cloned()
            .ok_or(HostError::NotExecuting)
    }

    pub(crate) fn fresh_address(&self) -> Address {
        loop {
            let nonce = self.host.nonce.get();
            self.host.nonce.set(nonce + 1);
            let address = Address::from_slice(&keccak256(nonce.to_be_bytes())[12..]);
            if !self.is_registered(&address) {
                return address;
            }
        }
    }

    pub(crate) fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.host.ledger.borrow())
    }

    pub(crate) fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.host.ledger.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::Address as _;
    use crate::ContractError;

    // A counter that can call itself back through a peer.
    trait Counter {
        fn bump(&self, env: &Env, times: u32) -> Result<u32, HostError>;
        fn fail_after_write(&self, env: &Env) -> Result<(), HostError>;
    }

    #[derive(Default)]
    struct CounterContract;

    impl Counter for CounterContract {
        fn bump(&self, env: &Env, times: u32) -> Result<u32, HostError> {
            let count: u32 = env.storage().instance().get(&"count")?.unwrap_or(0);
            env.storage().instance().set(&"count", &(count + 1))?;
            env.storage().temporary().set(&"seen", &true)?;
            if times > 1 {
                let this = env.current_contract_address()?;
                return bump(env, &this, times - 1);
            }
            Ok(count + 1)
        }

        fn fail_after_write(&self, env: &Env) -> Result<(), HostError> {
            env.storage().instance().set(&"count", &99u32)?;
            env.events().publish(&["failing"], &())?;
            Err(HostError::from_contract(env, 7, "boom".into()))
        }
    }

    impl Contract for CounterContract {
        fn export(self: Rc<Self>, exports: &mut Exports) {
            exports.export::<dyn Counter>(self);
        }
    }

    fn bump(env: &Env, contract: &Address, times: u32) -> Result<u32, HostError> {
        env.invoke_contract(contract, "bump", |env| {
            env.interface::<dyn Counter>(contract)?.bump(env, times)
        })
    }

    fn count(env: &Env, contract: &Address) -> Option<u32> {
        env.as_contract(contract, || env.storage().instance().get(&"count"))
            .unwrap()
    }

    fn setup() -> (Env, Address, Address) {
        let env = Env::default();
        let user = Address::generate(&env);
        env.set_source_account(&user);
        let contract = env.register(CounterContract);
        (env, user, contract)
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum TestError {
        #[error("boom")]
        Boom,
        #[error(transparent)]
        Host(#[from] HostError),
    }

    impl ContractError for TestError {
        fn from_code(code: u32) -> Option<Self> {
            (code == 7).then_some(TestError::Boom)
        }

        fn into_host_error(self, env: &Env) -> HostError {
            match self {
                TestError::Host(err) => err,
                other => HostError::from_contract(env, 7, other.to_string()),
            }
        }
    }

    // === Invocation Tests ===

    #[test]
    fn test_reentrant_calls_are_allowed() {
        let (env, _, contract) = setup();
        assert_eq!(bump(&env, &contract, 3), Ok(3));
        assert_eq!(count(&env, &contract), Some(3));
        assert_eq!(env.call_depth(), 0);
    }

    #[test]
    fn test_invoker_is_calling_contract() {
        let (env, user, contract) = setup();
        let callee = env.register(CounterContract);

        let seen = env.invoke_contract(&contract, "outer", |env| {
            assert_eq!(env.invoker(), Ok(user));
            env.invoke_contract(&callee, "inner", |env| {
                assert_eq!(env.current_contract_address(), Ok(callee));
                env.invoker()
            })
        });
        assert_eq!(seen, Ok(contract));
    }

    #[test]
    fn test_require_auth_checks_direct_invoker() {
        let (env, user, contract) = setup();
        let other = Address::generate(&env);
        let result = env.invoke_contract(&contract, "auth", |env| {
            env.require_auth(&user)?;
            env.require_auth(&other)
        });
        assert_eq!(result, Err(HostError::NotAuthorized(other)));
    }

    #[test]
    fn test_failed_call_rolls_back_state_and_events() {
        let (env, _, contract) = setup();
        bump(&env, &contract, 1).unwrap();

        let result = env.invoke_contract(&contract, "fail_after_write", |env| {
            env.interface::<dyn Counter>(&contract)?.fail_after_write(env)
        });
        assert_eq!(result.unwrap_err().code(), Some(7));
        assert_eq!(count(&env, &contract), Some(1));
        assert!(env.events().all().is_empty());
    }

    #[test]
    fn test_caller_survives_failed_nested_call() {
        let (env, _, contract) = setup();
        let callee = env.register(CounterContract);

        let result = env.invoke_contract(&contract, "outer", |env| {
            env.storage().instance().set(&"count", &5u32)?;
            let nested = env.invoke_contract(&callee, "fail_after_write", |env| {
                env.interface::<dyn Counter>(&callee)?.fail_after_write(env)
            });
            assert!(nested.is_err());
            Ok::<_, HostError>(())
        });
        assert!(result.is_ok());
        assert_eq!(count(&env, &contract), Some(5));
        assert_eq!(count(&env, &callee), None);
    }

    #[test]
    fn test_contract_error_maps_back_to_origin() {
        let (env, _, contract) = setup();
        let other = env.register(CounterContract);
        let err = env
            .invoke_contract(&other, "fail_after_write", |env| {
                env.interface::<dyn Counter>(&other)?.fail_after_write(env)
            })
            .unwrap_err();

        assert_eq!(err.contract_error::<TestError>(&other), Some(TestError::Boom));
        let seen = env.as_contract(&contract, || TestError::from_host_error(&env, err.clone()));
        assert_eq!(seen, TestError::Host(err));
    }

    #[test]
    fn test_temporary_storage_cleared_after_top_level_call() {
        let (env, _, contract) = setup();
        bump(&env, &contract, 2).unwrap();
        let seen: Option<bool> = env
            .as_contract(&contract, || env.storage().temporary().get(&"seen"))
            .unwrap();
        assert_eq!(seen, None);
    }

    #[test]
    fn test_call_depth_limit() {
        let (env, _, contract) = setup();
        let result = bump(&env, &contract, MAX_CALL_DEPTH as u32 + 1);
        assert_eq!(
            result,
            Err(HostError::CallDepthExceeded {
                depth: MAX_CALL_DEPTH + 1,
                max: MAX_CALL_DEPTH
            })
        );
        assert_eq!(count(&env, &contract), None);
    }

    #[test]
    fn test_missing_source_account() {
        let env = Env::default();
        let contract = env.register(CounterContract);
        assert_eq!(bump(&env, &contract, 1), Err(HostError::MissingSourceAccount));
    }

    #[test]
    fn test_missing_contract_and_interface() {
        let (env, _, contract) = setup();
        let nobody = Address::generate(&env);
        assert_eq!(bump(&env, &nobody, 1), Err(HostError::MissingContract(nobody)));
        assert!(matches!(
            env.interface::<dyn std::fmt::Debug>(&contract),
            Err(HostError::MissingInterface { .. })
        ));
    }

    // === Deployment Tests ===

    #[test]
    fn test_deploy_is_deterministic() {
        let (env, _, contract) = setup();
        let code_hash = env.deployer().upload_contract::<CounterContract>();
        let salt = B256::repeat_byte(1);

        let deployed = env
            .as_contract(&contract, || {
                env.deployer().with_current_contract(salt)?.deploy(&code_hash)
            })
            .unwrap();
        assert_eq!(
            deployed,
            crate::create2_address(&contract, &salt, &code_hash)
        );
        assert_eq!(bump(&env, &deployed, 1), Ok(1));

        let again = env.as_contract(&contract, || {
            env.deployer().with_current_contract(salt)?.deploy(&code_hash)
        });
        assert_eq!(again, Err(HostError::ContractExists(deployed)));
    }

    #[test]
    fn test_deploy_unknown_code() {
        let (env, _, contract) = setup();
        let result = env.as_contract(&contract, || {
            env.deployer()
                .with_current_contract(B256::ZERO)?
                .deploy(&B256::ZERO)
        });
        assert_eq!(result, Err(HostError::UnknownCode(B256::ZERO)));
    }

    #[test]
    fn test_deploy_for_another_deployer_requires_its_auth() {
        let (env, _, contract) = setup();
        let intruder = env.register(CounterContract);
        let code_hash = env.deployer().upload_contract::<CounterContract>();
        let salt = B256::repeat_byte(2);
        let target = crate::create2_address(&contract, &salt, &code_hash);

        let squatted = env.invoke_contract(&intruder, "squat", |env| {
            env.deployer().with_address(contract, salt).deploy(&code_hash)
        });
        assert_eq!(squatted, Err(HostError::NotAuthorized(contract)));
        assert!(!env.is_registered(&target));

        // Outside any invocation nobody can vouch for the deployer
        let outside = env.deployer().with_address(contract, salt).deploy(&code_hash);
        assert_eq!(outside, Err(HostError::NotExecuting));
    }

    #[test]
    fn test_deploy_authorized_by_invoking_deployer() {
        let (env, user, contract) = setup();
        let code_hash = env.deployer().upload_contract::<CounterContract>();
        let salt = B256::repeat_byte(3);

        let deployed = env
            .invoke_contract(&contract, "deploy_for_user", |env| {
                env.deployer().with_address(user, salt).deploy(&code_hash)
            })
            .unwrap();
        assert_eq!(deployed, crate::create2_address(&user, &salt, &code_hash));
    }

    // === Journal Tests ===

    #[test]
    fn test_failed_call_undoes_removals_and_deployments() {
        let (env, _, contract) = setup();
        bump(&env, &contract, 1).unwrap();
        let code_hash = env.deployer().upload_contract::<CounterContract>();
        let salt = B256::repeat_byte(4);

        let result = env.invoke_contract(&contract, "churn", |env| {
            env.storage().instance().remove(&"count")?;
            env.storage().persistent().set(&"fresh", &1u32)?;
            env.deployer().with_current_contract(salt)?.deploy(&code_hash)?;
            Err::<(), _>(HostError::from_contract(env, 7, "boom".into()))
        });
        assert_eq!(result.unwrap_err().code(), Some(7));

        assert_eq!(count(&env, &contract), Some(1));
        let fresh: Option<u32> = env
            .as_contract(&contract, || env.storage().persistent().get(&"fresh"))
            .unwrap();
        assert_eq!(fresh, None);
        assert!(!env.is_registered(&crate::create2_address(&contract, &salt, &code_hash)));
    }

    #[test]
    fn test_nested_failure_keeps_earlier_writes_of_caller() {
        let (env, _, contract) = setup();
        let callee = env.register(CounterContract);

        env.invoke_contract(&contract, "outer", |env| {
            env.events().publish(&["before"], &())?;
            let nested = env.invoke_contract(&callee, "fail_after_write", |env| {
                env.interface::<dyn Counter>(&callee)?.fail_after_write(env)
            });
            assert!(nested.is_err());
            env.events().publish(&["after"], &())
        })
        .unwrap();

        let topics: Vec<_> = env.events().all().into_iter().flat_map(|event| event.topics).collect();
        assert_eq!(topics, vec!["before".to_string(), "after".to_string()]);
    }

    // === Execution Context Tests ===

    #[test]
    fn test_context_outside_invocation_is_an_error() {
        let (env, user, _) = setup();
        assert_eq!(env.current_contract_address(), Err(HostError::NotExecuting));
        assert_eq!(env.invoker(), Err(HostError::NotExecuting));
        assert_eq!(env.require_auth(&user), Err(HostError::NotExecuting));
        assert_eq!(
            env.storage().instance().get::<_, u32>(&"count"),
            Err(HostError::NotExecuting)
        );
        assert_eq!(env.events().publish(&["orphan"], &()), Err(HostError::NotExecuting));
        assert_eq!(
            HostError::from_contract(&env, 7, "boom".into()),
            HostError::NotExecuting
        );
    }
}
