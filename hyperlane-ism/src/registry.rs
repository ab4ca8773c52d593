use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use hyperlane_core::utils::keccak256_concat;
use hyperlane_core::{InterchainSecurityModule, IsmError, IsmResult, H256};

#[derive(Debug, Default)]
struct RegistryState {
    modules: HashMap<H256, Arc<dyn InterchainSecurityModule>>,
    nonces: HashMap<H256, u64>,
}

/// Every deployed module, by address. Stands in for chain state when one
/// module refers to another by address.
#[derive(Debug, Clone, Default)]
pub struct IsmRegistry {
    state: Arc<RwLock<RegistryState>>,
}

/// A non-owning view of an [`IsmRegistry`], held by composite modules so
/// that module trees do not keep the registry alive.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    state: Weak<RwLock<RegistryState>>,
}

impl IsmRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The next CREATE-style address for a deployment by `deployer`.
    /// Advances the deployer's nonce.
    pub fn next_address(&self, deployer: H256) -> H256 {
        let mut state = self.state.write();
        let nonce = state.nonces.entry(deployer).or_default();
        let address = create_address(deployer, *nonce);
        *nonce += 1;
        address
    }

    /// Deploy `ism` at its own address and hand back a typed reference.
    pub fn deploy<I>(&self, ism: I) -> IsmResult<Arc<I>>
    where
        I: InterchainSecurityModule + 'static,
    {
        let ism = Arc::new(ism);
        self.register(ism.clone())?;
        Ok(ism)
    }

    /// Make an existing module reachable at its address.
    pub fn register(&self, ism: Arc<dyn InterchainSecurityModule>) -> IsmResult<H256> {
        let address = ism.address();
        let mut state = self.state.write();
        if state.modules.contains_key(&address) {
            return Err(IsmError::AlreadyDeployed(address));
        }
        debug!(?address, module_type = %ism.module_type(), "Module deployed");
        state.modules.insert(address, ism);
        Ok(address)
    }

    /// The module at `address`
    pub fn get(&self, address: H256) -> IsmResult<Arc<dyn InterchainSecurityModule>> {
        lookup(&self.state.read(), address)
    }

    /// Whether anything is deployed at `address`
    pub fn is_deployed(&self, address: H256) -> bool {
        self.state.read().modules.contains_key(&address)
    }

    /// A weak handle for composite modules
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle {
            state: Arc::downgrade(&self.state),
        }
    }
}

impl RegistryHandle {
    /// The module at `address`. The returned reference is detached from the
    /// registry lock, so it is safe to call into it.
    pub fn get(&self, address: H256) -> IsmResult<Arc<dyn InterchainSecurityModule>> {
        let state = self
            .state
            .upgrade()
            .ok_or(IsmError::NotContract(address))?;
        let guard = state.read();
        lookup(&guard, address)
    }

    /// Whether anything is deployed at `address`
    pub fn is_deployed(&self, address: H256) -> bool {
        self.state
            .upgrade()
            .map(|state| state.read().modules.contains_key(&address))
            .unwrap_or(false)
    }
}

fn lookup(state: &RegistryState, address: H256) -> IsmResult<Arc<dyn InterchainSecurityModule>> {
    state
        .modules
        .get(&address)
        .cloned()
        .ok_or(IsmError::NotContract(address))
}

/// Address of the `nonce`th deployment by `deployer`.
pub fn create_address(deployer: H256, nonce: u64) -> H256 {
    let hash = keccak256_concat(&[deployer.as_bytes(), &nonce.to_be_bytes()[..]]);
    truncate_to_address(hash)
}

/// CREATE2 address: `keccak256(0xff ++ factory ++ salt ++ init_code_hash)`,
/// truncated to 20 bytes.
pub fn create2_address(factory: H256, salt: H256, init_code_hash: H256) -> H256 {
    let hash = keccak256_concat(&[
        &[0xffu8][..],
        &factory.as_bytes()[12..],
        salt.as_bytes(),
        init_code_hash.as_bytes(),
    ]);
    truncate_to_address(hash)
}

fn truncate_to_address(hash: H256) -> H256 {
    let mut address = H256::zero();
    address.as_mut()[12..].copy_from_slice(&hash.as_bytes()[12..]);
    address
}

#[cfg(test)]
mod test {
    use hyperlane_core::{CallContext, HyperlaneContract, HyperlaneMessage};

    use super::*;
    use crate::test_ism::TestIsm;

    #[test]
    fn addresses_advance_with_nonce() {
        let registry = IsmRegistry::new();
        let deployer = H256::repeat_byte(7);
        let first = registry.next_address(deployer);
        let second = registry.next_address(deployer);
        assert_ne!(first, second);
        assert_eq!(first, create_address(deployer, 0));
        assert_eq!(&first.as_bytes()[..12], &[0u8; 12]);
    }

    #[test]
    fn create2_is_deterministic() {
        let factory = H256::repeat_byte(1);
        let salt = H256::repeat_byte(2);
        let code = H256::repeat_byte(3);
        assert_eq!(
            create2_address(factory, salt, code),
            create2_address(factory, salt, code)
        );
        assert_ne!(
            create2_address(factory, salt, code),
            create2_address(factory, H256::repeat_byte(4), code)
        );
    }

    #[test]
    fn lookups_and_double_deploys() {
        let registry = IsmRegistry::new();
        let address = registry.next_address(H256::zero());
        let ism = registry.deploy(TestIsm::new(address, true)).unwrap();
        assert!(registry.is_deployed(address));
        assert_eq!(
            registry.deploy(TestIsm::new(address, true)).unwrap_err(),
            IsmError::AlreadyDeployed(address)
        );

        let handle = registry.handle();
        let resolved = handle.get(address).unwrap();
        let verified = resolved
            .verify(&CallContext::default(), &[], &HyperlaneMessage::default())
            .unwrap();
        assert!(verified);
        assert_eq!(resolved.address(), ism.address());
        assert_eq!(
            handle.get(H256::repeat_byte(9)).unwrap_err(),
            IsmError::NotContract(H256::repeat_byte(9))
        );
    }

    #[test]
    fn handle_outliving_registry_sees_nothing() {
        let registry = IsmRegistry::new();
        let handle = registry.handle();
        drop(registry);
        assert!(!handle.is_deployed(H256::zero()));
    }
}
