//! Interchain Security Module used for testing.

use parking_lot::RwLock;

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmResult,
    ModuleType, H256,
};

const ISM_TYPE: ModuleType = ModuleType::Unused;

/// Accepts or declines every message, ignoring metadata.
#[derive(Debug)]
pub struct TestIsm {
    address: H256,
    /// Whether messages should be accepted / verified.
    accept: RwLock<bool>,
}

impl TestIsm {
    pub fn new(address: H256, accept: bool) -> Self {
        Self {
            address,
            accept: RwLock::new(accept),
        }
    }

    /// Sets whether messages should be accepted / verified.
    pub fn set_accept(&self, accept: bool) {
        *self.accept.write() = accept;
    }

    pub fn accept(&self) -> bool {
        *self.accept.read()
    }
}

impl HyperlaneContract for TestIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl InterchainSecurityModule for TestIsm {
    fn module_type(&self) -> ModuleType {
        ISM_TYPE
    }

    fn verify(&self, _: &CallContext, _: &[u8], _: &HyperlaneMessage) -> IsmResult<bool> {
        Ok(self.accept())
    }
}
