use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmError,
    IsmResult, ModuleType, H256,
};

use crate::{AccessControl, Ownable};

/// Accepts every message unless the owner has paused it. Used as the
/// circuit breaker in optimistic compositions.
#[derive(Debug)]
pub struct PausableIsm {
    address: H256,
    ownable: Ownable,
    paused: AtomicBool,
}

impl PausableIsm {
    pub fn new(address: H256, owner: H256) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            paused: AtomicBool::new(false),
        }
    }

    /// Halt verification. Owner only.
    pub fn pause(&self, ctx: &CallContext) -> IsmResult<()> {
        self.set_paused(ctx, true)
    }

    /// Resume verification. Owner only.
    pub fn unpause(&self, ctx: &CallContext) -> IsmResult<()> {
        self.set_paused(ctx, false)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn set_paused(&self, ctx: &CallContext, paused: bool) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        self.paused.store(paused, Ordering::Release);
        info!(ism = ?self.address, paused, "Pause state changed");
        Ok(())
    }
}

impl AccessControl for PausableIsm {
    fn ownable(&self) -> &Ownable {
        &self.ownable
    }
}

impl HyperlaneContract for PausableIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl InterchainSecurityModule for PausableIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::Null
    }

    fn verify(&self, _: &CallContext, _: &[u8], _: &HyperlaneMessage) -> IsmResult<bool> {
        if self.is_paused() {
            return Err(IsmError::Paused);
        }
        Ok(true)
    }
}
