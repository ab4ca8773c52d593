use parking_lot::RwLock;
use tracing::info;

use hyperlane_core::{CallContext, IsmError, IsmResult, H256};

/// Single owner role.
#[derive(Debug)]
pub struct Ownable {
    owner: RwLock<H256>,
}

impl Ownable {
    /// Owned by `owner`
    pub fn new(owner: H256) -> Self {
        Self {
            owner: RwLock::new(owner),
        }
    }

    /// Current owner
    pub fn owner(&self) -> H256 {
        *self.owner.read()
    }

    /// Errors unless `caller` is the owner
    pub fn ensure_owner(&self, caller: H256) -> IsmResult<()> {
        if caller != self.owner() {
            return Err(IsmError::NotOwner(caller));
        }
        Ok(())
    }

    /// Hand the role to `new_owner`. Owner only.
    pub fn transfer_ownership(&self, ctx: &CallContext, new_owner: H256) -> IsmResult<()> {
        let mut owner = self.owner.write();
        if ctx.caller != *owner {
            return Err(IsmError::NotOwner(ctx.caller));
        }
        info!(previous_owner = ?*owner, ?new_owner, "Ownership transferred");
        *owner = new_owner;
        Ok(())
    }
}

/// Modules with an owner gated configuration surface.
pub trait AccessControl {
    /// The owner role of this module
    fn ownable(&self) -> &Ownable;

    /// Current owner
    fn owner(&self) -> H256 {
        self.ownable().owner()
    }

    /// Errors unless the call comes from the owner
    fn ensure_owner(&self, ctx: &CallContext) -> IsmResult<()> {
        self.ownable().ensure_owner(ctx.caller)
    }

    /// Hand the owner role to someone else
    fn transfer_ownership(&self, ctx: &CallContext, new_owner: H256) -> IsmResult<()> {
        self.ownable().transfer_ownership(ctx, new_owner)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_owner_can_transfer() {
        let owner = H256::repeat_byte(1);
        let other = H256::repeat_byte(2);
        let ownable = Ownable::new(owner);

        assert_eq!(
            ownable.transfer_ownership(&CallContext::new(other, 0), other),
            Err(IsmError::NotOwner(other))
        );
        ownable
            .transfer_ownership(&CallContext::new(owner, 0), other)
            .unwrap();
        assert_eq!(ownable.owner(), other);
        assert!(ownable.ensure_owner(owner).is_err());
        assert!(ownable.ensure_owner(other).is_ok());
    }
}
