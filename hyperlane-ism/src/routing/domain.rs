use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmError,
    IsmResult, Mailbox, ModuleType, RoutingIsm, H256,
};

use super::{RoutingPolicy, RoutingTable};
use crate::{AccessControl, Ownable, RegistryHandle};

/// Routes each message to the module configured for its origin domain.
///
/// Three flavours share this type: the plain owner managed table, the
/// append-only incremental table and the fallback table which defers to the
/// mailbox default module for unknown origins.
pub struct DomainRoutingIsm {
    address: H256,
    ownable: Ownable,
    table: RoutingTable,
    registry: RegistryHandle,
    fallback: Option<Arc<dyn Mailbox>>,
}

impl DomainRoutingIsm {
    /// Owner managed table without fallback
    pub fn new(address: H256, owner: H256, registry: RegistryHandle) -> Self {
        Self::with_policy(address, owner, registry, RoutingPolicy::Mutable, None)
    }

    /// Append-only table
    pub fn incremental(address: H256, owner: H256, registry: RegistryHandle) -> Self {
        Self::with_policy(address, owner, registry, RoutingPolicy::Incremental, None)
    }

    /// Owner managed table that falls back to `mailbox.default_ism()`
    pub fn default_fallback(
        address: H256,
        owner: H256,
        registry: RegistryHandle,
        mailbox: Arc<dyn Mailbox>,
    ) -> Self {
        Self::with_policy(address, owner, registry, RoutingPolicy::Mutable, Some(mailbox))
    }

    fn with_policy(
        address: H256,
        owner: H256,
        registry: RegistryHandle,
        policy: RoutingPolicy,
        fallback: Option<Arc<dyn Mailbox>>,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            table: RoutingTable::new(policy),
            registry,
            fallback,
        }
    }

    /// Route messages from `domain` to `module`. Owner only; `module` must be
    /// deployed.
    pub fn set(&self, ctx: &CallContext, domain: u32, module: H256) -> IsmResult<()> {
        self.set_many(ctx, &[(domain, module)])
    }

    /// Bulk [`set`](Self::set). Nothing is written if any entry is invalid.
    pub fn set_many(&self, ctx: &CallContext, entries: &[(u32, H256)]) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        if let Some((_, missing)) = entries
            .iter()
            .find(|(_, module)| !self.registry.is_deployed(*module))
        {
            return Err(IsmError::NotContract(*missing));
        }
        self.table.set_many(entries)?;
        for (domain, module) in entries {
            info!(ism = ?self.address, domain, ?module, "Route set");
        }
        Ok(())
    }

    /// Forget the route for `domain`. Owner only.
    pub fn remove(&self, ctx: &CallContext, domain: u32) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        let module = self.table.remove(domain)?;
        info!(ism = ?self.address, domain, ?module, "Route removed");
        Ok(())
    }

    /// The module verifying messages from `domain`
    pub fn module(&self, domain: u32) -> IsmResult<H256> {
        if let Some(module) = self.table.get(domain) {
            return Ok(module);
        }
        match &self.fallback {
            Some(mailbox) => Ok(mailbox.default_ism()),
            None => Err(IsmError::NoRouteForOrigin(domain)),
        }
    }

    /// Domains with an explicit route
    pub fn domains(&self) -> Vec<u32> {
        self.table.domains()
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.table.policy()
    }
}

impl Debug for DomainRoutingIsm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainRoutingIsm")
            .field("address", &self.address)
            .field("policy", &self.table.policy())
            .field("domains", &self.table.domains())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl AccessControl for DomainRoutingIsm {
    fn ownable(&self) -> &Ownable {
        &self.ownable
    }
}

impl HyperlaneContract for DomainRoutingIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl RoutingIsm for DomainRoutingIsm {
    fn route(&self, message: &HyperlaneMessage) -> IsmResult<H256> {
        self.module(message.origin)
    }
}

impl InterchainSecurityModule for DomainRoutingIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::Routing
    }

    #[instrument(skip_all, fields(ism = ?self.address, origin = message.origin))]
    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        let module = self.route(message)?;
        let ism = self.registry.get(module)?;
        if ism.verify(ctx, metadata, message)? {
            Ok(true)
        } else {
            warn!(?module, "Routed module rejected message");
            Err(IsmError::VerifyRejected(module))
        }
    }
}
