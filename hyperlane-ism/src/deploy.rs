use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::{info, instrument};

use hyperlane_core::{CallContext, HyperlaneContract, IsmError, IsmResult, Mailbox, H256};

use crate::aggregation::StaticAggregationIsmFactory;
use crate::config::{IsmConfig, RateLimitConfig, RoutingConfig};
use crate::pausable::PausableIsm;
use crate::routing::{DomainRoutingIsm, WarpRateLimitingIsm};
use crate::test_ism::TestIsm;
use crate::timelock::TimelockRouter;
use crate::trusted_relayer::TrustedRelayerIsm;
use crate::{AccessControl, IsmRegistry, RegistryHandle};

/// Deploys [`IsmConfig`] trees into a registry.
///
/// Members are deployed before the modules that refer to them. Owned
/// modules are configured by the deployer and then handed to their
/// configured owner.
pub struct IsmDeployer {
    registry: IsmRegistry,
    deployer: H256,
    factory: StaticAggregationIsmFactory,
    mailbox: Arc<dyn Mailbox>,
}

impl IsmDeployer {
    /// A deployer acting as `deployer`. Its aggregation factory is
    /// deployed at the deployer's next address.
    pub fn new(registry: IsmRegistry, deployer: H256, mailbox: Arc<dyn Mailbox>) -> Self {
        let factory =
            StaticAggregationIsmFactory::new(registry.next_address(deployer), registry.clone());
        Self {
            registry,
            deployer,
            factory,
            mailbox,
        }
    }

    pub fn factory(&self) -> &StaticAggregationIsmFactory {
        &self.factory
    }

    pub fn registry(&self) -> &IsmRegistry {
        &self.registry
    }

    fn as_deployer(&self) -> CallContext {
        CallContext::new(self.deployer, 0)
    }

    /// Deploy `config` and return the address of its root module.
    #[instrument(skip_all, fields(deployer = ?self.deployer))]
    pub fn deploy(&self, config: &IsmConfig) -> IsmResult<H256> {
        let address = self.deploy_config(config)?;
        info!(?address, "Module tree deployed");
        Ok(address)
    }

    fn deploy_config(&self, config: &IsmConfig) -> IsmResult<H256> {
        match config {
            IsmConfig::Address { address } => {
                if !self.registry.is_deployed(*address) {
                    return Err(IsmError::NotContract(*address));
                }
                Ok(*address)
            }
            IsmConfig::TestIsm { accept } => {
                let address = self.registry.next_address(self.deployer);
                self.registry.deploy(TestIsm::new(address, *accept))?;
                Ok(address)
            }
            IsmConfig::TrustedRelayer { relayer } => {
                let address = self.registry.next_address(self.deployer);
                self.registry.deploy(TrustedRelayerIsm::new(
                    address,
                    self.mailbox.clone(),
                    *relayer,
                ))?;
                Ok(address)
            }
            IsmConfig::Pausable { owner, paused } => {
                let address = self.registry.next_address(self.deployer);
                let ism = self
                    .registry
                    .deploy(PausableIsm::new(address, self.deployer))?;
                if *paused {
                    ism.pause(&self.as_deployer())?;
                }
                self.hand_over(ism.as_ref(), *owner)?;
                Ok(address)
            }
            IsmConfig::DomainRouting(routing) => self.deploy_routing(routing, DomainRoutingIsm::new),
            IsmConfig::IncrementalDomainRouting(routing) => {
                self.deploy_routing(routing, DomainRoutingIsm::incremental)
            }
            IsmConfig::DefaultFallbackRouting(routing) => {
                let mailbox = self.mailbox.clone();
                self.deploy_routing(routing, move |address, owner, registry| {
                    DomainRoutingIsm::default_fallback(address, owner, registry, mailbox)
                })
            }
            IsmConfig::RateLimitedRouting(config) => {
                let ism = WarpRateLimitingIsm::new(
                    self.routing(&config.routing, DomainRoutingIsm::new)?,
                );
                for RateLimitConfig {
                    origin,
                    max_capacity,
                } in config.limits.iter()
                {
                    ism.set_rate_limit(&self.as_deployer(), *origin, *max_capacity)?;
                }
                let ism = self.registry.deploy(ism)?;
                self.hand_over(ism.as_ref(), config.routing.owner)?;
                Ok(ism.address())
            }
            IsmConfig::Aggregation { modules, threshold } => {
                let members = modules
                    .iter()
                    .map(|module| self.deploy_config(module))
                    .collect::<IsmResult<Vec<_>>>()?;
                self.factory.deploy(&members, *threshold)
            }
            IsmConfig::Timelock {
                owner,
                window,
                routers,
            } => {
                let address = self.registry.next_address(self.deployer);
                let ism = self.registry.deploy(TimelockRouter::new(
                    address,
                    self.mailbox.clone(),
                    self.deployer,
                    *window,
                ))?;
                if !routers.is_empty() {
                    ism.enroll_remote_routers(&self.as_deployer(), routers.clone())?;
                }
                self.hand_over(ism.as_ref(), *owner)?;
                Ok(address)
            }
        }
    }

    fn deploy_routing<F>(&self, config: &RoutingConfig, build: F) -> IsmResult<H256>
    where
        F: FnOnce(H256, H256, RegistryHandle) -> DomainRoutingIsm,
    {
        let ism = self.registry.deploy(self.routing(config, build)?)?;
        self.hand_over(ism.as_ref(), config.owner)?;
        Ok(ism.address())
    }

    /// A routing module over freshly deployed routes, still owned by the
    /// deployer.
    fn routing<F>(&self, config: &RoutingConfig, build: F) -> IsmResult<DomainRoutingIsm>
    where
        F: FnOnce(H256, H256, RegistryHandle) -> DomainRoutingIsm,
    {
        let routes = config
            .domains
            .iter()
            .map(|route| Ok((route.domain, self.deploy_config(&route.ism)?)))
            .collect::<IsmResult<Vec<_>>>()?;
        let address = self.registry.next_address(self.deployer);
        let ism = build(address, self.deployer, self.registry.handle());
        if !routes.is_empty() {
            ism.set_many(&self.as_deployer(), &routes)?;
        }
        Ok(ism)
    }

    fn hand_over(&self, ism: &impl AccessControl, owner: H256) -> IsmResult<()> {
        if owner != self.deployer {
            ism.transfer_ownership(&self.as_deployer(), owner)?;
        }
        Ok(())
    }
}

impl Debug for IsmDeployer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsmDeployer")
            .field("deployer", &self.deployer)
            .field("factory", &self.factory.address())
            .finish_non_exhaustive()
    }
}
