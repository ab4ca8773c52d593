use std::sync::Arc;

use ethers_core::abi::{self, Token};
use tracing::{debug, info, instrument};

use hyperlane_core::utils::keccak256;
use hyperlane_core::{IsmError, IsmResult, H256};

use super::ism::normalize_modules;
use super::StaticAggregationIsm;
use crate::abi::{address_token, small_uint_token};
use crate::{create2_address, IsmRegistry};

/// Stand-in for the init code hash of aggregation deployments
fn init_code_hash() -> H256 {
    keccak256(b"StaticAggregationIsm")
}

/// Deploys [`StaticAggregationIsm`]s at addresses derived from their
/// configuration, so the same member set and threshold always lands at the
/// same address.
#[derive(Debug, Clone)]
pub struct StaticAggregationIsmFactory {
    address: H256,
    registry: IsmRegistry,
}

impl StaticAggregationIsmFactory {
    pub fn new(address: H256, registry: IsmRegistry) -> Self {
        Self { address, registry }
    }

    pub fn address(&self) -> H256 {
        self.address
    }

    /// Where an aggregation of `modules` with `threshold` is or would be
    /// deployed. Member order does not matter.
    pub fn get_address(&self, modules: &[H256], threshold: u8) -> IsmResult<H256> {
        let modules = normalize_modules(modules, threshold)?;
        Ok(self.address_of(&modules, threshold))
    }

    fn address_of(&self, sorted: &[H256], threshold: u8) -> H256 {
        let encoded = abi::encode(&[
            Token::Array(sorted.iter().copied().map(address_token).collect()),
            small_uint_token(threshold as u64),
        ]);
        create2_address(self.address, keccak256(encoded), init_code_hash())
    }

    /// Deploy an aggregation, or return the existing one for the same
    /// configuration. Every member must already be deployed.
    #[instrument(skip_all, fields(factory = ?self.address, threshold = threshold as u64))]
    pub fn deploy(&self, modules: &[H256], threshold: u8) -> IsmResult<H256> {
        let modules = normalize_modules(modules, threshold)?;
        if let Some(missing) = modules.iter().find(|m| !self.registry.is_deployed(**m)) {
            return Err(IsmError::NotContract(*missing));
        }
        let address = self.address_of(&modules, threshold);
        if self.registry.is_deployed(address) {
            debug!(?address, "Aggregation already deployed");
            return Ok(address);
        }
        let ism = StaticAggregationIsm::new(address, modules, threshold, self.registry.handle())?;
        match self.registry.register(Arc::new(ism)) {
            Ok(_) => {
                info!(?address, "Aggregation deployed");
                Ok(address)
            }
            // lost a race with an identical deployment
            Err(IsmError::AlreadyDeployed(_)) => Ok(address),
            Err(err) => Err(err),
        }
    }
}
