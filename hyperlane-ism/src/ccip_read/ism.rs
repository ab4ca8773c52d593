use ethers_core::abi::Token;
use parking_lot::RwLock;
use tracing::{info, instrument};

use hyperlane_core::{
    CallContext, CcipReadIsm, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule,
    IsmResult, ModuleType, OffchainLookup, RawHyperlaneMessage, H256,
};

use crate::abi::{encode_call, selector};
use crate::{AccessControl, Ownable, RegistryHandle};

/// Gateway call the relayer resolves
pub const GET_PROOF_SIGNATURE: &str = "getProof(bytes)";
/// Callback the resolved proof is delivered through
pub const PROCESS_SIGNATURE: &str = "process(bytes,bytes)";

/// A module whose metadata is served by off-chain gateways.
///
/// Relayers learn where to fetch the metadata from
/// [`get_offchain_verify_info`](CcipReadIsm::get_offchain_verify_info).
/// The fetched metadata is checked by the `verifier` module.
#[derive(Debug)]
pub struct OffchainLookupIsm {
    address: H256,
    ownable: Ownable,
    urls: RwLock<Vec<String>>,
    verifier: H256,
    registry: RegistryHandle,
}

impl OffchainLookupIsm {
    pub fn new(
        address: H256,
        owner: H256,
        urls: Vec<String>,
        verifier: H256,
        registry: RegistryHandle,
    ) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            urls: RwLock::new(urls),
            verifier,
            registry,
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.read().clone()
    }

    /// Replace the gateway URLs. Owner only.
    pub fn set_urls(&self, ctx: &CallContext, urls: Vec<String>) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        info!(ism = ?self.address, ?urls, "Offchain urls set");
        *self.urls.write() = urls;
        Ok(())
    }

    pub fn verifier(&self) -> H256 {
        self.verifier
    }
}

impl AccessControl for OffchainLookupIsm {
    fn ownable(&self) -> &Ownable {
        &self.ownable
    }
}

impl HyperlaneContract for OffchainLookupIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl CcipReadIsm for OffchainLookupIsm {
    fn get_offchain_verify_info(&self, message: &HyperlaneMessage) -> IsmResult<OffchainLookup> {
        let raw = RawHyperlaneMessage::from(message);
        Ok(OffchainLookup::new(
            self.address,
            self.urls(),
            encode_call(GET_PROOF_SIGNATURE, &[Token::Bytes(raw.clone())]),
            selector(PROCESS_SIGNATURE),
            raw,
        ))
    }
}

impl InterchainSecurityModule for OffchainLookupIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::CcipRead
    }

    #[instrument(skip_all, fields(ism = ?self.address, verifier = ?self.verifier))]
    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        self.registry.get(self.verifier)?.verify(ctx, metadata, message)
    }
}
