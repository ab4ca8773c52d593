use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ethers_core::abi::{self, ParamType, Token};

use hyperlane_core::{CallContext, HyperlaneContract, IsmError, IsmResult, ModuleType, H256, U256};

use super::PolygonZkEvmIsm;
use crate::abi::{address_token, bytes32_token, small_uint_token, uint_token, TokenReader};
use crate::message_id::{
    decode_message_id_attestation, Attestation, MessageIdBridge, RelayedCall,
};

/// Depth of the zkEVM bridge's sparse merkle tree
pub const SMT_DEPTH: usize = 32;

/// The Polygon zkEVM bridge.
#[cfg_attr(test, mockall::automock)]
pub trait ZkEvmBridge: Send + Sync {
    /// Address of the bridge
    fn address(&self) -> H256;

    /// Verify the claim against the exit roots and deliver it
    fn claim_message(&self, claim: &ClaimMessage) -> IsmResult<()>;
}

/// Arguments of `PolygonZkEVMBridge.claimMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimMessage {
    pub smt_proof: Vec<H256>,
    pub index: u32,
    pub mainnet_exit_root: H256,
    pub rollup_exit_root: H256,
    pub origin_network: u32,
    pub origin_address: H256,
    pub destination_network: u32,
    pub destination_address: H256,
    pub amount: U256,
    /// `abi.encode(messageId)`
    pub metadata: Vec<u8>,
}

fn claim_types() -> Vec<ParamType> {
    vec![
        ParamType::FixedArray(Box::new(ParamType::FixedBytes(32)), SMT_DEPTH),
        ParamType::Uint(32),
        ParamType::FixedBytes(32),
        ParamType::FixedBytes(32),
        ParamType::Uint(32),
        ParamType::Address,
        ParamType::Uint(32),
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Bytes,
    ]
}

/// Metadata for the inline path: the `claimMessage` arguments, ABI encoded.
pub fn encode_claim_metadata(claim: &ClaimMessage) -> Vec<u8> {
    abi::encode(&[
        Token::FixedArray(claim.smt_proof.iter().copied().map(bytes32_token).collect()),
        small_uint_token(claim.index.into()),
        bytes32_token(claim.mainnet_exit_root),
        bytes32_token(claim.rollup_exit_root),
        small_uint_token(claim.origin_network.into()),
        address_token(claim.origin_address),
        small_uint_token(claim.destination_network.into()),
        address_token(claim.destination_address),
        uint_token(claim.amount),
        Token::Bytes(claim.metadata.clone()),
    ])
}

/// Inverse of [`encode_claim_metadata`]
pub fn decode_claim_metadata(metadata: &[u8]) -> IsmResult<ClaimMessage> {
    let mut args = TokenReader::decode("zkevm claim", &claim_types(), metadata)?;
    Ok(ClaimMessage {
        smt_proof: args.bytes32_array()?,
        index: args.u32()?,
        mainnet_exit_root: args.bytes32()?,
        rollup_exit_root: args.bytes32()?,
        origin_network: args.u32()?,
        origin_address: args.address()?,
        destination_network: args.u32()?,
        destination_address: args.address()?,
        amount: args.uint()?,
        metadata: args.bytes()?,
    })
}

/// zkEVM bridge messages from one origin network. Claims are assembled
/// off-chain, so modules on this bridge report `CcipRead`.
pub struct PolygonZkEvmBridge {
    bridge: Arc<dyn ZkEvmBridge>,
    origin_network: u32,
}

impl PolygonZkEvmBridge {
    pub fn new(bridge: Arc<dyn ZkEvmBridge>, origin_network: u32) -> Self {
        Self {
            bridge,
            origin_network,
        }
    }

    fn ensure_origin_network(&self, network: u32) -> IsmResult<()> {
        if network != self.origin_network {
            return Err(IsmError::WrongSourceChain {
                expected: self.origin_network.into(),
                actual: network.into(),
            });
        }
        Ok(())
    }
}

impl Debug for PolygonZkEvmBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonZkEvmBridge")
            .field("origin_network", &self.origin_network)
            .finish_non_exhaustive()
    }
}

impl MessageIdBridge for PolygonZkEvmBridge {
    fn module_type(&self) -> ModuleType {
        ModuleType::CcipRead
    }

    fn inline_call(&self, metadata: &[u8]) -> IsmResult<Option<RelayedCall>> {
        if metadata.is_empty() {
            return Ok(None);
        }
        let claim = decode_claim_metadata(metadata)?;
        self.ensure_origin_network(claim.origin_network)?;
        Ok(Some(RelayedCall {
            sender: claim.origin_address,
            target: claim.destination_address,
            value: claim.amount,
            data: claim.metadata,
        }))
    }

    fn finalize_inline(&self, metadata: &[u8]) -> IsmResult<()> {
        self.bridge.claim_message(&decode_claim_metadata(metadata)?)
    }

    fn decode_attestation(&self, call: &RelayedCall) -> IsmResult<Attestation> {
        decode_message_id_attestation(call)
    }
}

impl PolygonZkEvmIsm {
    /// Bridge callback for a claimed message. The bridged amount arrives as
    /// call value.
    pub fn on_message_received(
        &self,
        ctx: &CallContext,
        origin_address: H256,
        origin_network: u32,
        data: &[u8],
    ) -> IsmResult<()> {
        self.ensure_caller(ctx, self.bridge().bridge.address())?;
        self.bridge().ensure_origin_network(origin_network)?;
        self.accept_relayed_call(&RelayedCall {
            sender: origin_address,
            target: self.address(),
            value: ctx.value,
            data: data.to_vec(),
        })?;
        Ok(())
    }
}
