use hyperlane_core::{CallContext, HyperlaneContract, IsmError, IsmResult, H256, U256};

use super::CcipIsm;
use crate::abi::decode_address;
use crate::message_id::{decode_message_id_attestation, Attestation, MessageIdBridge, RelayedCall};

/// `Client.Any2EVMMessage`, without token amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Any2EvmMessage {
    pub message_id: H256,
    pub source_chain_selector: u64,
    /// `abi.encode(address)` of the origin sender
    pub sender: Vec<u8>,
    /// `abi.encode(bytes32)` of the attested Hyperlane message id
    pub data: Vec<u8>,
}

/// Chainlink CCIP messages delivered by the router from one source chain.
#[derive(Debug, Clone)]
pub struct CcipBridge {
    router: H256,
    origin_chain_selector: u64,
}

impl CcipBridge {
    pub fn new(router: H256, origin_chain_selector: u64) -> Self {
        Self {
            router,
            origin_chain_selector,
        }
    }
}

impl MessageIdBridge for CcipBridge {
    fn decode_attestation(&self, call: &RelayedCall) -> IsmResult<Attestation> {
        decode_message_id_attestation(call)
    }
}

impl CcipIsm {
    /// Router callback
    pub fn ccip_receive(&self, ctx: &CallContext, message: &Any2EvmMessage) -> IsmResult<()> {
        let bridge = self.bridge();
        self.ensure_caller(ctx, bridge.router)?;
        if message.source_chain_selector != bridge.origin_chain_selector {
            return Err(IsmError::WrongSourceChain {
                expected: bridge.origin_chain_selector,
                actual: message.source_chain_selector,
            });
        }
        let sender = decode_address(&message.sender)?;
        self.accept_relayed_call(&RelayedCall {
            sender,
            target: self.address(),
            value: U256::zero(),
            data: message.data.clone(),
        })?;
        Ok(())
    }
}
