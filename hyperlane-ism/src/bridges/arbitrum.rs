use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ethers_core::abi::{self, ParamType, Token};

use hyperlane_core::{IsmResult, ModuleType, H256, U256};

use crate::abi::{
    address_token, bytes32_token, decode_pre_verify_message, uint_token, TokenReader,
};
use crate::message_id::{MessageIdBridge, RelayedCall, SenderAwareBridge};

/// The Arbitrum bridge and its active outbox.
#[cfg_attr(test, mockall::automock)]
pub trait ArbitrumOutbox: Send + Sync {
    /// Address of the outbox currently executing L2 to L1 transactions
    fn active_outbox(&self) -> H256;

    /// L2 sender of the transaction being executed
    fn l2_to_l1_sender(&self) -> IsmResult<H256>;

    /// Prove and execute an L2 to L1 transaction
    fn execute_transaction(&self, tx: &OutboxTransaction) -> IsmResult<()>;
}

/// Arguments of `Outbox.executeTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutboxTransaction {
    pub proof: Vec<H256>,
    pub index: U256,
    pub l2_sender: H256,
    pub to: H256,
    pub l2_block: U256,
    pub l1_block: U256,
    pub l2_timestamp: U256,
    /// Not part of the metadata; taken from the attested `msgValue`.
    pub value: U256,
    pub data: Vec<u8>,
}

fn outbox_metadata_types() -> Vec<ParamType> {
    vec![
        ParamType::Array(Box::new(ParamType::FixedBytes(32))),
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bytes,
    ]
}

/// `abi.encode(proof, index, l2Sender, to, l2Block, l1Block, l2Timestamp, data)`
pub fn encode_outbox_metadata(tx: &OutboxTransaction) -> Vec<u8> {
    abi::encode(&[
        Token::Array(tx.proof.iter().copied().map(bytes32_token).collect()),
        uint_token(tx.index),
        address_token(tx.l2_sender),
        address_token(tx.to),
        uint_token(tx.l2_block),
        uint_token(tx.l1_block),
        uint_token(tx.l2_timestamp),
        Token::Bytes(tx.data.clone()),
    ])
}

/// Inverse of [`encode_outbox_metadata`]. The value is read from the
/// `preVerifyMessage` call in `data`.
pub fn decode_outbox_metadata(metadata: &[u8]) -> IsmResult<OutboxTransaction> {
    let mut args = TokenReader::decode("arbitrum outbox metadata", &outbox_metadata_types(), metadata)?;
    let mut tx = OutboxTransaction {
        proof: args.bytes32_array()?,
        index: args.uint()?,
        l2_sender: args.address()?,
        to: args.address()?,
        l2_block: args.uint()?,
        l1_block: args.uint()?,
        l2_timestamp: args.uint()?,
        value: U256::zero(),
        data: args.bytes()?,
    };
    tx.value = decode_pre_verify_message(&tx.data)?.1;
    Ok(tx)
}

/// Arbitrum L2 to L1 messaging through the outbox.
pub struct ArbitrumBridge {
    outbox: Arc<dyn ArbitrumOutbox>,
}

impl ArbitrumBridge {
    pub fn new(outbox: Arc<dyn ArbitrumOutbox>) -> Self {
        Self { outbox }
    }
}

impl Debug for ArbitrumBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbitrumBridge").finish_non_exhaustive()
    }
}

impl MessageIdBridge for ArbitrumBridge {
    fn module_type(&self) -> ModuleType {
        ModuleType::ArbL2ToL1
    }

    fn inline_call(&self, metadata: &[u8]) -> IsmResult<Option<RelayedCall>> {
        if metadata.is_empty() {
            return Ok(None);
        }
        let tx = decode_outbox_metadata(metadata)?;
        Ok(Some(RelayedCall {
            sender: tx.l2_sender,
            target: tx.to,
            value: tx.value,
            data: tx.data,
        }))
    }

    fn finalize_inline(&self, metadata: &[u8]) -> IsmResult<()> {
        self.outbox.execute_transaction(&decode_outbox_metadata(metadata)?)
    }
}

impl SenderAwareBridge for ArbitrumBridge {
    fn endpoint(&self) -> H256 {
        self.outbox.active_outbox()
    }

    fn cross_chain_sender(&self) -> IsmResult<H256> {
        self.outbox.l2_to_l1_sender()
    }
}
