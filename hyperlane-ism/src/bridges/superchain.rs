use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ethers_core::abi::{self, ParamType, Token};
use ethers_core::utils::keccak256;

use hyperlane_core::{IsmError, IsmResult, ModuleType, H256, U256};

use crate::abi::{address_token, bytes32_token, uint_token, TokenReader};
use crate::message_id::{MessageIdBridge, RelayedCall, SenderAwareBridge};

/// Event the origin messenger emits for every sent message
pub const SENT_MESSAGE_EVENT: &str = "SentMessage(uint256,address,uint256,address,bytes)";

const SENT_MESSAGE_TOPICS_LEN: usize = 4 * 32;

/// `ICrossL2Inbox.Identifier` of the `SentMessage` log being relayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identifier {
    pub origin: H256,
    pub block_number: U256,
    pub log_index: U256,
    pub timestamp: U256,
    pub chain_id: U256,
}

/// A `SentMessage` log: indexed destination, target and nonce, then the
/// sender and message as data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SentMessage {
    pub destination: U256,
    pub target: H256,
    pub nonce: U256,
    pub sender: H256,
    pub message: Vec<u8>,
}

/// The `L2ToL2CrossDomainMessenger` predeploy.
#[cfg_attr(test, mockall::automock)]
pub trait L2ToL2Messenger: Send + Sync {
    /// Address of the messenger
    fn address(&self) -> H256;

    /// `(sender, source chain)` of the message being relayed
    fn cross_domain_message_context(&self) -> IsmResult<(H256, u64)>;

    /// Validate the identifier against the inbox and deliver the sent
    /// message. A message is relayed at most once.
    fn relay_message(&self, id: &Identifier, sent_message: &[u8]) -> IsmResult<()>;
}

fn relay_types() -> Vec<ParamType> {
    vec![
        ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::Uint(256),
        ]),
        ParamType::Bytes,
    ]
}

fn sent_message_topic() -> H256 {
    H256::from(keccak256(SENT_MESSAGE_EVENT))
}

/// Metadata for the inline path: `abi.encode(Identifier, sentMessage)`
pub fn encode_relay_metadata(id: &Identifier, sent_message: &[u8]) -> Vec<u8> {
    abi::encode(&[
        Token::Tuple(vec![
            address_token(id.origin),
            uint_token(id.block_number),
            uint_token(id.log_index),
            uint_token(id.timestamp),
            uint_token(id.chain_id),
        ]),
        Token::Bytes(sent_message.to_vec()),
    ])
}

/// Inverse of [`encode_relay_metadata`]
pub fn decode_relay_metadata(metadata: &[u8]) -> IsmResult<(Identifier, Vec<u8>)> {
    let mut args = TokenReader::decode("superchain relay", &relay_types(), metadata)?;
    let mut id = args.tuple()?;
    let identifier = Identifier {
        origin: id.address()?,
        block_number: id.uint()?,
        log_index: id.uint()?,
        timestamp: id.uint()?,
        chain_id: id.uint()?,
    };
    Ok((identifier, args.bytes()?))
}

/// Topics followed by `abi.encode(sender, message)`, as the messenger
/// reads a relayed log.
pub fn encode_sent_message(sent: &SentMessage) -> Vec<u8> {
    let mut log = abi::encode(&[
        bytes32_token(sent_message_topic()),
        uint_token(sent.destination),
        address_token(sent.target),
        uint_token(sent.nonce),
    ]);
    log.extend(abi::encode(&[
        address_token(sent.sender),
        Token::Bytes(sent.message.clone()),
    ]));
    log
}

/// Inverse of [`encode_sent_message`]
pub fn decode_sent_message(log: &[u8]) -> IsmResult<SentMessage> {
    if log.len() < SENT_MESSAGE_TOPICS_LEN {
        return Err(IsmError::MalformedProof(
            "sent message: missing topics".into(),
        ));
    }
    let (topics, data) = log.split_at(SENT_MESSAGE_TOPICS_LEN);
    let mut topics = TokenReader::decode(
        "sent message topics",
        &[
            ParamType::FixedBytes(32),
            ParamType::Uint(256),
            ParamType::Address,
            ParamType::Uint(256),
        ],
        topics,
    )?;
    if topics.bytes32()? != sent_message_topic() {
        return Err(IsmError::MalformedProof(
            "sent message: not a SentMessage log".into(),
        ));
    }
    let (destination, target, nonce) = (topics.uint()?, topics.address()?, topics.uint()?);
    let mut data = TokenReader::decode(
        "sent message data",
        &[ParamType::Address, ParamType::Bytes],
        data,
    )?;
    Ok(SentMessage {
        destination,
        target,
        nonce,
        sender: data.address()?,
        message: data.bytes()?,
    })
}

/// Superchain interop messages from one source chain.
pub struct SuperchainBridge {
    messenger: Arc<dyn L2ToL2Messenger>,
    origin_chain_id: u64,
}

impl SuperchainBridge {
    pub fn new(messenger: Arc<dyn L2ToL2Messenger>, origin_chain_id: u64) -> Self {
        Self {
            messenger,
            origin_chain_id,
        }
    }

    fn ensure_source(&self, source: u64) -> IsmResult<()> {
        if source != self.origin_chain_id {
            return Err(IsmError::WrongSourceChain {
                expected: self.origin_chain_id,
                actual: source,
            });
        }
        Ok(())
    }
}

impl Debug for SuperchainBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperchainBridge")
            .field("origin_chain_id", &self.origin_chain_id)
            .finish_non_exhaustive()
    }
}

impl MessageIdBridge for SuperchainBridge {
    fn module_type(&self) -> ModuleType {
        ModuleType::Superchain
    }

    fn inline_call(&self, metadata: &[u8]) -> IsmResult<Option<RelayedCall>> {
        if metadata.is_empty() {
            return Ok(None);
        }
        let (identifier, log) = decode_relay_metadata(metadata)?;
        if identifier.origin != self.messenger.address() {
            return Err(IsmError::BridgeRejected(format!(
                "log emitted by {:?}, not the messenger",
                identifier.origin
            )));
        }
        let source = u64::try_from(identifier.chain_id).map_err(|_| {
            IsmError::MalformedProof("superchain relay: chain id exceeds u64".into())
        })?;
        self.ensure_source(source)?;
        let sent = decode_sent_message(&log)?;
        Ok(Some(RelayedCall {
            sender: sent.sender,
            target: sent.target,
            value: U256::zero(),
            data: sent.message,
        }))
    }

    fn finalize_inline(&self, metadata: &[u8]) -> IsmResult<()> {
        let (identifier, log) = decode_relay_metadata(metadata)?;
        self.messenger.relay_message(&identifier, &log)
    }
}

impl SenderAwareBridge for SuperchainBridge {
    fn endpoint(&self) -> H256 {
        self.messenger.address()
    }

    fn cross_chain_sender(&self) -> IsmResult<H256> {
        let (sender, source) = self.messenger.cross_domain_message_context()?;
        self.ensure_source(source)?;
        Ok(sender)
    }
}
