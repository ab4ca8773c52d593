use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use ethers_core::abi::{self, ParamType, Token};

use hyperlane_core::{IsmError, IsmResult, ModuleType, H256, U256};

use crate::abi::{address_token, decode_call, encode_call, uint_token, TokenReader};
use crate::message_id::{MessageIdBridge, RelayedCall, SenderAwareBridge};

/// `CrossDomainMessenger.relayMessage`
pub const RELAY_MESSAGE_SIGNATURE: &str =
    "relayMessage(uint256,address,address,uint256,uint256,bytes)";

/// An OP stack cross domain messenger.
#[cfg_attr(test, mockall::automock)]
pub trait CrossDomainMessenger: Send + Sync {
    /// Address of the messenger
    fn address(&self) -> H256;

    /// Origin sender of the message being relayed
    fn x_domain_message_sender(&self) -> IsmResult<H256>;
}

/// The L1 portal finalizing withdrawals from an OP stack chain.
#[cfg_attr(test, mockall::automock)]
pub trait OptimismPortal: Send + Sync {
    /// Prove-checked finalization of a withdrawal
    fn finalize_withdrawal_transaction(&self, tx: &WithdrawalTransaction) -> IsmResult<()>;
}

/// `Types.WithdrawalTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WithdrawalTransaction {
    pub nonce: U256,
    pub sender: H256,
    pub target: H256,
    pub value: U256,
    pub gas_limit: U256,
    pub data: Vec<u8>,
}

/// A messenger level relay carried inside a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessengerRelay {
    pub nonce: U256,
    pub sender: H256,
    pub target: H256,
    pub value: U256,
    pub min_gas_limit: U256,
    pub message: Vec<u8>,
}

// (uint256,address,address,uint256,uint256,bytes), shared by the withdrawal
// struct and the messenger relay
fn relay_types() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Bytes,
    ]
}

fn withdrawal_types() -> Vec<ParamType> {
    vec![ParamType::Tuple(relay_types())]
}

/// Calldata of `relayMessage` on the L1 messenger
pub fn encode_relay_message(relay: &MessengerRelay) -> Vec<u8> {
    encode_call(
        RELAY_MESSAGE_SIGNATURE,
        &[
            uint_token(relay.nonce),
            address_token(relay.sender),
            address_token(relay.target),
            uint_token(relay.value),
            uint_token(relay.min_gas_limit),
            Token::Bytes(relay.message.clone()),
        ],
    )
}

/// Inverse of [`encode_relay_message`]
pub fn decode_relay_message(data: &[u8]) -> IsmResult<MessengerRelay> {
    let mut args = decode_call(RELAY_MESSAGE_SIGNATURE, &relay_types(), data)?;
    Ok(MessengerRelay {
        nonce: args.uint()?,
        sender: args.address()?,
        target: args.address()?,
        value: args.uint()?,
        min_gas_limit: args.uint()?,
        message: args.bytes()?,
    })
}

/// Portal metadata: `abi.encode(WithdrawalTransaction)`
pub fn encode_withdrawal_metadata(tx: &WithdrawalTransaction) -> Vec<u8> {
    abi::encode(&[Token::Tuple(vec![
        uint_token(tx.nonce),
        address_token(tx.sender),
        address_token(tx.target),
        uint_token(tx.value),
        uint_token(tx.gas_limit),
        Token::Bytes(tx.data.clone()),
    ])])
}

/// Inverse of [`encode_withdrawal_metadata`]
pub fn decode_withdrawal_metadata(metadata: &[u8]) -> IsmResult<WithdrawalTransaction> {
    let mut tx = TokenReader::decode("withdrawal metadata", &withdrawal_types(), metadata)?.tuple()?;
    Ok(WithdrawalTransaction {
        nonce: tx.uint()?,
        sender: tx.address()?,
        target: tx.address()?,
        value: tx.uint()?,
        gas_limit: tx.uint()?,
        data: tx.bytes()?,
    })
}

/// L1 to L2 messages through the L2 cross domain messenger.
pub struct OptimismBridge {
    messenger: Arc<dyn CrossDomainMessenger>,
}

impl OptimismBridge {
    pub fn new(messenger: Arc<dyn CrossDomainMessenger>) -> Self {
        Self { messenger }
    }
}

impl Debug for OptimismBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimismBridge").finish_non_exhaustive()
    }
}

impl MessageIdBridge for OptimismBridge {}

impl SenderAwareBridge for OptimismBridge {
    fn endpoint(&self) -> H256 {
        self.messenger.address()
    }

    fn cross_chain_sender(&self) -> IsmResult<H256> {
        self.messenger.x_domain_message_sender()
    }
}

/// L2 to L1 messages through the L1 messenger, finalizable inline through
/// the portal.
pub struct OpStackL2ToL1Bridge {
    messenger: Arc<dyn CrossDomainMessenger>,
    portal: Arc<dyn OptimismPortal>,
}

impl OpStackL2ToL1Bridge {
    pub fn new(messenger: Arc<dyn CrossDomainMessenger>, portal: Arc<dyn OptimismPortal>) -> Self {
        Self { messenger, portal }
    }

    /// A withdrawal that relays through the L1 messenger
    fn decode_withdrawal(&self, metadata: &[u8]) -> IsmResult<WithdrawalTransaction> {
        let tx = decode_withdrawal_metadata(metadata)?;
        if tx.target != self.messenger.address() {
            return Err(IsmError::BridgeRejected(format!(
                "withdrawal targets {:?}, not the messenger",
                tx.target
            )));
        }
        Ok(tx)
    }
}

impl Debug for OpStackL2ToL1Bridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpStackL2ToL1Bridge").finish_non_exhaustive()
    }
}

impl MessageIdBridge for OpStackL2ToL1Bridge {
    fn module_type(&self) -> ModuleType {
        ModuleType::OpL2ToL1
    }

    fn inline_call(&self, metadata: &[u8]) -> IsmResult<Option<RelayedCall>> {
        if metadata.is_empty() {
            return Ok(None);
        }
        let tx = self.decode_withdrawal(metadata)?;
        let relay = decode_relay_message(&tx.data)?;
        Ok(Some(RelayedCall {
            sender: relay.sender,
            target: relay.target,
            value: relay.value,
            data: relay.message,
        }))
    }

    fn finalize_inline(&self, metadata: &[u8]) -> IsmResult<()> {
        self.portal
            .finalize_withdrawal_transaction(&self.decode_withdrawal(metadata)?)
    }
}

impl SenderAwareBridge for OpStackL2ToL1Bridge {
    fn endpoint(&self) -> H256 {
        self.messenger.address()
    }

    fn cross_chain_sender(&self) -> IsmResult<H256> {
        self.messenger.x_domain_message_sender()
    }
}

#[cfg(test)]
mod test {
    use hyperlane_core::InterchainSecurityModule;
    use hyperlane_test::test_utils::{addr, ctx, dummy_message};

    use super::*;
    use crate::abi::encode_pre_verify_message;
    use crate::bridges::{OpL2ToL1Ism, OptimismIsm};

    const HOOK: u64 = 0x400c;
    const MESSENGER: u64 = 0x4200;
    const ISM: u64 = 0x15;

    fn messenger(sender: H256) -> MockCrossDomainMessenger {
        let mut messenger = MockCrossDomainMessenger::new();
        messenger.expect_address().return_const(addr(MESSENGER));
        messenger
            .expect_x_domain_message_sender()
            .returning(move || Ok(sender));
        messenger
    }

    fn withdrawal(message_id: H256, value: U256) -> WithdrawalTransaction {
        let relay = MessengerRelay {
            nonce: U256::from(1u64),
            sender: addr(HOOK),
            target: addr(ISM),
            value,
            min_gas_limit: U256::from(200_000u64),
            message: encode_pre_verify_message(message_id, value),
        };
        WithdrawalTransaction {
            nonce: U256::from(9u64),
            sender: addr(0x4201),
            target: addr(MESSENGER),
            value,
            gas_limit: U256::from(300_000u64),
            data: encode_relay_message(&relay),
        }
    }

    #[test]
    fn l1_to_l2_callback_checks_messenger_sender() {
        let ism = OptimismIsm::new(
            addr(ISM),
            addr(HOOK),
            OptimismBridge::new(Arc::new(messenger(addr(0xbad)))),
        );
        assert_eq!(
            ism.verify_message_id(&ctx(addr(MESSENGER), 0), H256::zero(), U256::zero()),
            Err(IsmError::UnauthorizedSender {
                sender: addr(0xbad),
                expected: addr(HOOK)
            })
        );
        assert_eq!(ism.module_type(), ModuleType::Null);
    }

    #[test]
    fn l1_to_l2_callback_then_verify() {
        let ism = OptimismIsm::new(
            addr(ISM),
            addr(HOOK),
            OptimismBridge::new(Arc::new(messenger(addr(HOOK)))),
        );
        let message = dummy_message(1);
        ism.verify_message_id(&ctx(addr(MESSENGER), 0), message.id(), U256::zero())
            .unwrap();
        assert_eq!(ism.verify(&ctx(addr(0), 0), &[], &message), Ok(true));
    }

    #[test]
    fn withdrawal_metadata_round_trips() {
        let tx = withdrawal(H256::repeat_byte(4), U256::from(3u64));
        let decoded = decode_withdrawal_metadata(&encode_withdrawal_metadata(&tx)).unwrap();
        assert_eq!(decoded, tx);
        let relay = decode_relay_message(&decoded.data).unwrap();
        assert_eq!(relay.target, addr(ISM));
    }

    #[test]
    fn portal_finalization_verifies_inline() {
        let message = dummy_message(10);
        let value = U256::from(77u64);
        let mut portal = MockOptimismPortal::new();
        portal
            .expect_finalize_withdrawal_transaction()
            .times(1)
            .returning(|_| Ok(()));
        let bridge = OpStackL2ToL1Bridge::new(Arc::new(messenger(addr(HOOK))), Arc::new(portal));
        let ism = OpL2ToL1Ism::new(addr(ISM), addr(HOOK), bridge);

        let metadata = encode_withdrawal_metadata(&withdrawal(message.id(), value));
        assert_eq!(ism.verify(&ctx(addr(0), 0), &metadata, &message), Ok(true));
        assert_eq!(ism.released_to(message.recipient_address()), value);
        assert_eq!(ism.module_type(), ModuleType::OpL2ToL1);

        // already verified, the portal is not touched again
        assert_eq!(ism.verify(&ctx(addr(0), 0), &metadata, &message), Ok(true));
    }

    #[test]
    fn withdrawal_to_another_contract_is_rejected() {
        let message = dummy_message(10);
        let mut tx = withdrawal(message.id(), U256::zero());
        tx.target = addr(0xdead);
        let bridge = OpStackL2ToL1Bridge::new(
            Arc::new(messenger(addr(HOOK))),
            Arc::new(MockOptimismPortal::new()),
        );
        let ism = OpL2ToL1Ism::new(addr(ISM), addr(HOOK), bridge);
        assert!(matches!(
            ism.verify(&ctx(addr(0), 0), &encode_withdrawal_metadata(&tx), &message),
            Err(IsmError::BridgeRejected(_))
        ));
    }

    #[test]
    fn withdrawal_for_another_message_is_not_finalized() {
        let (message, other) = (dummy_message(10), dummy_message(11));
        let mut portal = MockOptimismPortal::new();
        portal.expect_finalize_withdrawal_transaction().times(0);
        let bridge = OpStackL2ToL1Bridge::new(Arc::new(messenger(addr(HOOK))), Arc::new(portal));
        let ism = OpL2ToL1Ism::new(addr(ISM), addr(HOOK), bridge);

        let metadata = encode_withdrawal_metadata(&withdrawal(other.id(), U256::zero()));
        assert_eq!(
            ism.verify(&ctx(addr(0), 0), &metadata, &message),
            Err(IsmError::MessageIdMismatch {
                expected: message.id(),
                actual: other.id()
            })
        );
    }
}
