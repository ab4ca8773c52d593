use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmError,
    IsmResult, ModuleType, H160, H256, U256,
};

use super::MessageIdStore;
use crate::abi::{decode_message_id, decode_pre_verify_message};

/// A call a bridge delivered on behalf of an origin-chain sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedCall {
    /// Logical sender on the origin chain
    pub sender: H256,
    /// Contract the call was delivered to
    pub target: H256,
    /// Native value carried with the call
    pub value: U256,
    /// Calldata
    pub data: Vec<u8>,
}

/// A message id and the value forwarded with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attestation {
    /// Attested message id
    pub message_id: H256,
    /// Forwarded value
    pub value: U256,
}

/// How one external bridge delivers attestations.
pub trait MessageIdBridge: Debug + Send + Sync {
    /// Module type reported by modules built on this bridge
    fn module_type(&self) -> ModuleType {
        ModuleType::Null
    }

    /// The call the bridge proof in `metadata` would deliver, read without
    /// touching the bridge. `None` when this bridge has no inline path or
    /// there is no proof.
    fn inline_call(&self, _metadata: &[u8]) -> IsmResult<Option<RelayedCall>> {
        Ok(None)
    }

    /// Prove and finalize the bridge proof in `metadata`. Finalization
    /// cannot be undone, so it only runs once the call from
    /// [`inline_call`](Self::inline_call) has been checked.
    fn finalize_inline(&self, _metadata: &[u8]) -> IsmResult<()> {
        Ok(())
    }

    /// Extract the attestation from a relayed call. Defaults to a
    /// `preVerifyMessage` call whose value must match what was carried.
    fn decode_attestation(&self, call: &RelayedCall) -> IsmResult<Attestation> {
        let (message_id, value) = decode_pre_verify_message(&call.data)?;
        if value != call.value {
            return Err(IsmError::ValueMismatch {
                declared: value,
                actual: call.value,
            });
        }
        Ok(Attestation { message_id, value })
    }
}

/// Attestation for bridges that carry the id as `abi.encode(bytes32)` and
/// forward value natively.
pub fn decode_message_id_attestation(call: &RelayedCall) -> IsmResult<Attestation> {
    Ok(Attestation {
        message_id: decode_message_id(&call.data)?,
        value: call.value,
    })
}

/// Bridges that deliver attestations by calling `verify_message_id` and
/// expose the origin sender while doing so.
pub trait SenderAwareBridge: MessageIdBridge {
    /// The only account allowed to call `verify_message_id`
    fn endpoint(&self) -> H256;

    /// The unwrapped origin-chain sender of the call in flight
    fn cross_chain_sender(&self) -> IsmResult<H256>;
}

/// Accepts messages whose id was attested by `authorized_hook` through
/// bridge `B`, releasing any forwarded value to the recipient.
#[derive(Debug)]
pub struct MessageIdAuthorizedIsm<B> {
    address: H256,
    authorized_hook: H256,
    bridge: B,
    store: MessageIdStore,
    released: RwLock<HashMap<H160, U256>>,
}

impl<B: MessageIdBridge> MessageIdAuthorizedIsm<B> {
    /// A module at `address` trusting attestations from `authorized_hook`
    pub fn new(address: H256, authorized_hook: H256, bridge: B) -> Self {
        Self {
            address,
            authorized_hook,
            bridge,
            store: MessageIdStore::default(),
            released: RwLock::new(HashMap::new()),
        }
    }

    /// The origin-chain hook whose attestations are trusted
    pub fn authorized_hook(&self) -> H256 {
        self.authorized_hook
    }

    /// The bridge strategy
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Whether `message_id` has been attested
    pub fn is_verified(&self, message_id: H256) -> bool {
        self.store.is_verified(message_id)
    }

    /// Value held for `message_id`, not yet released
    pub fn escrowed_value(&self, message_id: H256) -> U256 {
        self.store.record(message_id).escrowed_value
    }

    /// Total value released to `recipient`
    pub fn released_to(&self, recipient: H160) -> U256 {
        self.released
            .read()
            .get(&recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Errors unless the unwrapped origin sender is the authorized hook.
    pub fn ensure_authorized_sender(&self, sender: H256) -> IsmResult<()> {
        if sender != self.authorized_hook {
            warn!(?sender, authorized_hook = ?self.authorized_hook, "Rejected attestation from unauthorized sender");
            return Err(IsmError::UnauthorizedSender {
                sender,
                expected: self.authorized_hook,
            });
        }
        Ok(())
    }

    /// Errors unless the immediate caller is `endpoint`.
    pub fn ensure_caller(&self, ctx: &CallContext, endpoint: H256) -> IsmResult<()> {
        if ctx.caller != endpoint {
            return Err(IsmError::UnauthorizedCaller {
                caller: ctx.caller,
                expected: endpoint,
            });
        }
        Ok(())
    }

    /// Record an attestation that already passed the sender checks.
    pub fn accept_attestation(&self, attestation: Attestation) -> IsmResult<()> {
        let Attestation { message_id, value } = attestation;
        self.store.attest(message_id, value)?;
        info!(?message_id, %value, ism = ?self.address, "Message id attested");
        Ok(())
    }

    /// Check a relayed call end to end: addressed to us, from the hook,
    /// carrying an attestation. Nothing is recorded.
    pub fn check_relayed_call(&self, call: &RelayedCall) -> IsmResult<Attestation> {
        if call.target != self.address {
            return Err(IsmError::BridgeRejected(format!(
                "relayed call targets {:?}, not {:?}",
                call.target, self.address
            )));
        }
        self.ensure_authorized_sender(call.sender)?;
        self.bridge.decode_attestation(call)
    }

    /// Check a relayed call and record its attestation.
    pub fn accept_relayed_call(&self, call: &RelayedCall) -> IsmResult<Attestation> {
        let attestation = self.check_relayed_call(call)?;
        self.accept_attestation(attestation)?;
        Ok(attestation)
    }

    /// Verify `message_id` from a bridge proof in `metadata`. The proof is
    /// finalized only if it attests this message from the hook to us.
    fn relay_inline(&self, metadata: &[u8], message_id: H256) -> IsmResult<Option<Attestation>> {
        let Some(call) = self.bridge.inline_call(metadata)? else {
            return Ok(None);
        };
        let attestation = self.check_relayed_call(&call)?;
        if attestation.message_id != message_id {
            return Err(IsmError::MessageIdMismatch {
                expected: message_id,
                actual: attestation.message_id,
            });
        }
        self.bridge.finalize_inline(metadata)?;
        self.accept_attestation(attestation)?;
        Ok(Some(attestation))
    }

    fn release_escrow(&self, message: &HyperlaneMessage, message_id: H256) {
        let value = self.store.take_escrow(message_id);
        if value.is_zero() {
            return;
        }
        let recipient = message.recipient_address();
        *self.released.write().entry(recipient).or_default() += value;
        info!(?message_id, ?recipient, %value, "Released escrowed value");
    }
}

impl<B: SenderAwareBridge> MessageIdAuthorizedIsm<B> {
    /// Bridge callback recording that the hook attested to `message_id`.
    /// The attached value must equal `value`.
    pub fn verify_message_id(&self, ctx: &CallContext, message_id: H256, value: U256) -> IsmResult<()> {
        self.ensure_caller(ctx, self.bridge.endpoint())?;
        self.ensure_authorized_sender(self.bridge.cross_chain_sender()?)?;
        if ctx.value != value {
            return Err(IsmError::ValueMismatch {
                declared: value,
                actual: ctx.value,
            });
        }
        self.accept_attestation(Attestation { message_id, value })
    }
}

impl<B> HyperlaneContract for MessageIdAuthorizedIsm<B> {
    fn address(&self) -> H256 {
        self.address
    }
}

impl<B: MessageIdBridge> InterchainSecurityModule for MessageIdAuthorizedIsm<B> {
    fn module_type(&self) -> ModuleType {
        self.bridge.module_type()
    }

    #[instrument(skip_all, fields(ism = ?self.address, message_id = tracing::field::Empty))]
    fn verify(
        &self,
        _ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        let message_id = message.id();
        tracing::Span::current().record("message_id", tracing::field::debug(&message_id));

        if !self.store.is_verified(message_id) {
            let Some(attestation) = self.relay_inline(metadata, message_id)? else {
                debug!("No attestation yet");
                return Ok(false);
            };
            debug!(value = %attestation.value, "Attested inline");
        }
        self.release_escrow(message, message_id);
        Ok(true)
    }
}
