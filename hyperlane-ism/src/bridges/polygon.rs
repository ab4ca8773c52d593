use tracing::debug;

use hyperlane_core::{CallContext, HyperlaneContract, IsmResult, H256, U256};

use super::PolygonPosIsm;
use crate::message_id::{MessageIdBridge, RelayedCall};

/// Polygon PoS state sync through the FxPortal. The child tunnel hands us
/// the root sender as an argument.
#[derive(Debug, Clone)]
pub struct PolygonPosBridge {
    fx_child: H256,
}

impl PolygonPosBridge {
    pub fn new(fx_child: H256) -> Self {
        Self { fx_child }
    }

    pub fn fx_child(&self) -> H256 {
        self.fx_child
    }
}

impl MessageIdBridge for PolygonPosBridge {}

impl PolygonPosIsm {
    /// FxChild callback. `data` is a `preVerifyMessage` call.
    pub fn process_message_from_root(
        &self,
        ctx: &CallContext,
        state_id: U256,
        root_message_sender: H256,
        data: &[u8],
    ) -> IsmResult<()> {
        self.ensure_caller(ctx, self.bridge().fx_child())?;
        debug!(%state_id, ?root_message_sender, "State sync from root");
        self.accept_relayed_call(&RelayedCall {
            sender: root_message_sender,
            target: self.address(),
            value: U256::zero(),
            data: data.to_vec(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use hyperlane_core::{InterchainSecurityModule, IsmError};
    use hyperlane_test::test_utils::{addr, ctx, dummy_message};

    use super::*;
    use crate::abi::encode_pre_verify_message;

    fn ism() -> PolygonPosIsm {
        PolygonPosIsm::new(addr(0x15), addr(0x400c), PolygonPosBridge::new(addr(0xf0)))
    }

    #[test]
    fn state_sync_from_hook_verifies() {
        let ism = ism();
        let message = dummy_message(1);
        let data = encode_pre_verify_message(message.id(), U256::zero());
        ism.process_message_from_root(&ctx(addr(0xf0), 0), U256::one(), addr(0x400c), &data)
            .unwrap();
        assert_eq!(ism.verify(&ctx(addr(0), 0), &[], &message), Ok(true));
        assert_eq!(
            ism.process_message_from_root(&ctx(addr(0xf0), 0), U256::from(2u64), addr(0x400c), &data),
            Err(IsmError::AlreadyVerified(message.id()))
        );
    }

    #[test]
    fn state_sync_from_other_root_sender_is_rejected() {
        let ism = ism();
        let data = encode_pre_verify_message(H256::zero(), U256::zero());
        assert_eq!(
            ism.process_message_from_root(&ctx(addr(0xf0), 0), U256::one(), addr(0xbad), &data),
            Err(IsmError::UnauthorizedSender {
                sender: addr(0xbad),
                expected: addr(0x400c)
            })
        );
        assert!(matches!(
            ism.process_message_from_root(&ctx(addr(0xbad), 0), U256::one(), addr(0x400c), &data),
            Err(IsmError::UnauthorizedCaller { .. })
        ));
    }

    #[test]
    fn value_cannot_be_claimed_over_state_sync() {
        let data = encode_pre_verify_message(H256::zero(), U256::one());
        assert!(matches!(
            ism().process_message_from_root(&ctx(addr(0xf0), 0), U256::one(), addr(0x400c), &data),
            Err(IsmError::ValueMismatch { .. })
        ));
    }
}
