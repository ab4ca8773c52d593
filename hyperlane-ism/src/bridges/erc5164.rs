use hyperlane_core::{CallContext, HyperlaneContract, IsmError, IsmResult, H256};

use super::Erc5164Ism;
use crate::message_id::{MessageIdBridge, RelayedCall};

/// An ERC-5164 message executor. The executor appends the origin sender
/// and chain id to every call it makes.
#[derive(Debug, Clone)]
pub struct Erc5164Bridge {
    executor: H256,
    origin_chain_id: u64,
}

impl Erc5164Bridge {
    pub fn new(executor: H256, origin_chain_id: u64) -> Self {
        Self {
            executor,
            origin_chain_id,
        }
    }
}

impl MessageIdBridge for Erc5164Bridge {}

impl Erc5164Ism {
    /// Executor callback with the `from` and `fromChainId` it appended.
    pub fn execute_message(
        &self,
        ctx: &CallContext,
        calldata: &[u8],
        from: H256,
        from_chain_id: u64,
    ) -> IsmResult<()> {
        let bridge = self.bridge();
        self.ensure_caller(ctx, bridge.executor)?;
        if from_chain_id != bridge.origin_chain_id {
            return Err(IsmError::WrongSourceChain {
                expected: bridge.origin_chain_id,
                actual: from_chain_id,
            });
        }
        self.accept_relayed_call(&RelayedCall {
            sender: from,
            target: self.address(),
            value: ctx.value,
            data: calldata.to_vec(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use hyperlane_core::{InterchainSecurityModule, U256};
    use hyperlane_test::test_utils::{addr, ctx, dummy_message};

    use super::*;
    use crate::abi::encode_pre_verify_message;

    #[test]
    fn executor_delivers_attestation() {
        let ism = Erc5164Ism::new(addr(0x15), addr(0x400c), Erc5164Bridge::new(addr(0xe5), 1));
        let message = dummy_message(1);
        let calldata = encode_pre_verify_message(message.id(), U256::zero());

        assert!(matches!(
            ism.execute_message(&ctx(addr(0xe5), 0), &calldata, addr(0x400c), 137),
            Err(IsmError::WrongSourceChain { .. })
        ));
        ism.execute_message(&ctx(addr(0xe5), 0), &calldata, addr(0x400c), 1)
            .unwrap();
        assert_eq!(ism.verify(&ctx(addr(0), 0), &[], &message), Ok(true));
    }
}
