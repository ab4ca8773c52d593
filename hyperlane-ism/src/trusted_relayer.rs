use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::debug;

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmResult,
    Mailbox, ModuleType, H256,
};

/// Accepts a message iff the mailbox recorded `relayer` as the account
/// that is delivering it.
pub struct TrustedRelayerIsm {
    address: H256,
    mailbox: Arc<dyn Mailbox>,
    relayer: H256,
}

impl TrustedRelayerIsm {
    pub fn new(address: H256, mailbox: Arc<dyn Mailbox>, relayer: H256) -> Self {
        Self {
            address,
            mailbox,
            relayer,
        }
    }

    pub fn trusted_relayer(&self) -> H256 {
        self.relayer
    }
}

impl Debug for TrustedRelayerIsm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedRelayerIsm")
            .field("address", &self.address)
            .field("relayer", &self.relayer)
            .finish_non_exhaustive()
    }
}

impl HyperlaneContract for TrustedRelayerIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl InterchainSecurityModule for TrustedRelayerIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::Null
    }

    fn verify(&self, _: &CallContext, _: &[u8], message: &HyperlaneMessage) -> IsmResult<bool> {
        let id = message.id();
        let processor = self.mailbox.processor(id);
        debug!(?id, ?processor, relayer = ?self.relayer, "Checking processor");
        Ok(processor == Some(self.relayer))
    }
}

#[cfg(test)]
mod test {
    use hyperlane_core::IsmError;
    use hyperlane_test::mocks::{MockMailboxContract, TestMailbox};
    use hyperlane_test::test_utils::{addr, ctx, dummy_message};

    use super::*;

    #[test]
    fn only_the_trusted_relayer_delivers() {
        let mailbox = Arc::new(TestMailbox::new(addr(0xa1), 1));
        let ism = TrustedRelayerIsm::new(addr(0x70), mailbox.clone(), addr(0x77));
        let message = dummy_message(5);

        assert_eq!(
            mailbox.process(&ctx(addr(0x66), 0), &ism, &[], &message),
            Err(IsmError::VerifyRejected(addr(0x70)))
        );
        mailbox
            .process(&ctx(addr(0x77), 0), &ism, &[], &message)
            .unwrap();
        assert_eq!(mailbox.processor(message.id()), Some(addr(0x77)));
    }

    #[test]
    fn undelivered_messages_are_declined() {
        let mut mailbox = MockMailboxContract::new();
        mailbox.expect__processor().times(1).returning(|_| None);
        let ism = TrustedRelayerIsm::new(addr(0x70), Arc::new(mailbox), addr(0x77));
        assert_eq!(
            ism.verify(&CallContext::default(), &[], &dummy_message(5)),
            Ok(false)
        );
    }
}
