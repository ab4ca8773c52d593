#![allow(non_snake_case)]

use std::collections::HashMap;

use mockall::*;
use parking_lot::RwLock;

use hyperlane_core::*;

mock! {
    pub MailboxContract {
        pub fn _address(&self) -> H256 {}

        pub fn _local_domain(&self) -> u32 {}

        pub fn _default_ism(&self) -> H256 {}

        pub fn _delivered(&self, id: H256) -> bool {}

        pub fn _processor(&self, id: H256) -> Option<H256> {}

        pub fn _latest_dispatched_id(&self) -> H256 {}

        pub fn _dispatch(
            &self,
            ctx: &CallContext,
            destination: u32,
            recipient: H256,
            body: Vec<u8>,
        ) -> IsmResult<H256> {}
    }
}

impl std::fmt::Debug for MockMailboxContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockMailboxContract")
    }
}

impl HyperlaneContract for MockMailboxContract {
    fn address(&self) -> H256 {
        self._address()
    }
}

impl Mailbox for MockMailboxContract {
    fn local_domain(&self) -> u32 {
        self._local_domain()
    }

    fn default_ism(&self) -> H256 {
        self._default_ism()
    }

    fn delivered(&self, id: H256) -> bool {
        self._delivered(id)
    }

    fn processor(&self, id: H256) -> Option<H256> {
        self._processor(id)
    }

    fn latest_dispatched_id(&self) -> H256 {
        self._latest_dispatched_id()
    }

    fn dispatch(
        &self,
        ctx: &CallContext,
        destination: u32,
        recipient: H256,
        body: Vec<u8>,
    ) -> IsmResult<H256> {
        self._dispatch(ctx, destination, recipient, body)
    }
}

/// In-memory mailbox that records dispatches and deliveries.
#[derive(Debug)]
pub struct TestMailbox {
    address: H256,
    local_domain: u32,
    default_ism: RwLock<H256>,
    deliveries: RwLock<HashMap<H256, H256>>,
    dispatched: RwLock<Vec<HyperlaneMessage>>,
}

impl TestMailbox {
    /// Message version stamped on dispatched messages
    pub const VERSION: u8 = 3;

    /// A mailbox at `address` on `local_domain`
    pub fn new(address: H256, local_domain: u32) -> Self {
        Self {
            address,
            local_domain,
            default_ism: RwLock::new(H256::zero()),
            deliveries: RwLock::new(HashMap::new()),
            dispatched: RwLock::new(Vec::new()),
        }
    }

    /// Point the protocol-wide default at another module
    pub fn set_default_ism(&self, ism: H256) {
        *self.default_ism.write() = ism;
    }

    /// Everything dispatched so far, oldest first
    pub fn dispatched(&self) -> Vec<HyperlaneMessage> {
        self.dispatched.read().clone()
    }

    /// Deliver `message` the way the mailbox does: record the processor,
    /// then ask `ism` to verify. A failed verification undoes the delivery.
    pub fn process(
        &self,
        ctx: &CallContext,
        ism: &dyn InterchainSecurityModule,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<()> {
        let id = message.id();
        if self.deliveries.read().contains_key(&id) {
            return Err(IsmError::AlreadyDelivered(id));
        }
        self.deliveries.write().insert(id, ctx.caller);
        let outcome = match ism.verify(ctx, metadata, message) {
            Ok(true) => Ok(()),
            Ok(false) => Err(IsmError::VerifyRejected(ism.address())),
            Err(err) => Err(err),
        };
        if outcome.is_err() {
            self.deliveries.write().remove(&id);
        }
        outcome
    }
}

impl HyperlaneContract for TestMailbox {
    fn address(&self) -> H256 {
        self.address
    }
}

impl Mailbox for TestMailbox {
    fn local_domain(&self) -> u32 {
        self.local_domain
    }

    fn default_ism(&self) -> H256 {
        *self.default_ism.read()
    }

    fn delivered(&self, id: H256) -> bool {
        self.deliveries.read().contains_key(&id)
    }

    fn processor(&self, id: H256) -> Option<H256> {
        self.deliveries.read().get(&id).copied()
    }

    fn latest_dispatched_id(&self) -> H256 {
        self.dispatched
            .read()
            .last()
            .map(HyperlaneMessage::id)
            .unwrap_or_default()
    }

    fn dispatch(
        &self,
        ctx: &CallContext,
        destination: u32,
        recipient: H256,
        body: Vec<u8>,
    ) -> IsmResult<H256> {
        let mut dispatched = self.dispatched.write();
        let message = HyperlaneMessage {
            version: Self::VERSION,
            nonce: dispatched.len() as u32,
            origin: self.local_domain,
            sender: ctx.caller,
            destination,
            recipient,
            body,
        };
        let id = message.id();
        dispatched.push(message);
        Ok(id)
    }
}
