use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmError,
    IsmResult, Mailbox, ModuleType, H256,
};

use crate::{AccessControl, Ownable};

/// Configuration for a remote router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRouterConfig {
    /// The domain of the remote router.
    pub domain: u32,
    /// The remote router. `None` unenrolls.
    pub router: Option<H256>,
}

/// Where a message stands in the timelock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Never preverified
    Unseen,
    /// Preverified, usable from the contained timestamp
    Queued(u64),
    /// Preverified and past its timelock
    Ready(u64),
}

/// Hook on the origin chain and module on the destination chain.
///
/// As a hook it forwards the id of each dispatched message to the router
/// enrolled for the destination. As a message recipient it preverifies
/// those ids, and as a module it accepts a message once `timelock_window`
/// seconds have passed since its preverification.
pub struct TimelockRouter {
    address: H256,
    mailbox: Arc<dyn Mailbox>,
    ownable: Ownable,
    timelock_window: u64,
    routers: RwLock<HashMap<u32, H256>>,
    ready_at: RwLock<HashMap<H256, u64>>,
}

impl TimelockRouter {
    pub fn new(
        address: H256,
        mailbox: Arc<dyn Mailbox>,
        owner: H256,
        timelock_window: u64,
    ) -> Self {
        Self {
            address,
            mailbox,
            ownable: Ownable::new(owner),
            timelock_window,
            routers: RwLock::new(HashMap::new()),
            ready_at: RwLock::new(HashMap::new()),
        }
    }

    pub fn timelock_window(&self) -> u64 {
        self.timelock_window
    }

    /// Returns the router for the provided domain, or None if no router is
    /// enrolled.
    pub fn router(&self, domain: u32) -> Option<H256> {
        self.routers.read().get(&domain).copied()
    }

    /// Enrolls a remote router. Owner only.
    pub fn enroll_remote_router(
        &self,
        ctx: &CallContext,
        config: RemoteRouterConfig,
    ) -> IsmResult<()> {
        self.enroll_remote_routers(ctx, vec![config])
    }

    /// Enrolls multiple remote routers. Owner only.
    pub fn enroll_remote_routers(
        &self,
        ctx: &CallContext,
        configs: Vec<RemoteRouterConfig>,
    ) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        let mut routers = self.routers.write();
        for RemoteRouterConfig { domain, router } in configs {
            match router {
                Some(router) => routers.insert(domain, router),
                None => routers.remove(&domain),
            };
            info!(timelock = ?self.address, domain, ?router, "Remote router enrolled");
        }
        Ok(())
    }

    fn only_remote_router(&self, origin: u32, sender: H256) -> IsmResult<()> {
        if self.router(origin) != Some(sender) {
            return Err(IsmError::NotRemoteRouter {
                domain: origin,
                sender,
            });
        }
        Ok(())
    }

    /// Hook entrypoint. Sends the id of the message just dispatched to the
    /// router enrolled for its destination.
    #[instrument(skip_all, fields(timelock = ?self.address, destination = message.destination))]
    pub fn post_dispatch(&self, ctx: &CallContext, message: &HyperlaneMessage) -> IsmResult<H256> {
        let id = message.id();
        if self.mailbox.latest_dispatched_id() != id {
            return Err(IsmError::NotLatestDispatched(id));
        }
        let router = self
            .router(message.destination)
            .ok_or(IsmError::NoRouterEnrolled(message.destination))?;
        let forwarded = self.mailbox.dispatch(
            &ctx.from_caller(self.address),
            message.destination,
            router,
            id.as_bytes().to_vec(),
        )?;
        debug!(?id, ?forwarded, "Forwarded message id");
        Ok(forwarded)
    }

    /// Recipient entrypoint, called by the mailbox with a message id sent
    /// by a remote router.
    #[instrument(skip_all, fields(timelock = ?self.address, origin = origin))]
    pub fn handle(&self, ctx: &CallContext, origin: u32, sender: H256, body: &[u8]) -> IsmResult<()> {
        let mailbox = self.mailbox.address();
        if ctx.caller != mailbox {
            return Err(IsmError::UnauthorizedCaller {
                caller: ctx.caller,
                expected: mailbox,
            });
        }
        self.only_remote_router(origin, sender)?;
        if body.len() != 32 {
            return Err(IsmError::InvalidMessageBody(format!(
                "expected a 32 byte message id, got {} bytes",
                body.len()
            )));
        }
        self.preverify(H256::from_slice(body), ctx.timestamp)
    }

    /// Preverify without a relayed id. Owner only.
    pub fn manually_preverify_message(&self, ctx: &CallContext, id: H256) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        self.preverify(id, ctx.timestamp)
    }

    fn preverify(&self, id: H256, now: u64) -> IsmResult<()> {
        let mut ready_at = self.ready_at.write();
        if ready_at.contains_key(&id) {
            return Err(IsmError::AlreadyPreverified(id));
        }
        // zero is never a ready time; a zero window at genesis opens at 1
        let ready = now.saturating_add(self.timelock_window).max(1);
        ready_at.insert(id, ready);
        info!(timelock = ?self.address, ?id, ready_at = ready, "Message preverified");
        Ok(())
    }

    /// Timestamp from which `id` verifies, if it was preverified
    pub fn ready_at(&self, id: H256) -> Option<u64> {
        self.ready_at.read().get(&id).copied()
    }

    pub fn message_state(&self, id: H256, now: u64) -> MessageState {
        match self.ready_at(id) {
            None => MessageState::Unseen,
            Some(ready) if ready > now => MessageState::Queued(ready),
            Some(ready) => MessageState::Ready(ready),
        }
    }
}

impl Debug for TimelockRouter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelockRouter")
            .field("address", &self.address)
            .field("timelock_window", &self.timelock_window)
            .field("routers", &*self.routers.read())
            .finish_non_exhaustive()
    }
}

impl AccessControl for TimelockRouter {
    fn ownable(&self) -> &Ownable {
        &self.ownable
    }
}

impl HyperlaneContract for TimelockRouter {
    fn address(&self) -> H256 {
        self.address
    }
}

impl InterchainSecurityModule for TimelockRouter {
    fn module_type(&self) -> ModuleType {
        ModuleType::Null
    }

    fn verify(
        &self,
        ctx: &CallContext,
        _: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        let id = message.id();
        match self.message_state(id, ctx.timestamp) {
            MessageState::Unseen => Err(IsmError::NotPreverified(id)),
            MessageState::Queued(ready) => Err(IsmError::MessageNotReadyUntil(ready)),
            MessageState::Ready(_) => Ok(true),
        }
    }
}

#[cfg(test)]
mod test {
    use hyperlane_core::IsmErrorKind;
    use hyperlane_test::mocks::TestMailbox;
    use hyperlane_test::test_utils::{addr, ctx, message};

    use super::*;

    const OWNER: u64 = 0x0e;
    const WINDOW: u64 = 3600;

    struct Deployment {
        origin_mailbox: Arc<TestMailbox>,
        origin: TimelockRouter,
        destination_mailbox: Arc<TestMailbox>,
        destination: TimelockRouter,
    }

    /// Routers on domains 1 and 2, enrolled with each other
    fn deploy() -> Deployment {
        let origin_mailbox = Arc::new(TestMailbox::new(addr(0xa1), 1));
        let destination_mailbox = Arc::new(TestMailbox::new(addr(0xa2), 2));
        let origin = TimelockRouter::new(addr(0x71), origin_mailbox.clone(), addr(OWNER), WINDOW);
        let destination =
            TimelockRouter::new(addr(0x72), destination_mailbox.clone(), addr(OWNER), WINDOW);
        let owner = ctx(addr(OWNER), 0);
        origin
            .enroll_remote_router(&owner, RemoteRouterConfig { domain: 2, router: Some(addr(0x72)) })
            .unwrap();
        destination
            .enroll_remote_router(&owner, RemoteRouterConfig { domain: 1, router: Some(addr(0x71)) })
            .unwrap();
        Deployment {
            origin_mailbox,
            origin,
            destination_mailbox,
            destination,
        }
    }

    /// Dispatch a message on the origin mailbox and return it
    fn dispatch(deployment: &Deployment) -> HyperlaneMessage {
        let sender = ctx(addr(0x5e), 0);
        deployment
            .origin_mailbox
            .dispatch(&sender, 2, addr(0xb0b), b"hello".to_vec())
            .unwrap();
        deployment.origin_mailbox.dispatched().remove(0)
    }

    #[test]
    fn preverified_messages_wait_out_the_window() {
        let deployment = deploy();
        let message = dispatch(&deployment);
        let id = message.id();
        deployment
            .origin
            .post_dispatch(&ctx(addr(0xa1), 900), &message)
            .unwrap();

        // the hook sent the id to the destination router
        let forwarded = deployment.origin_mailbox.dispatched().remove(1);
        assert_eq!(forwarded.recipient, addr(0x72));
        assert_eq!(forwarded.sender, addr(0x71));
        assert_eq!(forwarded.body, id.as_bytes().to_vec());

        let destination = &deployment.destination;
        let mailbox = ctx(deployment.destination_mailbox.address(), 1000);
        destination
            .handle(&mailbox, forwarded.origin, forwarded.sender, &forwarded.body)
            .unwrap();
        assert_eq!(destination.ready_at(id), Some(4600));
        assert_eq!(destination.message_state(id, 1000), MessageState::Queued(4600));

        let err = destination
            .verify(&ctx(addr(0x99), 4599), &[], &message)
            .unwrap_err();
        assert_eq!(err, IsmError::MessageNotReadyUntil(4600));
        assert_eq!(err.kind(), IsmErrorKind::NotYetReady);
        assert_eq!(err.retry_after(), Some(4600));

        assert_eq!(destination.verify(&ctx(addr(0x99), 4600), &[], &message), Ok(true));
        assert_eq!(destination.message_state(id, 4600), MessageState::Ready(4600));
    }

    #[test]
    fn unseen_messages_do_not_verify() {
        let deployment = deploy();
        let message = message(1, 3, vec![]);
        assert_eq!(
            deployment.destination.verify(&ctx(addr(0x99), 10_000), &[], &message),
            Err(IsmError::NotPreverified(message.id()))
        );
    }

    #[test]
    fn first_preverification_wins() {
        let deployment = deploy();
        let destination = &deployment.destination;
        let id = H256::repeat_byte(0x42);
        let mailbox = ctx(addr(0xa2), 1000);
        destination
            .handle(&mailbox, 1, addr(0x71), id.as_bytes())
            .unwrap();
        assert_eq!(
            destination.handle(&ctx(addr(0xa2), 2000), 1, addr(0x71), id.as_bytes()),
            Err(IsmError::AlreadyPreverified(id))
        );
        assert_eq!(
            destination.manually_preverify_message(&ctx(addr(OWNER), 2000), id),
            Err(IsmError::AlreadyPreverified(id))
        );
        assert_eq!(destination.ready_at(id), Some(4600));
    }

    #[test]
    fn handle_authenticates_mailbox_and_router() {
        let deployment = deploy();
        let destination = &deployment.destination;
        let id = H256::repeat_byte(0x42);

        assert_eq!(
            destination.handle(&ctx(addr(0x66), 0), 1, addr(0x71), id.as_bytes()),
            Err(IsmError::UnauthorizedCaller {
                caller: addr(0x66),
                expected: addr(0xa2)
            })
        );
        assert_eq!(
            destination.handle(&ctx(addr(0xa2), 0), 1, addr(0x66), id.as_bytes()),
            Err(IsmError::NotRemoteRouter {
                domain: 1,
                sender: addr(0x66)
            })
        );
        assert_eq!(
            destination.handle(&ctx(addr(0xa2), 0), 3, addr(0x71), id.as_bytes()),
            Err(IsmError::NotRemoteRouter {
                domain: 3,
                sender: addr(0x71)
            })
        );
        assert!(matches!(
            destination.handle(&ctx(addr(0xa2), 0), 1, addr(0x71), &[1, 2, 3]),
            Err(IsmError::InvalidMessageBody(_))
        ));
        assert_eq!(destination.ready_at(id), None);
    }

    #[test]
    fn post_dispatch_requires_latest_message_and_router() {
        let deployment = deploy();
        let message = dispatch(&deployment);
        let stale = HyperlaneMessage {
            nonce: 99,
            ..message.clone()
        };
        assert_eq!(
            deployment.origin.post_dispatch(&ctx(addr(0xa1), 0), &stale),
            Err(IsmError::NotLatestDispatched(stale.id()))
        );

        deployment
            .origin
            .enroll_remote_router(&ctx(addr(OWNER), 0), RemoteRouterConfig { domain: 2, router: None })
            .unwrap();
        assert_eq!(
            deployment.origin.post_dispatch(&ctx(addr(0xa1), 0), &message),
            Err(IsmError::NoRouterEnrolled(2))
        );
    }

    #[test]
    fn manual_preverification_is_owner_only() {
        let deployment = deploy();
        let id = H256::repeat_byte(0x42);
        assert_eq!(
            deployment
                .destination
                .manually_preverify_message(&ctx(addr(0x66), 0), id),
            Err(IsmError::NotOwner(addr(0x66)))
        );
        deployment
            .destination
            .manually_preverify_message(&ctx(addr(OWNER), 50), id)
            .unwrap();
        assert_eq!(deployment.destination.ready_at(id), Some(3650));
    }

    #[test]
    fn ready_time_is_never_zero() {
        let mailbox = Arc::new(TestMailbox::new(addr(0xa2), 2));
        let router = TimelockRouter::new(addr(0x72), mailbox, addr(OWNER), 0);
        let message = message(1, 0, vec![]);
        router
            .manually_preverify_message(&ctx(addr(OWNER), 0), message.id())
            .unwrap();
        assert_eq!(router.ready_at(message.id()), Some(1));
        assert_eq!(router.message_state(message.id(), 0), MessageState::Queued(1));
        assert_eq!(
            router.verify(&ctx(addr(0x99), 0), &[], &message),
            Err(IsmError::MessageNotReadyUntil(1))
        );
        assert_eq!(router.verify(&ctx(addr(0x99), 1), &[], &message), Ok(true));
    }
}
