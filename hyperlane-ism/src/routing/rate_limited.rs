use std::collections::{HashMap, HashSet};

use derive_more::Deref;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use hyperlane_core::{
    CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule, IsmError,
    IsmResult, ModuleType, RoutingIsm, TokenMessage, H256, U256,
};

use super::DomainRoutingIsm;
use crate::{AccessControl, Ownable};

/// Length of a rate limit window, in seconds
pub const RATE_LIMIT_DURATION: u64 = 86_400;

/// Rolling capacity that refills linearly over [`RATE_LIMIT_DURATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    max_capacity: U256,
    filled_level: U256,
    last_updated: u64,
}

impl RateLimit {
    /// A full limit of `max_capacity` per window
    pub fn new(max_capacity: U256, now: u64) -> Self {
        Self {
            max_capacity,
            filled_level: max_capacity,
            last_updated: now,
        }
    }

    pub fn max_capacity(&self) -> U256 {
        self.max_capacity
    }

    /// Capacity regained per second
    pub fn refill_rate(&self) -> U256 {
        self.max_capacity / U256::from(RATE_LIMIT_DURATION)
    }

    /// Capacity available at `now`
    pub fn available(&self, now: u64) -> U256 {
        let elapsed = now.saturating_sub(self.last_updated);
        if elapsed >= RATE_LIMIT_DURATION {
            return self.max_capacity;
        }
        let refilled = self
            .filled_level
            .saturating_add(self.refill_rate().saturating_mul(U256::from(elapsed)));
        refilled.min(self.max_capacity)
    }

    /// Take `amount` out of the capacity available at `now`.
    pub fn consume(&mut self, amount: U256, now: u64) -> IsmResult<U256> {
        let available = self.available(now);
        if amount > available {
            return Err(IsmError::RateLimitExceeded {
                requested: amount,
                available,
            });
        }
        self.filled_level = available - amount;
        self.last_updated = now;
        Ok(self.filled_level)
    }
}

/// Domain routing for warp route transfers with a per-origin ceiling on
/// the transferred amount. Origins without a limit are not limited. A
/// transfer is charged once; verifying it again is free.
/// Route management goes through the wrapped [`DomainRoutingIsm`].
#[derive(Debug, Deref)]
pub struct WarpRateLimitingIsm {
    #[deref]
    routing: DomainRoutingIsm,
    limits: RwLock<HashMap<u32, RateLimit>>,
    validated: RwLock<HashSet<H256>>,
}

impl WarpRateLimitingIsm {
    pub fn new(routing: DomainRoutingIsm) -> Self {
        Self {
            routing,
            limits: RwLock::new(HashMap::new()),
            validated: RwLock::new(HashSet::new()),
        }
    }

    /// Limit transfers from `origin` to `max_capacity` per window. Owner
    /// only. The new limit starts full.
    pub fn set_rate_limit(&self, ctx: &CallContext, origin: u32, max_capacity: U256) -> IsmResult<()> {
        self.ensure_owner(ctx)?;
        self.limits
            .write()
            .insert(origin, RateLimit::new(max_capacity, ctx.timestamp));
        info!(origin, %max_capacity, "Rate limit set");
        Ok(())
    }

    pub fn rate_limit(&self, origin: u32) -> Option<RateLimit> {
        self.limits.read().get(&origin).copied()
    }

    /// Capacity left for `origin` at `now`, `None` when unlimited
    pub fn available(&self, origin: u32, now: u64) -> Option<U256> {
        self.rate_limit(origin).map(|limit| limit.available(now))
    }

    /// Whether the transfer `id` has already been charged
    pub fn is_validated(&self, id: H256) -> bool {
        self.validated.read().contains(&id)
    }
}

impl AccessControl for WarpRateLimitingIsm {
    fn ownable(&self) -> &Ownable {
        self.routing.ownable()
    }
}

impl HyperlaneContract for WarpRateLimitingIsm {
    fn address(&self) -> H256 {
        self.routing.address()
    }
}

impl RoutingIsm for WarpRateLimitingIsm {
    fn route(&self, message: &HyperlaneMessage) -> IsmResult<H256> {
        self.routing.route(message)
    }
}

impl InterchainSecurityModule for WarpRateLimitingIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::Routing
    }

    #[instrument(skip_all, fields(ism = ?self.address(), origin = message.origin))]
    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        let Some(limit) = self.rate_limit(message.origin) else {
            return self.routing.verify(ctx, metadata, message);
        };
        let id = message.id();
        if self.is_validated(id) {
            debug!(?id, "Transfer already charged");
            return Ok(true);
        }
        let amount = TokenMessage::parse(&message.body)?.amount();
        let available = limit.available(ctx.timestamp);
        if amount > available {
            return Err(IsmError::RateLimitExceeded {
                requested: amount,
                available,
            });
        }

        self.routing.verify(ctx, metadata, message)?;

        let mut limits = self.limits.write();
        let limit = limits
            .get_mut(&message.origin)
            .ok_or(IsmError::NoRouteForOrigin(message.origin))?;
        let remaining = limit.consume(amount, ctx.timestamp)?;
        self.validated.write().insert(id);
        info!(%amount, %remaining, "Rate limit consumed");
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use hyperlane_test::test_utils::{addr, ctx, message};
    use rstest::rstest;

    use super::*;
    use crate::test_ism::TestIsm;
    use crate::IsmRegistry;

    const OWNER: u64 = 0x0e;
    const DAY: u64 = RATE_LIMIT_DURATION;

    fn transfer(origin: u32, amount: u64) -> HyperlaneMessage {
        let body = hyperlane_core::Encode::to_vec(&TokenMessage::new(
            addr(0xb0b),
            U256::from(amount),
            vec![],
        ));
        message(origin, 0, body)
    }

    fn setup(accept: bool) -> (IsmRegistry, WarpRateLimitingIsm) {
        let registry = IsmRegistry::new();
        let inner = registry.next_address(addr(OWNER));
        registry.deploy(TestIsm::new(inner, accept)).unwrap();
        let ism = WarpRateLimitingIsm::new(DomainRoutingIsm::new(
            addr(0x20),
            addr(OWNER),
            registry.handle(),
        ));
        // route management through the wrapped table
        ism.set_many(&ctx(addr(OWNER), 0), &[(5, inner), (6, inner)])
            .unwrap();
        ism.set_rate_limit(&ctx(addr(OWNER), 0), 5, U256::from(DAY * 10))
            .unwrap();
        (registry, ism)
    }

    #[rstest]
    #[case(0, DAY * 10)]
    #[case(DAY / 2, DAY * 10)]
    #[case(DAY, DAY * 10)]
    fn limits_start_full(#[case] now: u64, #[case] expected: u64) {
        let limit = RateLimit::new(U256::from(DAY * 10), 0);
        assert_eq!(limit.available(now), U256::from(expected));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(100, 1_000)]
    #[case(DAY / 2, DAY * 5)]
    #[case(DAY * 2, DAY * 10)]
    fn capacity_refills_linearly(#[case] elapsed: u64, #[case] expected: u64) {
        let mut limit = RateLimit::new(U256::from(DAY * 10), 0);
        limit.consume(U256::from(DAY * 10), 0).unwrap();
        assert_eq!(limit.available(elapsed), U256::from(expected));
    }

    #[test]
    fn over_limit_transfers_are_rejected_without_consuming() {
        let (_registry, ism) = setup(true);
        let limit = U256::from(DAY * 10);
        assert_eq!(
            ism.verify(&ctx(addr(1), 0), &[], &transfer(5, DAY * 10 + 1)),
            Err(IsmError::RateLimitExceeded {
                requested: U256::from(DAY * 10 + 1),
                available: limit
            })
        );
        assert_eq!(ism.available(5, 0), Some(limit));
    }

    #[test]
    fn verified_transfers_consume_capacity() {
        let (_registry, ism) = setup(true);
        assert_eq!(ism.verify(&ctx(addr(1), 10), &[], &transfer(5, DAY * 6)), Ok(true));
        assert_eq!(ism.available(5, 10), Some(U256::from(DAY * 4)));
        assert!(matches!(
            ism.verify(&ctx(addr(1), 10), &[], &transfer(5, DAY * 6)),
            Err(IsmError::RateLimitExceeded { .. })
        ));
        // unlimited origin
        assert_eq!(ism.verify(&ctx(addr(1), 10), &[], &transfer(6, DAY * 100)), Ok(true));
        assert_eq!(ism.available(6, 10), None);
    }

    #[test]
    fn repeated_verification_charges_once() {
        let (_registry, ism) = setup(true);
        let sent = transfer(5, DAY * 4);
        for _ in 0..3 {
            assert_eq!(ism.verify(&ctx(addr(1), 10), &[], &sent), Ok(true));
        }
        assert!(ism.is_validated(sent.id()));
        assert_eq!(ism.available(5, 10), Some(U256::from(DAY * 6)));
    }

    #[test]
    fn rejected_transfers_do_not_consume() {
        let (_registry, ism) = setup(false);
        assert!(matches!(
            ism.verify(&ctx(addr(1), 0), &[], &transfer(5, 1)),
            Err(IsmError::VerifyRejected(_))
        ));
        assert_eq!(ism.available(5, 0), Some(U256::from(DAY * 10)));
    }

    #[test]
    fn non_token_bodies_are_rejected_on_limited_origins() {
        let (_registry, ism) = setup(true);
        assert!(matches!(
            ism.verify(&ctx(addr(1), 0), &[], &message(5, 0, vec![1, 2, 3])),
            Err(IsmError::InvalidMessageBody(_))
        ));
    }

    #[test]
    fn only_owner_sets_limits() {
        let (_registry, ism) = setup(true);
        assert_eq!(
            ism.set_rate_limit(&ctx(addr(2), 0), 6, U256::one()),
            Err(IsmError::NotOwner(addr(2)))
        );
    }
}
