use crate::{H256, U256};

/// The result of calling into an interchain security module.
pub type IsmResult<T> = Result<T, IsmError>;

/// Error types for the Hyperlane protocol encoding layer
#[derive(Debug, thiserror::Error)]
pub enum HyperlaneProtocolError {
    /// IO error from Read/Write usage
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// An unknown or invalid domain id was encountered
    #[error("Unknown or invalid domain ID ({0})")]
    UnknownDomainId(u32),
    /// A message body could not be decoded into the expected payload
    #[error("Invalid message body: {0}")]
    InvalidMessageBody(String),
}

/// Failure classes surfaced to relayers. Every [`IsmError`] belongs to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum IsmErrorKind {
    /// The caller, or the unwrapped cross-chain sender, is not trusted.
    Authorization,
    /// No module is configured for the message's origin.
    RoutingMiss,
    /// A second attestation or preverification for the same message.
    ReplayRejected,
    /// A time gate has not opened yet. Retry later.
    NotYetReady,
    /// Fewer than the required number of sub-modules verified.
    AggregationInsufficient,
    /// Metadata or payload could not be decoded, or refers to another message.
    MalformedProof,
    /// Set-time validation of owner supplied configuration.
    Configuration,
    /// The module is halted.
    Paused,
    /// Off-chain proof data could not be obtained.
    OffchainLookup,
}

/// Errors returned by interchain security modules. An `Err` is the
/// equivalent of a revert: the whole call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsmError {
    /// The immediate caller is not the bridge endpoint / mailbox
    #[error("Caller {caller:?} is not {expected:?}")]
    UnauthorizedCaller {
        /// The immediate caller
        caller: H256,
        /// The only caller allowed
        expected: H256,
    },
    /// The unwrapped cross-chain sender is not the authorized hook
    #[error("Cross-chain sender {sender:?} is not the authorized hook {expected:?}")]
    UnauthorizedSender {
        /// Logical sender reported by the bridge
        sender: H256,
        /// The authorized hook
        expected: H256,
    },
    /// The bridge delivered a message from an unexpected source chain
    #[error("Unexpected source chain {actual}, expected {expected}")]
    WrongSourceChain {
        /// Configured source chain
        expected: u64,
        /// Source chain reported by the bridge
        actual: u64,
    },
    /// Owner-only entrypoint called by someone else
    #[error("Caller {0:?} is not the owner")]
    NotOwner(H256),
    /// Sender is not the router enrolled for the origin
    #[error("Sender {sender:?} is not the enrolled router for domain {domain}")]
    NotRemoteRouter {
        /// Origin domain
        domain: u32,
        /// Claimed sender
        sender: H256,
    },
    /// No module for the message's origin and no fallback
    #[error("No ISM found for origin domain {0}")]
    NoRouteForOrigin(u32),
    /// No remote router is enrolled for the destination
    #[error("No router enrolled for domain {0}")]
    NoRouterEnrolled(u32),
    /// A message id was attested twice
    #[error("Message {0:?} already verified")]
    AlreadyVerified(H256),
    /// The mailbox already delivered this message
    #[error("Message {0:?} already delivered")]
    AlreadyDelivered(H256),
    /// A message id was preverified twice
    #[error("Message {0:?} already preverified")]
    AlreadyPreverified(H256),
    /// A message id was never preverified
    #[error("Message {0:?} not preverified")]
    NotPreverified(H256),
    /// The timelock for a message has not elapsed
    #[error("Message not ready until {0}")]
    MessageNotReadyUntil(u64),
    /// Aggregation could not reach its threshold
    #[error("Threshold not met: {verified} of {threshold} required modules verified")]
    ThresholdNotMet {
        /// Sub-modules that verified
        verified: u8,
        /// Required threshold
        threshold: u8,
    },
    /// Metadata failed to decode as the expected structure
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    /// Proof or payload refers to a different message
    #[error("Proof attests message {actual:?}, expected {expected:?}")]
    MessageIdMismatch {
        /// Id of the message being verified
        expected: H256,
        /// Id carried by the proof
        actual: H256,
    },
    /// The external bridge refused to finalize
    #[error("Bridge rejected proof: {0}")]
    BridgeRejected(String),
    /// The message body is not a valid payload for this module
    #[error("Invalid message body: {0}")]
    InvalidMessageBody(String),
    /// Aggregation metadata range points outside the metadata
    #[error("Metadata range for module {0} is out of bounds")]
    MetadataOutOfBounds(usize),
    /// Declared and attached native value differ
    #[error("Attached value {actual} does not match declared value {declared}")]
    ValueMismatch {
        /// Value argument
        declared: U256,
        /// `msg.value`
        actual: U256,
    },
    /// A module referenced by address does not exist
    #[error("Address {0:?} is not a deployed module")]
    NotContract(H256),
    /// A module is already deployed at an address
    #[error("Address {0:?} is already deployed")]
    AlreadyDeployed(H256),
    /// The same module was listed twice
    #[error("Module {0:?} listed more than once")]
    DuplicateModule(H256),
    /// Incremental routing forbids overwriting
    #[error("Domain {0} already has a module")]
    DomainAlreadySet(u32),
    /// Removing a domain that has no entry
    #[error("Domain {0} has no module")]
    DomainNotSet(u32),
    /// Incremental routing forbids removal
    #[error("Removal is not supported by this routing module")]
    RemovalNotSupported,
    /// `m` out of range for `n` modules
    #[error("Invalid threshold {threshold} for {modules} modules")]
    InvalidThreshold {
        /// Requested threshold
        threshold: u8,
        /// Number of modules
        modules: usize,
    },
    /// A delegated-to module returned false
    #[error("Module {0:?} did not verify the message")]
    VerifyRejected(H256),
    /// Hook called for a message that was not just dispatched
    #[error("Message {0:?} is not the latest dispatched message")]
    NotLatestDispatched(H256),
    /// The module is paused
    #[error("Pausable: paused")]
    Paused,
    /// Requested amount exceeds the remaining rate limit capacity
    #[error("Rate limit exceeded: requested {requested}, available {available}")]
    RateLimitExceeded {
        /// Amount carried by the message
        requested: U256,
        /// Capacity left in the window
        available: U256,
    },
    /// Every off-chain lookup URL failed
    #[error("Offchain lookup failed: {0}")]
    OffchainLookupFailed(String),
}

impl IsmError {
    /// The failure class of this error.
    pub fn kind(&self) -> IsmErrorKind {
        use IsmError::*;
        match self {
            UnauthorizedCaller { .. }
            | UnauthorizedSender { .. }
            | WrongSourceChain { .. }
            | NotOwner(_)
            | NotRemoteRouter { .. } => IsmErrorKind::Authorization,
            NoRouteForOrigin(_) | NoRouterEnrolled(_) => IsmErrorKind::RoutingMiss,
            AlreadyVerified(_) | AlreadyDelivered(_) | AlreadyPreverified(_) => {
                IsmErrorKind::ReplayRejected
            }
            NotPreverified(_) | MessageNotReadyUntil(_) | RateLimitExceeded { .. } => {
                IsmErrorKind::NotYetReady
            }
            ThresholdNotMet { .. } | VerifyRejected(_) => IsmErrorKind::AggregationInsufficient,
            MalformedProof(_)
            | MessageIdMismatch { .. }
            | BridgeRejected(_)
            | InvalidMessageBody(_)
            | MetadataOutOfBounds(_)
            | ValueMismatch { .. } => IsmErrorKind::MalformedProof,
            NotContract(_)
            | AlreadyDeployed(_)
            | DuplicateModule(_)
            | DomainAlreadySet(_)
            | DomainNotSet(_)
            | RemovalNotSupported
            | InvalidThreshold { .. }
            | NotLatestDispatched(_) => IsmErrorKind::Configuration,
            Paused => IsmErrorKind::Paused,
            OffchainLookupFailed(_) => IsmErrorKind::OffchainLookup,
        }
    }

    /// Timestamp after which retrying the same call may succeed.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            IsmError::MessageNotReadyUntil(ready_at) => Some(*ready_at),
            _ => None,
        }
    }
}

impl From<HyperlaneProtocolError> for IsmError {
    fn from(err: HyperlaneProtocolError) -> Self {
        match err {
            HyperlaneProtocolError::InvalidMessageBody(reason) => {
                IsmError::InvalidMessageBody(reason)
            }
            other => IsmError::MalformedProof(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_ready_surfaces_retry_time() {
        let err = IsmError::MessageNotReadyUntil(4600);
        assert_eq!(err.kind(), IsmErrorKind::NotYetReady);
        assert_eq!(err.retry_after(), Some(4600));
        assert_eq!(err.to_string(), "Message not ready until 4600");
        assert_eq!(IsmError::Paused.retry_after(), None);
    }

    #[test]
    fn replay_and_routing_are_classified() {
        assert_eq!(
            IsmError::AlreadyVerified(H256::zero()).kind(),
            IsmErrorKind::ReplayRejected
        );
        assert_eq!(
            IsmError::AlreadyDelivered(H256::zero()).kind(),
            IsmErrorKind::ReplayRejected
        );
        assert_ne!(
            IsmError::AlreadyDelivered(H256::zero()),
            IsmError::AlreadyVerified(H256::zero())
        );
        assert_eq!(
            IsmError::NoRouteForOrigin(7).to_string(),
            "No ISM found for origin domain 7"
        );
        assert_eq!(
            IsmError::NoRouteForOrigin(7).kind(),
            IsmErrorKind::RoutingMiss
        );
    }

    #[test]
    fn decode_errors_become_malformed_proofs() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: IsmError = HyperlaneProtocolError::from(io).into();
        assert_eq!(err.kind(), IsmErrorKind::MalformedProof);
    }
}
