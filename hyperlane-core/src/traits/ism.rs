use std::fmt::Debug;

use auto_impl::auto_impl;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::{CallContext, HyperlaneMessage, IsmResult, H256};

/// Something deployed at an address
#[auto_impl(&, Box, Arc)]
pub trait HyperlaneContract {
    /// Address of the contract
    fn address(&self) -> H256;
}

/// Enumeration of all known module types
#[derive(
    FromPrimitive,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[cfg_attr(test, derive(strum::EnumIter))]
pub enum ModuleType {
    /// INVALID ISM
    #[default]
    Unused,
    /// Routing ISM (defers to another ISM)
    Routing,
    /// Aggregation ISM (aggregates multiple ISMs)
    Aggregation,
    /// Legacy ISM (DEPRECATED)
    LegacyMultisig,
    /// Merkle Proof ISM (batching and censorship resistance)
    MerkleRootMultisig,
    /// Message ID ISM (cheapest multisig with no batching)
    MessageIdMultisig,
    /// No metadata ISM (no metadata)
    Null,
    /// Ccip Read ISM (accepts offchain signature information)
    CcipRead,
    /// Arbitrum L2 to L1 ISM (verifies outbox execution)
    ArbL2ToL1,
    /// Weighted Merkle Root Multisig ISM
    WeightedMerkleRootMultisig,
    /// Weighted Message ID Multisig ISM
    WeightedMessageIdMultisig,
    /// OP stack L2 to L1 ISM (verifies portal withdrawals)
    OpL2ToL1,
    /// Origin block hash ISM
    Blockhash,
    /// Superchain interop ISM (verifies L2 to L2 relays)
    Superchain,
}

impl ModuleType {
    /// Look up a module type by its on-chain discriminant
    pub fn from_u8(value: u8) -> Option<Self> {
        FromPrimitive::from_u8(value)
    }

    /// The on-chain discriminant
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Interface for an interchain security module. Allows abstraction over the
/// different verification strategies a destination chain may use.
#[auto_impl(&, Box, Arc)]
pub trait InterchainSecurityModule: HyperlaneContract + Send + Sync + Debug {
    /// The type of metadata this module expects
    fn module_type(&self) -> ModuleType;

    /// Decide whether `message` is authentic.
    ///
    /// `Ok(true)` accepts the message and `Ok(false)` declines it without
    /// reverting. An `Err` fails the whole call. Side effects performed
    /// before an `Err` are the caller's concern.
    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool>;
}
