//! Interchain security modules: bridge authenticated modules, routing,
//! aggregation, timelocks and the machinery to compose them.

#![forbid(unsafe_code)]

pub use access_control::{AccessControl, Ownable};
pub use registry::{create2_address, create_address, IsmRegistry, RegistryHandle};

/// ABI helpers for bridge payloads
pub mod abi;
mod access_control;
/// m-of-n aggregation
pub mod aggregation;
/// Bridge specific message id modules
pub mod bridges;
/// Off-chain lookup support
pub mod ccip_read;
/// Optimistic security composition
pub mod composition;
/// Declarative module configuration
pub mod config;
/// Deploys module trees from configuration
pub mod deploy;
/// Shared core of bridge authenticated modules
pub mod message_id;
/// Pausable module
pub mod pausable;
mod registry;
/// Origin based routing
pub mod routing;
/// Unconditional module for tests
pub mod test_ism;
/// Timelocked preverification router
pub mod timelock;
/// Trusted relayer module
pub mod trusted_relayer;
