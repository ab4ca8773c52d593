//! This crate contains core primitives, traits, and types for Hyperlane
//! interchain security modules.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

pub use error::*;
pub use traits::*;
pub use types::*;

/// Error types for Hyperlane
pub mod error;
/// Traits implemented by modules and the collaborators they consume
pub mod traits;
/// Core hyperlane system data structures
pub mod types;
/// Utilities
pub mod utils;
