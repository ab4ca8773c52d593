//! Runtime plumbing shared by binaries embedding the security modules:
//! settings loading and tracing setup.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use settings::*;

/// Settings and tracing configuration
pub mod settings;
