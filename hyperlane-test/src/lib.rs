//! This crate contains mocks and utilities for testing Hyperlane security
//! modules.

#![forbid(unsafe_code)]
#![cfg_attr(test, warn(missing_docs))]

/// Mock contracts
pub mod mocks;
/// Message and address builders
pub mod test_utils;
