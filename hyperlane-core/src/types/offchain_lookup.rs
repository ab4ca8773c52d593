use derive_new::new;

use crate::H256;

/// An ERC-3668 off-chain lookup request, returned as a value instead of
/// being signalled through a revert.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct OffchainLookup {
    /// The contract asking for the lookup
    pub sender: H256,
    /// Gateway URL templates, tried in order
    pub urls: Vec<String>,
    /// Data the gateway is asked to resolve
    pub call_data: Vec<u8>,
    /// Selector of the function the result is passed to
    pub callback_function: [u8; 4],
    /// Opaque data passed through to the callback
    pub extra_data: Vec<u8>,
}
