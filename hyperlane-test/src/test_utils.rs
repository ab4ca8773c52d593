use hyperlane_core::{address_to_h256, CallContext, HyperlaneMessage, H160, H256};

/// A 32 byte identifier wrapping the EVM address `n`
pub fn addr(n: u64) -> H256 {
    address_to_h256(H160::from_low_u64_be(n))
}

/// A call from `caller` at `timestamp` with no value
pub fn ctx(caller: H256, timestamp: u64) -> CallContext {
    CallContext::new(caller, timestamp)
}

/// A message from `origin` with the given nonce and body
pub fn message(origin: u32, nonce: u32, body: Vec<u8>) -> HyperlaneMessage {
    HyperlaneMessage {
        version: 3,
        nonce,
        origin,
        sender: addr(0xa11ce),
        destination: 1,
        recipient: addr(0xb0b),
        body,
    }
}

/// A message from `origin` with an empty body
pub fn dummy_message(origin: u32) -> HyperlaneMessage {
    message(origin, 0, vec![])
}
