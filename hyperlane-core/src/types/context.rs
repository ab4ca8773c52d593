use crate::{H256, U256};

/// The environment a single entrypoint call executes in: who called, how
/// much native value was attached and the current block timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallContext {
    /// The immediate caller (`msg.sender`)
    pub caller: H256,
    /// Native value attached to the call (`msg.value`)
    pub value: U256,
    /// Block timestamp, in seconds
    pub timestamp: u64,
}

impl CallContext {
    /// A call from `caller` with no value attached
    pub fn new(caller: H256, timestamp: u64) -> Self {
        Self {
            caller,
            value: U256::zero(),
            timestamp,
        }
    }

    /// The same call with `value` attached
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// The same call made by another account
    pub fn from_caller(mut self, caller: H256) -> Self {
        self.caller = caller;
        self
    }
}
