pub use primitive_types::{H160, H256, U256};

pub use context::*;
pub use identifiers::*;
pub use message::*;
pub use offchain_lookup::*;
pub use token_message::*;

mod context;
mod identifiers;
mod message;
mod offchain_lookup;
mod token_message;
