//! One bridge strategy per external messaging bridge. Each plugs into
//! [`MessageIdAuthorizedIsm`](crate::message_id::MessageIdAuthorizedIsm).

pub use arbitrum::*;
pub use ccip::*;
pub use erc5164::*;
pub use optimism::*;
pub use polygon::*;
pub use polygon_zkevm::*;
pub use superchain::*;

use crate::message_id::MessageIdAuthorizedIsm;

mod arbitrum;
mod ccip;
mod erc5164;
mod optimism;
mod polygon;
mod polygon_zkevm;
mod superchain;

/// Arbitrum L2 to L1 module
pub type ArbL2ToL1Ism = MessageIdAuthorizedIsm<ArbitrumBridge>;
/// Optimism L1 to L2 module
pub type OptimismIsm = MessageIdAuthorizedIsm<OptimismBridge>;
/// OP stack L2 to L1 module
pub type OpL2ToL1Ism = MessageIdAuthorizedIsm<OpStackL2ToL1Bridge>;
/// Polygon PoS module
pub type PolygonPosIsm = MessageIdAuthorizedIsm<PolygonPosBridge>;
/// Polygon zkEVM module
pub type PolygonZkEvmIsm = MessageIdAuthorizedIsm<PolygonZkEvmBridge>;
/// Chainlink CCIP module
pub type CcipIsm = MessageIdAuthorizedIsm<CcipBridge>;
/// Superchain interop module
pub type SuperchainIsm = MessageIdAuthorizedIsm<SuperchainBridge>;
/// ERC-5164 module
pub type Erc5164Ism = MessageIdAuthorizedIsm<Erc5164Bridge>;
