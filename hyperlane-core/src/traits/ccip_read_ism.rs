use auto_impl::auto_impl;

use crate::{HyperlaneMessage, InterchainSecurityModule, IsmResult, OffchainLookup};

/// A module whose metadata has to be assembled by an off-chain gateway
#[auto_impl(&, Box, Arc)]
pub trait CcipReadIsm: InterchainSecurityModule {
    /// Describe the lookup a relayer performs to build metadata for
    /// `message`
    fn get_offchain_verify_info(&self, message: &HyperlaneMessage) -> IsmResult<OffchainLookup>;
}
