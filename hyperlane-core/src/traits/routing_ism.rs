use auto_impl::auto_impl;

use crate::{HyperlaneMessage, InterchainSecurityModule, IsmResult, H256};

/// A module that dispatches verification to another module chosen by the
/// message's origin. Routing itself never authenticates anything.
#[auto_impl(&, Box, Arc)]
pub trait RoutingIsm: InterchainSecurityModule {
    /// Returns the address of the module that verifies `message`
    fn route(&self, message: &HyperlaneMessage) -> IsmResult<H256>;
}
