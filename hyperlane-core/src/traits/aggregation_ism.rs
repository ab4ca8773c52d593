use auto_impl::auto_impl;

use crate::{HyperlaneMessage, InterchainSecurityModule, IsmResult, H256};

/// An m-of-n composition of other modules
#[auto_impl(&, Box, Arc)]
pub trait AggregationIsm: InterchainSecurityModule {
    /// Returns the member modules and the threshold needed to verify
    /// `message`. Members are in metadata order.
    fn modules_and_threshold(&self, message: &HyperlaneMessage) -> IsmResult<(Vec<H256>, u8)>;
}
