use std::fmt::Debug;

use auto_impl::auto_impl;

use crate::{CallContext, HyperlaneContract, IsmResult, H256};

/// The message passing ledger as seen by security modules. Only the calls
/// modules consume are modelled.
#[auto_impl(&, Box, Arc)]
pub trait Mailbox: HyperlaneContract + Send + Sync + Debug {
    /// Domain of the chain this mailbox lives on
    fn local_domain(&self) -> u32;

    /// Address of the protocol-wide default module
    fn default_ism(&self) -> H256;

    /// Whether a message has already been delivered
    fn delivered(&self, id: H256) -> bool;

    /// The account that delivered a message, if any
    fn processor(&self, id: H256) -> Option<H256>;

    /// Id of the most recently dispatched message
    fn latest_dispatched_id(&self) -> H256;

    /// Dispatch a message to `recipient` on `destination`, returning its id
    fn dispatch(
        &self,
        ctx: &CallContext,
        destination: u32,
        recipient: H256,
        body: Vec<u8>,
    ) -> IsmResult<H256>;
}
