use tracing::info;

use hyperlane_core::{IsmResult, H256};

use crate::aggregation::{format_metadata, StaticAggregationIsmFactory, SubModuleMetadata};

/// Addresses of an optimistic security deployment.
///
/// `inner` is the 2-of-2 aggregation of `pausable` and `timelock`, `outer`
/// is the 1-of-2 aggregation of `inner` and `proof`. Messages either wait
/// out the timelock while the watchers have a chance to pause, or carry a
/// full bridge proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticSecurity {
    pub pausable: H256,
    pub timelock: H256,
    pub proof: H256,
    pub inner: H256,
    pub outer: H256,
}

/// Deploy both aggregation layers through `factory`. All three members must
/// already be deployed.
pub fn deploy_optimistic_security(
    factory: &StaticAggregationIsmFactory,
    pausable: H256,
    timelock: H256,
    proof: H256,
) -> IsmResult<OptimisticSecurity> {
    let inner = factory.deploy(&[pausable, timelock], 2)?;
    let outer = factory.deploy(&[inner, proof], 1)?;
    info!(?inner, ?outer, ?proof, "Optimistic security deployed");
    Ok(OptimisticSecurity {
        pausable,
        timelock,
        proof,
        inner,
        outer,
    })
}

/// Metadata slot of `member` in a sorted two member aggregation
fn slot(member: H256, other: H256) -> usize {
    usize::from(member > other)
}

impl OptimisticSecurity {
    /// Outer metadata that takes the pausable + timelock path.
    pub fn fast_path_metadata(&self, pausable_metadata: Vec<u8>, timelock_metadata: Vec<u8>) -> Vec<u8> {
        let mut inner = vec![
            SubModuleMetadata::new(slot(self.pausable, self.timelock), pausable_metadata),
            SubModuleMetadata::new(slot(self.timelock, self.pausable), timelock_metadata),
        ];
        inner.sort_by_key(|meta| meta.index);
        let inner_metadata = format_metadata(&mut inner, 2);
        let mut outer = vec![SubModuleMetadata::new(
            slot(self.inner, self.proof),
            inner_metadata,
        )];
        format_metadata(&mut outer, 2)
    }

    /// Outer metadata that takes the bridge proof path.
    pub fn proof_path_metadata(&self, proof_metadata: Vec<u8>) -> Vec<u8> {
        let mut outer = vec![SubModuleMetadata::new(
            slot(self.proof, self.inner),
            proof_metadata,
        )];
        format_metadata(&mut outer, 2)
    }
}
