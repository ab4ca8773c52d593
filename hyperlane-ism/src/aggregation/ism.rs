use tracing::{debug, instrument, warn};

use hyperlane_core::{
    AggregationIsm, CallContext, HyperlaneContract, HyperlaneMessage, InterchainSecurityModule,
    IsmError, IsmResult, ModuleType, H256,
};

use super::metadata_at;
use crate::RegistryHandle;

/// Verifies a message if at least `threshold` of its members do.
///
/// Members are fixed at construction, stored sorted by address, and the
/// metadata ranges follow that order. Members given no metadata are skipped.
/// A member that errors counts as a failure and does not abort the
/// aggregation.
#[derive(Debug)]
pub struct StaticAggregationIsm {
    address: H256,
    modules: Vec<H256>,
    threshold: u8,
    registry: RegistryHandle,
}

impl StaticAggregationIsm {
    /// An aggregation of `modules` requiring `threshold` of them.
    pub fn new(
        address: H256,
        modules: Vec<H256>,
        threshold: u8,
        registry: RegistryHandle,
    ) -> IsmResult<Self> {
        let modules = normalize_modules(&modules, threshold)?;
        Ok(Self {
            address,
            modules,
            threshold,
            registry,
        })
    }

    pub fn modules(&self) -> &[H256] {
        &self.modules
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

/// Sort `modules` and check that `threshold` makes sense for them.
pub(crate) fn normalize_modules(modules: &[H256], threshold: u8) -> IsmResult<Vec<H256>> {
    let mut sorted = modules.to_vec();
    sorted.sort();
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(IsmError::DuplicateModule(pair[0]));
    }
    if threshold == 0 || threshold as usize > sorted.len() {
        return Err(IsmError::InvalidThreshold {
            threshold,
            modules: sorted.len(),
        });
    }
    Ok(sorted)
}

impl HyperlaneContract for StaticAggregationIsm {
    fn address(&self) -> H256 {
        self.address
    }
}

impl AggregationIsm for StaticAggregationIsm {
    fn modules_and_threshold(&self, _: &HyperlaneMessage) -> IsmResult<(Vec<H256>, u8)> {
        Ok((self.modules.clone(), self.threshold))
    }
}

impl InterchainSecurityModule for StaticAggregationIsm {
    fn module_type(&self) -> ModuleType {
        ModuleType::Aggregation
    }

    #[instrument(skip_all, fields(ism = ?self.address, threshold = self.threshold, verified = tracing::field::Empty))]
    fn verify(
        &self,
        ctx: &CallContext,
        metadata: &[u8],
        message: &HyperlaneMessage,
    ) -> IsmResult<bool> {
        let threshold = self.threshold as usize;
        let mut verified = 0usize;
        for (index, module) in self.modules.iter().enumerate() {
            let remaining = self.modules.len() - index;
            if verified + remaining < threshold {
                break;
            }
            let Some(sub_metadata) = metadata_at(metadata, index)? else {
                debug!(index, ?module, "No metadata for module, skipping");
                continue;
            };
            let ism = self.registry.get(*module)?;
            match ism.verify(ctx, sub_metadata, message) {
                Ok(true) => {
                    verified += 1;
                    if verified >= threshold {
                        tracing::Span::current().record("verified", verified);
                        return Ok(true);
                    }
                }
                Ok(false) => debug!(index, ?module, "Module declined message"),
                Err(err) => warn!(index, ?module, error = %err, "Module failed to verify"),
            }
        }
        tracing::Span::current().record("verified", verified);
        Err(IsmError::ThresholdNotMet {
            verified: verified as u8,
            threshold: self.threshold,
        })
    }
}
