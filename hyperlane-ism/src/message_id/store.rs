use std::collections::HashMap;

use parking_lot::RwLock;

use hyperlane_core::{IsmError, IsmResult, H256, U256};

/// What the authorized bridge told us about one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationRecord {
    /// The bridge attested to this message
    pub verified: bool,
    /// Value forwarded with the attestation and not yet released
    pub escrowed_value: U256,
}

/// Append-only attestation ledger. A record is written once and never
/// deleted; only its escrow is drained.
#[derive(Debug, Default)]
pub struct MessageIdStore {
    records: RwLock<HashMap<H256, VerificationRecord>>,
}

impl MessageIdStore {
    /// Record an attestation. A second attestation for the same id fails
    /// with `AlreadyVerified` and leaves the first untouched.
    pub fn attest(&self, id: H256, value: U256) -> IsmResult<()> {
        let mut records = self.records.write();
        let record = records.entry(id).or_default();
        if record.verified {
            return Err(IsmError::AlreadyVerified(id));
        }
        *record = VerificationRecord {
            verified: true,
            escrowed_value: value,
        };
        Ok(())
    }

    /// Whether `id` has been attested
    pub fn is_verified(&self, id: H256) -> bool {
        self.record(id).verified
    }

    /// The record for `id`, zero valued if never written
    pub fn record(&self, id: H256) -> VerificationRecord {
        self.records.read().get(&id).copied().unwrap_or_default()
    }

    /// Drain the escrow for `id`, returning what was held.
    pub fn take_escrow(&self, id: H256) -> U256 {
        self.records
            .write()
            .get_mut(&id)
            .map(|record| std::mem::take(&mut record.escrowed_value))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn second_attestation_is_rejected() {
        let store = MessageIdStore::default();
        let id = H256::repeat_byte(1);
        store.attest(id, U256::from(10u64)).unwrap();
        assert_eq!(
            store.attest(id, U256::from(99u64)),
            Err(IsmError::AlreadyVerified(id))
        );
        assert_eq!(store.record(id).escrowed_value, U256::from(10u64));
    }

    #[test]
    fn escrow_drains_once() {
        let store = MessageIdStore::default();
        let id = H256::repeat_byte(1);
        store.attest(id, U256::from(10u64)).unwrap();
        assert_eq!(store.take_escrow(id), U256::from(10u64));
        assert_eq!(store.take_escrow(id), U256::zero());
        assert!(store.is_verified(id));
    }

    #[test]
    fn unknown_ids_read_as_zero() {
        let store = MessageIdStore::default();
        assert_eq!(store.record(H256::zero()), VerificationRecord::default());
        assert_eq!(store.take_escrow(H256::zero()), U256::zero());
    }
}
