use std::collections::BTreeMap;

use itertools::Itertools;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use hyperlane_core::{IsmError, IsmResult, H256};

/// How a routing table may change once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
pub enum RoutingPolicy {
    /// Entries can be overwritten and removed
    #[default]
    Mutable,
    /// Append only: no overwrites, no removals
    Incremental,
}

/// Origin domain to module address.
#[derive(Debug, Default)]
pub struct RoutingTable {
    policy: RoutingPolicy,
    entries: RwLock<BTreeMap<u32, H256>>,
}

impl RoutingTable {
    pub fn new(policy: RoutingPolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Point `domain` at `module`
    pub fn set(&self, domain: u32, module: H256) -> IsmResult<()> {
        self.set_many(&[(domain, module)])
    }

    /// Write several entries. Either all are written or none.
    pub fn set_many(&self, entries: &[(u32, H256)]) -> IsmResult<()> {
        let mut table = self.entries.write();
        if self.policy == RoutingPolicy::Incremental {
            let domains = entries.iter().map(|(domain, _)| *domain);
            if let Some(domain) = domains
                .clone()
                .find(|domain| table.contains_key(domain))
                .or_else(|| domains.duplicates().next())
            {
                return Err(IsmError::DomainAlreadySet(domain));
            }
        }
        table.extend(entries.iter().copied());
        Ok(())
    }

    /// Drop the entry for `domain`, returning what it pointed at
    pub fn remove(&self, domain: u32) -> IsmResult<H256> {
        if self.policy == RoutingPolicy::Incremental {
            return Err(IsmError::RemovalNotSupported);
        }
        self.entries
            .write()
            .remove(&domain)
            .ok_or(IsmError::DomainNotSet(domain))
    }

    pub fn get(&self, domain: u32) -> Option<H256> {
        self.entries.read().get(&domain).copied()
    }

    /// Configured domains, ascending
    pub fn domains(&self) -> Vec<u32> {
        self.entries.read().keys().copied().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mutable_tables_overwrite_and_remove() {
        let table = RoutingTable::new(RoutingPolicy::Mutable);
        table.set(5, H256::repeat_byte(1)).unwrap();
        table.set(5, H256::repeat_byte(2)).unwrap();
        assert_eq!(table.get(5), Some(H256::repeat_byte(2)));
        assert_eq!(table.remove(5), Ok(H256::repeat_byte(2)));
        assert_eq!(table.remove(5), Err(IsmError::DomainNotSet(5)));
    }

    #[test]
    fn incremental_tables_are_append_only() {
        let table = RoutingTable::new(RoutingPolicy::Incremental);
        table.set(5, H256::repeat_byte(1)).unwrap();
        assert_eq!(
            table.set(5, H256::repeat_byte(2)),
            Err(IsmError::DomainAlreadySet(5))
        );
        assert_eq!(table.remove(5), Err(IsmError::RemovalNotSupported));
        assert_eq!(table.remove(6), Err(IsmError::RemovalNotSupported));
        table.set(3, H256::repeat_byte(3)).unwrap();
        assert_eq!(table.domains(), vec![3, 5]);
    }

    #[test]
    fn incremental_batches_are_atomic() {
        let table = RoutingTable::new(RoutingPolicy::Incremental);
        table.set(5, H256::repeat_byte(1)).unwrap();
        assert_eq!(
            table.set_many(&[(6, H256::repeat_byte(2)), (5, H256::repeat_byte(2))]),
            Err(IsmError::DomainAlreadySet(5))
        );
        assert_eq!(
            table.set_many(&[(7, H256::repeat_byte(2)), (7, H256::repeat_byte(3))]),
            Err(IsmError::DomainAlreadySet(7))
        );
        assert_eq!(table.domains(), vec![5]);
    }
}
