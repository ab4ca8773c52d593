use std::ops::Deref;

use crate::{Decode, Encode, HyperlaneProtocolError, H160, H256};

/// Identifier type.
///
/// Addresses are always carried as 32 bytes. EVM addresses are left padded
/// with 12 zero bytes.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct HyperlaneIdentifier(H256);

impl HyperlaneIdentifier {
    /// Check if the identifier is an ethereum address. This checks
    /// that the first 12 bytes are all 0.
    pub fn is_ethereum_address(&self) -> bool {
        self.0.as_bytes()[0..12].iter().all(|b| *b == 0)
    }

    /// Cast to an ethereum address by truncating.
    pub fn as_ethereum_address(&self) -> H160 {
        H160::from_slice(&self.0.as_ref()[12..])
    }
}

impl From<H256> for HyperlaneIdentifier {
    fn from(address: H256) -> Self {
        HyperlaneIdentifier(address)
    }
}

impl From<H160> for HyperlaneIdentifier {
    fn from(address: H160) -> Self {
        let mut id = H256::zero();
        id.as_mut()[12..].copy_from_slice(address.as_ref());
        HyperlaneIdentifier(id)
    }
}

impl From<HyperlaneIdentifier> for H256 {
    fn from(addr: HyperlaneIdentifier) -> Self {
        addr.0
    }
}

impl Deref for HyperlaneIdentifier {
    type Target = H256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Encode for HyperlaneIdentifier {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        self.0.write_to(writer)
    }
}

impl Decode for HyperlaneIdentifier {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
        Self: Sized,
    {
        Ok(HyperlaneIdentifier(H256::read_from(reader)?))
    }
}

/// Left pad an EVM address to 32 bytes
pub fn address_to_h256(address: H160) -> H256 {
    HyperlaneIdentifier::from(address).into()
}

/// Truncate a 32 byte identifier to its EVM address
pub fn h256_to_address(id: H256) -> H160 {
    HyperlaneIdentifier::from(id).as_ethereum_address()
}
