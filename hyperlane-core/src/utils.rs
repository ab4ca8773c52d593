use sha3::{Digest, Keccak256};

use crate::H256;

/// Keccak256 of the concatenation of the given byte slices
pub fn keccak256_concat<T: AsRef<[u8]>>(parts: &[T]) -> H256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    H256::from_slice(hasher.finalize().as_slice())
}

/// Keccak256 of a byte slice
pub fn keccak256(bytes: impl AsRef<[u8]>) -> H256 {
    keccak256_concat(&[bytes])
}

/// Format a byte slice as a 0x-prefixed hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a hex string, with or without the 0x prefix
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}

/// The 4-byte selector of a solidity function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            bytes_to_hex(keccak256([]).as_bytes()),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn known_selector() {
        // transfer(address,uint256)
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn hex_round_trips_with_prefix() {
        assert_eq!(hex_to_bytes("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(hex_to_bytes("beef").unwrap(), vec![0xbe, 0xef]);
    }
}
