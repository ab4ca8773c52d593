//! Thin layer over `ethers_core::abi` for the payloads bridges carry.

use ethers_core::abi::{self, ParamType, Token};
use ethers_core::types as eth;

use hyperlane_core::{address_to_h256, h256_to_address, IsmError, IsmResult, H160, H256, U256};

/// `preVerifyMessage(bytes32,uint256)`
pub const PRE_VERIFY_MESSAGE_SIGNATURE: &str = "preVerifyMessage(bytes32,uint256)";

/// Length of an encoded `preVerifyMessage` call
pub const PRE_VERIFY_MESSAGE_CALL_LEN: usize = 4 + 32 + 32;

/// The 4 byte selector of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    ethers_core::utils::id(signature)
}

/// Calldata of `preVerifyMessage(messageId, msgValue)`, the attestation
/// hooks send through bridges.
pub fn encode_pre_verify_message(message_id: H256, value: U256) -> Vec<u8> {
    encode_call(
        PRE_VERIFY_MESSAGE_SIGNATURE,
        &[bytes32_token(message_id), uint_token(value)],
    )
}

/// Parse `preVerifyMessage` calldata into `(messageId, msgValue)`.
pub fn decode_pre_verify_message(data: &[u8]) -> IsmResult<(H256, U256)> {
    if data.len() != PRE_VERIFY_MESSAGE_CALL_LEN {
        return Err(IsmError::MalformedProof(format!(
            "preVerifyMessage call must be {PRE_VERIFY_MESSAGE_CALL_LEN} bytes, got {}",
            data.len()
        )));
    }
    let mut args = decode_call(
        PRE_VERIFY_MESSAGE_SIGNATURE,
        &[ParamType::FixedBytes(32), ParamType::Uint(256)],
        data,
    )?;
    Ok((args.bytes32()?, args.uint()?))
}

/// `abi.encode(bytes32)`
pub fn encode_message_id(message_id: H256) -> Vec<u8> {
    abi::encode(&[bytes32_token(message_id)])
}

/// Inverse of [`encode_message_id`]
pub fn decode_message_id(data: &[u8]) -> IsmResult<H256> {
    TokenReader::decode("message id", &[ParamType::FixedBytes(32)], data)?.bytes32()
}

/// `abi.encode(address)` of a left padded identifier
pub fn encode_address(address: H256) -> Vec<u8> {
    abi::encode(&[address_token(address)])
}

/// Inverse of [`encode_address`]
pub fn decode_address(data: &[u8]) -> IsmResult<H256> {
    TokenReader::decode("address", &[ParamType::Address], data)?.address()
}

/// Selector followed by the encoded arguments
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(abi::encode(args));
    data
}

/// Check the selector and decode the arguments of a call
pub fn decode_call(signature: &str, types: &[ParamType], data: &[u8]) -> IsmResult<TokenReader> {
    if data.len() < 4 || data[..4] != selector(signature) {
        return Err(IsmError::MalformedProof(format!(
            "calldata is not a call to {signature}"
        )));
    }
    TokenReader::decode(signature, types, &data[4..])
}

/// Token for a word sized unsigned integer
pub fn uint_token(value: U256) -> Token {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    Token::Uint(eth::U256::from_big_endian(&buf))
}

/// Token for a small unsigned integer
pub fn small_uint_token(value: u64) -> Token {
    Token::Uint(eth::U256::from(value))
}

/// Token for a `bytes32`
pub fn bytes32_token(value: H256) -> Token {
    Token::FixedBytes(value.as_bytes().to_vec())
}

/// Token for an `address`, truncating the identifier
pub fn address_token(value: H256) -> Token {
    Token::Address(eth::Address::from_slice(h256_to_address(value).as_bytes()))
}

/// Sequential, typed access to decoded tokens.
#[derive(Debug)]
pub struct TokenReader {
    what: String,
    tokens: std::vec::IntoIter<Token>,
}

impl TokenReader {
    /// Decode `data` as the given parameter list. `what` names the payload
    /// in errors.
    pub fn decode(what: &str, types: &[ParamType], data: &[u8]) -> IsmResult<Self> {
        let tokens = abi::decode(types, data)
            .map_err(|err| IsmError::MalformedProof(format!("{what}: {err}")))?;
        Ok(Self::from_tokens(what, tokens))
    }

    fn from_tokens(what: &str, tokens: Vec<Token>) -> Self {
        Self {
            what: what.to_owned(),
            tokens: tokens.into_iter(),
        }
    }

    fn malformed(&self, expected: &str) -> IsmError {
        IsmError::MalformedProof(format!("{}: expected {expected}", self.what))
    }

    fn next_token(&mut self, expected: &str) -> IsmResult<Token> {
        match self.tokens.next() {
            Some(token) => Ok(token),
            None => Err(self.malformed(expected)),
        }
    }

    /// Next `uint256`
    pub fn uint(&mut self) -> IsmResult<U256> {
        match self.next_token("uint")? {
            Token::Uint(value) => {
                let mut buf = [0u8; 32];
                value.to_big_endian(&mut buf);
                Ok(U256::from_big_endian(&buf))
            }
            _ => Err(self.malformed("uint")),
        }
    }

    /// Next integer that has to fit a `u64`
    pub fn u64(&mut self) -> IsmResult<u64> {
        let value = self.uint()?;
        if value > U256::from(u64::MAX) {
            return Err(self.malformed("uint64"));
        }
        Ok(value.low_u64())
    }

    /// Next integer that has to fit a `u32`
    pub fn u32(&mut self) -> IsmResult<u32> {
        let value = self.u64()?;
        u32::try_from(value).map_err(|_| self.malformed("uint32"))
    }

    /// Next `address`, left padded
    pub fn address(&mut self) -> IsmResult<H256> {
        match self.next_token("address")? {
            Token::Address(address) => Ok(address_to_h256(H160::from_slice(address.as_bytes()))),
            _ => Err(self.malformed("address")),
        }
    }

    /// Next `bytes32`
    pub fn bytes32(&mut self) -> IsmResult<H256> {
        match self.next_token("bytes32")? {
            Token::FixedBytes(bytes) if bytes.len() == 32 => Ok(H256::from_slice(&bytes)),
            _ => Err(self.malformed("bytes32")),
        }
    }

    /// Next dynamic `bytes`
    pub fn bytes(&mut self) -> IsmResult<Vec<u8>> {
        match self.next_token("bytes")? {
            Token::Bytes(bytes) => Ok(bytes),
            _ => Err(self.malformed("bytes")),
        }
    }

    /// Next `bytes32[]` or `bytes32[N]`
    pub fn bytes32_array(&mut self) -> IsmResult<Vec<H256>> {
        let items = match self.next_token("bytes32 array")? {
            Token::Array(items) | Token::FixedArray(items) => items,
            _ => return Err(self.malformed("bytes32 array")),
        };
        let mut inner = Self::from_tokens(&self.what, items);
        let mut out = Vec::with_capacity(inner.tokens.len());
        while inner.tokens.len() > 0 {
            out.push(inner.bytes32()?);
        }
        Ok(out)
    }

    /// Next tuple, as its own reader
    pub fn tuple(&mut self) -> IsmResult<TokenReader> {
        match self.next_token("tuple")? {
            Token::Tuple(items) => Ok(Self::from_tokens(&self.what, items)),
            _ => Err(self.malformed("tuple")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pre_verify_message_layout() {
        let id = H256::repeat_byte(0xab);
        let data = encode_pre_verify_message(id, U256::from(5u64));
        assert_eq!(data.len(), PRE_VERIFY_MESSAGE_CALL_LEN);
        assert_eq!(&data[..4], &selector(PRE_VERIFY_MESSAGE_SIGNATURE));
        assert_eq!(&data[4..36], id.as_bytes());
        assert_eq!(data[67], 5);
        assert_eq!(
            decode_pre_verify_message(&data).unwrap(),
            (id, U256::from(5u64))
        );
    }

    #[test]
    fn rejects_other_calls() {
        let mut data = encode_pre_verify_message(H256::zero(), U256::zero());
        data[0] ^= 1;
        assert!(matches!(
            decode_pre_verify_message(&data),
            Err(IsmError::MalformedProof(_))
        ));
        assert!(decode_pre_verify_message(&data[..40]).is_err());
    }

    #[test]
    fn message_id_is_one_word() {
        let id = H256::repeat_byte(3);
        let data = encode_message_id(id);
        assert_eq!(data, id.as_bytes());
        assert_eq!(decode_message_id(&data).unwrap(), id);
        assert!(decode_message_id(&data[..31]).is_err());
    }

    #[test]
    fn addresses_are_truncated_and_padded() {
        let address = address_to_h256(H160::repeat_byte(0x44));
        assert_eq!(decode_address(&encode_address(address)).unwrap(), address);
    }
}
