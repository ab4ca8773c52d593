use std::fmt::{Debug, Display, Formatter};

use crate::utils::{bytes_to_hex, keccak256};
use crate::{h256_to_address, Decode, Encode, HyperlaneProtocolError, H160, H256};

const HYPERLANE_MESSAGE_PREFIX_LEN: usize = 77;

/// A message as it appears on the wire
pub type RawHyperlaneMessage = Vec<u8>;

impl From<&HyperlaneMessage> for RawHyperlaneMessage {
    fn from(m: &HyperlaneMessage) -> Self {
        m.to_vec()
    }
}

/// A full Hyperlane message between chains
#[derive(Clone, Eq, PartialEq, Default)]
pub struct HyperlaneMessage {
    /// 1   Hyperlane version number
    pub version: u8,
    /// 4   Message nonce
    pub nonce: u32,
    /// 4   Origin domain ID
    pub origin: u32,
    /// 32  Address in origin convention
    pub sender: H256,
    /// 4   Destination domain ID
    pub destination: u32,
    /// 32  Address in destination convention
    pub recipient: H256,
    /// 0+  Message contents
    pub body: Vec<u8>,
}

impl Debug for HyperlaneMessage {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "HyperlaneMessage {{ id: {:?}, version: {}, nonce: {}, origin: {}, sender: {:?}, destination: {}, recipient: {:?}, body: {} }}",
            self.id(),
            self.version,
            self.nonce,
            self.origin,
            self.sender,
            self.destination,
            self.recipient,
            bytes_to_hex(&self.body)
        )
    }
}

impl Display for HyperlaneMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HyperlaneMessage {}->{}", self.origin, self.destination)
    }
}

impl TryFrom<&[u8]> for HyperlaneMessage {
    type Error = HyperlaneProtocolError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        let mut reader = raw;
        HyperlaneMessage::read_from(&mut reader)
    }
}

impl Encode for HyperlaneMessage {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        writer.write_all(&self.version.to_be_bytes())?;
        writer.write_all(&self.nonce.to_be_bytes())?;
        writer.write_all(&self.origin.to_be_bytes())?;
        writer.write_all(self.sender.as_ref())?;
        writer.write_all(&self.destination.to_be_bytes())?;
        writer.write_all(self.recipient.as_ref())?;
        writer.write_all(&self.body)?;
        Ok(HYPERLANE_MESSAGE_PREFIX_LEN + self.body.len())
    }
}

impl Decode for HyperlaneMessage {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
    {
        let version = u8::read_from(reader)?;
        let nonce = u32::read_from(reader)?;
        let origin = u32::read_from(reader)?;
        let sender = H256::read_from(reader)?;
        let destination = u32::read_from(reader)?;
        let recipient = H256::read_from(reader)?;

        let mut body = vec![];
        reader.read_to_end(&mut body)?;

        Ok(Self {
            version,
            nonce,
            origin,
            sender,
            destination,
            recipient,
            body,
        })
    }
}

impl HyperlaneMessage {
    /// Convert the message to a message id
    pub fn id(&self) -> H256 {
        keccak256(self.to_vec())
    }

    /// The recipient as an EVM address, the target of any released value
    pub fn recipient_address(&self) -> H160 {
        h256_to_address(self.recipient)
    }

    /// The sender as an EVM address
    pub fn sender_address(&self) -> H160 {
        h256_to_address(self.sender)
    }
}
