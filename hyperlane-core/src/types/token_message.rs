use crate::{Decode, Encode, HyperlaneProtocolError, H256, U256};

/// The body of a warp route transfer message: recipient, amount (or token
/// id) and optional trailing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenMessage {
    recipient: H256,
    amount_or_id: U256,
    metadata: Vec<u8>,
}

impl Encode for TokenMessage {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        let mut written = self.recipient.write_to(writer)?;
        written += self.amount_or_id.write_to(writer)?;
        writer.write_all(&self.metadata)?;
        Ok(written + self.metadata.len())
    }
}

impl Decode for TokenMessage {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
    {
        let recipient = H256::read_from(reader)?;
        let amount_or_id = U256::read_from(reader)?;
        let mut metadata = vec![];
        reader.read_to_end(&mut metadata)?;
        Ok(Self {
            recipient,
            amount_or_id,
            metadata,
        })
    }
}

impl TokenMessage {
    /// Creates a new token message.
    pub fn new(recipient: H256, amount_or_id: U256, metadata: Vec<u8>) -> Self {
        Self {
            recipient,
            amount_or_id,
            metadata,
        }
    }

    /// Parse a message body. Bodies shorter than 64 bytes are not token
    /// messages.
    pub fn parse(body: &[u8]) -> Result<Self, HyperlaneProtocolError> {
        if body.len() < 64 {
            return Err(HyperlaneProtocolError::InvalidMessageBody(format!(
                "token message must be at least 64 bytes, got {}",
                body.len()
            )));
        }
        let mut reader = body;
        Self::read_from(&mut reader)
    }

    /// The recipient of the tokens.
    pub fn recipient(&self) -> H256 {
        self.recipient
    }

    /// The amount or ID of the tokens.
    pub fn amount(&self) -> U256 {
        self.amount_or_id
    }

    /// The metadata of the token message.
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }
}
