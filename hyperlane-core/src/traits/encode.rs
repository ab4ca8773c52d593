use std::io::{Error, ErrorKind};

use crate::{HyperlaneProtocolError, H256, U256};

/// Simple trait for types with a canonical encoding
pub trait Encode {
    /// Write the canonical encoding to the writer
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write;

    /// Serialize to a vec
    fn to_vec(&self) -> Vec<u8> {
        let mut buf = vec![];
        self.write_to(&mut buf).expect("!alloc");
        buf
    }
}

/// Simple trait for types with a canonical encoding
pub trait Decode {
    /// Try to read from some source
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
        Self: Sized;
}

impl Encode for H256 {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        writer.write_all(self.as_ref())?;
        Ok(32)
    }
}

impl Decode for H256 {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
        Self: Sized,
    {
        let mut digest = H256::default();
        reader.read_exact(digest.as_mut())?;
        Ok(digest)
    }
}

// Word sized integers travel in EVM order.
impl Encode for U256 {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        let mut buf = [0; 32];
        self.to_big_endian(&mut buf);
        writer.write_all(&buf)?;
        Ok(32)
    }
}

impl Decode for U256 {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
        Self: Sized,
    {
        let mut buf = [0; 32];
        reader.read_exact(&mut buf)?;
        Ok(U256::from_big_endian(&buf))
    }
}

macro_rules! impl_int_encode {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
            where
                W: std::io::Write,
            {
                let bytes = self.to_be_bytes();
                writer.write_all(&bytes)?;
                Ok(bytes.len())
            }
        }

        impl Decode for $ty {
            fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
            where
                R: std::io::Read,
                Self: Sized,
            {
                let mut buf = [0; std::mem::size_of::<$ty>()];
                reader.read_exact(&mut buf)?;
                Ok(<$ty>::from_be_bytes(buf))
            }
        }
    )*};
}

impl_int_encode!(u8, u32, u64);

impl Encode for bool {
    fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: std::io::Write,
    {
        writer.write_all(&[u8::from(*self)])?;
        Ok(1)
    }
}

impl Decode for bool {
    fn read_from<R>(reader: &mut R) -> Result<Self, HyperlaneProtocolError>
    where
        R: std::io::Read,
        Self: Sized,
    {
        let mut buf = [0; 1];
        reader.read_exact(&mut buf)?;
        match buf[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(HyperlaneProtocolError::IoError(Error::new(
                ErrorKind::InvalidData,
                "decoded bool invalid",
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn u256_is_big_endian() {
        let bytes = U256::from(1u64).to_vec();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert_eq!(U256::read_from(&mut bytes.as_slice()).unwrap(), U256::one());
    }

    #[test]
    fn short_reads_fail() {
        let short = [0u8; 3];
        assert!(u32::read_from(&mut short.as_slice()).is_err());
        assert!(bool::read_from(&mut [2u8].as_slice()).is_err());
    }
}
