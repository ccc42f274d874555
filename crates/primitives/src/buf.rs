use std::{fmt, str};

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// 32-byte buf, useful for validator keys and other opaque identifiers.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Buf32(#[serde(with = "hex::serde")] pub [u8; 32]);

impl Buf32 {
    pub fn zero() -> Self {
        Self([0; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Buf32 {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl From<Buf32> for [u8; 32] {
    fn from(value: Buf32) -> Self {
        value.0
    }
}

impl fmt::Debug for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; 64];
        hex::encode_to_slice(self.0, &mut buf).expect("buf: enc hex");
        f.write_str(unsafe { str::from_utf8_unchecked(&buf) })
    }
}

impl fmt::Display for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only show the ends, these are mostly for logging.
        let mut buf = [0; 64];
        hex::encode_to_slice(self.0, &mut buf).expect("buf: enc hex");
        let s = unsafe { str::from_utf8_unchecked(&buf) };
        f.write_str(&s[..8])?;
        f.write_str("..")?;
        f.write_str(&s[56..])
    }
}

impl BorshSerialize for Buf32 {
    fn serialize<W: std::io::prelude::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.0)
    }
}

impl BorshDeserialize for Buf32 {
    fn deserialize_reader<R: std::io::prelude::Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut array = [0u8; 32];
        reader.read_exact(&mut array)?;
        Ok(Self(array))
    }
}

impl<'a> Arbitrary<'a> for Buf32 {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut array = [0u8; 32];
        u.fill_buffer(&mut array)?;
        Ok(Buf32(array))
    }
}

#[cfg(test)]
mod tests {
    use super::Buf32;

    #[test]
    fn test_buf32_debug_roundtrip() {
        let buf = Buf32::from([3; 32]);
        let s = format!("{buf:?}");
        assert_eq!(s.len(), 64);
        let mut dec = [0; 32];
        hex::decode_to_slice(&s, &mut dec).expect("test: dec hex");
        assert_eq!(dec, buf.0);
    }

    #[test]
    fn test_buf32_serde_json() {
        let buf = Buf32::from([7; 32]);
        let s = serde_json::to_string(&buf).expect("test: serialize");
        let back: Buf32 = serde_json::from_str(&s).expect("test: deserialize");
        assert_eq!(buf, back);
    }
}
