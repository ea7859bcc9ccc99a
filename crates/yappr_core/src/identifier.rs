use crate::consts::IDENTIFIER_BYTES;
use crate::errors::{Result, YapprError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte platform identity, shown to users in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_BYTES]);

impl Identifier {
    pub const fn from_bytes(bytes: [u8; IDENTIFIER_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; IDENTIFIER_BYTES] =
            bytes
                .try_into()
                .map_err(|_| YapprError::InvalidIdentifierLength {
                    expected: IDENTIFIER_BYTES,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_BYTES] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

/// Decode a base58 string without any length requirement.
pub fn decode_base58(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| YapprError::InvalidIdentifierFormat(format!("{s:?}: {e}")))
}

impl FromStr for Identifier {
    type Err = YapprError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_base58(s.trim())?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.to_base58())
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Anything a filter accepts as an identifier: base58 text or raw bytes.
#[derive(Clone, Copy, Debug)]
pub enum IdentifierInput<'a> {
    Encoded(&'a str),
    Raw(&'a [u8]),
}

impl IdentifierInput<'_> {
    /// Raw bytes to hash. Encoded input of any decoded length is accepted;
    /// surrounding whitespace is ignored, as in `Identifier::from_str`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            IdentifierInput::Encoded(s) => decode_base58(s.trim()),
            IdentifierInput::Raw(b) => Ok(b.to_vec()),
        }
    }
}

impl<'a> From<&'a str> for IdentifierInput<'a> {
    fn from(s: &'a str) -> Self {
        IdentifierInput::Encoded(s)
    }
}

impl<'a> From<&'a String> for IdentifierInput<'a> {
    fn from(s: &'a String) -> Self {
        IdentifierInput::Encoded(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for IdentifierInput<'a> {
    fn from(b: &'a [u8]) -> Self {
        IdentifierInput::Raw(b)
    }
}

impl<'a> From<&'a [u8; IDENTIFIER_BYTES]> for IdentifierInput<'a> {
    fn from(b: &'a [u8; IDENTIFIER_BYTES]) -> Self {
        IdentifierInput::Raw(b.as_slice())
    }
}

impl<'a> From<&'a Identifier> for IdentifierInput<'a> {
    fn from(id: &'a Identifier) -> Self {
        IdentifierInput::Raw(id.0.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base58_roundtrip_and_display() {
        let id = Identifier::from_bytes([7u8; IDENTIFIER_BYTES]);
        let text = id.to_string();
        let back: Identifier = text.parse().unwrap();
        assert_eq!(back, id);
        assert_eq!(format!("{id:?}"), format!("Identifier({text})"));
    }

    #[test]
    fn rejects_bad_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        let err = "0OIl".parse::<Identifier>().unwrap_err();
        assert!(matches!(err, YapprError::InvalidIdentifierFormat(_)));
    }

    #[test]
    fn rejects_wrong_length() {
        let short = bs58::encode([1u8; 5]).into_string();
        let err = short.parse::<Identifier>().unwrap_err();
        assert!(matches!(
            err,
            YapprError::InvalidIdentifierLength { expected: 32, actual: 5 }
        ));
    }

    #[test]
    fn encoded_input_decodes_any_length() {
        let text = bs58::encode([9u8, 8, 7]).into_string();
        let input = IdentifierInput::from(text.as_str());
        assert_eq!(input.to_bytes().unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn encoded_input_trims_like_parse() {
        let id = Identifier::from_bytes([4u8; IDENTIFIER_BYTES]);
        let padded = format!("  {id}\n");
        let parsed: Identifier = padded.parse().unwrap();
        let bytes = IdentifierInput::from(&padded).to_bytes().unwrap();
        assert_eq!(bytes.as_slice(), parsed.as_bytes().as_slice());
    }

    #[test]
    fn serde_uses_base58_string() {
        let id = Identifier::from_bytes([3u8; IDENTIFIER_BYTES]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_base58()));
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
