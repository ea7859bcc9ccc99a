//! Base64 transport form of a filter: standard alphabet, padded, no framing.
//! Item count and layout version travel out-of-band.
use crate::errors::Result;
use crate::filter::BloomFilter;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn to_base64(filter: &BloomFilter) -> String {
    STANDARD.encode(filter.serialize())
}

/// Decoded bytes go through `BloomFilter::from_bytes`, so short payloads are padded.
pub fn from_base64(encoded: &str, item_count: u64) -> Result<BloomFilter> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(BloomFilter::from_bytes(&bytes, item_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::YapprError;

    #[test]
    fn roundtrip_is_bit_exact() {
        let mut f = BloomFilter::new();
        for k in [&b"alice"[..], b"bob", b"carol"] {
            f.add_bytes(k);
        }
        let enc = to_base64(&f);
        let back = from_base64(&enc, f.item_count()).unwrap();
        assert_eq!(back.serialize(), f.serialize());
        assert_eq!(back.item_count(), 3);
        for k in [&b"alice"[..], b"bob", b"carol", b"dave"] {
            assert_eq!(back.might_contain_bytes(k), f.might_contain_bytes(k));
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut a = BloomFilter::new();
        let mut b = BloomFilter::new();
        a.add_bytes(b"x");
        b.add_bytes(b"x");
        assert_eq!(to_base64(&a), to_base64(&b));
    }

    #[test]
    fn empty_filter_encodes_to_fixed_length() {
        // 5000 bytes -> ceil(5000 / 3) * 4 chars
        assert_eq!(to_base64(&BloomFilter::new()).len(), 6668);
    }

    #[test]
    fn invalid_base64_is_reported() {
        let err = from_base64("***not base64***", 0).unwrap_err();
        assert!(matches!(err, YapprError::InvalidEncoding(_)));
    }
}
