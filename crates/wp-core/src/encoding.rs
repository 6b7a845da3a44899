//! # Base64url Codec
//!
//! All binary values on the wire (keys, signatures, salts, nonces,
//! ciphertexts) are unpadded base64url. Decoding strips trailing `=` so that
//! padded input from older writers is still accepted.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

use crate::error::CoreError;

/// Encode bytes as unpadded base64url.
pub fn b64u_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode base64url, with or without trailing padding.
pub fn b64u_decode(s: &str) -> Result<Vec<u8>, CoreError> {
    URL_SAFE_NO_PAD
        .decode(s.trim().trim_end_matches('='))
        .map_err(|e| CoreError::Encoding(format!("invalid base64url: {e}")))
}

/// Decode standard (padded) base64. Only version-1 keystore files use it.
pub fn b64_std_decode(s: &str) -> Result<Vec<u8>, CoreError> {
    STANDARD
        .decode(s.trim())
        .map_err(|e| CoreError::Encoding(format!("invalid base64: {e}")))
}

/// Decode base64url into a fixed-size array, rejecting any other length.
pub fn b64u_decode_array<const N: usize>(s: &str) -> Result<[u8; N], CoreError> {
    let bytes = b64u_decode(s)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CoreError::Encoding(format!("expected {N} bytes, got {len}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_has_no_padding_or_std_alphabet() {
        let s = b64u_encode([0xfb, 0xff, 0xfe]);
        assert_eq!(s, "-__-");
        assert!(!b64u_encode([1u8]).contains('='));
    }

    #[test]
    fn decode_accepts_padded_input() {
        let padded = "AQ==";
        assert_eq!(b64u_decode(padded).unwrap(), vec![1u8]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(b64u_decode("!!!").is_err());
    }

    #[test]
    fn decode_array_checks_length() {
        let s = b64u_encode([7u8; 16]);
        assert_eq!(b64u_decode_array::<16>(&s).unwrap(), [7u8; 16]);
        assert!(b64u_decode_array::<12>(&s).is_err());
    }

    #[test]
    fn std_decode_reads_legacy_form() {
        assert_eq!(b64_std_decode("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(data in proptest::collection::vec(any::<u8>(), 0..96)) {
            prop_assert_eq!(b64u_decode(&b64u_encode(&data)).unwrap(), data);
        }
    }
}
