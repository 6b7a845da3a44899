//! # AES-256-GCM
//!
//! Authenticated encryption for keystore payloads. Decryption fails closed:
//! on a tag mismatch the caller receives [`CryptoError::AuthenticationFailure`]
//! and no plaintext bytes at all.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf::DERIVED_KEY_LEN;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
pub fn aead_encrypt(
    key: &[u8; DERIVED_KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)
}

/// Decrypt and authenticate `ciphertext`.
pub fn aead_decrypt(
    key: &[u8; DERIVED_KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x11; 32];
    const NONCE: [u8; NONCE_LEN] = [0x22; NONCE_LEN];

    #[test]
    fn encrypt_then_decrypt() {
        let ct = aead_encrypt(&KEY, &NONCE, b"secret identity").unwrap();
        assert_eq!(ct.len(), b"secret identity".len() + 16);
        let pt = aead_decrypt(&KEY, &NONCE, &ct).unwrap();
        assert_eq!(pt.as_slice(), b"secret identity");
    }

    #[test]
    fn wrong_key_fails_closed() {
        let ct = aead_encrypt(&KEY, &NONCE, b"x").unwrap();
        let err = aead_decrypt(&[0x12; 32], &NONCE, &ct).unwrap_err();
        assert_eq!(err, CryptoError::AuthenticationFailure);
    }

    #[test]
    fn flipped_ciphertext_byte_fails() {
        let mut ct = aead_encrypt(&KEY, &NONCE, b"payload").unwrap();
        ct[0] ^= 0x01;
        assert!(aead_decrypt(&KEY, &NONCE, &ct).is_err());
    }

    #[test]
    fn truncated_ciphertext_fails() {
        assert!(aead_decrypt(&KEY, &NONCE, &[0u8; 4]).is_err());
    }
}
