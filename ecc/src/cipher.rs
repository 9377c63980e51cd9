//! ECIES-style hybrid encryption.
//!
//! ```text
//! envelope = ephemeral point ‖ ciphertext ‖ tag
//!
//! shared   = ECDH(ephemeral, recipient).x
//! digest   = H(shared ‖ 00 00 00 01 ‖ ephemeral point)   -- H follows the curve
//! key      = digest[0..16]
//! iv       = digest[16..32]
//! ```
//!
//! The payload is sealed with AES-128-GCM under a 16-byte IV with no
//! additional authenticated data.

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::private_key::PrivateKey;
use crate::provider::{CryptoProvider, PROVIDER, PrivateHandle};
use crate::public_key::PublicKey;

pub const TAG_SIZE: usize = 16;
const KEY_SIZE: usize = 16;
const IV_SIZE: usize = 16;
const KDF_COUNTER: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Derives the AEAD key and IV from an ECDH secret and the ephemeral point.
pub fn derive_key_iv(
    curve: Curve,
    shared_secret: &[u8],
    ephemeral_point: &[u8],
) -> (Vec<u8>, Vec<u8>) {
    let mut input =
        Vec::with_capacity(shared_secret.len() + KDF_COUNTER.len() + ephemeral_point.len());
    input.extend_from_slice(shared_secret);
    input.extend_from_slice(&KDF_COUNTER);
    input.extend_from_slice(ephemeral_point);
    let digest = PROVIDER.digest(curve.digest_algorithm(), &input);
    (
        digest[..KEY_SIZE].to_vec(),
        digest[KEY_SIZE..KEY_SIZE + IV_SIZE].to_vec(),
    )
}

/// Encrypts `plaintext` to `public_key` under a fresh ephemeral key.
pub fn encrypt(plaintext: &[u8], public_key: &PublicKey) -> Result<Vec<u8>> {
    let ephemeral = PROVIDER.generate_private_key(public_key.curve())?;
    encrypt_with_ephemeral(plaintext, public_key, &ephemeral)
}

fn encrypt_with_ephemeral(
    plaintext: &[u8],
    public_key: &PublicKey,
    ephemeral: &PrivateHandle,
) -> Result<Vec<u8>> {
    let curve = public_key.curve();
    let ephemeral_point = PROVIDER.public_point_of(ephemeral);
    let shared = PROVIDER
        .ecdh_shared_secret(ephemeral, public_key.handle())
        .map_err(|_| Error::FailedEncryptionAlgorithm)?;
    let (key, iv) = derive_key_iv(curve, &shared, &ephemeral_point);
    let (ciphertext, tag) = PROVIDER
        .aead_encrypt(&key, &iv, &[], plaintext)
        .map_err(|_| Error::FailedEncryptionAlgorithm)?;

    let mut envelope = ephemeral_point;
    envelope.reserve(ciphertext.len() + tag.len());
    envelope.extend(ciphertext);
    envelope.extend(tag);
    tracing::debug!(%curve, length = envelope.len(), "sealed envelope");
    Ok(envelope)
}

/// Opens an envelope produced by [`encrypt`] for `private_key`.
pub fn decrypt(envelope: &[u8], private_key: &PrivateKey) -> Result<Vec<u8>> {
    let curve = private_key.curve();
    let point_size = curve.key_size();
    if envelope.len() < point_size + TAG_SIZE {
        tracing::warn!(%curve, length = envelope.len(), "envelope too short");
        return Err(Error::FailedDecryptionAlgorithm);
    }
    let (ephemeral_point, rest) = envelope.split_at(point_size);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

    let ephemeral = PROVIDER
        .import_public_key(curve, ephemeral_point)
        .map_err(|_| Error::FailedDecryptionAlgorithm)?;
    let shared = PROVIDER
        .ecdh_shared_secret(private_key.handle(), &ephemeral)
        .map_err(|_| Error::FailedDecryptionAlgorithm)?;
    let (key, iv) = derive_key_iv(curve, &shared, ephemeral_point);
    PROVIDER
        .aead_decrypt(&key, &iv, &[], ciphertext, tag)
        .inspect_err(|_| tracing::warn!(%curve, "envelope failed authentication"))
        .map_err(|_| Error::FailedDecryptionAlgorithm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::private_key::tests::{P256_SEC1_PEM, P256_SPKI_PEM};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use hex_literal::hex;
    use rstest::rstest;

    const EPHEMERAL_SCALAR: [u8; 32] =
        hex!("1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");

    const HELLO_WORLD_ENVELOPE: &str = "BEccPnWMSQQoW7p+UxGO0PUkresHV9Jb0vjnsNdt+nFM3VIPesqKi5F6zDf1HejwybvjrYWDgucC3CWhLQn3qFgganiqKhQwsSKnfgQ9O71BdLeUvvDpAPX90VE=";

    #[test]
    fn test_known_answer() {
        let public_key = PublicKey::from_pem_str(P256_SPKI_PEM).unwrap();
        let ephemeral = PROVIDER
            .import_private_key(Curve::Prime256v1, &EPHEMERAL_SCALAR)
            .unwrap();
        let envelope = encrypt_with_ephemeral(b"Hello world", &public_key, &ephemeral).unwrap();
        assert_eq!(HELLO_WORLD_ENVELOPE, STANDARD.encode(&envelope));
        assert_eq!(65 + 11 + TAG_SIZE, envelope.len());

        let private_key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        assert_eq!(b"Hello world".to_vec(), decrypt(&envelope, &private_key).unwrap());
    }

    #[rstest]
    #[case(Curve::Prime256v1)]
    #[case(Curve::Secp384r1)]
    #[case(Curve::Secp521r1)]
    fn test_round_trip(#[case] curve: Curve) {
        let private_key = PrivateKey::generate(curve).unwrap();
        let public_key = private_key.extract_public_key().unwrap();
        let plaintexts: [&[u8]; 3] = [b"", b"a", &[0x5a; 1000]];
        for plaintext in plaintexts {
            let envelope = encrypt(plaintext, &public_key).unwrap();
            assert_eq!(curve.key_size() + plaintext.len() + TAG_SIZE, envelope.len());
            assert_eq!(plaintext.to_vec(), decrypt(&envelope, &private_key).unwrap());
        }
    }

    #[test]
    fn test_fresh_ephemeral_per_call() {
        let public_key = PublicKey::from_pem_str(P256_SPKI_PEM).unwrap();
        let first = encrypt(b"same", &public_key).unwrap();
        let second = encrypt(b"same", &public_key).unwrap();
        assert_ne!(first, second);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(66)]
    #[case(91)]
    fn test_tampered_envelope(#[case] index: usize) {
        let private_key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        let mut envelope = STANDARD.decode(HELLO_WORLD_ENVELOPE).unwrap();
        envelope[index] ^= 0x01;
        assert_eq!(
            Err(Error::FailedDecryptionAlgorithm),
            decrypt(&envelope, &private_key)
        );
    }

    #[test]
    fn test_wrong_recipient() {
        let private_key = PrivateKey::generate(Curve::Prime256v1).unwrap();
        let envelope = STANDARD.decode(HELLO_WORLD_ENVELOPE).unwrap();
        assert_eq!(
            Err(Error::FailedDecryptionAlgorithm),
            decrypt(&envelope, &private_key)
        );
    }

    #[rstest]
    #[case(0)]
    #[case(65)]
    #[case(80)]
    fn test_short_envelope(#[case] length: usize) {
        let private_key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        let envelope = STANDARD.decode(HELLO_WORLD_ENVELOPE).unwrap();
        assert_eq!(
            Err(Error::FailedDecryptionAlgorithm),
            decrypt(&envelope[..length], &private_key)
        );
    }

    #[test]
    fn test_empty_payload_envelope() {
        // point ‖ tag with no ciphertext is the shortest valid envelope
        let private_key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        let public_key = private_key.extract_public_key().unwrap();
        let envelope = encrypt(b"", &public_key).unwrap();
        assert_eq!(81, envelope.len());
        assert!(decrypt(&envelope, &private_key).unwrap().is_empty());
    }

    #[test]
    fn test_derive_key_iv_uses_curve_digest() {
        let (key, iv) = derive_key_iv(Curve::Secp384r1, &[0x01; 48], &[0x04; 97]);
        assert_eq!(16, key.len());
        assert_eq!(16, iv.len());
        let (key256, _) = derive_key_iv(Curve::Prime256v1, &[0x01; 48], &[0x04; 97]);
        assert_ne!(key, key256);
    }
}
