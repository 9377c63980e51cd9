//! # kagi-ecc
//!
//! Elliptic-curve keys for P-256, P-384 and P-521: PEM/DER key parsing and
//! generation, ECDSA signatures in DER or raw `r ‖ s` form, ECIES-style hybrid
//! encryption and ES256/ES384/ES512 JWTs.
//!
//! ```ignore
//! use kagi_ecc::{Curve, make_key_pair};
//!
//! let (private_key, public_key) = make_key_pair(Curve::Prime256v1)?;
//! let signature = kagi_ecc::sign("Hello world", &private_key)?;
//! assert!(kagi_ecc::verify("Hello world", &signature, &public_key));
//!
//! let envelope = kagi_ecc::encrypt("secret", &public_key)?;
//! assert_eq!("secret", kagi_ecc::decrypt_to_string(&envelope, &private_key)?);
//! ```
//!
//! All curve arithmetic goes through [`provider::CryptoProvider`].

#![forbid(unsafe_code)]

pub mod cipher;
pub mod curve;
pub mod error;
pub mod jwt;
pub mod private_key;
pub mod provider;
pub mod public_key;
pub mod signature;

pub use curve::{Curve, DigestAlgorithm};
pub use error::{Error, Result};
pub use jwt::{JwtClaims, create_jwt, verify_jwt};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{Signature, SignatureFormat, der_to_raw, raw_to_der};

/// Generates a key pair on `curve`.
pub fn make_key_pair(curve: Curve) -> Result<(PrivateKey, PublicKey)> {
    let private_key = PrivateKey::generate(curve)?;
    let public_key = private_key.extract_public_key()?;
    Ok((private_key, public_key))
}

/// Parses a SEC1 or PKCS#8 private key PEM.
pub fn parse_private_key(pem: &str) -> Result<PrivateKey> {
    PrivateKey::from_pem_str(pem)
}

/// Parses an SPKI public key PEM.
pub fn parse_public_key(pem: &str) -> Result<PublicKey> {
    PublicKey::from_pem_str(pem)
}

pub fn sign(message: impl AsRef<[u8]>, private_key: &PrivateKey) -> Result<Signature> {
    signature::sign(private_key, message)
}

pub fn verify(message: impl AsRef<[u8]>, signature: &Signature, public_key: &PublicKey) -> bool {
    signature.verify(public_key, message)
}

pub fn encrypt(message: impl AsRef<[u8]>, public_key: &PublicKey) -> Result<Vec<u8>> {
    cipher::encrypt(message.as_ref(), public_key)
}

pub fn decrypt(envelope: &[u8], private_key: &PrivateKey) -> Result<Vec<u8>> {
    cipher::decrypt(envelope, private_key)
}

pub fn decrypt_to_string(envelope: &[u8], private_key: &PrivateKey) -> Result<String> {
    let plaintext = decrypt(envelope, private_key)?;
    String::from_utf8(plaintext).map_err(|_| Error::FailedUtf8Decoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Curve::Prime256v1)]
    #[case(Curve::Secp384r1)]
    #[case(Curve::Secp521r1)]
    fn test_key_pair_round_trip(#[case] curve: Curve) {
        let (private_key, public_key) = make_key_pair(curve).unwrap();
        assert_eq!(curve.key_size(), public_key.public_key_bytes().len());

        let reparsed = parse_private_key(private_key.pem()).unwrap();
        assert_eq!(private_key.pem(), reparsed.pem());
        assert_eq!(private_key.public_key_bytes(), reparsed.public_key_bytes());
        assert_eq!(public_key, parse_public_key(public_key.pem()).unwrap());
    }

    #[rstest]
    #[case(Curve::Prime256v1)]
    #[case(Curve::Secp384r1)]
    #[case(Curve::Secp521r1)]
    fn test_sign_verify(#[case] curve: Curve) {
        let (private_key, public_key) = make_key_pair(curve).unwrap();
        let (_, other) = make_key_pair(curve).unwrap();

        let signature = sign("message", &private_key).unwrap();
        assert_eq!(curve.field_size(), signature.curve_field_size());
        assert!(verify("message", &signature, &public_key));
        assert!(!verify("message", &signature, &other));
        assert!(!verify("massage", &signature, &public_key));
    }

    #[test]
    fn test_verify_across_curves_is_false() {
        let (private_key, _) = make_key_pair(Curve::Secp384r1).unwrap();
        let (_, public_key) = make_key_pair(Curve::Prime256v1).unwrap();
        let signature = sign("message", &private_key).unwrap();
        assert!(!verify("message", &signature, &public_key));
    }

    #[test]
    fn test_encrypt_decrypt_string() {
        let (private_key, public_key) = make_key_pair(Curve::Prime256v1).unwrap();
        let envelope = encrypt("Hello world", &public_key).unwrap();
        assert_eq!("Hello world", decrypt_to_string(&envelope, &private_key).unwrap());

        let envelope = encrypt(&[0xffu8, 0xfe], &public_key).unwrap();
        assert_eq!(
            Err(Error::FailedUtf8Decoding),
            decrypt_to_string(&envelope, &private_key)
        );
    }
}
