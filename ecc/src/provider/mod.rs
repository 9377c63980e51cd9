//! Native cryptographic back-end.
//!
//! Everything above this module is written against [`CryptoProvider`] and never
//! touches a curve library directly. Exactly one implementation is compiled in
//! and selected through [`NativeProvider`].

mod rust_crypto;

pub use rust_crypto::{PointHandle, RustCryptoProvider, SecretHandle};

use crate::curve::{Curve, DigestAlgorithm};
use crate::error::Result;

/// The back-end the key types are bound to.
pub type NativeProvider = RustCryptoProvider;

pub(crate) const PROVIDER: NativeProvider = RustCryptoProvider;

pub type PrivateHandle = <NativeProvider as CryptoProvider>::PrivateHandle;
pub type PublicHandle = <NativeProvider as CryptoProvider>::PublicHandle;

pub trait CryptoProvider {
    /// Curve-native private key. Dropping it releases the key material.
    type PrivateHandle;
    /// Curve-native public key.
    type PublicHandle;

    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8>;

    fn random_bytes(&self, count: usize) -> Result<Vec<u8>>;

    fn generate_private_key(&self, curve: Curve) -> Result<Self::PrivateHandle>;

    /// `scalar` is big-endian and may be shorter than the field size, or
    /// longer by leading zero bytes only.
    fn import_private_key(&self, curve: Curve, scalar: &[u8]) -> Result<Self::PrivateHandle>;

    /// `point` is a SEC1 encoded point.
    fn import_public_key(&self, curve: Curve, point: &[u8]) -> Result<Self::PublicHandle>;

    /// Fixed-width big-endian private scalar.
    fn private_scalar(&self, key: &Self::PrivateHandle) -> Vec<u8>;

    /// Uncompressed public point derived from a private key.
    fn public_point_of(&self, key: &Self::PrivateHandle) -> Vec<u8>;

    /// Uncompressed public point, `0x04 ‖ X ‖ Y`.
    fn public_point(&self, key: &Self::PublicHandle) -> Vec<u8>;

    /// Raw x-coordinate of the shared point.
    fn ecdh_shared_secret(
        &self,
        private_key: &Self::PrivateHandle,
        public_key: &Self::PublicHandle,
    ) -> Result<Vec<u8>>;

    /// Signs a precomputed digest, returning a DER `SEQUENCE { r, s }`.
    fn ecdsa_sign(&self, key: &Self::PrivateHandle, digest: &[u8]) -> Result<Vec<u8>>;

    /// Returns `false` for any malformed signature or mismatched key.
    fn ecdsa_verify(&self, key: &Self::PublicHandle, digest: &[u8], signature: &[u8]) -> bool;

    /// Returns `(ciphertext, tag)`.
    fn aead_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)>;

    fn aead_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>>;
}
