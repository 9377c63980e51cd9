use aes_gcm::{
    AesGcm, KeyInit, Nonce, Tag,
    aead::{AeadInPlace, consts::U16},
    aes::Aes128,
};
use elliptic_curve::{ecdh::diffie_hellman, sec1::ToEncodedPoint};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::CryptoProvider;
use crate::curve::{Curve, DigestAlgorithm};
use crate::error::{Error, Result};

/// AES-128-GCM with a 16-byte nonce and a 16-byte tag.
type Aes128Gcm16 = AesGcm<Aes128, U16>;

const AEAD_KEY_SIZE: usize = 16;
const AEAD_NONCE_SIZE: usize = 16;
const AEAD_TAG_SIZE: usize = 16;

/// Candidate scalars drawn before key generation gives up.
const MAX_KEYGEN_ATTEMPTS: usize = 64;

#[derive(Debug, Clone)]
pub enum SecretHandle {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl SecretHandle {
    pub fn curve(&self) -> Curve {
        match self {
            Self::P256(_) => Curve::Prime256v1,
            Self::P384(_) => Curve::Secp384r1,
            Self::P521(_) => Curve::Secp521r1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointHandle {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

impl PointHandle {
    pub fn curve(&self) -> Curve {
        match self {
            Self::P256(_) => Curve::Prime256v1,
            Self::P384(_) => Curve::Secp384r1,
            Self::P521(_) => Curve::Secp521r1,
        }
    }
}

/// Back-end built on the RustCrypto curve, hash and AEAD crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

/// Left-pads `scalar` to `width` bytes, dropping surplus leading zeros.
fn normalize_scalar(scalar: &[u8], width: usize) -> Option<Vec<u8>> {
    let skip = scalar
        .iter()
        .take(scalar.len().saturating_sub(width))
        .take_while(|&&b| b == 0)
        .count();
    let significant = &scalar[skip..];
    if significant.len() > width {
        return None;
    }
    let mut out = vec![0u8; width - significant.len()];
    out.extend_from_slice(significant);
    Some(out)
}

fn secret_from_bytes(curve: Curve, scalar: &[u8]) -> Option<SecretHandle> {
    let bytes = normalize_scalar(scalar, curve.field_size())?;
    let handle = match curve {
        Curve::Prime256v1 => SecretHandle::P256(p256::SecretKey::from_slice(&bytes).ok()?),
        Curve::Secp384r1 => SecretHandle::P384(p384::SecretKey::from_slice(&bytes).ok()?),
        Curve::Secp521r1 => SecretHandle::P521(p521::SecretKey::from_slice(&bytes).ok()?),
    };
    Some(handle)
}

impl CryptoProvider for RustCryptoProvider {
    type PrivateHandle = SecretHandle;
    type PublicHandle = PointHandle;

    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
        match algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    fn random_bytes(&self, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| Error::RngFailure)?;
        Ok(buf)
    }

    fn generate_private_key(&self, curve: Curve) -> Result<SecretHandle> {
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let mut candidate = self.random_bytes(curve.field_size())?;
            if curve == Curve::Secp521r1 {
                // the P-521 order is a 521-bit number
                candidate[0] &= 0x01;
            }
            if let Some(handle) = secret_from_bytes(curve, &candidate) {
                return Ok(handle);
            }
        }
        Err(Error::RngFailure)
    }

    fn import_private_key(&self, curve: Curve, scalar: &[u8]) -> Result<SecretHandle> {
        secret_from_bytes(curve, scalar).ok_or(Error::FailedNativeKeyCreation)
    }

    fn import_public_key(&self, curve: Curve, point: &[u8]) -> Result<PointHandle> {
        let handle = match curve {
            Curve::Prime256v1 => p256::PublicKey::from_sec1_bytes(point).map(PointHandle::P256),
            Curve::Secp384r1 => p384::PublicKey::from_sec1_bytes(point).map(PointHandle::P384),
            Curve::Secp521r1 => p521::PublicKey::from_sec1_bytes(point).map(PointHandle::P521),
        };
        handle.map_err(|_| Error::FailedNativeKeyCreation)
    }

    fn private_scalar(&self, key: &SecretHandle) -> Vec<u8> {
        match key {
            SecretHandle::P256(sk) => sk.to_bytes().to_vec(),
            SecretHandle::P384(sk) => sk.to_bytes().to_vec(),
            SecretHandle::P521(sk) => sk.to_bytes().to_vec(),
        }
    }

    fn public_point_of(&self, key: &SecretHandle) -> Vec<u8> {
        match key {
            SecretHandle::P256(sk) => sk.public_key().to_encoded_point(false).as_bytes().to_vec(),
            SecretHandle::P384(sk) => sk.public_key().to_encoded_point(false).as_bytes().to_vec(),
            SecretHandle::P521(sk) => sk.public_key().to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    fn public_point(&self, key: &PointHandle) -> Vec<u8> {
        match key {
            PointHandle::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            PointHandle::P384(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            PointHandle::P521(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    fn ecdh_shared_secret(
        &self,
        private_key: &SecretHandle,
        public_key: &PointHandle,
    ) -> Result<Vec<u8>> {
        let shared = match (private_key, public_key) {
            (SecretHandle::P256(sk), PointHandle::P256(pk)) => {
                diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            (SecretHandle::P384(sk), PointHandle::P384(pk)) => {
                diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            (SecretHandle::P521(sk), PointHandle::P521(pk)) => {
                diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine())
                    .raw_secret_bytes()
                    .to_vec()
            }
            _ => return Err(Error::CurveMismatch),
        };
        Ok(shared)
    }

    fn ecdsa_sign(&self, key: &SecretHandle, digest: &[u8]) -> Result<Vec<u8>> {
        match key {
            SecretHandle::P256(sk) => {
                let signing_key = p256::ecdsa::SigningKey::from_bytes(&sk.to_bytes())
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                let signature: p256::ecdsa::Signature = signing_key
                    .sign_prehash(digest)
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            SecretHandle::P384(sk) => {
                let signing_key = p384::ecdsa::SigningKey::from_bytes(&sk.to_bytes())
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                let signature: p384::ecdsa::Signature = signing_key
                    .sign_prehash(digest)
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            SecretHandle::P521(sk) => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&sk.to_bytes())
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                let signature: p521::ecdsa::Signature = signing_key
                    .sign_prehash(digest)
                    .map_err(|_| Error::FailedSigningAlgorithm)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }

    fn ecdsa_verify(&self, key: &PointHandle, digest: &[u8], signature: &[u8]) -> bool {
        match key {
            PointHandle::P256(pk) => {
                let point = pk.to_encoded_point(false);
                let (Ok(verifying_key), Ok(sig)) = (
                    p256::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes()),
                    p256::ecdsa::Signature::from_der(signature),
                ) else {
                    return false;
                };
                verifying_key.verify_prehash(digest, &sig).is_ok()
            }
            PointHandle::P384(pk) => {
                let point = pk.to_encoded_point(false);
                let (Ok(verifying_key), Ok(sig)) = (
                    p384::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes()),
                    p384::ecdsa::Signature::from_der(signature),
                ) else {
                    return false;
                };
                verifying_key.verify_prehash(digest, &sig).is_ok()
            }
            PointHandle::P521(pk) => {
                let point = pk.to_encoded_point(false);
                let (Ok(verifying_key), Ok(sig)) = (
                    p521::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes()),
                    p521::ecdsa::Signature::from_der(signature),
                ) else {
                    return false;
                };
                verifying_key.verify_prehash(digest, &sig).is_ok()
            }
        }
    }

    fn aead_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        if key.len() != AEAD_KEY_SIZE || iv.len() != AEAD_NONCE_SIZE {
            return Err(Error::FailedEncryptionAlgorithm);
        }
        let cipher =
            Aes128Gcm16::new_from_slice(key).map_err(|_| Error::FailedEncryptionAlgorithm)?;
        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(iv), aad, &mut buffer)
            .map_err(|_| Error::FailedEncryptionAlgorithm)?;
        Ok((buffer, tag.to_vec()))
    }

    fn aead_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>> {
        if key.len() != AEAD_KEY_SIZE || iv.len() != AEAD_NONCE_SIZE || tag.len() != AEAD_TAG_SIZE
        {
            return Err(Error::FailedDecryptionAlgorithm);
        }
        let cipher =
            Aes128Gcm16::new_from_slice(key).map_err(|_| Error::FailedDecryptionAlgorithm)?;
        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(iv),
                aad,
                &mut buffer,
                Tag::<U16>::from_slice(tag),
            )
            .map_err(|_| Error::FailedDecryptionAlgorithm)?;
        Ok(buffer)
    }
}
