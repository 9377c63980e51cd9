//! EC private keys in SEC1 and PKCS#8 form.
//!
//! ```text
//! ECPrivateKey ::= SEQUENCE {
//!     version        INTEGER { ecPrivkeyVer1(1) },
//!     privateKey     OCTET STRING,
//!     parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
//!     publicKey  [1] BIT STRING OPTIONAL
//! }
//!
//! PrivateKeyInfo ::= SEQUENCE {
//!     version             INTEGER (0),
//!     privateKeyAlgorithm AlgorithmIdentifier,
//!     privateKey          OCTET STRING  -- DER ECPrivateKey
//! }
//! ```

use std::{fmt, str::FromStr};

use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{Element, Tag, encode_tlv};
use kagi_pem::{FromPem, Label, Pem, PemOptions, ToPem};

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::provider::{CryptoProvider, PROVIDER, PrivateHandle};
use crate::public_key::PublicKey;
use crate::signature::{self, Signature};

const SEC1_VERSION: u64 = 1;

pub struct PrivateKey {
    curve: Curve,
    handle: PrivateHandle,
    /// Uncompressed point, `0x04 ‖ X ‖ Y`.
    public_point: Vec<u8>,
    /// The BIT STRING carried a leading zero that was removed from the point.
    stripped: bool,
    pem: String,
}

impl PrivateKey {
    /// Generates a fresh key on `curve`.
    pub fn generate(curve: Curve) -> Result<Self> {
        let handle = PROVIDER.generate_private_key(curve)?;
        let scalar = PROVIDER.private_scalar(&handle);
        let public_point = PROVIDER.public_point_of(&handle);
        let der = encode_sec1(curve, &scalar, &bit_string(&public_point, true));
        tracing::debug!(%curve, "generated private key");
        Ok(PrivateKey {
            curve,
            handle,
            public_point,
            stripped: true,
            pem: Pem::from_bytes(Label::ECPrivateKey, &der).to_string(),
        })
    }

    /// Accepts SEC1 (`EC PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`) PEM text.
    pub fn from_pem_str(text: &str) -> Result<Self> {
        let pem = Pem::from_str(text)?;
        Self::from_pem(&pem)
    }

    /// Accepts SEC1 or PKCS#8 DER, told apart by the second field: an OCTET
    /// STRING scalar for SEC1, an AlgorithmIdentifier SEQUENCE for PKCS#8.
    /// Both SEC1 and PKCS#8 v2 carry version 1.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let element: Element = der.decode()?;
        match element.expect_sequence()?.get(1) {
            Some(Element::Bytes(_)) => Self::from_sec1_der(der),
            Some(Element::Sequence(_)) => Self::from_pkcs8_der(der),
            _ => Err(Error::FailedAsn1Decoding),
        }
    }

    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let element: Element = der.decode()?;
        let fields = element.expect_sequence()?;
        let scalar = fields
            .get(1)
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;
        let oid = fields
            .get(2)
            .and_then(|e| e.as_constructed(0))
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;
        let bits = fields
            .get(3)
            .and_then(|e| e.as_constructed(1))
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;

        let curve = lookup_curve(oid)?;
        let key = Self::from_parts(curve, scalar, bits, Some(der))?;
        tracing::debug!(%curve, format = "SEC1", "parsed private key");
        Ok(key)
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let element: Element = der.decode()?;
        let fields = element.expect_sequence()?;
        let oid = fields
            .get(1)
            .and_then(Element::as_sequence)
            .and_then(|algorithm| algorithm.get(1))
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;
        let inner_der = fields
            .get(2)
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;

        let inner: Element = inner_der.decode()?;
        let inner = inner.expect_sequence()?;
        let scalar = inner
            .get(1)
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;
        // [1] sits at index 3 when the optional [0] parameters are present
        let bits = [2, 3]
            .into_iter()
            .find_map(|index| inner.get(index).and_then(|e| e.as_constructed(1)))
            .and_then(Element::as_bytes)
            .ok_or(Error::FailedAsn1Decoding)?;

        let curve = lookup_curve(oid)?;
        let key = Self::from_parts(curve, scalar, bits, None)?;
        tracing::debug!(%curve, format = "PKCS#8", "parsed private key");
        Ok(key)
    }

    /// `bits` is the public key BIT STRING content. `sec1_der` is cached as is
    /// when present; otherwise a SEC1 encoding is rebuilt from the parts.
    fn from_parts(
        curve: Curve,
        scalar: &[u8],
        bits: &[u8],
        sec1_der: Option<&[u8]>,
    ) -> Result<Self> {
        let (point, stripped) = match bits.split_first() {
            Some((0x00, rest)) => (rest, true),
            _ => (bits, false),
        };

        let handle = PROVIDER
            .import_private_key(curve, scalar)
            .inspect_err(|_| tracing::warn!(%curve, "native provider rejected private scalar"))?;
        let provided = PROVIDER
            .import_public_key(curve, point)
            .inspect_err(|_| tracing::warn!(%curve, "native provider rejected public point"))?;
        let public_point = PROVIDER.public_point(&provided);
        if PROVIDER.public_point_of(&handle) != public_point {
            tracing::warn!(%curve, "public point does not match private scalar");
            return Err(Error::FailedNativeKeyCreation);
        }

        let der = match sec1_der {
            Some(der) => der.to_vec(),
            None => encode_sec1(curve, scalar, bits),
        };
        Ok(PrivateKey {
            curve,
            handle,
            public_point,
            stripped,
            pem: Pem::from_bytes(Label::ECPrivateKey, &der).to_string(),
        })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// SEC1 PEM text, wrapped at 64 columns.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    pub fn pem_with(&self, options: &PemOptions) -> Result<String> {
        Ok(self.to_pem()?.encode_with(options))
    }

    /// Uncompressed public point, `0x04 ‖ X ‖ Y`.
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public_point
    }

    /// SEC1 DER decoded from the cached PEM.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_pem()?.decode()?)
    }

    pub fn extract_public_key(&self) -> Result<PublicKey> {
        let mut der = self.curve.spki_header();
        der.extend(bit_string(&self.public_point, true));
        PublicKey::from_der(&der)
    }

    pub fn sign(&self, message: impl AsRef<[u8]>) -> Result<Signature> {
        signature::sign(self, message)
    }

    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        crate::cipher::decrypt(envelope, self)
    }

    pub(crate) fn handle(&self) -> &PrivateHandle {
        &self.handle
    }

    /// Whether the public key BIT STRING led with an unused-bits byte. This
    /// describes the encoding the key was read from; generated keys are
    /// always encoded with that byte, so they report `true`.
    pub fn stripped(&self) -> bool {
        self.stripped
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve)
            .field("stripped", &self.stripped)
            .finish_non_exhaustive()
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_pem_str(s)
    }
}

impl FromPem for PrivateKey {
    type Error = Error;

    fn expected_label() -> Label {
        Label::ECPrivateKey
    }

    fn from_pem(pem: &Pem) -> Result<Self> {
        let der: Vec<u8> = pem.decode()?;
        match pem.label() {
            Label::ECPrivateKey => Self::from_sec1_der(&der),
            Label::PrivateKey => Self::from_pkcs8_der(&der),
            _ => Err(Error::UnknownPemHeader),
        }
    }
}

impl ToPem for PrivateKey {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::ECPrivateKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_str(&self.pem)?)
    }
}

impl DecodableFrom<Pem> for PrivateKey {}

impl Decoder<Pem, PrivateKey> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKey> {
        PrivateKey::from_pem(self)
    }
}

impl EncodableTo<PrivateKey> for Pem {}

impl Encoder<PrivateKey, Pem> for PrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Pem> {
        self.to_pem()
    }
}

fn lookup_curve(oid: &[u8]) -> Result<Curve> {
    Curve::from_oid(oid).inspect_err(|_| tracing::warn!(?oid, "unsupported curve OID"))
}

/// BIT STRING content for `point`, with the unused-bits byte when `padded`.
pub(crate) fn bit_string(point: &[u8], padded: bool) -> Vec<u8> {
    let mut bits = Vec::with_capacity(point.len() + 1);
    if padded {
        bits.push(0x00);
    }
    bits.extend_from_slice(point);
    bits
}

fn encode_sec1(curve: Curve, scalar: &[u8], bits: &[u8]) -> Vec<u8> {
    let mut content = encode_tlv(Tag::Integer, &[SEC1_VERSION as u8]);
    content.extend(encode_tlv(Tag::OctetString, scalar));
    content.extend(encode_tlv(
        Tag::ContextSpecific(0),
        &encode_tlv(Tag::ObjectIdentifier, curve.oid()),
    ));
    content.extend(encode_tlv(
        Tag::ContextSpecific(1),
        &encode_tlv(Tag::BitString, bits),
    ));
    encode_tlv(Tag::Sequence, &content)
}
