//! ECDSA signatures and the conversion between the fixed-width `r ‖ s` form
//! and the DER `SEQUENCE { INTEGER r, INTEGER s }` form.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use kagi_der::{Element, Tag, encode_tlv};

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::private_key::PrivateKey;
use crate::provider::{CryptoProvider, PROVIDER};
use crate::public_key::PublicKey;

/// Widths `r` and `s` may have, one per supported curve.
const SUPPORTED_WIDTHS: [usize; 3] = [32, 48, 66];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureFormat {
    /// ASN.1 `SEQUENCE { INTEGER r, INTEGER s }`
    #[default]
    Der,
    /// Fixed-width `r ‖ s`
    Raw,
}

impl fmt::Display for SignatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Der => write!(f, "der"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for SignatureFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "der" | "asn1" => Ok(Self::Der),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown signature format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    r: Vec<u8>,
    s: Vec<u8>,
    der: Vec<u8>,
}

impl Signature {
    pub fn from_raw(r: &[u8], s: &[u8]) -> Result<Self> {
        let der = raw_to_der(r, s)?;
        Ok(Signature {
            r: r.to_vec(),
            s: s.to_vec(),
            der,
        })
    }

    /// `bytes` is `r ‖ s` for `curve`.
    pub fn from_raw_bytes(curve: Curve, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 2 * curve.field_size() {
            return Err(Error::InvalidRsLength);
        }
        let (r, s) = bytes.split_at(curve.field_size());
        Self::from_raw(r, s)
    }

    /// Decodes a DER signature whose curve is not known, inferring the field
    /// width from the encoded length.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_der_with_width(der, heuristic_width(der.len()))
    }

    pub fn from_der_for_curve(curve: Curve, der: &[u8]) -> Result<Self> {
        Self::from_der_with_width(der, curve.field_size())
    }

    fn from_der_with_width(der: &[u8], width: usize) -> Result<Self> {
        let (r, s) = der_to_raw_with_width(der, width)?;
        Self::from_raw(&r, &s)
    }

    pub fn from_base64(format: SignatureFormat, text: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| Error::FailedBase64Encoding)?;
        match format {
            SignatureFormat::Der => Self::from_der(&bytes),
            SignatureFormat::Raw => {
                let (r, s) = bytes.split_at(bytes.len() / 2);
                Self::from_raw(r, s)
            }
        }
    }

    pub fn r(&self) -> &[u8] {
        &self.r
    }

    pub fn s(&self) -> &[u8] {
        &self.s
    }

    /// `r ‖ s`
    pub fn to_raw(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.r.len() + self.s.len());
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn curve_field_size(&self) -> usize {
        self.r.len()
    }

    pub fn to_bytes(&self, format: SignatureFormat) -> Vec<u8> {
        match format {
            SignatureFormat::Der => self.der.clone(),
            SignatureFormat::Raw => self.to_raw(),
        }
    }

    pub fn to_base64(&self, format: SignatureFormat) -> String {
        STANDARD.encode(self.to_bytes(format))
    }

    /// Checks the signature over `message`. Never errors: a malformed
    /// signature or a key on another curve yields `false`.
    pub fn verify(&self, public_key: &PublicKey, message: impl AsRef<[u8]>) -> bool {
        let curve = public_key.curve();
        if self.curve_field_size() != curve.field_size() {
            tracing::debug!(%curve, width = self.curve_field_size(), "signature width does not match key");
            return false;
        }
        let digest = PROVIDER.digest(curve.digest_algorithm(), message.as_ref());
        PROVIDER.ecdsa_verify(public_key.handle(), &digest, &self.der)
    }
}

/// Signs `message` with the curve's companion digest.
pub fn sign(private_key: &PrivateKey, message: impl AsRef<[u8]>) -> Result<Signature> {
    let curve = private_key.curve();
    let digest = PROVIDER.digest(curve.digest_algorithm(), message.as_ref());
    let der = PROVIDER.ecdsa_sign(private_key.handle(), &digest)?;
    // the curve is known here, so no width inference
    Signature::from_der_for_curve(curve, &der)
}

/// Encodes fixed-width `r` and `s` as a DER `SEQUENCE { INTEGER, INTEGER }`.
///
/// Both halves must have the same length, one of 32, 48 or 66 bytes.
pub fn raw_to_der(r: &[u8], s: &[u8]) -> Result<Vec<u8>> {
    if r.len() != s.len() || !SUPPORTED_WIDTHS.contains(&r.len()) {
        return Err(Error::InvalidRsLength);
    }
    let mut content = encode_tlv(Tag::Integer, &positive_integer(r));
    content.extend(encode_tlv(Tag::Integer, &positive_integer(s)));
    Ok(encode_tlv(Tag::Sequence, &content))
}

/// Decodes a DER signature into fixed-width `(r, s)`, inferring the width from
/// the total encoded length.
pub fn der_to_raw(der: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    der_to_raw_with_width(der, heuristic_width(der.len()))
}

pub fn der_to_raw_with_width(der: &[u8], width: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    let (element, _) = kagi_der::parse(der);
    let elements = element.as_sequence().ok_or(Error::FailedAsn1Decoding)?;
    if elements.len() < 2 {
        return Err(Error::FailedAsn1Decoding);
    }
    let r = fit_width(&integer_bytes(&elements[0])?, width)?;
    let s = fit_width(&integer_bytes(&elements[1])?, width)?;
    Ok((r, s))
}

/// <96 bytes for P-256, <132 for P-384, anything longer for P-521.
fn heuristic_width(der_length: usize) -> usize {
    if der_length < 96 {
        32
    } else if der_length < 132 {
        48
    } else {
        66
    }
}

/// Minimal DER INTEGER content for an unsigned big-endian value.
fn positive_integer(value: &[u8]) -> Vec<u8> {
    let skip = value
        .iter()
        .take(value.len().saturating_sub(1))
        .take_while(|&&b| b == 0)
        .count();
    let trimmed = &value[skip..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().is_some_and(|&b| b & 0x80 != 0) {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

fn integer_bytes(element: &Element) -> Result<Vec<u8>> {
    match element {
        Element::Bytes(bytes) => Ok(bytes.clone()),
        // short INTEGERs come back from the parser already folded
        Element::Integer(value) => Ok(value.to_be_bytes().to_vec()),
        _ => Err(Error::FailedAsn1Decoding),
    }
}

fn fit_width(value: &[u8], width: usize) -> Result<Vec<u8>> {
    if value.len() > width {
        let (excess, rest) = value.split_at(value.len() - width);
        if excess.iter().any(|&b| b != 0) {
            return Err(Error::FailedAsn1Decoding);
        }
        return Ok(rest.to_vec());
    }
    let mut out = vec![0u8; width - value.len()];
    out.extend_from_slice(value);
    Ok(out)
}
