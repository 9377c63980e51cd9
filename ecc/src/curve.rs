//! Supported named curves.
//!
//! Each curve fixes its key sizes, its object identifier and its companion
//! digest. The digest is used both for ECDSA message hashing and for the
//! hybrid cipher's key derivation.

use std::{fmt, str::FromStr};

use kagi_der::{Tag, encode_tlv};

use crate::error::{Error, Result};

/// id-ecPublicKey, 1.2.840.10045.2.1
pub const OID_EC_PUBLIC_KEY: [u8; 7] = [0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// prime256v1 (also known as secp256r1 or P-256)
    /// OID: 1.2.840.10045.3.1.7
    Prime256v1,
    /// secp384r1 (also known as P-384)
    /// OID: 1.3.132.0.34
    Secp384r1,
    /// secp521r1 (also known as P-521)
    /// OID: 1.3.132.0.35
    Secp521r1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const fn output_size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl Curve {
    pub const OID_PRIME256V1: &'static [u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
    pub const OID_SECP384R1: &'static [u8] = &[0x2b, 0x81, 0x04, 0x00, 0x22];
    pub const OID_SECP521R1: &'static [u8] = &[0x2b, 0x81, 0x04, 0x00, 0x23];

    pub const ALL: [Curve; 3] = [Curve::Prime256v1, Curve::Secp384r1, Curve::Secp521r1];

    /// Content octets of the curve's OBJECT IDENTIFIER.
    pub const fn oid(&self) -> &'static [u8] {
        match self {
            Self::Prime256v1 => Self::OID_PRIME256V1,
            Self::Secp384r1 => Self::OID_SECP384R1,
            Self::Secp521r1 => Self::OID_SECP521R1,
        }
    }

    pub fn from_oid(oid: &[u8]) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|curve| curve.oid() == oid)
            .ok_or(Error::UnsupportedCurve)
    }

    /// Byte length of a field element, and of each of `r` and `s`.
    pub const fn field_size(&self) -> usize {
        match self {
            Self::Prime256v1 => 32,
            Self::Secp384r1 => 48,
            Self::Secp521r1 => 66,
        }
    }

    /// Byte length of an uncompressed public point, `0x04 ‖ X ‖ Y`.
    pub const fn key_size(&self) -> usize {
        1 + 2 * self.field_size()
    }

    pub const fn digest_algorithm(&self) -> DigestAlgorithm {
        match self {
            Self::Prime256v1 => DigestAlgorithm::Sha256,
            Self::Secp384r1 => DigestAlgorithm::Sha384,
            Self::Secp521r1 => DigestAlgorithm::Sha512,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Prime256v1 => "prime256v1",
            Self::Secp384r1 => "secp384r1",
            Self::Secp521r1 => "secp521r1",
        }
    }

    /// JWS `alg` value for ECDSA with this curve's digest.
    pub const fn jwt_algorithm(&self) -> &'static str {
        match self {
            Self::Prime256v1 => "ES256",
            Self::Secp384r1 => "ES384",
            Self::Secp521r1 => "ES512",
        }
    }

    /// The `AlgorithmIdentifier` SEQUENCE of a SubjectPublicKeyInfo.
    pub fn algorithm_identifier(&self) -> Vec<u8> {
        let mut content = encode_tlv(Tag::ObjectIdentifier, &OID_EC_PUBLIC_KEY);
        content.extend(encode_tlv(Tag::ObjectIdentifier, self.oid()));
        encode_tlv(Tag::Sequence, &content)
    }

    /// Fixed SubjectPublicKeyInfo prefix up to and including the BIT STRING
    /// length. Appending `0x00 ‖ point` completes the structure.
    ///
    /// ```text
    /// P-256: 30 59 30 13 06 07 2a8648ce3d0201 06 08 2a8648ce3d030107 03 42
    /// P-384: 30 76 30 10 06 07 2a8648ce3d0201 06 05 2b81040022       03 62
    /// P-521: 30 81 9b 30 10 06 07 2a8648ce3d0201 06 05 2b81040023    03 81 86
    /// ```
    pub fn spki_header(&self) -> Vec<u8> {
        let algorithm = self.algorithm_identifier();
        // unused-bits byte plus the point
        let bit_string_length = kagi_der::encode_length(1 + self.key_size());
        let content_length = algorithm.len() + 1 + bit_string_length.len() + 1 + self.key_size();

        let mut header = vec![u8::from(Tag::Sequence)];
        header.extend(kagi_der::encode_length(content_length));
        header.extend(algorithm);
        header.push(u8::from(Tag::BitString));
        header.extend(bit_string_length);
        header
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prime256v1" | "secp256r1" | "p-256" | "p256" => Ok(Self::Prime256v1),
            "secp384r1" | "p-384" | "p384" => Ok(Self::Secp384r1),
            "secp521r1" | "p-521" | "p521" => Ok(Self::Secp521r1),
            _ => Err(Error::UnsupportedCurve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rstest::rstest;

    #[rstest]
    #[case(Curve::Prime256v1, 32, 65, DigestAlgorithm::Sha256)]
    #[case(Curve::Secp384r1, 48, 97, DigestAlgorithm::Sha384)]
    #[case(Curve::Secp521r1, 66, 133, DigestAlgorithm::Sha512)]
    fn test_curve_sizes(
        #[case] curve: Curve,
        #[case] field_size: usize,
        #[case] key_size: usize,
        #[case] digest: DigestAlgorithm,
    ) {
        assert_eq!(field_size, curve.field_size());
        assert_eq!(key_size, curve.key_size());
        assert_eq!(digest, curve.digest_algorithm());
    }

    #[rstest]
    #[case(Curve::Prime256v1)]
    #[case(Curve::Secp384r1)]
    #[case(Curve::Secp521r1)]
    fn test_oid_round_trip(#[case] curve: Curve) {
        assert_eq!(curve, Curve::from_oid(curve.oid()).unwrap());
        assert_eq!(curve, curve.to_string().parse::<Curve>().unwrap());
    }

    #[rstest]
    #[case(&hex!("2b 81 04 00 21"))] // secp224r1
    #[case(&hex!("2a 86 48 ce 3d 03 01"))]
    #[case(&hex!(""))]
    fn test_from_oid_unsupported(#[case] oid: &[u8]) {
        assert_eq!(Err(Error::UnsupportedCurve), Curve::from_oid(oid));
    }

    #[rstest]
    #[case("P-256", Curve::Prime256v1)]
    #[case("secp256r1", Curve::Prime256v1)]
    #[case("P-384", Curve::Secp384r1)]
    #[case("SECP521R1", Curve::Secp521r1)]
    fn test_from_str_aliases(#[case] name: &str, #[case] expected: Curve) {
        assert_eq!(expected, name.parse::<Curve>().unwrap());
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(Err(Error::UnsupportedCurve), "secp256k1".parse::<Curve>());
    }

    #[rstest]
    #[case(
        Curve::Prime256v1,
        hex!("30 59 30 13 06 07 2a 86 48 ce 3d 02 01 06 08 2a 86 48 ce 3d 03 01 07 03 42").to_vec()
    )]
    #[case(
        Curve::Secp384r1,
        hex!("30 76 30 10 06 07 2a 86 48 ce 3d 02 01 06 05 2b 81 04 00 22 03 62").to_vec()
    )]
    #[case(
        Curve::Secp521r1,
        hex!("30 81 9b 30 10 06 07 2a 86 48 ce 3d 02 01 06 05 2b 81 04 00 23 03 81 86").to_vec()
    )]
    fn test_spki_header(#[case] curve: Curve, #[case] expected: Vec<u8>) {
        assert_eq!(expected, curve.spki_header());
    }

    #[rstest]
    #[case(Curve::Prime256v1, "ES256")]
    #[case(Curve::Secp384r1, "ES384")]
    #[case(Curve::Secp521r1, "ES512")]
    fn test_jwt_algorithm(#[case] curve: Curve, #[case] alg: &str) {
        assert_eq!(alg, curve.jwt_algorithm());
    }
}
