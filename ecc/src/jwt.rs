//! Compact JWS tokens signed with ES256, ES384 or ES512.
//!
//! The token is `base64url(header).base64url(claims).base64url(r ‖ s)` with
//! unpadded base64url segments and a fixed-width raw signature.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::signature::Signature;

/// Lifetime applied by [`JwtClaims::new`], in seconds.
pub const DEFAULT_LIFETIME: u64 = 3600;

const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Registered claims carried in the payload, serialized as
/// `{"iat":…,"exp":…,"aud":…}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    pub aud: String,
}

impl JwtClaims {
    pub fn new(audience: impl Into<String>, issued_at: u64) -> Self {
        Self::with_lifetime(audience, issued_at, DEFAULT_LIFETIME)
    }

    pub fn with_lifetime(audience: impl Into<String>, issued_at: u64, lifetime: u64) -> Self {
        JwtClaims {
            iat: issued_at,
            exp: issued_at.saturating_add(lifetime),
            aud: audience.into(),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.exp
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| Error::InvalidJwt(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| Error::InvalidJwt(format!("{name}: {e}")))
}

/// Signs `claims` with the algorithm implied by the key's curve.
pub fn create_jwt(claims: &JwtClaims, private_key: &PrivateKey) -> Result<String> {
    let header = JwtHeader {
        alg: private_key.curve().jwt_algorithm().to_string(),
        typ: TOKEN_TYPE.to_string(),
    };
    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);
    let signature = private_key.sign(signing_input.as_bytes())?;
    tracing::debug!(alg = %header.alg, aud = %claims.aud, "created JWT");
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_raw())
    ))
}

/// Checks the header and signature of `token` and returns its claims.
///
/// Expiry is not enforced here; see [`JwtClaims::is_expired`].
pub fn verify_jwt(token: &str, public_key: &PublicKey) -> Result<JwtClaims> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(Error::InvalidJwt("expected three segments".to_string()));
    };

    let header_json: JwtHeader = serde_json::from_slice(&decode_segment(header, "header")?)
        .map_err(|e| Error::InvalidJwt(format!("header: {e}")))?;
    let expected = public_key.curve().jwt_algorithm();
    if header_json.alg != expected {
        return Err(Error::InvalidJwt(format!(
            "algorithm {} does not match {expected}",
            header_json.alg
        )));
    }

    let raw = decode_segment(signature, "signature")?;
    let signature = Signature::from_raw_bytes(public_key.curve(), &raw)
        .map_err(|_| Error::InvalidJwt("signature has the wrong length".to_string()))?;
    let signing_input = &token.trim()[..header.len() + 1 + payload.len()];
    if !signature.verify(public_key, signing_input.as_bytes()) {
        tracing::warn!(alg = expected, "JWT signature rejected");
        return Err(Error::InvalidJwt("signature verification failed".to_string()));
    }

    serde_json::from_slice(&decode_segment(payload, "payload")?)
        .map_err(|e| Error::InvalidJwt(format!("payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use crate::private_key::tests::{P256_SEC1_PEM, P256_SPKI_PEM};
    use rstest::rstest;

    #[test]
    fn test_claims_serialization_order() {
        let claims = JwtClaims::new("my-project", 1_500_000_000);
        assert_eq!(
            r#"{"iat":1500000000,"exp":1500003600,"aud":"my-project"}"#,
            serde_json::to_string(&claims).unwrap()
        );
        assert!(!claims.is_expired(1_500_003_599));
        assert!(claims.is_expired(1_500_003_600));
    }

    #[test]
    fn test_create_layout() {
        let key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        let token = create_jwt(&JwtClaims::new("my-project", 1_500_000_000), &key).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(3, segments.len());
        // {"alg":"ES256","typ":"JWT"}
        assert_eq!("eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9", segments[0]);
        assert_eq!(
            "eyJpYXQiOjE1MDAwMDAwMDAsImV4cCI6MTUwMDAwMzYwMCwiYXVkIjoibXktcHJvamVjdCJ9",
            segments[1]
        );
        assert_eq!(64, URL_SAFE_NO_PAD.decode(segments[2]).unwrap().len());
        assert!(!token.contains('='));
    }

    #[rstest]
    #[case(Curve::Prime256v1, "ES256")]
    #[case(Curve::Secp384r1, "ES384")]
    #[case(Curve::Secp521r1, "ES512")]
    fn test_round_trip(#[case] curve: Curve, #[case] alg: &str) {
        let key = PrivateKey::generate(curve).unwrap();
        let claims = JwtClaims::with_lifetime("device", 42, 60);
        let token = create_jwt(&claims, &key).unwrap();
        let header: JwtHeader =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(token.split('.').next().unwrap()).unwrap())
                .unwrap();
        assert_eq!(alg, header.alg);

        let public_key = key.extract_public_key().unwrap();
        assert_eq!(claims, verify_jwt(&token, &public_key).unwrap());
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let key = PrivateKey::from_pem_str(P256_SEC1_PEM).unwrap();
        let public_key = PublicKey::from_pem_str(P256_SPKI_PEM).unwrap();
        let token = create_jwt(&JwtClaims::new("my-project", 1_500_000_000), &key).unwrap();

        let forged_claims = encode_segment(&JwtClaims::new("other", 1_500_000_000)).unwrap();
        let mut segments: Vec<&str> = token.split('.').collect();
        segments[1] = &forged_claims;
        assert!(matches!(
            verify_jwt(&segments.join("."), &public_key),
            Err(Error::InvalidJwt(_))
        ));
    }

    #[rstest]
    #[case("")]
    #[case("a.b")]
    #[case("a.b.c.d")]
    #[case("!!!.e30.AAAA")]
    fn test_verify_rejects_malformed(#[case] token: &str) {
        let public_key = PublicKey::from_pem_str(P256_SPKI_PEM).unwrap();
        assert!(matches!(
            verify_jwt(token, &public_key),
            Err(Error::InvalidJwt(_))
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_algorithm() {
        let key = PrivateKey::generate(Curve::Secp384r1).unwrap();
        let token = create_jwt(&JwtClaims::new("device", 0), &key).unwrap();
        let public_key = PublicKey::from_pem_str(P256_SPKI_PEM).unwrap();
        let err = verify_jwt(&token, &public_key).unwrap_err();
        assert_eq!(
            Error::InvalidJwt("algorithm ES384 does not match ES256".to_string()),
            err
        );
    }
}
