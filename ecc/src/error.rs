use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid PEM string")]
    InvalidPemString,
    #[error("unknown PEM header")]
    UnknownPemHeader,
    #[error("failed base64 encoding")]
    FailedBase64Encoding,
    #[error("failed ASN.1 decoding")]
    FailedAsn1Decoding,
    #[error("unsupported curve")]
    UnsupportedCurve,
    #[error("failed native key creation")]
    FailedNativeKeyCreation,
    #[error("failed signing algorithm")]
    FailedSigningAlgorithm,
    #[error("invalid r/s length")]
    InvalidRsLength,
    #[error("failed encryption algorithm")]
    FailedEncryptionAlgorithm,
    #[error("failed decryption algorithm")]
    FailedDecryptionAlgorithm,
    #[error("failed UTF-8 decoding")]
    FailedUtf8Decoding,
    #[error("random number generator failure")]
    RngFailure,
    #[error("keys belong to different curves")]
    CurveMismatch,
    #[error("invalid JWT: {0}")]
    InvalidJwt(String),
}

impl From<kagi_pem::error::Error> for Error {
    fn from(e: kagi_pem::error::Error) -> Self {
        match e {
            kagi_pem::error::Error::InvalidPemString => Error::InvalidPemString,
            kagi_pem::error::Error::UnknownLabel(_) => Error::UnknownPemHeader,
            kagi_pem::error::Error::Base64Decode(_) => Error::FailedBase64Encoding,
        }
    }
}

impl From<kagi_der::Error> for Error {
    fn from(_: kagi_der::Error) -> Self {
        Error::FailedAsn1Decoding
    }
}
