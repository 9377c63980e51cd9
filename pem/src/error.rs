use base64::DecodeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing or decoding PEM data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Fewer `-----` delimited segments than a single PEM block needs
    #[error("invalid PEM string")]
    InvalidPemString,

    /// The label in the boundary marker is not recognized
    #[error("unknown PEM label: {0}")]
    UnknownLabel(String),

    /// Failed to decode base64 data
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
