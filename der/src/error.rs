use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("malformed DER element")]
    Malformed,
    #[error("trailing data after element: consumed {consumed} of {length} bytes")]
    TrailingData { consumed: usize, length: usize },
    #[error("unexpected element: expected {expected}, found {found}")]
    UnexpectedElement {
        expected: &'static str,
        found: &'static str,
    },
}
