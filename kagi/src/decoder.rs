//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The
//! destination has to opt in through the `DecodableFrom<T>` marker, so only
//! conversions somebody wrote down can be called.
//!
//! ```no_run
//! use kagi::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Raw(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct ArmorError;
//!
//! impl DecodableFrom<Armored> for Raw {}
//!
//! impl Decoder<Armored, Raw> for Armored {
//!     type Error = ArmorError;
//!
//!     fn decode(&self) -> Result<Raw, Self::Error> {
//!         Ok(Raw(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented on the source type. `D` must implement `DecodableFrom<T>`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails. The specific error
    /// conditions depend on the implementing type.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T> {}
