//! Best-effort DER element parser and the small encoding helpers the key and
//! signature writers assemble their layouts with.
//!
//! [`parse`] never fails: malformed or truncated input degrades to
//! [`Element::Unknown`], and callers decide which shape they expect. The
//! `expect_*` accessors turn a shape mismatch into an [`Error`].

use kagi::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;

pub use error::{Error, Result};

/// Nesting depth at which parsing gives up and yields `Unknown`.
pub const MAX_DEPTH: usize = 32;

/// INTEGER payloads shorter than this are reduced to a native integer.
const NATIVE_INTEGER_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Integer,
    BitString,
    OctetString,
    ObjectIdentifier,
    Sequence,
    /// Context-specific constructed tag `[n]`, `n` in 0..=31.
    ContextSpecific(u8),
    Other(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Tag::Integer,
            0x03 => Tag::BitString,
            0x04 => Tag::OctetString,
            0x06 => Tag::ObjectIdentifier,
            0x30 => Tag::Sequence,
            v if v & 0xe0 == 0xa0 => Tag::ContextSpecific(v & 0x1f),
            v => Tag::Other(v),
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Integer => 0x02,
            Tag::BitString => 0x03,
            Tag::OctetString => 0x04,
            Tag::ObjectIdentifier => 0x06,
            Tag::Sequence => 0x30,
            Tag::ContextSpecific(n) => 0xa0 | (n & 0x1f),
            Tag::Other(v) => v,
        }
    }
}

/// A decoded DER element.
///
/// OCTET STRING, BIT STRING, OBJECT IDENTIFIER and any INTEGER too wide for
/// a native integer all surface as [`Element::Bytes`]. BIT STRING contents
/// keep their leading unused-bits byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Sequence(Vec<Element>),
    Integer(u64),
    Bytes(Vec<u8>),
    Constructed(u8, Box<Element>),
    Unknown,
}

impl Element {
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Sequence(_) => "SEQUENCE",
            Element::Integer(_) => "INTEGER",
            Element::Bytes(_) => "BYTES",
            Element::Constructed(..) => "CONSTRUCTED",
            Element::Unknown => "UNKNOWN",
        }
    }

    pub fn as_sequence(&self) -> Option<&[Element]> {
        match self {
            Element::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Element::Bytes(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Element::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the inner element when `self` is `[tag]`.
    pub fn as_constructed(&self, tag: u8) -> Option<&Element> {
        match self {
            Element::Constructed(t, inner) if *t == tag => Some(inner),
            _ => None,
        }
    }

    pub fn expect_sequence(&self) -> Result<&[Element]> {
        self.as_sequence().ok_or(Error::UnexpectedElement {
            expected: "SEQUENCE",
            found: self.kind(),
        })
    }

    pub fn expect_bytes(&self) -> Result<&[u8]> {
        self.as_bytes().ok_or(Error::UnexpectedElement {
            expected: "BYTES",
            found: self.kind(),
        })
    }

    pub fn expect_constructed(&self, tag: u8) -> Result<&Element> {
        self.as_constructed(tag).ok_or(Error::UnexpectedElement {
            expected: "CONSTRUCTED",
            found: self.kind(),
        })
    }
}

/// Parses one element from the front of `input`.
///
/// Returns the element and the number of bytes it occupied. Input shorter than
/// two bytes, or whose length prefix runs past the end of the buffer, yields
/// `(Element::Unknown, input.len())`.
pub fn parse(input: &[u8]) -> (Element, usize) {
    parse_at_depth(input, 0)
}

/// Decodes a DER length field.
///
/// Returns `(length, bytes consumed by the length field)`, or `None` when the
/// field is empty, indefinite, wider than `usize`, or truncated.
pub fn read_length(input: &[u8]) -> Option<(usize, usize)> {
    let (rest, length) = parse_length(input).ok()?;
    Some((length, input.len() - rest.len()))
}

fn parse_at_depth(input: &[u8], depth: usize) -> (Element, usize) {
    match parse_element(input, depth) {
        Ok((rest, element)) => (element, input.len() - rest.len()),
        Err(_) => (Element::Unknown, input.len()),
    }
}

fn parse_element(input: &[u8], depth: usize) -> IResult<&[u8], Element> {
    if input.len() < 2 || depth > MAX_DEPTH {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Eof,
        )));
    }
    let (input, tag) = parse_tag(input)?;
    let (input, length) = parse_length(input)?;
    let (rest, content) = nom::bytes::complete::take(length).parse(input)?;

    let element = match tag {
        Tag::Sequence => Element::Sequence(parse_children(content, depth + 1)),
        Tag::Integer if content.len() < NATIVE_INTEGER_LIMIT => {
            // two's-complement sign is not interpreted
            Element::Integer(content.iter().fold(0u64, |n, &b| (n << 8) | u64::from(b)))
        }
        Tag::Integer => Element::Bytes(content.to_vec()),
        Tag::ContextSpecific(n) => {
            let (inner, _) = parse_at_depth(content, depth + 1);
            Element::Constructed(n, Box::new(inner))
        }
        _ => Element::Bytes(content.to_vec()),
    };

    Ok((rest, element))
}

fn parse_children(mut content: &[u8], depth: usize) -> Vec<Element> {
    let mut elements = Vec::new();
    while !content.is_empty() {
        let (element, consumed) = parse_at_depth(content, depth);
        elements.push(element);
        // consumed is at most content.len()
        content = &content[consumed..];
    }
    elements
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    if n & 0x80 == 0 {
        // short form: 0-127
        return Ok((input, usize::from(n)));
    }
    // long form: the low 7 bits count the length octets that follow
    let count = usize::from(n & 0x7f);
    if count == 0 || count > std::mem::size_of::<usize>() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TooLarge,
        )));
    }
    let (input, bs) = nom::bytes::complete::take(count).parse(input)?;
    let length = bs.iter().fold(0usize, |n, &b| (n << 8) | usize::from(b));
    Ok((input, length))
}

/// Encodes `length` in DER short or long form.
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = Vec::with_capacity(1 + bytes.len() - skip);
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Encodes a complete tag-length-value triple.
pub fn encode_tlv(tag: Tag, content: &[u8]) -> Vec<u8> {
    let length = encode_length(content.len());
    let mut out = Vec::with_capacity(1 + length.len() + content.len());
    out.push(u8::from(tag));
    out.extend_from_slice(&length);
    out.extend_from_slice(content);
    out
}

impl DecodableFrom<&[u8]> for Element {}

/// Strict decoding: the whole buffer must be exactly one well-formed element.
impl Decoder<&[u8], Element> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Element> {
        let (element, consumed) = parse(self);
        if element == Element::Unknown {
            return Err(Error::Malformed);
        }
        if consumed != self.len() {
            return Err(Error::TrailingData {
                consumed,
                length: self.len(),
            });
        }
        Ok(element)
    }
}

impl DecodableFrom<Vec<u8>> for Element {}

impl Decoder<Vec<u8>, Element> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Element> {
        self.as_slice().decode()
    }
}
