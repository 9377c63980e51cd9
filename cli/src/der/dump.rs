use std::fmt::Write;
use std::str::FromStr;

use clap::Args;
use kagi::decoder::Decoder;
use kagi_der::Element;
use kagi_pem::Pem;

use crate::error::Result;
use crate::utils::{format_hex_dump, read_input};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the DER or PEM file. If not specified, reads from stdin
    file: Option<String>,

    /// Output a hexadecimal dump of the DER bytes instead of the tree
    #[arg(long)]
    hex: bool,
}

const INDENT: &str = "  ";

/// PEM armor is detected by its boundary; anything else is taken as DER.
fn to_der(input: Vec<u8>) -> Result<Vec<u8>> {
    match std::str::from_utf8(&input) {
        Ok(text) if text.trim_start().starts_with("-----") => {
            let pem = Pem::from_str(text)?;
            Ok(pem.decode()?)
        }
        _ => Ok(input),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn render(element: &Element, depth: usize, out: &mut String) -> std::fmt::Result {
    let indent = INDENT.repeat(depth);
    match element {
        Element::Sequence(children) => {
            writeln!(out, "{indent}SEQUENCE ({} elements)", children.len())?;
            for child in children {
                render(child, depth + 1, out)?;
            }
        }
        Element::Integer(value) => writeln!(out, "{indent}INTEGER {value}")?,
        Element::Bytes(bytes) => writeln!(out, "{indent}BYTES ({} bytes) {}", bytes.len(), hex(bytes))?,
        Element::Constructed(tag, inner) => {
            writeln!(out, "{indent}[{tag}]")?;
            render(inner, depth + 1, out)?;
        }
        Element::Unknown => writeln!(out, "{indent}UNKNOWN")?,
    }
    Ok(())
}

pub(crate) fn format_tree(der: &[u8]) -> Result<String> {
    let (element, consumed) = kagi_der::parse(der);
    let mut out = String::new();
    render(&element, 0, &mut out)?;
    if consumed < der.len() {
        writeln!(out, "({} trailing bytes)", der.len() - consumed)?;
    }
    Ok(out)
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let der = to_der(read_input(config.file.as_deref())?)?;

    if config.hex {
        print!("{}", format_hex_dump(&der));
    } else {
        print!("{}", format_tree(&der)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tree() {
        let tree = format_tree(&[0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x07]).unwrap();
        assert_eq!("SEQUENCE (2 elements)\n  INTEGER 5\n  INTEGER 7\n", tree);
    }

    #[test]
    fn test_format_tree_constructed_and_trailing() {
        let tree = format_tree(&[0xa1, 0x03, 0x04, 0x01, 0xff, 0x00]).unwrap();
        assert_eq!("[1]\n  BYTES (1 bytes) ff\n(1 trailing bytes)\n", tree);
    }

    #[test]
    fn test_format_tree_truncated() {
        assert_eq!("UNKNOWN\n", format_tree(&[0x30, 0x05, 0x02]).unwrap());
    }

    #[test]
    fn test_to_der_accepts_pem() {
        let pem = "-----BEGIN PUBLIC KEY-----\nMAYCAQUCAQc=\n-----END PUBLIC KEY-----\n";
        assert_eq!(
            vec![0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x07],
            to_der(pem.as_bytes().to_vec()).unwrap()
        );
        assert_eq!(vec![0x30, 0x00], to_der(vec![0x30, 0x00]).unwrap());
    }
}
