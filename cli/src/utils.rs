use std::fs;
use std::io::{self, Read};
use std::time::{SystemTime, UNIX_EPOCH};

use kagi_ecc::{PrivateKey, PublicKey};

use crate::error::{Error, Result};

/// Read input from a file or stdin
///
/// If `file` is `Some`, reads from the specified file path.
/// If `file` is `None`, reads from stdin.
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    match file {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Read input as UTF-8 text with surrounding whitespace removed
pub(crate) fn read_text(file: Option<&str>) -> Result<String> {
    let text = String::from_utf8(read_input(file)?)?;
    Ok(text.trim().to_string())
}

pub(crate) fn read_private_key(path: &str) -> Result<PrivateKey> {
    let pem = fs::read_to_string(path)?;
    Ok(PrivateKey::from_pem_str(&pem)?)
}

pub(crate) fn read_public_key(path: &str) -> Result<PublicKey> {
    let pem = fs::read_to_string(path)?;
    Ok(PublicKey::from_pem_str(&pem)?)
}

/// Seconds since the Unix epoch
pub(crate) fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| Error::InvalidInput("system clock is before the Unix epoch".to_string()))
}

/// Format binary data as hexadecimal dump
///
/// Returns a string formatted in hexdump style (similar to `xxd` command):
/// - 16 bytes per line
/// - Offset in hexadecimal
/// - Hex bytes with space separator
/// - ASCII representation on the right
pub(crate) fn format_hex_dump(data: &[u8]) -> String {
    const BYTES_PER_LINE: usize = 16;
    let mut output = String::new();

    for (offset, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        output.push_str(&format!("{:08x}  ", offset * BYTES_PER_LINE));

        for (i, byte) in chunk.iter().enumerate() {
            output.push_str(&format!("{:02x} ", byte));
            if i == 7 {
                output.push(' ');
            }
        }

        // Padding for incomplete lines
        for i in chunk.len()..BYTES_PER_LINE {
            output.push_str("   ");
            if i == 7 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
