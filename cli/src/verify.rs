use std::process::ExitCode;

use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Args;
use kagi_ecc::{PublicKey, Signature, SignatureFormat};

use crate::error::Result;
use crate::utils::{read_input, read_public_key};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the public key PEM
    #[arg(short, long)]
    key: String,

    /// Base64 signature
    #[arg(short, long)]
    signature: String,

    /// Signature encoding (der or raw)
    #[arg(short, long, default_value_t = SignatureFormat::Der)]
    format: SignatureFormat,

    /// Path to the message. If not specified, reads from stdin
    file: Option<String>,
}

/// The key's curve fixes the field width, so neither form needs guessing.
fn decode_signature(
    public_key: &PublicKey,
    format: SignatureFormat,
    bytes: &[u8],
) -> Option<Signature> {
    let curve = public_key.curve();
    let signature = match format {
        SignatureFormat::Der => Signature::from_der_for_curve(curve, bytes),
        SignatureFormat::Raw => Signature::from_raw_bytes(curve, bytes),
    };
    signature
        .inspect_err(|e| tracing::debug!(error = %e, "signature does not decode"))
        .ok()
}

pub(crate) fn execute(config: Config) -> Result<ExitCode> {
    let public_key = read_public_key(&config.key)?;
    let bytes = STANDARD.decode(config.signature.trim())?;
    let message = read_input(config.file.as_deref())?;

    let verified = decode_signature(&public_key, config.format, &bytes)
        .is_some_and(|signature| public_key.verify(&message, &signature));
    if verified {
        println!("Verified OK");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Verification failure");
        Ok(ExitCode::FAILURE)
    }
}
