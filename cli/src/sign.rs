use clap::Args;
use kagi_ecc::SignatureFormat;

use crate::error::Result;
use crate::utils::{read_input, read_private_key};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the private key PEM
    #[arg(short, long)]
    key: String,

    /// Signature encoding (der or raw)
    #[arg(short, long, default_value_t = SignatureFormat::Der)]
    format: SignatureFormat,

    /// Path to the message. If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let private_key = read_private_key(&config.key)?;
    let message = read_input(config.file.as_deref())?;
    let signature = private_key.sign(&message)?;
    println!("{}", signature.to_base64(config.format));
    Ok(())
}
