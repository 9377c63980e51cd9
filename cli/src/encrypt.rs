use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Args;

use crate::error::Result;
use crate::utils::{read_input, read_public_key};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the recipient's public key PEM
    #[arg(short, long)]
    key: String,

    /// Path to the plaintext. If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let public_key = read_public_key(&config.key)?;
    let plaintext = read_input(config.file.as_deref())?;
    let envelope = public_key.encrypt(&plaintext)?;
    println!("{}", STANDARD.encode(envelope));
    Ok(())
}
