use std::io::{self, Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Args;

use crate::error::Result;
use crate::utils::{read_private_key, read_text};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the recipient's private key PEM
    #[arg(short, long)]
    key: String,

    /// Path to the base64 envelope. If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let private_key = read_private_key(&config.key)?;
    let envelope = STANDARD.decode(read_text(config.file.as_deref())?)?;
    let plaintext = private_key.decrypt(&envelope)?;
    io::stdout().write_all(&plaintext)?;
    Ok(())
}
