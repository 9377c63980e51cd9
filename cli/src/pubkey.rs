use clap::Args;
use kagi_ecc::PrivateKey;

use crate::error::Result;
use crate::utils::read_text;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the private key PEM (SEC1 or PKCS#8). If not specified, reads from stdin
    file: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let pem = read_text(config.file.as_deref())?;
    let private_key = PrivateKey::from_pem_str(&pem)?;
    println!("{}", private_key.extract_public_key()?.pem());
    Ok(())
}
