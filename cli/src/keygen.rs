use std::fs;

use clap::Args;
use kagi_ecc::{Curve, PrivateKey};
use kagi_pem::PemOptions;

use crate::error::Result;

#[derive(Args)]
pub(crate) struct Config {
    /// Curve name (prime256v1, secp384r1, secp521r1 or P-256, P-384, P-521)
    #[arg(short, long, default_value_t = Curve::Prime256v1)]
    curve: Curve,

    /// Also write the matching public key PEM to this path
    #[arg(long)]
    public_out: Option<String>,

    /// Base64 characters per PEM line
    #[arg(long, default_value_t = kagi_pem::DEFAULT_LINE_WIDTH)]
    line_width: usize,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let options = PemOptions {
        line_width: config.line_width,
    };
    let private_key = PrivateKey::generate(config.curve)?;

    if let Some(path) = config.public_out.as_deref() {
        let public_key = private_key.extract_public_key()?;
        fs::write(path, public_key.pem_with(&options)? + "\n")?;
    }

    println!("{}", private_key.pem_with(&options)?);
    Ok(())
}
