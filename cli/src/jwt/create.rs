use clap::Args;
use kagi_ecc::jwt::{DEFAULT_LIFETIME, JwtClaims, create_jwt};

use crate::error::Result;
use crate::utils::{read_private_key, unix_now};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the private key PEM
    #[arg(short, long)]
    key: String,

    /// Audience claim
    #[arg(short, long)]
    audience: String,

    /// Issued-at time in seconds since the Unix epoch (defaults to now)
    #[arg(long)]
    iat: Option<u64>,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_LIFETIME)]
    expires_in: u64,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let private_key = read_private_key(&config.key)?;
    let iat = match config.iat {
        Some(iat) => iat,
        None => unix_now()?,
    };
    let claims = JwtClaims::with_lifetime(config.audience, iat, config.expires_in);
    println!("{}", create_jwt(&claims, &private_key)?);
    Ok(())
}
