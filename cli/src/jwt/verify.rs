use std::process::ExitCode;

use clap::Args;
use kagi_ecc::jwt::verify_jwt;

use crate::error::Result;
use crate::utils::{read_public_key, read_text, unix_now};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the public key PEM
    #[arg(short, long)]
    key: String,

    /// Accept tokens whose `exp` has passed
    #[arg(long)]
    ignore_expiry: bool,

    /// The token. If not specified, reads from stdin
    token: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<ExitCode> {
    let public_key = read_public_key(&config.key)?;
    let token = match config.token {
        Some(token) => token,
        None => read_text(None)?,
    };

    let claims = verify_jwt(&token, &public_key)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);

    if !config.ignore_expiry && claims.is_expired(unix_now()?) {
        eprintln!("token expired at {}", claims.exp);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
