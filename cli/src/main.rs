use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod decrypt;
mod der;
mod encrypt;
mod error;
mod jwt;
mod keygen;
mod pubkey;
mod sign;
mod utils;
mod verify;

use error::Result;

use der::DerCommands;
use jwt::JwtCommands;

#[derive(Parser)]
#[command(name = "kagi")]
#[command(about = "Elliptic-curve key, signature and encryption toolkit", long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an EC private key
    Keygen {
        #[command(flatten)]
        config: keygen::Config,
    },
    /// Derive the public key of a private key
    Pubkey {
        #[command(flatten)]
        config: pubkey::Config,
    },
    /// Sign a message with ECDSA
    Sign {
        #[command(flatten)]
        config: sign::Config,
    },
    /// Verify an ECDSA signature
    Verify {
        #[command(flatten)]
        config: verify::Config,
    },
    /// Encrypt a message to a public key
    Encrypt {
        #[command(flatten)]
        config: encrypt::Config,
    },
    /// Decrypt an envelope with a private key
    Decrypt {
        #[command(flatten)]
        config: decrypt::Config,
    },
    /// DER inspection
    Der {
        #[command(subcommand)]
        command: DerCommands,
    },
    /// JSON Web Tokens signed with ES256/ES384/ES512
    Jwt {
        #[command(subcommand)]
        command: JwtCommands,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Keygen { config } => {
            keygen::execute(config)?;
            ExitCode::SUCCESS
        }
        Commands::Pubkey { config } => {
            pubkey::execute(config)?;
            ExitCode::SUCCESS
        }
        Commands::Sign { config } => {
            sign::execute(config)?;
            ExitCode::SUCCESS
        }
        Commands::Verify { config } => verify::execute(config)?,
        Commands::Encrypt { config } => {
            encrypt::execute(config)?;
            ExitCode::SUCCESS
        }
        Commands::Decrypt { config } => {
            decrypt::execute(config)?;
            ExitCode::SUCCESS
        }
        Commands::Der { command } => match command {
            DerCommands::Dump { config } => {
                der::dump::execute(config)?;
                ExitCode::SUCCESS
            }
        },
        Commands::Jwt { command } => match command {
            JwtCommands::Create { config } => {
                jwt::create::execute(config)?;
                ExitCode::SUCCESS
            }
            JwtCommands::Verify { config } => jwt::verify::execute(config)?,
        },
    };

    Ok(code)
}
