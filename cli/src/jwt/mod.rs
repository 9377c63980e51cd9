pub(crate) mod create;
pub(crate) mod verify;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum JwtCommands {
    /// Create a signed token
    Create {
        #[command(flatten)]
        config: create::Config,
    },
    /// Verify a token and print its claims
    Verify {
        #[command(flatten)]
        config: verify::Config,
    },
}
