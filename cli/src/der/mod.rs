pub(crate) mod dump;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum DerCommands {
    /// Print the element tree of DER or PEM input
    Dump {
        #[command(flatten)]
        config: dump::Config,
    },
}
