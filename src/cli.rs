use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file. Overrides the `DEPLOYMENT_VERIFIER__CONFIG` variable.
    #[clap(short, long)]
    pub config_path: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Verify every configured contract.
    Verify,
    /// Print an L1 block of a configured chain as json.
    L1Block {
        #[clap(long)]
        chain: String,
        #[clap(long)]
        hash: String,
    },
}
