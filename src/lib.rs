pub mod bytecode;
mod cli;
mod consts;
pub mod explorer;
pub mod l1_block;
pub mod rpc;
mod run;
mod settings;
mod types;
pub mod verifier;

pub use cli::{Args, Command};
pub use run::run;
pub use settings::{ChainSettings, ContractSettings, HttpSettings, Settings};
pub use types::Mismatch;
pub use verifier::{Verdict, VerificationError, VerificationRequest, Verifier};
