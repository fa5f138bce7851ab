mod etherscan;
mod types;

pub use etherscan::EtherscanClient;
pub use types::{CompilerSettings, ContractMetadata, DeploymentBytecode};

use async_trait::async_trait;
use ethers_core::types::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("contract {0:?} was not found")]
    NotFound(Address),
    #[error("contract {0:?} is not verified")]
    Unverified(Address),
    #[error("explorer rate limit reached: {0}")]
    RateLimited(String),
    #[error("explorer returned an error: {message}: {result}")]
    Api { message: String, result: String },
    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid explorer response: {0}")]
    InvalidResponse(String),
}

impl ExplorerError {
    /// Errors that may disappear if the request is sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            ExplorerError::RateLimited(_) => true,
            ExplorerError::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().map_or(false, |status| status.is_server_error())
            }
            _ => false,
        }
    }
}

/// Source of verified contract data for a single chain.
#[async_trait]
pub trait ContractDataClient: Send + Sync {
    async fn fetch_contract_data(&self, address: Address)
        -> Result<ContractMetadata, ExplorerError>;

    /// Fetches the bytecode of a deployment without requiring verified source.
    async fn fetch_bytecode(&self, address: Address) -> Result<DeploymentBytecode, ExplorerError>;
}
