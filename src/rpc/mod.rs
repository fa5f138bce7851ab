mod client;

pub use client::JsonRpcClient;

use async_trait::async_trait;
use ethers_core::types::{Address, Bytes, H256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("rpc request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
    #[error("block {0:?} was not found")]
    BlockNotFound(H256),
}

/// Returns the code currently stored at an address.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    async fn get_code(&self, address: Address) -> Result<Bytes, RpcError>;
}
