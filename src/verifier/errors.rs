use crate::{
    bytecode::{BytecodeMismatch, ReconcileError},
    explorer::ExplorerError,
    rpc::RpcError,
};
use ethers_core::types::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("chain '{0}' is not configured")]
    UnknownChain(String),
    #[error("fetching data of {address:?} on '{chain}' failed: {source}")]
    UpstreamFetch {
        chain: String,
        address: Address,
        #[source]
        source: UpstreamError,
    },
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("bytecode verification failed: {}", display_mismatches(.0))]
    Mismatches(Vec<BytecodeMismatch>),
}

fn display_mismatches(mismatches: &[BytecodeMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl VerificationError {
    pub(super) fn upstream(
        chain: &str,
        address: Address,
        source: impl Into<UpstreamError>,
    ) -> Self {
        VerificationError::UpstreamFetch {
            chain: chain.to_string(),
            address,
            source: source.into(),
        }
    }
}
