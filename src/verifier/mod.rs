//! Sequences explorer and rpc calls and the bytecode checks for one contract.

mod errors;
mod types;

pub use errors::{UpstreamError, VerificationError};
pub use types::{
    CompanionCheck, ComparisonRequest, FetchedContract, Verdict, VerificationRequest,
};

use crate::{
    bytecode::{compare_bytecode, compare_bytes, decode_hex, BytecodeCheck, BytecodeMismatch},
    explorer::{ContractDataClient, ContractMetadata, DeploymentBytecode, EtherscanClient},
    rpc::{CodeProvider, JsonRpcClient},
    settings::Settings,
};
use anyhow::Context;
use bytes::Bytes;
use ethers_core::types::Address;
use std::{collections::HashMap, sync::Arc};

#[derive(Default, Clone)]
pub struct Verifier {
    explorers: HashMap<String, Arc<dyn ContractDataClient>>,
    rpcs: HashMap<String, Arc<dyn CodeProvider>>,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(
        mut self,
        chain: impl Into<String>,
        explorer: Arc<dyn ContractDataClient>,
        rpc: Arc<dyn CodeProvider>,
    ) -> Self {
        let chain = chain.into();
        self.explorers.insert(chain.clone(), explorer);
        self.rpcs.insert(chain, rpc);
        self
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut verifier = Self::new();
        for (name, chain) in &settings.chains {
            let explorer = EtherscanClient::new(name.as_str(), chain, &settings.http)
                .with_context(|| format!("explorer client for '{name}'"))?;
            let rpc = JsonRpcClient::new(chain.rpc_url.clone(), settings.http.request_timeout())
                .with_context(|| format!("rpc client for '{name}'"))?;
            verifier = verifier.with_chain(name.as_str(), Arc::new(explorer), Arc::new(rpc));
        }
        Ok(verifier)
    }

    fn explorer(&self, chain: &str) -> Result<&Arc<dyn ContractDataClient>, VerificationError> {
        self.explorers
            .get(chain)
            .ok_or_else(|| VerificationError::UnknownChain(chain.to_string()))
    }

    fn rpc(&self, chain: &str) -> Result<&Arc<dyn CodeProvider>, VerificationError> {
        self.rpcs
            .get(chain)
            .ok_or_else(|| VerificationError::UnknownChain(chain.to_string()))
    }

    /// Fetches verified contract data, unless the contract is not expected
    /// to be verified; then the explorer is not called at all.
    pub async fn fetch_contract_data(
        &self,
        verified: bool,
        chain: &str,
        address: Address,
    ) -> Result<FetchedContract, VerificationError> {
        if !verified {
            tracing::debug!(chain, address = ?address, "contract is not verified, skipping fetch");
            return Ok(FetchedContract::Unverified);
        }

        let metadata = self
            .explorer(chain)?
            .fetch_contract_data(address)
            .await
            .map_err(|err| VerificationError::upstream(chain, address, err))?;
        Ok(FetchedContract::Verified(Box::new(metadata)))
    }

    /// Compares a deployment with the companion deployment of the same
    /// logical contract.
    pub async fn compare_bytecode_with_companion(
        &self,
        metadata: &ContractMetadata,
        companion: &CompanionCheck,
    ) -> Result<(), VerificationError> {
        into_result(self.companion_failures(metadata, companion).await?)
    }

    /// Compares the deployed bytecode reported by the explorer with the code
    /// currently stored at the address on `chain`.
    pub async fn compare_deployed_bytecode_with_rpc(
        &self,
        metadata: &ContractMetadata,
        chain: &str,
    ) -> Result<(), VerificationError> {
        into_result(self.rpc_failures(metadata, chain).await?)
    }

    /// Fetches the contract and runs every requested check.
    ///
    /// Fetch errors abort the verification. Failed checks are collected
    /// into the verdict.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<Verdict, VerificationError> {
        let contract = self
            .fetch_contract_data(request.verified, &request.chain, request.address)
            .await?;

        let mut failures = Vec::new();
        if let Some(metadata) = contract.metadata() {
            if let Some(companion) = &request.companion {
                failures.extend(self.companion_failures(metadata, companion).await?);
            }
            if request.compare_with_rpc {
                failures.extend(self.rpc_failures(metadata, &request.chain).await?);
            }
        }

        Ok(Verdict { contract, failures })
    }

    async fn companion_failures(
        &self,
        metadata: &ContractMetadata,
        companion: &CompanionCheck,
    ) -> Result<Vec<BytecodeMismatch>, VerificationError> {
        let request = companion.request;
        request.ensure_not_empty()?;

        let found = self
            .explorer(&companion.chain)?
            .fetch_bytecode(companion.address)
            .await
            .map_err(|err| {
                VerificationError::upstream(&companion.chain, companion.address, err)
            })?;

        let mut failures = Vec::new();
        if request.initialization {
            let result = compare_bytes(
                &initialization_code(&metadata.bytecode)?,
                &initialization_code(&found)?,
            );
            log_result(metadata, BytecodeCheck::Initialization, result.matched);
            if let Err(mismatch) = result.into_result(BytecodeCheck::Initialization) {
                failures.push(mismatch);
            }
        }
        if request.deployment {
            let result = compare_bytecode(
                &metadata.bytecode.deployed_bytecode,
                &found.deployed_bytecode,
            )?;
            log_result(metadata, BytecodeCheck::Deployment, result.matched);
            if let Err(mismatch) = result.into_result(BytecodeCheck::Deployment) {
                failures.push(mismatch);
            }
        }
        Ok(failures)
    }

    async fn rpc_failures(
        &self,
        metadata: &ContractMetadata,
        chain: &str,
    ) -> Result<Vec<BytecodeMismatch>, VerificationError> {
        let code = self
            .rpc(chain)?
            .get_code(metadata.address)
            .await
            .map_err(|err| VerificationError::upstream(chain, metadata.address, err))?;

        let expected = decode_hex(&metadata.bytecode.deployed_bytecode)?;
        let result = compare_bytes(&expected, &code);
        log_result(metadata, BytecodeCheck::Runtime, result.matched);
        Ok(result
            .into_result(BytecodeCheck::Runtime)
            .err()
            .into_iter()
            .collect())
    }
}

/// Creation bytecode with the deployment's own constructor arguments removed.
fn initialization_code(bytecode: &DeploymentBytecode) -> Result<Bytes, VerificationError> {
    let creation = decode_hex(&bytecode.creation_bytecode)?;
    match &bytecode.constructor_arguments {
        Some(salt) => Ok(creation.slice(..salt.strip_from(&creation)?.len())),
        None => Ok(creation),
    }
}

fn log_result(metadata: &ContractMetadata, check: BytecodeCheck, matched: bool) {
    tracing::info!(
        chain = %metadata.chain,
        address = ?metadata.address,
        check = %check,
        matched,
        "bytecode check finished"
    );
}

fn into_result(failures: Vec<BytecodeMismatch>) -> Result<(), VerificationError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(VerificationError::Mismatches(failures))
    }
}
