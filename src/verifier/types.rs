use crate::{
    bytecode::{BytecodeMismatch, ReconcileError},
    explorer::ContractMetadata,
    settings::ContractSettings,
};
use ethers_core::types::Address;
use serde::Serialize;

/// Bytecode comparisons to run against the companion deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComparisonRequest {
    pub initialization: bool,
    pub deployment: bool,
}

impl ComparisonRequest {
    pub fn ensure_not_empty(&self) -> Result<(), ReconcileError> {
        if !self.initialization && !self.deployment {
            return Err(ReconcileError::NoComparisonRequested);
        }
        Ok(())
    }
}

/// Deployment of the same logical contract on another chain.
///
/// Only its bytecode is fetched, so its source does not need to be verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanionCheck {
    pub chain: String,
    pub address: Address,
    pub request: ComparisonRequest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationRequest {
    pub chain: String,
    pub address: Address,
    pub verified: bool,
    pub companion: Option<CompanionCheck>,
    pub compare_with_rpc: bool,
}

/// Chain names are matched in lower case, as settings keys are lowercased
/// when loaded.
impl From<&ContractSettings> for VerificationRequest {
    fn from(contract: &ContractSettings) -> Self {
        let request = ComparisonRequest {
            initialization: contract.compare_initialization,
            deployment: contract.compare_deployment,
        };
        let companion = contract
            .companion_chain
            .as_ref()
            .map(|chain| CompanionCheck {
                chain: chain.to_lowercase(),
                address: contract.companion_address.unwrap_or(contract.address),
                request,
            });

        Self {
            chain: contract.chain.to_lowercase(),
            address: contract.address,
            verified: contract.verified,
            companion,
            compare_with_rpc: contract.compare_with_rpc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "contract", rename_all = "snake_case")]
pub enum FetchedContract {
    Verified(Box<ContractMetadata>),
    /// The contract is not expected to be verified; nothing was fetched.
    Unverified,
}

impl FetchedContract {
    pub fn metadata(&self) -> Option<&ContractMetadata> {
        match self {
            FetchedContract::Verified(metadata) => Some(metadata.as_ref()),
            FetchedContract::Unverified => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub contract: FetchedContract,
    pub failures: Vec<BytecodeMismatch>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}
