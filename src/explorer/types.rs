use crate::bytecode::DeploymentSalt;
use ethers_core::types::Address;
use serde::Serialize;

/// Compiler settings as reported by the explorer. Values are kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_used: bool,
    pub optimization_runs: Option<u32>,
    pub evm_version: String,
    pub license_type: String,
    pub libraries: String,
}

/// Verified contract data fetched for one deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContractMetadata {
    pub chain: String,
    pub address: Address,
    pub source_code: String,
    /// Raw json ABI; it is never decoded.
    pub abi: String,
    pub compiler_settings: CompilerSettings,
    #[serde(flatten)]
    pub bytecode: DeploymentBytecode,
}

/// Bytecode of a deployment. Available whether or not its source is verified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentBytecode {
    /// Code stored at the address, hex encoded.
    pub deployed_bytecode: String,
    /// Input of the creation transaction, hex encoded.
    pub creation_bytecode: String,
    pub constructor_arguments: Option<DeploymentSalt>,
}
