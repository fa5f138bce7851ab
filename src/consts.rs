pub const ENV_PREFIX: &str = "DEPLOYMENT_VERIFIER";
pub const CONFIG_PATH_ENV: &str = "DEPLOYMENT_VERIFIER__CONFIG";

pub const DEFAULT_EXPLORER_URL: &str = "https://api.etherscan.io/";
pub const DEFAULT_ETHEREUM_RPC_URL: &str = "https://ethereum-rpc.publicnode.com/";
pub const DEFAULT_OPTIMISM_RPC_URL: &str = "https://mainnet.optimism.io/";

/// Value of the `ABI` field returned by Etherscan for unverified contracts.
pub const NOT_VERIFIED_ABI: &str = "Contract source code not verified";
