use crate::{
    consts::{
        CONFIG_PATH_ENV, DEFAULT_ETHEREUM_RPC_URL, DEFAULT_EXPLORER_URL, DEFAULT_OPTIMISM_RPC_URL,
        ENV_PREFIX,
    },
    l1_block::{BaseFeeMapping, BlockHeaderFormat},
};
use anyhow::anyhow;
use config::{Config, Environment, File};
use ethers_core::types::Address;
use serde::{de::IgnoredAny, Deserialize};
use std::{collections::BTreeMap, num::NonZeroUsize, path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub chains: BTreeMap<String, ChainSettings>,
    pub http: HttpSettings,
    pub contracts: Vec<ContractSettings>,

    pub config: IgnoredAny,
}

impl Default for Settings {
    fn default() -> Self {
        let chains = [
            ("ethereum", 1, DEFAULT_ETHEREUM_RPC_URL),
            ("optimism", 10, DEFAULT_OPTIMISM_RPC_URL),
        ]
        .into_iter()
        .map(|(name, chain_id, rpc_url)| {
            let settings = ChainSettings {
                chain_id,
                explorer_url: Url::parse(DEFAULT_EXPLORER_URL).expect("valid url"),
                explorer_api_key: String::new(),
                rpc_url: Url::parse(rpc_url).expect("valid url"),
                block_header: Default::default(),
                base_fee: Default::default(),
            };
            (name.to_string(), settings)
        })
        .collect();

        Self {
            chains,
            http: Default::default(),
            contracts: Default::default(),
            config: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub explorer_url: Url,
    #[serde(default)]
    pub explorer_api_key: String,
    pub rpc_url: Url,
    #[serde(default)]
    pub block_header: BlockHeaderFormat,
    #[serde(default)]
    pub base_fee: BaseFeeMapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    /// Timeout of a single request in seconds.
    pub request_timeout: u64,
    /// Number of attempts made for transient explorer failures.
    /// Should be at least one. Set to `3` by default.
    pub request_attempts: NonZeroUsize,
    pub retry_delay_ms: u64,
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10,
            request_attempts: NonZeroUsize::new(3).expect("Is not zero"),
            retry_delay_ms: 1000,
        }
    }
}

/// A contract checked by the `verify` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractSettings {
    pub name: String,
    pub chain: String,
    pub address: Address,
    #[serde(default = "default_verified")]
    pub verified: bool,
    #[serde(default)]
    pub companion_chain: Option<String>,
    /// Address on the companion chain. Defaults to `address`.
    #[serde(default)]
    pub companion_address: Option<Address>,
    #[serde(default)]
    pub compare_initialization: bool,
    #[serde(default)]
    pub compare_deployment: bool,
    #[serde(default)]
    pub compare_with_rpc: bool,
}

fn default_verified() -> bool {
    true
}

impl Settings {
    /// Reads settings from the optional config file and the environment.
    ///
    /// The file is taken from `config_path` or, if it is not set,
    /// from the `DEPLOYMENT_VERIFIER__CONFIG` variable.
    pub fn build(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path =
            config_path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut builder = Config::builder();
        if let Some(config_path) = config_path {
            builder = builder.add_source(File::from(config_path));
        };
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let mut settings: Self = builder
            .build()?
            .try_deserialize()
            .map_err(|err| anyhow!(err))?;
        // Keys coming from the environment are lowercased by `config`.
        settings.chains = settings
            .chains
            .into_iter()
            .map(|(name, chain)| (name.to_lowercase(), chain))
            .collect();
        Ok(settings)
    }

    /// Looks a chain up by its case-insensitive name.
    pub fn chain(&self, name: &str) -> anyhow::Result<&ChainSettings> {
        self.chains
            .get(&name.to_lowercase())
            .ok_or_else(|| anyhow!("chain '{name}' is not configured"))
    }
}
