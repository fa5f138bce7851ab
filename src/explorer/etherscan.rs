use super::{
    CompilerSettings, ContractDataClient, ContractMetadata, DeploymentBytecode, ExplorerError,
};
use crate::{
    bytecode::{strip_hex_prefix, DeploymentSalt},
    settings::{ChainSettings, HttpSettings},
};
use anyhow::Context;
use async_trait::async_trait;
use ethers_core::types::Address;
use serde::de::DeserializeOwned;
use std::{num::NonZeroUsize, str::FromStr, time::Duration};
use url::Url;

mod json {
    use crate::consts::NOT_VERIFIED_ABI;
    use ethers_core::types::H256;
    use serde::Deserialize;
    use serde_json::Value;

    /// Common shape of `module=contract` and `module=proxy` responses.
    #[derive(Debug, Deserialize)]
    pub struct Envelope {
        pub status: Option<String>,
        pub message: Option<String>,
        #[serde(default)]
        pub result: Value,
        pub error: Option<ProxyError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ProxyError {
        pub code: i64,
        pub message: String,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "PascalCase")]
    pub struct SourceCode {
        pub source_code: String,
        #[serde(rename = "ABI")]
        pub abi: String,
        pub contract_name: String,
        pub compiler_version: String,
        pub optimization_used: String,
        pub runs: String,
        pub constructor_arguments: String,
        #[serde(rename = "EVMVersion")]
        pub evm_version: String,
        pub library: String,
        pub license_type: String,
    }

    impl SourceCode {
        pub fn is_verified(&self) -> bool {
            !self.source_code.is_empty() && self.abi != NOT_VERIFIED_ABI
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContractCreation {
        pub tx_hash: H256,
    }

    #[derive(Debug, Deserialize)]
    pub struct Transaction {
        pub input: String,
    }
}

impl json::Envelope {
    fn into_result<T: DeserializeOwned>(self, address: Address) -> Result<T, ExplorerError> {
        if let Some(error) = self.error {
            return Err(ExplorerError::Api {
                message: error.message,
                result: format!("code {}", error.code),
            });
        }

        if self.status.as_deref() == Some("0") {
            let message = self.message.unwrap_or_default();
            let result = match self.result {
                serde_json::Value::String(result) => result,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            if result.to_lowercase().contains("rate limit") {
                return Err(ExplorerError::RateLimited(result));
            }
            if message.contains("No data found") {
                return Err(ExplorerError::NotFound(address));
            }
            return Err(ExplorerError::Api { message, result });
        }

        serde_json::from_value(self.result)
            .map_err(|err| ExplorerError::InvalidResponse(err.to_string()))
    }
}

/// Client of the Etherscan v2 api. A single instance serves one chain.
pub struct EtherscanClient {
    chain: String,
    chain_id: String,
    api_url: Url,
    api_key: String,
    client: reqwest::Client,
    request_attempts: NonZeroUsize,
    retry_delay: Duration,
}

impl EtherscanClient {
    pub fn new(
        chain: impl Into<String>,
        settings: &ChainSettings,
        http: &HttpSettings,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(http.request_timeout())
            .build()
            .context("explorer client initialization failed")?;
        let api_url = settings
            .explorer_url
            .join("v2/api")
            .context("invalid explorer url")?;

        Ok(Self {
            chain: chain.into(),
            chain_id: settings.chain_id.to_string(),
            api_url,
            api_key: settings.explorer_api_key.clone(),
            client,
            request_attempts: http.request_attempts,
            retry_delay: http.retry_delay(),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        address: Address,
        params: &[(&str, &str)],
    ) -> Result<T, ExplorerError> {
        let mut response = self.send_request(address, params).await;
        for attempt in 1..self.request_attempts.get() {
            match &response {
                Err(err) if err.is_transient() => {
                    tracing::warn!(
                        chain = %self.chain,
                        attempt,
                        error = %err,
                        "explorer request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    response = self.send_request(address, params).await;
                }
                _ => break,
            }
        }
        response
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        address: Address,
        params: &[(&str, &str)],
    ) -> Result<T, ExplorerError> {
        let envelope: json::Envelope = self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("chainid", self.chain_id.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope.into_result(address)
    }

    async fn source_code(
        &self,
        address: Address,
        address_hex: &str,
    ) -> Result<Option<json::SourceCode>, ExplorerError> {
        tracing::debug!(
            chain = %self.chain,
            address = %address_hex,
            "fetching contract source code"
        );
        let sources: Vec<json::SourceCode> = self
            .request(
                address,
                &[
                    ("module", "contract"),
                    ("action", "getsourcecode"),
                    ("address", address_hex),
                ],
            )
            .await?;
        Ok(sources.into_iter().next())
    }

    /// Creation transaction input and current code of `address`.
    ///
    /// `constructor_arguments` come from the source code entry and are
    /// empty for unverified contracts.
    async fn deployment_bytecode(
        &self,
        address: Address,
        address_hex: &str,
        constructor_arguments: &str,
    ) -> Result<DeploymentBytecode, ExplorerError> {
        let creations: Vec<json::ContractCreation> = self
            .request(
                address,
                &[
                    ("module", "contract"),
                    ("action", "getcontractcreation"),
                    ("contractaddresses", address_hex),
                ],
            )
            .await?;
        let creation = creations
            .into_iter()
            .next()
            .ok_or(ExplorerError::NotFound(address))?;

        let tx_hash = format!("{:?}", creation.tx_hash);
        tracing::debug!(
            chain = %self.chain,
            address = %address_hex,
            tx_hash = %tx_hash,
            "fetching creation transaction"
        );
        let transaction: Option<json::Transaction> = self
            .request(
                address,
                &[
                    ("module", "proxy"),
                    ("action", "eth_getTransactionByHash"),
                    ("txhash", tx_hash.as_str()),
                ],
            )
            .await?;
        let transaction = transaction.ok_or_else(|| {
            ExplorerError::InvalidResponse(format!("creation transaction {tx_hash} was not found"))
        })?;

        let deployed_bytecode: String = self
            .request(
                address,
                &[
                    ("module", "proxy"),
                    ("action", "eth_getCode"),
                    ("address", address_hex),
                    ("tag", "latest"),
                ],
            )
            .await?;
        if strip_hex_prefix(&deployed_bytecode).is_empty() {
            return Err(ExplorerError::NotFound(address));
        }

        let constructor_arguments = match constructor_arguments {
            "" => None,
            arguments => Some(DeploymentSalt::from_str(arguments).map_err(|err| {
                ExplorerError::InvalidResponse(format!("constructor arguments: {err}"))
            })?),
        };

        Ok(DeploymentBytecode {
            deployed_bytecode,
            creation_bytecode: transaction.input,
            constructor_arguments,
        })
    }
}

fn optimization_runs(runs: &str) -> Result<Option<u32>, ExplorerError> {
    if runs.is_empty() {
        return Ok(None);
    }
    runs.parse::<u32>().map(Some).map_err(|err| {
        ExplorerError::InvalidResponse(format!("optimization runs '{runs}': {err}"))
    })
}

#[async_trait]
impl ContractDataClient for EtherscanClient {
    async fn fetch_contract_data(
        &self,
        address: Address,
    ) -> Result<ContractMetadata, ExplorerError> {
        let address_hex = format!("{address:?}");
        let source = self
            .source_code(address, &address_hex)
            .await?
            .ok_or(ExplorerError::NotFound(address))?;
        if !source.is_verified() {
            return Err(ExplorerError::Unverified(address));
        }
        let optimization_runs = optimization_runs(&source.runs)?;

        let bytecode = self
            .deployment_bytecode(address, &address_hex, &source.constructor_arguments)
            .await?;

        Ok(ContractMetadata {
            chain: self.chain.clone(),
            address,
            source_code: source.source_code,
            abi: source.abi,
            compiler_settings: CompilerSettings {
                contract_name: source.contract_name,
                compiler_version: source.compiler_version,
                optimization_used: source.optimization_used == "1",
                optimization_runs,
                evm_version: source.evm_version,
                license_type: source.license_type,
                libraries: source.library,
            },
            bytecode,
        })
    }

    async fn fetch_bytecode(&self, address: Address) -> Result<DeploymentBytecode, ExplorerError> {
        let address_hex = format!("{address:?}");
        let source = self
            .source_code(address, &address_hex)
            .await?
            .unwrap_or_default();
        self.deployment_bytecode(address, &address_hex, &source.constructor_arguments)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    const ADDRESS: &str = "0x4200000000000000000000000000000000000010";
    const TX_HASH: &str = "0x7f1fd1bbd9a6b3c4ba3ec6dbf49b8e3ea14d33ff6f7e2b8d6bd2b1cdf2c8a1d4";
    const CONSTRUCTOR_ARGUMENTS: &str =
        "000000000000000000000000000000000000000000000000000000000000002a";
    const CREATION_BYTECODE: &str = concat!(
        "0x608060405234801561001057600080fd5b50",
        "000000000000000000000000000000000000000000000000000000000000002a"
    );
    const DEPLOYED_BYTECODE: &str = "0x6080604052348015600f57600080fd5b";

    fn client(server: &MockServer, request_attempts: usize) -> EtherscanClient {
        let mut chain = Settings::default().chains["optimism"].clone();
        chain.explorer_url = Url::parse(&server.uri()).unwrap();
        chain.explorer_api_key = "test-key".to_string();
        let http = HttpSettings {
            request_timeout: 5,
            request_attempts: NonZeroUsize::new(request_attempts).unwrap(),
            retry_delay_ms: 0,
        };
        EtherscanClient::new("optimism", &chain, &http).unwrap()
    }

    fn action(action: &str) -> wiremock::MockBuilder {
        Mock::given(method("GET"))
            .and(path("/v2/api"))
            .and(query_param("chainid", "10"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("action", action))
    }

    fn ok(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": result,
        }))
    }

    fn proxy(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    fn verified_source() -> serde_json::Value {
        json!([{
            "SourceCode": "contract L2StandardBridge {}",
            "ABI": "[]",
            "ContractName": "L2StandardBridge",
            "CompilerVersion": "v0.8.15+commit.e14f2714",
            "OptimizationUsed": "1",
            "Runs": "999999",
            "ConstructorArguments": CONSTRUCTOR_ARGUMENTS,
            "EVMVersion": "Default",
            "Library": "",
            "LicenseType": "MIT",
            "Proxy": "0",
            "Implementation": "",
            "SwarmSource": ""
        }])
    }

    async fn mount_verified_contract(server: &MockServer) {
        action("getsourcecode")
            .and(query_param("address", ADDRESS))
            .respond_with(ok(verified_source()))
            .mount(server)
            .await;
        action("getcontractcreation")
            .and(query_param("contractaddresses", ADDRESS))
            .respond_with(ok(json!([{
                "contractAddress": ADDRESS,
                "contractCreator": "0xdeaddeaddeaddeaddeaddeaddeaddeaddead0000",
                "txHash": TX_HASH
            }])))
            .mount(server)
            .await;
        action("eth_getTransactionByHash")
            .and(query_param("txhash", TX_HASH))
            .respond_with(proxy(json!({ "hash": TX_HASH, "input": CREATION_BYTECODE })))
            .mount(server)
            .await;
        action("eth_getCode")
            .and(query_param("address", ADDRESS))
            .and(query_param("tag", "latest"))
            .respond_with(proxy(json!(DEPLOYED_BYTECODE)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetch_verified_contract() {
        let server = MockServer::start().await;
        mount_verified_contract(&server).await;

        let address = Address::from_str(ADDRESS).unwrap();
        let metadata = client(&server, 1)
            .fetch_contract_data(address)
            .await
            .expect("contract data should be fetched");

        let expected = ContractMetadata {
            chain: "optimism".to_string(),
            address,
            source_code: "contract L2StandardBridge {}".to_string(),
            abi: "[]".to_string(),
            compiler_settings: CompilerSettings {
                contract_name: "L2StandardBridge".to_string(),
                compiler_version: "v0.8.15+commit.e14f2714".to_string(),
                optimization_used: true,
                optimization_runs: Some(999999),
                evm_version: "Default".to_string(),
                license_type: "MIT".to_string(),
                libraries: "".to_string(),
            },
            bytecode: DeploymentBytecode {
                deployed_bytecode: DEPLOYED_BYTECODE.to_string(),
                creation_bytecode: CREATION_BYTECODE.to_string(),
                constructor_arguments: Some(
                    DeploymentSalt::from_str(CONSTRUCTOR_ARGUMENTS).unwrap(),
                ),
            },
        };
        assert_eq!(expected, metadata);
    }

    fn unverified_source() -> serde_json::Value {
        json!([{
            "SourceCode": "",
            "ABI": "Contract source code not verified",
            "ContractName": "",
            "CompilerVersion": "",
            "OptimizationUsed": "",
            "Runs": "",
            "ConstructorArguments": "",
            "EVMVersion": "",
            "Library": "",
            "LicenseType": "Unknown"
        }])
    }

    #[tokio::test]
    async fn unverified_contract_is_reported() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ok(unverified_source()))
            .expect(1)
            .mount(&server)
            .await;
        action("getcontractcreation")
            .respond_with(ok(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, 3)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Unverified(_)), "{err:?}");
    }

    #[tokio::test]
    async fn rate_limited_request_is_retried() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached"
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        mount_verified_contract(&server).await;

        let metadata = client(&server, 2)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .expect("second attempt should succeed");
        assert_eq!(metadata.compiler_settings.contract_name, "L2StandardBridge");
    }

    #[tokio::test]
    async fn rate_limit_is_returned_when_attempts_are_exhausted() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached, please use API Key for higher rate limit"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 3)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::RateLimited(_)), "{err:?}");
    }

    #[tokio::test]
    async fn api_errors_are_not_retried() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, 3)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "explorer returned an error: NOTOK: Invalid API Key"
        );
    }

    #[tokio::test]
    async fn missing_code_is_not_found() {
        let server = MockServer::start().await;
        action("eth_getCode")
            .respond_with(proxy(json!("0x")))
            .mount(&server)
            .await;
        mount_verified_contract(&server).await;

        let err = client(&server, 1)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_creation_data_is_not_found() {
        let server = MockServer::start().await;
        action("getcontractcreation")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No data found",
                "result": null
            })))
            .mount(&server)
            .await;
        mount_verified_contract(&server).await;

        let err = client(&server, 1)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        let err = client(&server, 2)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err:?}");
    }

    #[tokio::test]
    async fn bytecode_of_unverified_contract_is_fetched() {
        let server = MockServer::start().await;
        action("getsourcecode")
            .respond_with(ok(unverified_source()))
            .expect(1)
            .mount(&server)
            .await;
        mount_verified_contract(&server).await;

        let bytecode = client(&server, 1)
            .fetch_bytecode(Address::from_str(ADDRESS).unwrap())
            .await
            .expect("bytecode should be fetched");

        assert_eq!(
            bytecode,
            DeploymentBytecode {
                deployed_bytecode: DEPLOYED_BYTECODE.to_string(),
                creation_bytecode: CREATION_BYTECODE.to_string(),
                constructor_arguments: None,
            }
        );
    }

    #[tokio::test]
    async fn bytecode_keeps_constructor_arguments_of_verified_contract() {
        let server = MockServer::start().await;
        mount_verified_contract(&server).await;

        let bytecode = client(&server, 1)
            .fetch_bytecode(Address::from_str(ADDRESS).unwrap())
            .await
            .expect("bytecode should be fetched");

        assert_eq!(
            bytecode.constructor_arguments.map(|salt| salt.len()),
            Some(32)
        );
    }

    #[tokio::test]
    async fn invalid_optimization_runs_are_rejected() {
        let server = MockServer::start().await;
        let mut source = verified_source();
        source[0]["Runs"] = json!("many");
        action("getsourcecode")
            .respond_with(ok(source))
            .mount(&server)
            .await;
        action("getcontractcreation")
            .respond_with(ok(json!([])))
            .expect(0)
            .mount(&server)
            .await;
        mount_verified_contract(&server).await;

        let err = client(&server, 1)
            .fetch_contract_data(Address::from_str(ADDRESS).unwrap())
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ExplorerError::InvalidResponse(message) if message.contains("'many'")),
            "{err:?}"
        );
    }
}
