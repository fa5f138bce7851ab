use super::{CodeProvider, RpcError};
use async_trait::async_trait;
use ethers_core::types::{Address, Bytes};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use url::Url;

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Value,
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC 2.0 client over http.
pub struct JsonRpcClient {
    url: Url,
    client: reqwest::Client,
    id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url,
            client,
            id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends a single request; a `null` result is passed to `T` as is.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(url = %self.url, method, id, "rpc request");

        let response: Response = self
            .client
            .post(self.url.clone())
            .json(&Request {
                jsonrpc: "2.0",
                method,
                params,
                id,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        serde_json::from_value(response.result)
            .map_err(|err| RpcError::InvalidResponse(format!("{method}: {err}")))
    }
}

#[async_trait]
impl CodeProvider for JsonRpcClient {
    async fn get_code(&self, address: Address) -> Result<Bytes, RpcError> {
        self.call("eth_getCode", json!([address, "latest"])).await
    }
}
