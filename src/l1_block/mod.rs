//! Chain agnostic view of an L1 block.
//!
//! Blocks of different chains are fetched in their own header format and
//! exposed through the [`L1Block`] capability set instead of being
//! converted into a single concrete block type.

mod eth;
mod rsk;

pub use eth::{EthBlock, EthHeader};
pub use rsk::{RskBlock, RskHeader};

use crate::rpc::{JsonRpcClient, RpcError};
use ethers_core::types::{H256, U256};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub trait L1Block: Send + Sync {
    fn number(&self) -> U256;
    fn number_u64(&self) -> u64;
    fn hash(&self) -> H256;
    fn time(&self) -> u64;
    fn base_fee(&self) -> Option<U256>;
}

/// Header format returned by `eth_getBlockByHash` of a chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockHeaderFormat {
    #[default]
    Ethereum,
    Rootstock,
}

/// Source of the base fee for chains that have no `baseFeePerGas`.
///
/// Rootstock has no base fee; its minimum gas price is used instead by
/// default. This is an approximation and may be replaced per chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseFeeMapping {
    #[default]
    MinimumGasPrice,
    Fixed(U256),
    None,
}

/// Values of the [`L1Block`] capability set, suitable for printing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct L1BlockInfo {
    pub number: U256,
    pub hash: H256,
    pub time: u64,
    pub base_fee: Option<U256>,
}

impl L1BlockInfo {
    pub fn from_block(block: &dyn L1Block) -> Self {
        Self {
            number: block.number(),
            hash: block.hash(),
            time: block.time(),
            base_fee: block.base_fee(),
        }
    }
}

/// Fetches blocks of one chain and adapts them to [`L1Block`].
pub struct L1Client {
    rpc: JsonRpcClient,
    format: BlockHeaderFormat,
    base_fee: BaseFeeMapping,
}

impl L1Client {
    pub fn new(rpc: JsonRpcClient, format: BlockHeaderFormat, base_fee: BaseFeeMapping) -> Self {
        Self {
            rpc,
            format,
            base_fee,
        }
    }

    pub async fn block_by_hash(&self, hash: H256) -> Result<Box<dyn L1Block>, RpcError> {
        let params = json!([hash, true]);
        let block: Box<dyn L1Block> = match self.format {
            BlockHeaderFormat::Ethereum => {
                let header: Option<EthHeader> = self.rpc.call("eth_getBlockByHash", params).await?;
                let header = header.ok_or(RpcError::BlockNotFound(hash))?;
                Box::new(EthBlock::new(header))
            }
            BlockHeaderFormat::Rootstock => {
                let header: Option<RskHeader> = self.rpc.call("eth_getBlockByHash", params).await?;
                let header = header.ok_or(RpcError::BlockNotFound(hash))?;
                Box::new(RskBlock::new(header, self.base_fee)?)
            }
        };
        tracing::debug!(url = %self.rpc.url(), number = %block.number(), "fetched l1 block");
        Ok(block)
    }
}
