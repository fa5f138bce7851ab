use super::{BaseFeeMapping, L1Block};
use crate::rpc::RpcError;
use ethers_core::types::{Bloom, Bytes, H256, U256, U64};
use serde::Deserialize;

/// Block header as returned by the Rootstock rpc.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RskHeader {
    pub difficulty: U256,
    pub number: U256,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    pub extra_data: Bytes,
    pub minimum_gas_price: Option<U256>,
    pub hash: H256,
    pub parent_hash: H256,
    #[serde(rename = "sha3Uncles")]
    pub uncle_hash: H256,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    #[serde(rename = "logsBloom")]
    pub bloom: Bloom,
}

/// Rootstock block exposed through the [`L1Block`] capability set.
///
/// Numeric fields are converted once, when the block is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RskBlock {
    number: U256,
    number_u64: u64,
    hash: H256,
    time: u64,
    base_fee: Option<U256>,
    header: RskHeader,
}

impl RskBlock {
    pub fn new(header: RskHeader, base_fee: BaseFeeMapping) -> Result<Self, RpcError> {
        if header.number > U256::from(u64::MAX) {
            return Err(RpcError::InvalidResponse(format!(
                "block number {} does not fit into u64",
                header.number
            )));
        }

        let base_fee = match base_fee {
            BaseFeeMapping::MinimumGasPrice => header.minimum_gas_price,
            BaseFeeMapping::Fixed(value) => Some(value),
            BaseFeeMapping::None => None,
        };

        Ok(Self {
            number: header.number,
            number_u64: header.number.as_u64(),
            hash: header.hash,
            time: header.timestamp.as_u64(),
            base_fee,
            header,
        })
    }

    pub fn gas_limit(&self) -> u64 {
        self.header.gas_limit.as_u64()
    }

    pub fn gas_used(&self) -> u64 {
        self.header.gas_used.as_u64()
    }

    pub fn difficulty(&self) -> U256 {
        self.header.difficulty
    }

    pub fn minimum_gas_price(&self) -> Option<U256> {
        self.header.minimum_gas_price
    }

    pub fn extra(&self) -> &Bytes {
        &self.header.extra_data
    }

    pub fn bloom(&self) -> &Bloom {
        &self.header.bloom
    }

    pub fn root(&self) -> H256 {
        self.header.state_root
    }

    pub fn parent_hash(&self) -> H256 {
        self.header.parent_hash
    }

    pub fn tx_hash(&self) -> H256 {
        self.header.transactions_root
    }

    pub fn receipt_hash(&self) -> H256 {
        self.header.receipts_root
    }

    pub fn uncle_hash(&self) -> H256 {
        self.header.uncle_hash
    }
}

impl L1Block for RskBlock {
    fn number(&self) -> U256 {
        self.number
    }

    fn number_u64(&self) -> u64 {
        self.number_u64
    }

    fn hash(&self) -> H256 {
        self.hash
    }

    fn time(&self) -> u64 {
        self.time
    }

    fn base_fee(&self) -> Option<U256> {
        self.base_fee
    }
}
