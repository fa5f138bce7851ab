use super::L1Block;
use ethers_core::types::{H256, U256, U64};
use serde::Deserialize;

/// Subset of an Ethereum block header needed by [`L1Block`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthHeader {
    pub number: U64,
    pub hash: H256,
    pub parent_hash: H256,
    pub timestamp: U64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthBlock {
    header: EthHeader,
}

impl EthBlock {
    pub fn new(header: EthHeader) -> Self {
        Self { header }
    }

    pub fn parent_hash(&self) -> H256 {
        self.header.parent_hash
    }
}

impl L1Block for EthBlock {
    fn number(&self) -> U256 {
        U256::from(self.header.number.as_u64())
    }

    fn number_u64(&self) -> u64 {
        self.header.number.as_u64()
    }

    fn hash(&self) -> H256 {
        self.header.hash
    }

    fn time(&self) -> u64 {
        self.header.timestamp.as_u64()
    }

    fn base_fee(&self) -> Option<U256> {
        self.header.base_fee_per_gas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn pre_london_header_has_no_base_fee() {
        let header: EthHeader = serde_json::from_value(json!({
            "number": "0x1",
            "hash": "0x88e96d4537bea4d9c05d12549907b32561d3bf31f45aae734cdc119f13406cb6",
            "parentHash": "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3",
            "timestamp": "0x55ba4224"
        }))
        .unwrap();
        let block = EthBlock::new(header);

        assert_eq!(block.number(), U256::one());
        assert_eq!(block.time(), 1438269988);
        assert_eq!(block.base_fee(), None);
        assert_eq!(
            format!("{:?}", block.parent_hash()),
            "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
        );
    }
}
