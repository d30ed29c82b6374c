//! RPC types for Ethereum JSON-RPC requests and responses.

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use serde::{Deserialize, Serialize};

/// Block number or tag for RPC queries.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BlockNumberOrTag {
    /// Block number.
    Number(U64),
    /// Block tag.
    Tag(BlockTag),
}

impl Default for BlockNumberOrTag {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl From<u64> for BlockNumberOrTag {
    fn from(number: u64) -> Self {
        Self::Number(U64::from(number))
    }
}

/// Block tags for RPC queries.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// Earliest block (genesis).
    Earliest,
    /// Finalized block.
    Finalized,
    /// Safe block.
    Safe,
    /// Latest block.
    #[default]
    Latest,
    /// Pending block.
    Pending,
}

impl BlockNumberOrTag {
    /// Returns true if this is the latest block reference.
    pub const fn is_latest(&self) -> bool {
        matches!(self, Self::Tag(BlockTag::Latest))
    }

    /// Resolves to a concrete block number given the chain head.
    pub fn resolve(&self, head: u64) -> u64 {
        match self {
            Self::Number(n) => n.to::<u64>(),
            Self::Tag(BlockTag::Earliest) => 0,
            Self::Tag(_) => head,
        }
    }
}

/// Block header fields returned by `eth_getBlockByNumber`.
///
/// Only the fields the exporter and devnet use are modelled; anything else a
/// node sends is ignored on deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    /// Block hash.
    pub hash: B256,
    /// Parent block hash.
    pub parent_hash: B256,
    /// Block number.
    pub number: U64,
    /// Block timestamp.
    pub timestamp: U64,
    /// Gas limit.
    pub gas_limit: U64,
    /// Gas used.
    pub gas_used: U64,
    /// Miner/beneficiary address.
    #[serde(default)]
    pub miner: Address,
    /// Transaction hashes.
    #[serde(default)]
    pub transactions: Vec<B256>,
}

/// Log entry for JSON-RPC responses.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    /// Contract address.
    pub address: Address,
    /// Log topics.
    pub topics: Vec<B256>,
    /// Log data.
    pub data: Bytes,
    /// Block number.
    pub block_number: U64,
    /// Transaction hash.
    pub transaction_hash: B256,
    /// Transaction index.
    pub transaction_index: U64,
    /// Block hash.
    pub block_hash: B256,
    /// Log index in block.
    pub log_index: U64,
    /// Whether this log was removed due to reorg.
    #[serde(default)]
    pub removed: bool,
}

/// One address or a list of addresses in a log filter.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AddressFilter {
    /// A single address.
    Single(Address),
    /// Any of several addresses.
    Many(Vec<Address>),
}

impl AddressFilter {
    /// Flattens the filter into a list of addresses.
    pub fn into_vec(self) -> Vec<Address> {
        match self {
            Self::Single(address) => vec![address],
            Self::Many(addresses) => addresses,
        }
    }
}

/// One topic or a list of alternatives at a topic position.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TopicFilter {
    /// A single topic.
    Single(B256),
    /// Any of several topics.
    Many(Vec<B256>),
}

impl TopicFilter {
    /// Flattens the filter into a list of topics.
    pub fn into_vec(self) -> Vec<B256> {
        match self {
            Self::Single(topic) => vec![topic],
            Self::Many(topics) => topics,
        }
    }
}

/// Filter object for `eth_getLogs`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RpcLogFilter {
    /// First block to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockNumberOrTag>,
    /// Last block to search, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockNumberOrTag>,
    /// Emitting contracts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressFilter>,
    /// Topic constraints by position; `None` matches anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<TopicFilter>>>,
}

impl RpcLogFilter {
    /// Creates a filter matching every log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first block.
    #[must_use]
    pub fn from_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.from_block = Some(block.into());
        self
    }

    /// Sets the last block.
    #[must_use]
    pub fn to_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.to_block = Some(block.into());
        self
    }

    /// Restricts to logs emitted by `address`.
    #[must_use]
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(AddressFilter::Single(address));
        self
    }

    /// Restricts to events with the given signature hash.
    #[must_use]
    pub fn event_signature(mut self, signature: B256) -> Self {
        let mut topics = self.topics.take().unwrap_or_default();
        if topics.is_empty() {
            topics.push(None);
        }
        topics[0] = Some(TopicFilter::Single(signature));
        self.topics = Some(topics);
        self
    }
}

/// Call request for `eth_call`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Sender address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Gas limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    /// Value to transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Input data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Bytes>,
    /// Legacy data field (alias for input).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

impl CallRequest {
    /// Creates a call of `input` against `to`.
    pub fn new(to: Address, input: impl Into<Bytes>) -> Self {
        Self { to: Some(to), input: Some(input.into()), ..Default::default() }
    }

    /// Get the input data, preferring `input` over `data`.
    pub fn input_data(&self) -> Bytes {
        self.input.clone().or_else(|| self.data.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!("latest"), BlockNumberOrTag::Tag(BlockTag::Latest))]
    #[case(json!("earliest"), BlockNumberOrTag::Tag(BlockTag::Earliest))]
    #[case(json!("0x1b4"), BlockNumberOrTag::Number(U64::from(436)))]
    fn test_block_number_or_tag_from_json(
        #[case] value: serde_json::Value,
        #[case] expected: BlockNumberOrTag,
    ) {
        let parsed: BlockNumberOrTag = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case(BlockNumberOrTag::from(12), 12)]
    #[case(BlockNumberOrTag::Tag(BlockTag::Earliest), 0)]
    #[case(BlockNumberOrTag::Tag(BlockTag::Safe), 99)]
    #[case(BlockNumberOrTag::default(), 99)]
    fn test_resolve(#[case] block: BlockNumberOrTag, #[case] expected: u64) {
        assert_eq!(block.resolve(99), expected);
    }

    #[test]
    fn test_log_filter_serializes_like_a_node_expects() {
        let contract = address!("362bb67f7fdbdd0dbba4bce16da6a284cf484ed6");
        let signature = b256!("e842aea7a5f1b01049d752008c53c52890b1a6daf660cf39e8eec506112bbdf6");
        let filter = RpcLogFilter::new()
            .from_block(1)
            .to_block(BlockNumberOrTag::Tag(BlockTag::Latest))
            .address(contract)
            .event_signature(signature);

        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({
                "fromBlock": "0x1",
                "toBlock": "latest",
                "address": contract,
                "topics": [signature],
            })
        );

        let back: RpcLogFilter = serde_json::from_value(value).unwrap();
        assert_eq!(back, filter);
    }

    #[test]
    fn test_address_filter_accepts_list() {
        let filter: RpcLogFilter = serde_json::from_value(json!({
            "address": ["0x0000000000000000000000000000000000000001", "0x0000000000000000000000000000000000000002"],
            "topics": [null, "0x0000000000000000000000000000000000000000000000000000000000000001"],
        }))
        .unwrap();
        assert_eq!(filter.address.unwrap().into_vec().len(), 2);
        let topics = filter.topics.unwrap();
        assert!(topics[0].is_none());
        assert_eq!(topics[1].clone().unwrap().into_vec(), vec![B256::with_last_byte(1)]);
    }

    #[test]
    fn test_block_ignores_unknown_fields() {
        let block: RpcBlock = serde_json::from_value(json!({
            "hash": B256::repeat_byte(1),
            "parentHash": B256::ZERO,
            "number": "0x10",
            "timestamp": "0x58b58a70",
            "gasLimit": "0x47e7c4",
            "gasUsed": "0x0",
            "difficulty": "0x1",
            "transactions": [],
        }))
        .unwrap();
        assert_eq!(block.number.to::<u64>(), 16);
        assert_eq!(block.timestamp.to::<u64>(), 1_488_292_464);
    }

    #[test]
    fn test_call_request_prefers_input() {
        let mut req = CallRequest::new(Address::ZERO, Bytes::from_static(&[1]));
        req.data = Some(Bytes::from_static(&[2]));
        assert_eq!(req.input_data(), Bytes::from_static(&[1]));

        req.input = None;
        assert_eq!(req.input_data(), Bytes::from_static(&[2]));
    }
}
