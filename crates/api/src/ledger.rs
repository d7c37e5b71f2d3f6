// Path: crates/api/src/ledger.rs
//! The ledger RPC boundary.
//!
//! The prover talks to the counterparty chain through [`LedgerClient`], which
//! mirrors the handful of Ethereum JSON-RPC methods it needs. The wire types
//! here deserialize directly from the JSON-RPC results, so an implementation
//! only has to move bytes.

use crate::context::CallContext;
use alloy_primitives::{Address, Bytes, B256, B64, U256, U64};
use async_trait::async_trait;
use atlas_types::error::ProverError;
use serde::{Deserialize, Serialize, Serializer};

/// The block a ledger read is executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The `latest` tag.
    Latest,
    /// A concrete block number, encoded as a hex quantity.
    Number(u64),
}

impl BlockTag {
    /// The JSON-RPC encoding: `latest` or a minimal hex quantity such as `0x1a`.
    pub fn to_rpc_param(self) -> String {
        match self {
            Self::Latest => "latest".to_string(),
            Self::Number(n) => format!("{n:#x}"),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rpc_param())
    }
}

/// An `eth_getLogs` filter over one contract address and one event topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// The emitting contract.
    pub address: Address,
    /// Topic filters by position; position 0 is the event signature hash.
    pub topics: Vec<B256>,
    /// First block of the range, inclusive.
    pub from_block: BlockTag,
    /// Last block of the range, inclusive.
    pub to_block: BlockTag,
}

impl LogFilter {
    /// A filter for `topic0` emitted by `address` over `[from, to]`.
    pub fn new(address: Address, topic0: B256, from: u64, to: BlockTag) -> Self {
        Self {
            address,
            topics: vec![topic0],
            from_block: BlockTag::Number(from),
            to_block: to,
        }
    }

    /// The event signature topic this filter selects.
    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// One entry returned by `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// The emitting contract.
    pub address: Address,
    /// Indexed topics; `topics[0]` is the event signature hash.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields.
    pub data: Bytes,
    /// The block that included the log; absent for pending logs.
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Position of the log within its block.
    #[serde(default)]
    pub log_index: Option<U64>,
}

impl RawLog {
    /// The including block number as a `u64`.
    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}

/// One storage entry of an EIP-1186 `eth_getProof` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    /// The storage slot.
    pub key: U256,
    /// The value stored at the slot.
    #[serde(default)]
    pub value: U256,
    /// The RLP-encoded trie nodes from the storage root to the slot.
    #[serde(default)]
    pub proof: Vec<Bytes>,
}

/// An EIP-1186 `eth_getProof` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProof {
    /// The account the proof was requested for.
    #[serde(default)]
    pub address: Address,
    /// The account trie nodes from the state root to the account.
    #[serde(default)]
    pub account_proof: Vec<Bytes>,
    /// The account's storage trie root.
    #[serde(default)]
    pub storage_hash: B256,
    /// One entry per requested slot.
    #[serde(default)]
    pub storage_proof: Vec<StorageProof>,
}

/// The structural fields of a block header as returned by `eth_getBlockByNumber`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlockHeader {
    pub parent_hash: B256,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    #[serde(default)]
    pub logs_bloom: Bytes,
    pub number: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    #[serde(default)]
    pub extra_data: Bytes,
    #[serde(default)]
    pub mix_hash: B256,
    #[serde(default)]
    pub nonce: B64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
}

/// The subset of the ledger's JSON-RPC interface the prover consumes.
///
/// Every method observes the supplied [`CallContext`] and fails with
/// [`ProverError::Canceled`] when it fires. Transport failures surface as
/// [`ProverError::Transport`]; implementations do not retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// `eth_blockNumber`: the current head.
    async fn block_number(&self, ctx: &CallContext) -> Result<u64, ProverError>;

    /// `eth_call`: executes a read-only contract call against `block`.
    async fn call(
        &self,
        ctx: &CallContext,
        to: Address,
        data: Bytes,
        block: BlockTag,
    ) -> Result<Bytes, ProverError>;

    /// `eth_getLogs`: every log matching `filter`, in emission order.
    async fn get_logs(&self, ctx: &CallContext, filter: &LogFilter)
        -> Result<Vec<RawLog>, ProverError>;

    /// `eth_getProof`: inclusion proofs for `slots` of `address` at `block`.
    async fn get_proof(
        &self,
        ctx: &CallContext,
        address: Address,
        slots: &[B256],
        block: BlockTag,
    ) -> Result<AccountProof, ProverError>;

    /// `eth_getBlockByNumber`: the header of block `number`.
    async fn header_by_number(
        &self,
        ctx: &CallContext,
        number: u64,
    ) -> Result<RawBlockHeader, ProverError>;
}

/// Logs an external indexer has already collected for a filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexedLogs {
    /// Matching logs in emission order.
    pub logs: Vec<RawLog>,
    /// The last block the indexer has fully covered.
    pub through_block: u64,
}

/// An optional checkpoint collaborator that spares the scanner a full
/// from-genesis scan.
#[async_trait]
pub trait LogCursor: Send + Sync {
    /// Returns what the indexer holds for `filter`, or `None` to fall back to a
    /// full scan.
    async fn indexed(
        &self,
        ctx: &CallContext,
        filter: &LogFilter,
    ) -> Result<Option<IndexedLogs>, ProverError>;
}
