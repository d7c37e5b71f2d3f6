// Path: crates/test_utils/src/ledger.rs
//! An in-memory ledger that answers the prover's JSON-RPC calls.
//!
//! Contract call results are stored per `(to, calldata)` and per height; a
//! read at height `h` sees the most recent value set at or below `h`, which is
//! how historical state behaves on a real chain.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use atlas_api::context::CallContext;
use atlas_api::ledger::{
    AccountProof, BlockTag, IndexedLogs, LedgerClient, LogCursor, LogFilter, RawBlockHeader,
    RawLog, StorageProof,
};
use atlas_types::error::ProverError;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A proof request as observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofRequest {
    /// The account whose storage was proven.
    pub address: Address,
    /// The requested slots.
    pub slots: Vec<B256>,
    /// The block the proof was requested at.
    pub block: BlockTag,
}

#[derive(Default)]
struct State {
    head: u64,
    calls: HashMap<(Address, Bytes), BTreeMap<u64, Bytes>>,
    logs: Vec<RawLog>,
    proofs: HashMap<(B256, u64), Vec<Bytes>>,
    headers: BTreeMap<u64, RawBlockHeader>,
    failing: Vec<&'static str>,
    fail_all: bool,
    delay: Option<Duration>,
    counters: HashMap<&'static str, usize>,
    proof_requests: Vec<ProofRequest>,
}

/// An in-memory [`LedgerClient`].
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<State>,
}

impl MockLedger {
    /// An empty ledger at block 0.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Moves the chain head.
    pub fn set_head(&self, height: u64) {
        self.state().head = height;
    }

    /// The result of calling `to` with `calldata` from `height` onward.
    pub fn set_call(
        &self,
        to: Address,
        calldata: impl Into<Bytes>,
        height: u64,
        ret: impl Into<Bytes>,
    ) {
        self.state()
            .calls
            .entry((to, calldata.into()))
            .or_default()
            .insert(height, ret.into());
    }

    /// Appends a log to the chain history.
    pub fn push_log(&self, log: RawLog) {
        self.state().logs.push(log);
    }

    /// Appends a log emitted by `address` in `block`.
    pub fn emit(&self, address: Address, topics: Vec<B256>, data: impl Into<Bytes>, block: u64) {
        let mut state = self.state();
        let index = state.logs.len() as u64;
        state.logs.push(RawLog {
            address,
            topics,
            data: data.into(),
            block_number: Some(U64::from(block)),
            log_index: Some(U64::from(index)),
        });
    }

    /// The trie nodes returned for `slot` at exactly `height`.
    pub fn set_proof(&self, slot: B256, height: u64, nodes: Vec<Bytes>) {
        self.state().proofs.insert((slot, height), nodes);
    }

    /// Registers a block header.
    pub fn set_header(&self, header: RawBlockHeader) {
        let number = header.number.to::<u64>();
        self.state().headers.insert(number, header);
    }

    /// Makes every subsequent call of `method` fail with a transport error.
    pub fn fail_method(&self, method: &'static str) {
        self.state().failing.push(method);
    }

    /// Makes every subsequent call fail with a transport error.
    pub fn fail_all(&self) {
        self.state().fail_all = true;
    }

    /// Delays every response by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// How many times `method` was invoked.
    pub fn calls_to(&self, method: &str) -> usize {
        self.state().counters.get(method).copied().unwrap_or(0)
    }

    /// The most recent `eth_getProof` request.
    pub fn last_proof_request(&self) -> Option<ProofRequest> {
        self.state().proof_requests.last().cloned()
    }

    fn resolve(&self, block: BlockTag) -> u64 {
        match block {
            BlockTag::Latest => self.state().head,
            BlockTag::Number(n) => n,
        }
    }

    async fn enter(&self, method: &'static str) -> Result<(), ProverError> {
        let delay = {
            let mut state = self.state();
            *state.counters.entry(method).or_default() += 1;
            if state.fail_all || state.failing.contains(&method) {
                return Err(ProverError::transport(method, "connection refused"));
            }
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn block_number(&self, ctx: &CallContext) -> Result<u64, ProverError> {
        ctx.run(async {
            self.enter("eth_blockNumber").await?;
            Ok(self.state().head)
        })
        .await
    }

    async fn call(
        &self,
        ctx: &CallContext,
        to: Address,
        data: Bytes,
        block: BlockTag,
    ) -> Result<Bytes, ProverError> {
        ctx.run(async {
            self.enter("eth_call").await?;
            let height = self.resolve(block);
            let state = self.state();
            state
                .calls
                .get(&(to, data))
                .and_then(|history| history.range(..=height).next_back())
                .map(|(_, ret)| ret.clone())
                .ok_or_else(|| ProverError::transport("eth_call", "execution reverted"))
        })
        .await
    }

    async fn get_logs(
        &self,
        ctx: &CallContext,
        filter: &LogFilter,
    ) -> Result<Vec<RawLog>, ProverError> {
        ctx.run(async {
            self.enter("eth_getLogs").await?;
            let from = match filter.from_block {
                BlockTag::Number(n) => n,
                BlockTag::Latest => self.state().head,
            };
            let to = self.resolve(filter.to_block);
            let state = self.state();
            Ok(state
                .logs
                .iter()
                .filter(|log| log.address == filter.address)
                .filter(|log| {
                    filter
                        .topics
                        .iter()
                        .zip(log.topics.iter())
                        .all(|(want, got)| want == got)
                        && log.topics.len() >= filter.topics.len()
                })
                .filter(|log| {
                    let block = log.block().unwrap_or(0);
                    block >= from && block <= to
                })
                .cloned()
                .collect())
        })
        .await
    }

    async fn get_proof(
        &self,
        ctx: &CallContext,
        address: Address,
        slots: &[B256],
        block: BlockTag,
    ) -> Result<AccountProof, ProverError> {
        ctx.run(async {
            self.enter("eth_getProof").await?;
            let height = self.resolve(block);
            let mut state = self.state();
            state.proof_requests.push(ProofRequest {
                address,
                slots: slots.to_vec(),
                block,
            });
            let storage_proof = slots
                .iter()
                .map(|slot| StorageProof {
                    key: U256::from_be_bytes(slot.0),
                    value: U256::ZERO,
                    proof: state
                        .proofs
                        .get(&(*slot, height))
                        .cloned()
                        .unwrap_or_default(),
                })
                .collect();
            Ok(AccountProof {
                address,
                storage_proof,
                ..AccountProof::default()
            })
        })
        .await
    }

    async fn header_by_number(
        &self,
        ctx: &CallContext,
        number: u64,
    ) -> Result<RawBlockHeader, ProverError> {
        ctx.run(async {
            self.enter("eth_getBlockByNumber").await?;
            self.state()
                .headers
                .get(&number)
                .cloned()
                .ok_or_else(|| {
                    ProverError::transport("eth_getBlockByNumber", format!("block {number} not found"))
                })
        })
        .await
    }
}

/// A [`LogCursor`] that returns a fixed, pre-indexed prefix of the history.
#[derive(Default)]
pub struct MockLogCursor {
    indexed: Mutex<Option<IndexedLogs>>,
}

impl MockLogCursor {
    /// A cursor that has indexed `logs` through `through_block`.
    pub fn new(logs: Vec<RawLog>, through_block: u64) -> Self {
        Self {
            indexed: Mutex::new(Some(IndexedLogs {
                logs,
                through_block,
            })),
        }
    }
}

#[async_trait]
impl LogCursor for MockLogCursor {
    async fn indexed(
        &self,
        _ctx: &CallContext,
        filter: &LogFilter,
    ) -> Result<Option<IndexedLogs>, ProverError> {
        let guard = self.indexed.lock().unwrap_or_else(|p| p.into_inner());
        Ok(guard.as_ref().map(|idx| IndexedLogs {
            logs: idx
                .logs
                .iter()
                .filter(|log| log.address == filter.address)
                .filter(|log| log.topics.first().copied() == filter.topic0())
                .cloned()
                .collect(),
            through_block: idx.through_block,
        }))
    }
}
