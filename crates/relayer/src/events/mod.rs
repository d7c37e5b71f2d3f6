// Path: crates/relayer/src/events/mod.rs

//! Event log scanning over the IBC contracts.
//!
//! Views of sent packets and written acknowledgements are rebuilt from logs on
//! every call. Without a [`LogCursor`] that means a scan from genesis whose
//! cost is linear in the contract's total log volume; chains with long
//! histories should plug in an external indexer as the cursor.

pub mod packets;

use crate::contracts::{SendPacket, WriteAcknowledgement};
use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;
use atlas_api::context::CallContext;
use atlas_api::ledger::{BlockTag, LedgerClient, LogCursor, LogFilter, RawLog};
use atlas_types::config::ChainConfig;
use atlas_types::error::ProverError;
use std::sync::Arc;

pub use packets::PacketReconstructor;

/// The events the prover decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `SendPacket(Packet)` from the handler.
    SendPacket,
    /// `WriteAcknowledgement(string,string,uint64,bytes)` from the handler.
    WriteAcknowledgement,
}

/// Where an event is emitted and how its topic is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchema {
    /// The event.
    pub kind: EventKind,
    /// The canonical Solidity signature.
    pub signature: &'static str,
    /// `keccak256(signature)`, the log's `topics[0]`.
    pub topic: B256,
    /// The contract that emits it.
    pub emitter: Address,
}

impl EventSchema {
    fn of<E: SolEvent>(kind: EventKind, emitter: Address) -> Self {
        Self {
            kind,
            signature: E::SIGNATURE,
            topic: E::SIGNATURE_HASH,
            emitter,
        }
    }

    /// Decodes `log` as `E`, failing closed on any emitter, topic or field mismatch.
    pub fn decode<E: SolEvent>(&self, log: &RawLog) -> Result<E, ProverError> {
        if E::SIGNATURE_HASH != self.topic {
            return Err(ProverError::Decode(format!(
                "schema {} cannot decode as {}",
                self.signature,
                E::SIGNATURE
            )));
        }
        if log.address != self.emitter {
            return Err(ProverError::Decode(format!(
                "{} log from unexpected emitter {}",
                self.signature, log.address
            )));
        }
        if log.topics.first() != Some(&self.topic) {
            return Err(ProverError::Decode(format!(
                "log topic does not match {}",
                self.signature
            )));
        }
        E::decode_raw_log(log.topics.iter().copied(), &log.data, true)
            .map_err(|e| ProverError::Decode(format!("{}: {e}", self.signature)))
    }
}

/// The immutable registry of decodable events, built once per chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchemas {
    send_packet: EventSchema,
    write_acknowledgement: EventSchema,
}

impl EventSchemas {
    /// Binds the packet events to the handler contract at `handler`.
    pub fn new(handler: Address) -> Self {
        Self {
            send_packet: EventSchema::of::<SendPacket>(EventKind::SendPacket, handler),
            write_acknowledgement: EventSchema::of::<WriteAcknowledgement>(
                EventKind::WriteAcknowledgement,
                handler,
            ),
        }
    }

    /// The registry for the contracts named in `config`.
    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.ibc_handler_address)
    }

    /// The schema of `kind`.
    pub fn schema(&self, kind: EventKind) -> &EventSchema {
        match kind {
            EventKind::SendPacket => &self.send_packet,
            EventKind::WriteAcknowledgement => &self.write_acknowledgement,
        }
    }
}

/// Fetches raw logs for one contract and topic.
pub struct LogScanner {
    ledger: Arc<dyn LedgerClient>,
    cursor: Option<Arc<dyn LogCursor>>,
}

impl LogScanner {
    /// A scanner that always scans from genesis.
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            cursor: None,
        }
    }

    /// Seeds scans from an external indexer; only the unindexed tail is fetched.
    pub fn with_cursor(mut self, cursor: Arc<dyn LogCursor>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Every log with `topic` emitted by `address` in `[from_block, to_block]`.
    ///
    /// A transport failure aborts the whole scan; no partial result is returned.
    pub async fn scan(
        &self,
        ctx: &CallContext,
        address: Address,
        topic: B256,
        from_block: u64,
        to_block: BlockTag,
    ) -> Result<Vec<RawLog>, ProverError> {
        let filter = LogFilter::new(address, topic, from_block, to_block);
        let indexed = match &self.cursor {
            Some(cursor) => cursor.indexed(ctx, &filter).await?,
            None => None,
        };

        let logs = match indexed {
            Some(idx) => {
                let in_range = |log: &RawLog| {
                    let block = log.block().unwrap_or(from_block);
                    block >= from_block
                        && match to_block {
                            BlockTag::Number(to) => block <= to,
                            BlockTag::Latest => true,
                        }
                };
                let mut logs: Vec<RawLog> = idx.logs.into_iter().filter(|l| in_range(l)).collect();
                let covered = matches!(to_block, BlockTag::Number(to) if idx.through_block >= to);
                if !covered {
                    let tail_from = from_block.max(idx.through_block.saturating_add(1));
                    let tail = LogFilter::new(address, topic, tail_from, to_block);
                    logs.extend(self.ledger.get_logs(ctx, &tail).await?);
                }
                tracing::debug!(
                    target: "prover",
                    %address,
                    %topic,
                    through_block = idx.through_block,
                    covered,
                    "log scan seeded from cursor"
                );
                logs
            }
            None => self.ledger.get_logs(ctx, &filter).await?,
        };

        if let Some(bad) = logs
            .iter()
            .find(|l| l.address != address || l.topics.first() != Some(&topic))
        {
            return Err(ProverError::Decode(format!(
                "ledger returned a log outside the filter: emitter {} topics {:?}",
                bad.address, bad.topics
            )));
        }
        tracing::debug!(
            target: "prover",
            %address,
            %topic,
            from_block,
            to_block = %to_block.to_rpc_param(),
            logs = logs.len(),
            "log scan complete"
        );
        Ok(logs)
    }

    /// Scans for the logs of `schema`.
    pub async fn scan_schema(
        &self,
        ctx: &CallContext,
        schema: &EventSchema,
        to_block: BlockTag,
    ) -> Result<Vec<RawLog>, ProverError> {
        self.scan(ctx, schema.emitter, schema.topic, 0, to_block).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_test_utils::fixtures::HANDLER;
    use atlas_test_utils::{MockLedger, MockLogCursor};
    use alloy_primitives::{Bytes, U64};

    fn ack_log(block: u64, seq: u64) -> RawLog {
        let ev = WriteAcknowledgement {
            destinationPortId: "transfer".into(),
            destinationChannel: "channel-0".into(),
            sequence: seq,
            acknowledgement: Bytes::from(vec![1]),
        };
        RawLog {
            address: HANDLER,
            topics: vec![WriteAcknowledgement::SIGNATURE_HASH],
            data: ev.encode_data().into(),
            block_number: Some(U64::from(block)),
            log_index: None,
        }
    }

    #[test]
    fn registry_binds_emitters() {
        let schemas = EventSchemas::new(HANDLER);
        assert_eq!(schemas.schema(EventKind::SendPacket).emitter, HANDLER);
        assert_eq!(schemas.schema(EventKind::WriteAcknowledgement).emitter, HANDLER);
        assert_eq!(
            schemas.schema(EventKind::WriteAcknowledgement).topic,
            WriteAcknowledgement::SIGNATURE_HASH
        );
    }

    #[test]
    fn decode_rejects_wrong_schema_and_truncated_data() {
        let schemas = EventSchemas::new(HANDLER);
        let log = ack_log(1, 1);
        let send = schemas.schema(EventKind::SendPacket);
        assert!(matches!(
            send.decode::<WriteAcknowledgement>(&log),
            Err(ProverError::Decode(_))
        ));
        let ack = schemas.schema(EventKind::WriteAcknowledgement);
        assert_eq!(ack.decode::<WriteAcknowledgement>(&log).unwrap().sequence, 1);

        let mut truncated = log.clone();
        truncated.data = Bytes::from(log.data[..40].to_vec());
        assert!(matches!(
            ack.decode::<WriteAcknowledgement>(&truncated),
            Err(ProverError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn transport_error_aborts_scan() {
        let ledger = Arc::new(MockLedger::new());
        ledger.push_log(ack_log(1, 1));
        ledger.fail_method("eth_getLogs");
        let scanner = LogScanner::new(ledger);
        let res = scanner
            .scan(
                &CallContext::background(),
                HANDLER,
                WriteAcknowledgement::SIGNATURE_HASH,
                0,
                BlockTag::Latest,
            )
            .await;
        assert!(matches!(res, Err(ProverError::Transport { .. })));
    }

    #[tokio::test]
    async fn cursor_seeds_scan_and_only_tail_is_fetched() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_head(100);
        // Block 10 is indexed; block 60 is only on the ledger.
        ledger.push_log(ack_log(10, 1));
        ledger.push_log(ack_log(60, 2));
        let cursor = Arc::new(MockLogCursor::new(vec![ack_log(10, 1)], 50));
        let scanner = LogScanner::new(ledger.clone()).with_cursor(cursor);

        let logs = scanner
            .scan(
                &CallContext::background(),
                HANDLER,
                WriteAcknowledgement::SIGNATURE_HASH,
                0,
                BlockTag::Latest,
            )
            .await
            .unwrap();
        let blocks: Vec<_> = logs.iter().filter_map(|l| l.block()).collect();
        assert_eq!(blocks, vec![10, 60]);
        assert_eq!(ledger.calls_to("eth_getLogs"), 1);
    }

    #[tokio::test]
    async fn fully_indexed_range_skips_the_ledger() {
        let ledger = Arc::new(MockLedger::new());
        let cursor = Arc::new(MockLogCursor::new(vec![ack_log(10, 1), ack_log(40, 2)], 50));
        let scanner = LogScanner::new(ledger.clone()).with_cursor(cursor);
        let logs = scanner
            .scan(
                &CallContext::background(),
                HANDLER,
                WriteAcknowledgement::SIGNATURE_HASH,
                0,
                BlockTag::Number(20),
            )
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(ledger.calls_to("eth_getLogs"), 0);
    }
}
