// Path: crates/relayer/src/chain.rs

//! The counterparty chain as seen by the relayer framework.
//!
//! A [`Chain`] binds one ledger connection to one [`PathEnd`] and answers the
//! framework's unproven queries. The path end is assigned exactly once.

use crate::events::packets::{ack_commitment, packet_commitment};
use crate::events::{EventSchemas, LogScanner, PacketReconstructor};
use crate::query::{uninitialized_channel, uninitialized_connection, StateQuery};
use crate::rpc::HttpLedgerClient;
use async_trait::async_trait;
use atlas_api::context::CallContext;
use atlas_api::framework::ChainQuery;
use atlas_api::ledger::{BlockTag, LedgerClient, LogCursor};
use atlas_types::config::ChainConfig;
use atlas_types::error::ProverError;
use atlas_types::ibc::{PathEnd, QueryHeight};
use ibc_proto::cosmos::base::query::v1beta1::PageResponse;
use ibc_proto::ibc::core::channel::v1::{
    Packet, PacketState, QueryChannelResponse, QueryPacketAcknowledgementResponse,
    QueryPacketAcknowledgementsResponse, QueryPacketCommitmentResponse,
    QueryPacketCommitmentsResponse,
};
use ibc_proto::ibc::core::client::v1::{
    Height, QueryClientStateResponse, QueryConsensusStateResponse,
};
use ibc_proto::ibc::core::connection::v1::QueryConnectionResponse;
use std::sync::{Arc, OnceLock};

/// Applies `offset`/`limit` to an emission-ordered list; `limit == 0` means no limit.
fn paginate<T>(items: Vec<T>, offset: u64, limit: u64) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = match limit {
        0 => usize::MAX,
        n => usize::try_from(n).unwrap_or(usize::MAX),
    };
    (items.into_iter().skip(offset).take(limit).collect(), total)
}

/// One counterparty ledger and the path end proofs are made for.
///
/// Queries read the IBC host contract at explicit heights; the packet queries
/// additionally need [`Chain::set_path`] to have been called.
pub struct Chain {
    config: ChainConfig,
    revision_number: u64,
    path: OnceLock<PathEnd>,
    ledger: Arc<dyn LedgerClient>,
    schemas: Arc<EventSchemas>,
    state: StateQuery,
    packets: PacketReconstructor,
}

impl Chain {
    /// A chain reading through `ledger`, scanning logs from genesis.
    pub fn new(config: ChainConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        let schemas = Arc::new(EventSchemas::from_config(&config));
        let scanner = Arc::new(LogScanner::new(ledger.clone()));
        Self {
            state: StateQuery::new(ledger.clone(), config.ibc_host_address),
            packets: PacketReconstructor::new(scanner, schemas.clone()),
            revision_number: 0,
            path: OnceLock::new(),
            ledger,
            schemas,
            config,
        }
    }

    /// A chain over the JSON-RPC endpoint named in `config`.
    pub fn connect(config: ChainConfig) -> Result<Self, ProverError> {
        let ledger = Arc::new(HttpLedgerClient::from_config(&config)?);
        tracing::info!(
            target: "prover",
            chain_id = %config.chain_id,
            rpc = %ledger.endpoint(),
            host = %config.ibc_host_address,
            handler = %config.ibc_handler_address,
            "connected to ledger"
        );
        Ok(Self::new(config, ledger))
    }

    /// Seeds log scans from `cursor` instead of always scanning from genesis.
    pub fn with_cursor(mut self, cursor: Arc<dyn LogCursor>) -> Self {
        let scanner = Arc::new(LogScanner::new(self.ledger.clone()).with_cursor(cursor));
        self.packets = PacketReconstructor::new(scanner, self.schemas.clone());
        self
    }

    /// The revision number attached to every returned height.
    pub fn with_revision_number(mut self, revision_number: u64) -> Self {
        self.revision_number = revision_number;
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn revision_number(&self) -> u64 {
        self.revision_number
    }

    pub fn ledger(&self) -> Arc<dyn LedgerClient> {
        self.ledger.clone()
    }

    pub fn state(&self) -> &StateQuery {
        &self.state
    }

    pub fn packets(&self) -> &PacketReconstructor {
        &self.packets
    }

    /// Validates and assigns the path end. Fails if one is already set.
    pub fn set_path(&self, path: PathEnd) -> Result<(), ProverError> {
        path.validate()?;
        let summary = format!("{}/{}", path.port_id, path.channel_id);
        self.path
            .set(path)
            .map_err(|_| ProverError::PathAlreadySet)?;
        tracing::info!(target: "prover", chain_id = %self.config.chain_id, path = %summary, "path end set");
        Ok(())
    }

    /// The assigned path end.
    pub fn path(&self) -> Result<&PathEnd, ProverError> {
        self.path.get().ok_or(ProverError::PathNotSet)
    }

    /// `height` within this chain's revision.
    pub fn height(&self, height: u64) -> Height {
        Height {
            revision_number: self.revision_number,
            revision_height: height,
        }
    }

    /// Pins `height` to a concrete block number.
    pub async fn resolve(&self, ctx: &CallContext, height: QueryHeight) -> Result<u64, ProverError> {
        self.state.resolve(ctx, height).await
    }
}

#[async_trait]
impl ChainQuery for Chain {
    fn chain_id(&self) -> &str {
        &self.config.chain_id
    }

    async fn latest_height(&self, ctx: &CallContext) -> Result<u64, ProverError> {
        self.ledger.block_number(ctx).await
    }

    async fn query_client_state(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryClientStateResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let client_state = self
            .state
            .client_state(ctx, &path.client_id, h)
            .await?
            .require(format!("client state of {}", path.client_id))?;
        Ok(QueryClientStateResponse {
            client_state: Some(client_state),
            proof: Vec::new(),
            proof_height: Some(self.height(h)),
        })
    }

    async fn query_consensus_state(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        counterparty_height: Height,
    ) -> Result<QueryConsensusStateResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let consensus_state = self
            .state
            .consensus_state(ctx, &path.client_id, counterparty_height.clone(), h)
            .await?
            .require(format!(
                "consensus state of {} at {}-{}",
                path.client_id,
                counterparty_height.revision_number,
                counterparty_height.revision_height
            ))?;
        Ok(QueryConsensusStateResponse {
            consensus_state: Some(consensus_state),
            proof: Vec::new(),
            proof_height: Some(self.height(h)),
        })
    }

    async fn query_connection(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryConnectionResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let res = match self
            .state
            .connection(ctx, &path.connection_id, h)
            .await?
            .into_value()
        {
            Some(conn) => QueryConnectionResponse {
                connection: Some(conn),
                proof: Vec::new(),
                proof_height: Some(self.height(h)),
            },
            None => QueryConnectionResponse {
                connection: Some(uninitialized_connection()),
                proof: Vec::new(),
                proof_height: Some(Height::default()),
            },
        };
        Ok(res)
    }

    async fn query_channel(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryChannelResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let res = match self
            .state
            .channel(ctx, &path.port_id, &path.channel_id, h)
            .await?
            .into_value()
        {
            Some(channel) => QueryChannelResponse {
                channel: Some(channel),
                proof: Vec::new(),
                proof_height: Some(self.height(h)),
            },
            None => QueryChannelResponse {
                channel: Some(uninitialized_channel()),
                proof: Vec::new(),
                proof_height: Some(Height::default()),
            },
        };
        Ok(res)
    }

    async fn query_packet_commitment(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketCommitmentResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let commitment = self
            .state
            .packet_commitment(ctx, &path.port_id, &path.channel_id, sequence, h)
            .await?
            .require(format!(
                "packet commitment {}/{}/{sequence}",
                path.port_id, path.channel_id
            ))?;
        Ok(QueryPacketCommitmentResponse {
            commitment: commitment.to_vec(),
            proof: Vec::new(),
            proof_height: Some(self.height(h)),
        })
    }

    async fn query_packet_ack_commitment(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketAcknowledgementResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let commitment = self
            .state
            .packet_ack_commitment(ctx, &path.port_id, &path.channel_id, sequence, h)
            .await?
            .require(format!(
                "packet acknowledgement commitment {}/{}/{sequence}",
                path.port_id, path.channel_id
            ))?;
        Ok(QueryPacketAcknowledgementResponse {
            acknowledgement: commitment.to_vec(),
            proof: Vec::new(),
            proof_height: Some(self.height(h)),
        })
    }

    async fn query_packet_commitments(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        offset: u64,
        limit: u64,
    ) -> Result<QueryPacketCommitmentsResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let packets = self
            .packets
            .list_packets(ctx, &path.port_id, &path.channel_id, BlockTag::Number(h))
            .await?;
        let (page, total) = paginate(packets, offset, limit);
        let commitments = page
            .iter()
            .map(|p| {
                Ok(PacketState {
                    port_id: path.port_id.clone(),
                    channel_id: path.channel_id.clone(),
                    sequence: p.sequence,
                    data: packet_commitment(p)?,
                })
            })
            .collect::<Result<Vec<_>, ProverError>>()?;
        Ok(QueryPacketCommitmentsResponse {
            commitments,
            pagination: Some(PageResponse {
                next_key: Vec::new(),
                total,
            }),
            height: Some(self.height(h)),
        })
    }

    async fn query_packet_ack_commitments(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        offset: u64,
        limit: u64,
    ) -> Result<QueryPacketAcknowledgementsResponse, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let acks = self
            .packets
            .list_acknowledgements(ctx, &path.port_id, &path.channel_id, BlockTag::Number(h))
            .await?;
        let (page, total) = paginate(acks, offset, limit);
        let acknowledgements = page
            .iter()
            .map(|a| {
                Ok(PacketState {
                    port_id: path.port_id.clone(),
                    channel_id: path.channel_id.clone(),
                    sequence: a.sequence,
                    data: ack_commitment(&a.acknowledgement)?,
                })
            })
            .collect::<Result<Vec<_>, ProverError>>()?;
        Ok(QueryPacketAcknowledgementsResponse {
            acknowledgements,
            pagination: Some(PageResponse {
                next_key: Vec::new(),
                total,
            }),
            height: Some(self.height(h)),
        })
    }

    async fn query_unreceived_packets(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequences: &[u64],
    ) -> Result<Vec<u64>, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let mut unreceived = Vec::new();
        for &seq in sequences {
            if !self
                .state
                .has_packet_receipt(ctx, &path.port_id, &path.channel_id, seq, h)
                .await?
            {
                unreceived.push(seq);
            }
        }
        tracing::debug!(
            target: "prover",
            height = h,
            queried = sequences.len(),
            unreceived = unreceived.len(),
            "unreceived packets"
        );
        Ok(unreceived)
    }

    async fn query_unreceived_acks(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequences: &[u64],
    ) -> Result<Vec<u64>, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let mut unreceived = Vec::new();
        for &seq in sequences {
            if self
                .state
                .packet_commitment(ctx, &path.port_id, &path.channel_id, seq, h)
                .await?
                .is_found()
            {
                unreceived.push(seq);
            }
        }
        tracing::debug!(
            target: "prover",
            height = h,
            queried = sequences.len(),
            unreceived = unreceived.len(),
            "unreceived acknowledgements"
        );
        Ok(unreceived)
    }

    async fn query_packet(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<Packet, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let packet = self
            .packets
            .find_packet(ctx, &path.port_id, &path.channel_id, sequence, BlockTag::Number(h))
            .await?;
        Ok(packet.into())
    }

    async fn query_packet_acknowledgement(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<Vec<u8>, ProverError> {
        let path = self.path()?;
        let h = self.resolve(ctx, height).await?;
        let ack = self
            .packets
            .find_acknowledgement(ctx, &path.port_id, &path.channel_id, sequence, BlockTag::Number(h))
            .await?;
        Ok(ack.acknowledgement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_test_utils::fixtures::TestFixtures;
    use atlas_test_utils::{assert_err_code, MockLedger};

    fn chain() -> Chain {
        Chain::new(TestFixtures::chain_config(), Arc::new(MockLedger::new()))
    }

    #[test]
    fn pagination_skips_and_limits() {
        let items: Vec<u64> = (1..=5).collect();
        assert_eq!(paginate(items.clone(), 0, 0), (vec![1, 2, 3, 4, 5], 5));
        assert_eq!(paginate(items.clone(), 1, 2), (vec![2, 3], 5));
        assert_eq!(paginate(items, 9, 2), (vec![], 5));
    }

    #[test]
    fn path_is_set_once() {
        let chain = chain();
        assert_err_code!(chain.path(), "PROVER_PATH_NOT_SET");
        chain.set_path(TestFixtures::path_end()).unwrap();
        assert_eq!(chain.path().unwrap().channel_id, "channel-0");
        assert_err_code!(
            chain.set_path(TestFixtures::path_end()),
            "PROVER_PATH_ALREADY_SET"
        );
    }

    #[test]
    fn invalid_path_is_rejected_and_leaves_chain_unset() {
        let chain = chain();
        let mut path = TestFixtures::path_end();
        path.port_id = "Transfer".into();
        assert_err_code!(chain.set_path(path), "PROVER_INVALID_IDENTIFIER");
        assert!(chain.path().is_err());
    }

    #[tokio::test]
    async fn queries_require_a_path() {
        let chain = chain();
        assert_err_code!(
            chain
                .query_channel(&CallContext::background(), QueryHeight::At(1))
                .await,
            "PROVER_PATH_NOT_SET"
        );
    }
}
