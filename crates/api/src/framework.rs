// Path: crates/api/src/framework.rs
//! The capability set the generic relayer framework drives.
//!
//! The framework owns path configuration and the relay loop; a chain plugs in
//! by answering the queries below. Responses use the canonical `ibc-proto`
//! messages so the framework never sees ledger-specific types.

use crate::context::CallContext;
use async_trait::async_trait;
use atlas_types::error::ProverError;
use atlas_types::ibc::QueryHeight;
use ibc_proto::ibc::core::channel::v1::{
    Packet, QueryChannelResponse, QueryPacketAcknowledgementResponse,
    QueryPacketAcknowledgementsResponse, QueryPacketCommitmentResponse,
    QueryPacketCommitmentsResponse,
};
use ibc_proto::ibc::core::client::v1::{
    Height, MsgCreateClient, MsgUpdateClient, QueryClientStateResponse,
    QueryConsensusStateResponse,
};
use ibc_proto::ibc::core::connection::v1::QueryConnectionResponse;

/// Height-pinned reads of the IBC entities stored on a chain.
///
/// Responses carry no proof; see [`ProofQuery`] for the proven variants.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// The chain id this instance serves.
    fn chain_id(&self) -> &str;

    /// The chain's current head block number.
    async fn latest_height(&self, ctx: &CallContext) -> Result<u64, ProverError>;

    /// The client state of the path end's client.
    async fn query_client_state(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryClientStateResponse, ProverError>;

    /// The consensus state the path end's client stores for `counterparty_height`.
    async fn query_consensus_state(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        counterparty_height: Height,
    ) -> Result<QueryConsensusStateResponse, ProverError>;

    /// The path end's connection, or the uninitialized placeholder.
    async fn query_connection(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryConnectionResponse, ProverError>;

    /// The path end's channel, or the uninitialized placeholder.
    async fn query_channel(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryChannelResponse, ProverError>;

    /// The commitment of packet `sequence`.
    async fn query_packet_commitment(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketCommitmentResponse, ProverError>;

    /// The acknowledgement commitment of packet `sequence`.
    async fn query_packet_ack_commitment(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketAcknowledgementResponse, ProverError>;

    /// All packet commitments sent on the path end's channel.
    async fn query_packet_commitments(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        offset: u64,
        limit: u64,
    ) -> Result<QueryPacketCommitmentsResponse, ProverError>;

    /// All acknowledgement commitments written on the path end's channel.
    async fn query_packet_ack_commitments(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        offset: u64,
        limit: u64,
    ) -> Result<QueryPacketAcknowledgementsResponse, ProverError>;

    /// The subset of `sequences` this chain has not received.
    async fn query_unreceived_packets(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequences: &[u64],
    ) -> Result<Vec<u64>, ProverError>;

    /// The subset of `sequences` whose acknowledgement has not cleared the commitment.
    async fn query_unreceived_acks(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequences: &[u64],
    ) -> Result<Vec<u64>, ProverError>;

    /// The packet sent with `sequence` on the path end's channel.
    async fn query_packet(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<Packet, ProverError>;

    /// The acknowledgement written for `sequence` on the path end's channel.
    async fn query_packet_acknowledgement(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<Vec<u8>, ProverError>;
}

/// Proven reads and light-client message construction.
#[async_trait]
pub trait ProofQuery: Send + Sync {
    /// The light-client header type this prover synthesizes.
    type Header: Clone + Send + Sync;

    /// The header of the chain's current head.
    async fn query_latest_header(&self, ctx: &CallContext) -> Result<Self::Header, ProverError>;

    /// The latest header plus the heights it makes provable and queryable.
    async fn update_light_with_header(
        &self,
        ctx: &CallContext,
    ) -> Result<(Self::Header, u64, u64), ProverError>;

    /// Prepares a header for submission to the counterparty.
    fn setup_header(&self, header: Self::Header) -> Result<Self::Header, ProverError>;

    /// A `MsgCreateClient` seeded from `header`.
    fn create_msg_create_client(
        &self,
        header: &Self::Header,
        signer: &str,
    ) -> Result<MsgCreateClient, ProverError>;

    /// A `MsgUpdateClient` carrying `header` for `client_id`.
    fn create_msg_update_client(
        &self,
        client_id: &str,
        header: &Self::Header,
        signer: &str,
    ) -> Result<MsgUpdateClient, ProverError>;

    /// The client state together with its storage proof.
    async fn query_client_state_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryClientStateResponse, ProverError>;

    /// The consensus state together with its storage proof.
    async fn query_consensus_state_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        counterparty_height: Height,
    ) -> Result<QueryConsensusStateResponse, ProverError>;

    /// The connection together with its storage proof.
    async fn query_connection_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryConnectionResponse, ProverError>;

    /// The channel together with its storage proof.
    async fn query_channel_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryChannelResponse, ProverError>;

    /// The packet commitment together with its storage proof.
    async fn query_packet_commitment_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketCommitmentResponse, ProverError>;

    /// The acknowledgement commitment together with its storage proof.
    async fn query_packet_ack_commitment_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketAcknowledgementResponse, ProverError>;
}
