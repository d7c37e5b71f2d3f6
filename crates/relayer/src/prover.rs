// Path: crates/relayer/src/prover.rs

//! Proven queries and light-client message construction.
//!
//! Every proven query resolves its height once and then reads the value and
//! proves its slot at that same block, so the returned `proof_height` always
//! names the state root the proof was taken against.

use crate::chain::Chain;
use crate::header::HeaderSynthesizer;
use crate::lightclient::Header;
use crate::msgs::{build_create_client, build_update_client};
use crate::proof::ProofAssembler;
use crate::slots::{self, LogicalKey};
use async_trait::async_trait;
use atlas_api::context::CallContext;
use atlas_api::framework::{ChainQuery, ProofQuery};
use atlas_types::config::{ChainConfig, ProverConfig};
use atlas_types::error::ProverError;
use atlas_types::ibc::{Proof, QueryHeight};
use ibc_proto::ibc::core::channel::v1::{
    QueryChannelResponse, QueryPacketAcknowledgementResponse, QueryPacketCommitmentResponse,
};
use ibc_proto::ibc::core::client::v1::{
    Height, MsgCreateClient, MsgUpdateClient, QueryClientStateResponse,
    QueryConsensusStateResponse,
};
use ibc_proto::ibc::core::connection::v1::QueryConnectionResponse;
use std::sync::Arc;

/// Proves the state of one [`Chain`] for a light client with the parameters
/// in [`ProverConfig`].
pub struct Prover {
    chain: Arc<Chain>,
    config: ProverConfig,
    proofs: ProofAssembler,
    headers: HeaderSynthesizer,
}

impl Prover {
    /// A prover over `chain`.
    ///
    /// The chain and the prover must agree on the revision number, since
    /// proven and unproven responses both stamp heights with it.
    pub fn new(chain: Arc<Chain>, config: ProverConfig) -> Result<Self, ProverError> {
        if chain.revision_number() != config.revision_number {
            return Err(ProverError::Config(format!(
                "revision number {} does not match the chain's revision number {}",
                config.revision_number,
                chain.revision_number()
            )));
        }
        let ledger = chain.ledger();
        let host = chain.state().host();
        Ok(Self {
            proofs: ProofAssembler::new(ledger.clone(), host, config.commitment_slot),
            headers: HeaderSynthesizer::new(ledger, config.epoch_size, config.header_identifier.clone()),
            chain,
            config,
        })
    }

    /// A prover over a fresh JSON-RPC connection described by `chain_config`.
    pub fn connect(chain_config: ChainConfig, config: ProverConfig) -> Result<Self, ProverError> {
        let chain = Chain::connect(chain_config)?.with_revision_number(config.revision_number);
        Self::new(Arc::new(chain), config)
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.chain
    }

    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// The header of block `number`.
    pub async fn header_at(&self, ctx: &CallContext, number: u64) -> Result<Header, ProverError> {
        self.headers.header_at(ctx, number).await
    }

    /// The epoch of the chain's current head.
    pub async fn latest_epoch(&self, ctx: &CallContext) -> Result<u64, ProverError> {
        self.headers.latest_epoch(ctx).await
    }

    async fn prove(
        &self,
        ctx: &CallContext,
        key: &LogicalKey,
        height: u64,
    ) -> Result<(Vec<u8>, Height), ProverError> {
        let proof: Proof = self.proofs.prove_path(ctx, key, height).await?;
        tracing::info!(
            target: "prover",
            path = %key,
            height,
            proof_len = proof.as_bytes().len(),
            "proved commitment"
        );
        Ok((proof.into_bytes(), self.chain.height(height)))
    }
}

#[async_trait]
impl ProofQuery for Prover {
    type Header = Header;

    async fn query_latest_header(&self, ctx: &CallContext) -> Result<Header, ProverError> {
        self.headers.latest_header(ctx).await
    }

    async fn update_light_with_header(
        &self,
        ctx: &CallContext,
    ) -> Result<(Header, u64, u64), ProverError> {
        let header = self.query_latest_header(ctx).await?;
        let height = header.number();
        Ok((header, height, height))
    }

    fn setup_header(&self, header: Header) -> Result<Header, ProverError> {
        Ok(header)
    }

    fn create_msg_create_client(
        &self,
        header: &Header,
        signer: &str,
    ) -> Result<MsgCreateClient, ProverError> {
        let msg = build_create_client(header, &self.config, signer)?;
        tracing::info!(
            target: "prover",
            height = header.number(),
            epoch = header.epoch,
            "built MsgCreateClient"
        );
        Ok(msg)
    }

    fn create_msg_update_client(
        &self,
        client_id: &str,
        header: &Header,
        signer: &str,
    ) -> Result<MsgUpdateClient, ProverError> {
        Ok(build_update_client(client_id, header, signer))
    }

    async fn query_client_state_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryClientStateResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let mut res = self.chain.query_client_state(ctx, QueryHeight::At(h)).await?;
        let (proof, proof_height) = self.prove(ctx, &slots::client_state(&path.client_id)?, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }

    async fn query_consensus_state_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        counterparty_height: Height,
    ) -> Result<QueryConsensusStateResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let key = slots::consensus_state(
            &path.client_id,
            counterparty_height.revision_number,
            counterparty_height.revision_height,
        )?;
        let mut res = self
            .chain
            .query_consensus_state(ctx, QueryHeight::At(h), counterparty_height)
            .await?;
        let (proof, proof_height) = self.prove(ctx, &key, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }

    async fn query_connection_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryConnectionResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let mut res = self.chain.query_connection(ctx, QueryHeight::At(h)).await?;
        let (proof, proof_height) = self.prove(ctx, &slots::connection(&path.connection_id)?, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }

    async fn query_channel_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
    ) -> Result<QueryChannelResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let mut res = self.chain.query_channel(ctx, QueryHeight::At(h)).await?;
        let key = slots::channel(&path.port_id, &path.channel_id)?;
        let (proof, proof_height) = self.prove(ctx, &key, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }

    async fn query_packet_commitment_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketCommitmentResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let mut res = self
            .chain
            .query_packet_commitment(ctx, QueryHeight::At(h), sequence)
            .await?;
        let key = slots::packet_commitment(&path.port_id, &path.channel_id, sequence)?;
        let (proof, proof_height) = self.prove(ctx, &key, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }

    async fn query_packet_ack_commitment_with_proof(
        &self,
        ctx: &CallContext,
        height: QueryHeight,
        sequence: u64,
    ) -> Result<QueryPacketAcknowledgementResponse, ProverError> {
        let path = self.chain.path()?;
        let h = self.chain.resolve(ctx, height).await?;
        let mut res = self
            .chain
            .query_packet_ack_commitment(ctx, QueryHeight::At(h), sequence)
            .await?;
        let key = slots::packet_ack(&path.port_id, &path.channel_id, sequence)?;
        let (proof, proof_height) = self.prove(ctx, &key, h).await?;
        res.proof = proof;
        res.proof_height = Some(proof_height);
        Ok(res)
    }
}
