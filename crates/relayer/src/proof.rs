// Path: crates/relayer/src/proof.rs

//! Storage inclusion proofs for host commitments.

use crate::slots::LogicalKey;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::Header;
use atlas_api::context::CallContext;
use atlas_api::ledger::{BlockTag, LedgerClient};
use atlas_types::error::ProverError;
use atlas_types::ibc::Proof;
use std::sync::Arc;

/// Encodes trie nodes as one RLP list whose items are the raw nodes.
///
/// Each node returned by `eth_getProof` is already an RLP item, so the nodes
/// are concatenated verbatim behind a list header.
pub fn encode_nodes(nodes: &[Bytes]) -> Vec<u8> {
    let payload_length = nodes.iter().map(|n| n.len()).sum();
    let header = Header {
        list: true,
        payload_length,
    };
    let mut out = Vec::with_capacity(header.length() + payload_length);
    header.encode(&mut out);
    for node in nodes {
        out.extend_from_slice(node);
    }
    out
}

/// Produces storage proofs for slots of the IBC host contract.
#[derive(Clone)]
pub struct ProofAssembler {
    ledger: Arc<dyn LedgerClient>,
    host: Address,
    mapping_slot: u64,
}

impl ProofAssembler {
    /// An assembler for `host`, whose `commitments` mapping is declared at `mapping_slot`.
    pub fn new(ledger: Arc<dyn LedgerClient>, host: Address, mapping_slot: u64) -> Self {
        Self {
            ledger,
            host,
            mapping_slot,
        }
    }

    /// Proves the commitment stored under `key` at `height`.
    pub async fn prove_path(
        &self,
        ctx: &CallContext,
        key: &LogicalKey,
        height: u64,
    ) -> Result<Proof, ProverError> {
        let slot = key.slot(self.mapping_slot);
        tracing::debug!(target: "prover", path = %key, %slot, height, "proving commitment");
        self.prove_slot(ctx, slot, height).await
    }

    /// Proves storage `slot` of the host at `height`.
    pub async fn prove_slot(
        &self,
        ctx: &CallContext,
        slot: B256,
        height: u64,
    ) -> Result<Proof, ProverError> {
        let resp = self
            .ledger
            .get_proof(ctx, self.host, &[slot], BlockTag::Number(height))
            .await?;
        let key = U256::from_be_bytes(slot.0);
        let nodes = resp
            .storage_proof
            .into_iter()
            .find(|p| p.key == key)
            .map(|p| p.proof)
            .unwrap_or_default();
        if nodes.is_empty() {
            tracing::warn!(target: "prover", %slot, height, "ledger returned an empty storage proof");
            return Err(ProverError::EmptyProof {
                slot: slot.to_string(),
                height,
            });
        }
        tracing::debug!(target: "prover", %slot, height, nodes = nodes.len(), "storage proof assembled");
        Ok(Proof::new(slot, height, encode_nodes(&nodes)))
    }
}
