// Path: crates/relayer/src/slots.rs

//! Commitment-slot derivation for the contract-based IBC host.
//!
//! The host stores every commitment in a single Solidity mapping
//! `mapping(bytes32 => bytes32) commitments`, keyed by `keccak256(path)` where
//! `path` is the ICS-24 path string. The storage slot of an entry is therefore
//! `keccak256(keccak256(path) ++ uint256(mapping_slot))`. The destination light
//! client re-derives the same slot to check a proof, so any change here is a
//! protocol break.

use alloy_primitives::{keccak256, B256, U256};
use atlas_types::error::ProverError;
use atlas_types::ibc::parse_identifier;
use ibc_core_host_types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use ibc_core_host_types::path::{
    AckPath, ChannelEndPath, ClientConsensusStatePath, ClientStatePath, CommitmentPath,
    ConnectionPath,
};
use std::fmt;

/// The ICS-24 path of one IBC entity held by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalKey {
    path: String,
}

impl LogicalKey {
    /// The ICS-24 path string, e.g. `clients/map-client-0/clientState`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The key of the entry in the host's `commitments` mapping.
    pub fn commitment_key(&self) -> B256 {
        keccak256(self.path.as_bytes())
    }

    /// The storage slot holding the entry, for a mapping declared at `mapping_slot`.
    pub fn slot(&self, mapping_slot: u64) -> B256 {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(self.commitment_key().as_slice());
        preimage.extend_from_slice(&U256::from(mapping_slot).to_be_bytes::<32>());
        keccak256(&preimage)
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

fn key(path: impl fmt::Display) -> LogicalKey {
    LogicalKey {
        path: path.to_string(),
    }
}

/// `clients/{client_id}/clientState`
pub fn client_state(client_id: &str) -> Result<LogicalKey, ProverError> {
    let client: ClientId = parse_identifier("client", client_id)?;
    Ok(key(ClientStatePath::new(client)))
}

/// `clients/{client_id}/consensusStates/{revision_number}-{revision_height}`
pub fn consensus_state(
    client_id: &str,
    revision_number: u64,
    revision_height: u64,
) -> Result<LogicalKey, ProverError> {
    let client: ClientId = parse_identifier("client", client_id)?;
    Ok(key(ClientConsensusStatePath::new(
        client,
        revision_number,
        revision_height,
    )))
}

/// `connections/{connection_id}`
pub fn connection(connection_id: &str) -> Result<LogicalKey, ProverError> {
    let conn: ConnectionId = parse_identifier("connection", connection_id)?;
    Ok(key(ConnectionPath::new(&conn)))
}

/// `channelEnds/ports/{port_id}/channels/{channel_id}`
pub fn channel(port_id: &str, channel_id: &str) -> Result<LogicalKey, ProverError> {
    let (port, chan) = port_channel(port_id, channel_id)?;
    Ok(key(ChannelEndPath::new(&port, &chan)))
}

/// `commitments/ports/{port_id}/channels/{channel_id}/sequences/{sequence}`
pub fn packet_commitment(
    port_id: &str,
    channel_id: &str,
    sequence: u64,
) -> Result<LogicalKey, ProverError> {
    let (port, chan) = port_channel(port_id, channel_id)?;
    Ok(key(CommitmentPath::new(
        &port,
        &chan,
        Sequence::from(sequence),
    )))
}

/// `acks/ports/{port_id}/channels/{channel_id}/sequences/{sequence}`
pub fn packet_ack(
    port_id: &str,
    channel_id: &str,
    sequence: u64,
) -> Result<LogicalKey, ProverError> {
    let (port, chan) = port_channel(port_id, channel_id)?;
    Ok(key(AckPath::new(&port, &chan, Sequence::from(sequence))))
}

fn port_channel(port_id: &str, channel_id: &str) -> Result<(PortId, ChannelId), ProverError> {
    Ok((
        parse_identifier("port", port_id)?,
        parse_identifier("channel", channel_id)?,
    ))
}
