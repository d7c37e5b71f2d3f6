// Path: crates/relayer/src/msgs.rs

//! Helper functions for building IBC client messages.

use crate::epoch::epoch_of;
use crate::lightclient::{ClientState, ConsensusState, Header, TypedMessage};
use atlas_types::config::ProverConfig;
use atlas_types::error::ProverError;
use ibc_proto::google::protobuf::Timestamp;

pub use ibc_proto::ibc::core::client::v1::{MsgCreateClient, MsgUpdateClient};

/// The client state a new light client starts from at `header`.
pub fn client_state_for(header: &Header, config: &ProverConfig) -> ClientState {
    let number = header.number();
    ClientState {
        frozen: false,
        latest_epoch: epoch_of(number, config.epoch_size),
        epoch_size: config.epoch_size.get(),
        latest_height: number,
        client_identifier: config.client_identifier.clone(),
    }
}

/// The consensus state a new light client trusts at `header`.
///
/// The commitment root is the header's state root, which is what storage
/// proofs from `eth_getProof` verify against. No validator set is carried.
pub fn consensus_state_for(header: &Header, config: &ProverConfig) -> Result<ConsensusState, ProverError> {
    let seconds = i64::try_from(header.timestamp()).map_err(|_| {
        ProverError::InvalidHeader(format!(
            "block {}: timestamp {} out of range",
            header.number(),
            header.timestamp()
        ))
    })?;
    Ok(ConsensusState {
        epoch: epoch_of(header.number(), config.epoch_size),
        validators: Vec::new(),
        commitment_root: header.state_root().to_vec(),
        timestamp: Some(Timestamp { seconds, nanos: 0 }),
    })
}

/// A `MsgCreateClient` seeding a light client at `header`.
pub fn build_create_client(
    header: &Header,
    config: &ProverConfig,
    signer: &str,
) -> Result<MsgCreateClient, ProverError> {
    if header.signed_header.is_none() {
        return Err(ProverError::InvalidHeader("header carries no block".into()));
    }
    Ok(MsgCreateClient {
        client_state: Some(client_state_for(header, config).to_any()),
        consensus_state: Some(consensus_state_for(header, config)?.to_any()),
        signer: signer.to_string(),
    })
}

/// A `MsgUpdateClient` carrying `header` for `client_id`.
pub fn build_update_client(client_id: &str, header: &Header, signer: &str) -> MsgUpdateClient {
    MsgUpdateClient {
        client_id: client_id.to_string(),
        client_message: Some(header.to_any()),
        signer: signer.to_string(),
    }
}
