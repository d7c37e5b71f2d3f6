// Path: crates/types/src/error/mod.rs
//! Core error types for the Atlas IBC prover.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors produced while querying, reconstructing or proving counterparty state.
///
/// Every variant propagates to the immediate caller unmodified. The absence of a
/// connection or channel is *not* an error and never surfaces here.
#[derive(Error, Debug)]
pub enum ProverError {
    /// An identifier handed to the key deriver or the path end was malformed.
    #[error("Invalid {kind} identifier '{id}': {reason}")]
    InvalidIdentifier {
        /// Which identifier kind failed (client, connection, port, channel).
        kind: &'static str,
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The entity is absent at a height where absence is not a valid outcome.
    #[error("{entity} not found at height {height}")]
    NotFoundAtHeight {
        /// A human-readable description of the entity.
        entity: String,
        /// The height the query was pinned to.
        height: u64,
    },
    /// The ledger returned zero proof nodes for a storage slot.
    #[error("Storage proof is empty for slot {slot} at height {height}")]
    EmptyProof {
        /// The hex-encoded storage slot.
        slot: String,
        /// The height the proof was requested at.
        height: u64,
    },
    /// A log or RPC payload did not match its expected schema.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A packet scan was exhausted without a match.
    #[error("Packet not found: port={port} channel={channel} sequence={sequence}")]
    PacketNotFound {
        /// The source port id.
        port: String,
        /// The source channel id.
        channel: String,
        /// The packet sequence.
        sequence: u64,
    },
    /// An acknowledgement scan was exhausted without a match.
    #[error("Acknowledgement not found: port={port} channel={channel} sequence={sequence}")]
    AcknowledgementNotFound {
        /// The destination port id.
        port: String,
        /// The destination channel id.
        channel: String,
        /// The packet sequence.
        sequence: u64,
    },
    /// The ledger RPC failed at the network or protocol level.
    #[error("Transport error in {method}: {reason}")]
    Transport {
        /// The RPC method that failed.
        method: String,
        /// The underlying failure.
        reason: String,
    },
    /// The caller's cancellation signal or deadline fired.
    #[error("Operation canceled")]
    Canceled,
    /// A path-scoped operation ran before the path end was assigned.
    #[error("Path end is not set")]
    PathNotSet,
    /// The path end was assigned more than once.
    #[error("Path end is already set")]
    PathAlreadySet,
    /// A raw block header could not be turned into a light-client header.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProverError {
    /// Builds a `Transport` error from an RPC method name and any displayable cause.
    pub fn transport(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            method: method.into(),
            reason: reason.to_string(),
        }
    }
}

impl ErrorCode for ProverError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "PROVER_INVALID_IDENTIFIER",
            Self::NotFoundAtHeight { .. } => "PROVER_NOT_FOUND_AT_HEIGHT",
            Self::EmptyProof { .. } => "PROVER_EMPTY_PROOF",
            Self::Decode(_) => "PROVER_DECODE_ERROR",
            Self::PacketNotFound { .. } => "PROVER_PACKET_NOT_FOUND",
            Self::AcknowledgementNotFound { .. } => "PROVER_ACK_NOT_FOUND",
            Self::Transport { .. } => "PROVER_TRANSPORT_ERROR",
            Self::Canceled => "PROVER_CANCELED",
            Self::PathNotSet => "PROVER_PATH_NOT_SET",
            Self::PathAlreadySet => "PROVER_PATH_ALREADY_SET",
            Self::InvalidHeader(_) => "PROVER_INVALID_HEADER",
            Self::Config(_) => "PROVER_CONFIG_ERROR",
        }
    }
}

impl From<prost::DecodeError> for ProverError {
    fn from(e: prost::DecodeError) -> Self {
        Self::Decode(e.to_string())
    }
}
