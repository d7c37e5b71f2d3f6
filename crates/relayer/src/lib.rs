// Path: crates/relayer/src/lib.rs
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Atlas Relayer
//!
//! The state-proving core of a relayer for a contract-hosted IBC
//! counterparty: height-pinned reads of the IBC host contract, storage proofs
//! for its commitments, packet views rebuilt from handler logs, and the
//! light-client headers and messages that let a destination chain verify all
//! of it.

/// The counterparty chain bound to one path end; answers unproven queries.
pub mod chain;
/// ABI schema of the IBC host and handler contracts.
pub mod contracts;
/// Block-number to epoch arithmetic.
pub mod epoch;
/// Log scanning and event decoding.
pub mod events;
/// Light-client header synthesis.
pub mod header;
/// `ibc.lightclients.map.v1` protobuf messages.
pub mod lightclient;
/// `MsgCreateClient` / `MsgUpdateClient` builders.
pub mod msgs;
/// Storage proof assembly.
pub mod proof;
/// Proven queries and client message construction.
pub mod prover;
/// Height-pinned host contract reads.
pub mod query;
/// The Ethereum JSON-RPC ledger client.
pub mod rpc;
/// Commitment path and storage slot derivation.
pub mod slots;

pub use chain::Chain;
pub use prover::Prover;
pub use rpc::HttpLedgerClient;
