// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Atlas Types
//!
//! This crate is the foundational library for the Atlas IBC prover, containing
//! the IBC record types, configuration objects and the error taxonomy shared
//! by every other crate in the workspace.
//!
//! ## Architectural Role
//!
//! As the base crate, `atlas-types` has minimal dependencies. It defines the
//! canonical shape of a `PathEnd`, a `Proof`, a `PacketRecord` and the
//! `ProverError` enum so that the ledger boundary (`atlas-api`) and the
//! prover (`atlas-relayer`) agree on them without depending on each other.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::ProverError> = std::result::Result<T, E>;

/// Shared configuration structures (`ChainConfig`, `ProverConfig`).
pub mod config;
/// The error taxonomy used across the prover.
pub mod error;
/// IBC data structures: path ends, height-pinned results, proofs and packet records.
pub mod ibc;
