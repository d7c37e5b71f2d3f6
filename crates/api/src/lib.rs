// Path: crates/api/src/lib.rs

//! # Atlas API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
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
//! # Atlas API
//!
//! The stable contracts around the prover: the ledger RPC it consumes, the
//! relayer-framework capability set it exposes, and the call context that
//! carries cancellation and deadlines through every blocking operation.

/// Cancellation and deadline propagation for ledger calls.
pub mod context;
/// Re-exports the error taxonomy from the central `atlas-types` crate.
pub mod error;
/// The chain-query and proof-query capability sets exposed to the relayer framework.
pub mod framework;
/// The ledger JSON-RPC boundary: the `LedgerClient` trait and its wire types.
pub mod ledger;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::context::{CallContext, CancelHandle};
    pub use crate::error::{ErrorCode, ProverError};
    pub use crate::framework::{ChainQuery, ProofQuery};
    pub use crate::ledger::{BlockTag, LedgerClient, LogCursor, LogFilter, RawLog};
}
