// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Atlas Test Utilities
//!
//! Utilities for testing the Atlas prover components without a live ledger.

pub mod assertions;
pub mod fixtures;
pub mod ledger;

pub use ledger::{MockLedger, MockLogCursor};
