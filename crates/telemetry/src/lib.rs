// Path: crates/telemetry/src/lib.rs
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

//! # Atlas Telemetry
//!
//! Structured logging for processes that embed the prover. The prover crates
//! only emit `tracing` events; installing a subscriber is left to the binary,
//! which calls [`init::init_tracing`] once at startup.

/// The initialization routine for global structured logging.
pub mod init;

pub use init::{init_test_tracing, init_tracing, init_tracing_with};
