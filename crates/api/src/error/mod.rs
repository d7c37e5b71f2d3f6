// Path: crates/api/src/error/mod.rs
//! Re-exports all core error types from the central `atlas-types` crate.

pub use atlas_types::error::{ErrorCode, ProverError};
