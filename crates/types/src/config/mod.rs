// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the counterparty chain and the prover.
use crate::error::ProverError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::time::Duration;

/// Connection settings for one counterparty EVM ledger.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// The chain id reported to the relayer framework.
    pub chain_id: String,
    /// The JSON-RPC endpoint of the ledger.
    pub rpc_addr: String,
    /// The address of the IBC host contract that owns the commitment storage.
    pub ibc_host_address: Address,
    /// The address of the IBC handler contract that emits packet events.
    pub ibc_handler_address: Address,
    /// An optional per-request timeout applied by the HTTP client, in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ChainConfig {
    /// Returns the per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Checks the fields that `serde` cannot.
    pub fn validate(&self) -> Result<(), ProverError> {
        if self.chain_id.trim().is_empty() {
            return Err(ProverError::Config("chain_id must not be empty".into()));
        }
        if !(self.rpc_addr.starts_with("http://") || self.rpc_addr.starts_with("https://")) {
            return Err(ProverError::Config(format!(
                "rpc_addr must be an http(s) URL, got '{}'",
                self.rpc_addr
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ProverError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the light client this prover produces material for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProverConfig {
    /// Number of blocks per epoch on the counterparty chain.
    #[serde(default = "default_epoch_size")]
    pub epoch_size: NonZeroU64,
    /// The Solidity storage index of the host's `commitments` mapping.
    #[serde(default)]
    pub commitment_slot: u64,
    /// The revision number stamped on every proof height.
    #[serde(default)]
    pub revision_number: u64,
    /// The identifier written into created client states.
    #[serde(default = "default_client_identifier")]
    pub client_identifier: String,
    /// The identifier written into synthesized headers.
    #[serde(default = "default_header_identifier")]
    pub header_identifier: String,
}

fn default_epoch_size() -> NonZeroU64 {
    NonZeroU64::new(1000).unwrap_or(NonZeroU64::MIN)
}
fn default_client_identifier() -> String {
    "map-client-identifier".to_string()
}
fn default_header_identifier() -> String {
    "identifier".to_string()
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            epoch_size: default_epoch_size(),
            commitment_slot: 0,
            revision_number: 0,
            client_identifier: default_client_identifier(),
            header_identifier: default_header_identifier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prover_config_defaults_from_empty_toml() {
        let cfg: ProverConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ProverConfig::default());
        assert_eq!(cfg.epoch_size.get(), 1000);
        assert_eq!(cfg.client_identifier, "map-client-identifier");
        assert_eq!(cfg.header_identifier, "identifier");
    }

    #[test]
    fn prover_config_rejects_zero_epoch_size() {
        let res: Result<ProverConfig, _> = toml::from_str("epoch_size = 0");
        assert!(res.is_err());
    }

    #[test]
    fn chain_config_parses_addresses() {
        let cfg: ChainConfig = toml::from_str(
            r#"
            chain_id = "map-devnet"
            rpc_addr = "http://127.0.0.1:7445"
            ibc_host_address = "0x1000000000000000000000000000000000000001"
            ibc_handler_address = "0x2000000000000000000000000000000000000002"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(
            cfg.ibc_host_address,
            "0x1000000000000000000000000000000000000001"
                .parse::<Address>()
                .unwrap()
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn chain_config_validation() {
        let mut cfg = ChainConfig {
            chain_id: "map-devnet".into(),
            rpc_addr: "ws://127.0.0.1:7445".into(),
            ibc_host_address: Address::ZERO,
            ibc_handler_address: Address::ZERO,
            request_timeout_secs: None,
        };
        assert!(matches!(cfg.validate(), Err(ProverError::Config(_))));
        cfg.rpc_addr = "https://rpc.example".into();
        cfg.request_timeout_secs = Some(0);
        assert!(matches!(cfg.validate(), Err(ProverError::Config(_))));
        cfg.request_timeout_secs = None;
        assert!(cfg.validate().is_ok());
    }
}
