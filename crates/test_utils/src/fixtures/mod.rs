//! Canonical fixtures shared by the prover's tests

use alloy_primitives::{Address, Bytes, B256, B64, U256, U64};
use atlas_api::ledger::RawBlockHeader;
use atlas_types::config::{ChainConfig, ProverConfig};
use atlas_types::ibc::PathEnd;

/// The IBC host contract address used throughout the tests.
pub const HOST: Address = Address::new([0x11; 20]);
/// The IBC handler contract address used throughout the tests.
pub const HANDLER: Address = Address::new([0x22; 20]);

/// Predefined test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// A chain config pointing at the fixture contracts
    pub fn chain_config() -> ChainConfig {
        ChainConfig {
            chain_id: "map-devnet".to_string(),
            rpc_addr: "http://127.0.0.1:7445".to_string(),
            ibc_host_address: HOST,
            ibc_handler_address: HANDLER,
            request_timeout_secs: None,
        }
    }

    /// The default prover config (epoch size 1000)
    pub fn prover_config() -> ProverConfig {
        ProverConfig::default()
    }

    /// A valid path end on `transfer/channel-0`
    pub fn path_end() -> PathEnd {
        PathEnd::new("map-client-0", "connection-0", "transfer", "channel-0")
    }

    /// A raw header for block `number` with recognisable field values
    pub fn header(number: u64) -> RawBlockHeader {
        RawBlockHeader {
            parent_hash: B256::repeat_byte(0x01),
            state_root: B256::repeat_byte(0x02),
            transactions_root: B256::repeat_byte(0x03),
            receipts_root: B256::repeat_byte(0x04),
            logs_bloom: Bytes::from(vec![0u8; 256]),
            number: U64::from(number),
            gas_limit: U64::from(30_000_000u64),
            gas_used: U64::from(21_000u64),
            timestamp: U64::from(1_700_000_000u64 + number),
            extra_data: Bytes::from_static(b"atlas"),
            mix_hash: B256::repeat_byte(0x05),
            nonce: B64::repeat_byte(0x00),
            base_fee_per_gas: Some(U256::from(7u64)),
        }
    }
}
