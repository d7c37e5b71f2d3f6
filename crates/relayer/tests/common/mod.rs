// Path: crates/relayer/tests/common/mod.rs
#![allow(dead_code)]

//! A mock counterparty with the IBC host contract's getters wired up.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use atlas_relayer::contracts::{
    getChannelCall, getClientStateCall, getConnectionCall, getPacketCommitmentCall,
    hasPacketReceiptCall, ChannelCounterpartyData, ChannelData, ConnectionEndData,
    CounterpartyData, HeightData, MerklePrefixData, PacketData, SendPacket,
    WriteAcknowledgement,
};
use atlas_relayer::slots::LogicalKey;
use atlas_relayer::{Chain, Prover};
use atlas_test_utils::fixtures::{TestFixtures, HANDLER, HOST};
use atlas_test_utils::MockLedger;
use atlas_types::config::ProverConfig;
use ibc_proto::google::protobuf::Any;
use prost::Message;
use std::sync::Arc;

pub const PORT: &str = "transfer";
pub const CHANNEL: &str = "channel-0";
pub const CLIENT: &str = "map-client-0";
pub const CONNECTION: &str = "connection-0";

pub struct Harness {
    pub ledger: Arc<MockLedger>,
    pub chain: Arc<Chain>,
    pub prover: Prover,
}

impl Harness {
    /// A prover over an empty mock ledger with the fixture path end set.
    pub fn new() -> Self {
        Self::with_revision(0)
    }

    /// Like [`Harness::new`], with chain and prover on `revision_number`.
    pub fn with_revision(revision_number: u64) -> Self {
        atlas_telemetry::init_test_tracing();
        let ledger = Arc::new(MockLedger::new());
        let chain = Chain::new(TestFixtures::chain_config(), ledger.clone())
            .with_revision_number(revision_number);
        chain.set_path(TestFixtures::path_end()).unwrap();
        let chain = Arc::new(chain);
        let config = ProverConfig {
            revision_number,
            ..TestFixtures::prover_config()
        };
        let prover = Prover::new(chain.clone(), config).unwrap();
        Self {
            ledger,
            chain,
            prover,
        }
    }

    pub fn client_state(&self, height: u64, state: Option<Any>) {
        let call = getClientStateCall {
            clientId: CLIENT.into(),
        };
        let ret = match state {
            Some(any) => (Bytes::from(any.encode_to_vec()), true),
            None => (Bytes::new(), false),
        };
        self.ledger
            .set_call(HOST, call.abi_encode(), height, ret.abi_encode_params());
    }

    pub fn connection(&self, height: u64, open: bool) {
        let call = getConnectionCall {
            connectionId: CONNECTION.into(),
        };
        let data = ConnectionEndData {
            client_id: if open { CLIENT.into() } else { String::new() },
            versions: vec![],
            state: if open { 3 } else { 0 },
            counterparty: CounterpartyData {
                client_id: String::new(),
                connection_id: String::new(),
                prefix: MerklePrefixData {
                    key_prefix: Bytes::new(),
                },
            },
            delay_period: 0,
        };
        self.ledger
            .set_call(HOST, call.abi_encode(), height, (data, open).abi_encode_params());
    }

    pub fn channel(&self, height: u64, open: bool) {
        let call = getChannelCall {
            portId: PORT.into(),
            channelId: CHANNEL.into(),
        };
        let data = ChannelData {
            state: if open { 3 } else { 0 },
            ordering: 1,
            counterparty: ChannelCounterpartyData {
                port_id: PORT.into(),
                channel_id: "channel-5".into(),
            },
            connection_hops: vec![CONNECTION.into()],
            version: "ics20-1".into(),
        };
        self.ledger
            .set_call(HOST, call.abi_encode(), height, (data, open).abi_encode_params());
    }

    pub fn receipt(&self, sequence: u64, height: u64, received: bool) {
        let call = hasPacketReceiptCall {
            portId: PORT.into(),
            channelId: CHANNEL.into(),
            sequence,
        };
        self.ledger
            .set_call(HOST, call.abi_encode(), height, (received,).abi_encode_params());
    }

    pub fn commitment(&self, sequence: u64, height: u64, value: Option<B256>) {
        let call = getPacketCommitmentCall {
            portId: PORT.into(),
            channelId: CHANNEL.into(),
            sequence,
        };
        let ret = (value.unwrap_or_default(), value.is_some());
        self.ledger
            .set_call(HOST, call.abi_encode(), height, ret.abi_encode_params());
    }

    pub fn send_packet(&self, channel: &str, sequence: u64, data: &[u8], block: u64) {
        let ev = SendPacket {
            packet: PacketData {
                sequence,
                source_port: PORT.into(),
                source_channel: channel.into(),
                destination_port: PORT.into(),
                destination_channel: "channel-5".into(),
                data: Bytes::from(data.to_vec()),
                timeout_height: HeightData {
                    revision_number: 0,
                    revision_height: 10_000,
                },
                timeout_timestamp: 0,
            },
        };
        self.ledger
            .emit(HANDLER, vec![SendPacket::SIGNATURE_HASH], ev.encode_data(), block);
    }

    pub fn write_ack(&self, sequence: u64, ack: &[u8], block: u64) {
        let ev = WriteAcknowledgement {
            destinationPortId: PORT.into(),
            destinationChannel: CHANNEL.into(),
            sequence,
            acknowledgement: Bytes::from(ack.to_vec()),
        };
        self.ledger.emit(
            HANDLER,
            vec![WriteAcknowledgement::SIGNATURE_HASH],
            ev.encode_data(),
            block,
        );
    }

    /// Registers trie nodes for `key` at `height` and returns them.
    pub fn proof_nodes(&self, key: &LogicalKey, height: u64) -> Vec<Bytes> {
        let nodes = vec![
            Bytes::from(vec![0xc3, 0x01, 0x02, 0x03]),
            Bytes::from(vec![0xc2, 0x80, 0x80]),
        ];
        self.ledger.set_proof(key.slot(0), height, nodes.clone());
        nodes
    }
}

pub fn client_state_any() -> Any {
    Any {
        type_url: "/ibc.lightclients.map.v1.ClientState".into(),
        value: vec![0x08, 0x01],
    }
}
