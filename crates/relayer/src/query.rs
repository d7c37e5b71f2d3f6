// Path: crates/relayer/src/query.rs

//! Height-pinned reads of the IBC host contract.
//!
//! Every read is an `eth_call` to one of the host's getters executed against a
//! concrete block number. Results come back as [`HeightPinned`] so callers can
//! tell "absent at this height" apart from transport and decode failures.

use crate::contracts::{
    getChannelCall, getClientStateCall, getConnectionCall, getConsensusStateCall,
    getPacketAcknowledgementCommitmentCall, getPacketCommitmentCall, hasPacketReceiptCall,
    ChannelData, ConnectionEndData, HeightData,
};
use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;
use atlas_api::context::CallContext;
use atlas_api::ledger::{BlockTag, LedgerClient};
use atlas_types::error::ProverError;
use atlas_types::ibc::{HeightPinned, QueryHeight};
use ibc_proto::google::protobuf::Any;
use ibc_proto::ibc::core::channel::v1::{
    Channel, Counterparty as ChannelCounterparty, Order, State as ChannelState,
};
use ibc_proto::ibc::core::client::v1::Height;
use ibc_proto::ibc::core::commitment::v1::MerklePrefix;
use ibc_proto::ibc::core::connection::v1::{
    ConnectionEnd, Counterparty as ConnectionCounterparty, State as ConnectionState, Version,
};
use prost::Message;
use std::sync::Arc;

/// The connection reported before the host has created one.
pub fn uninitialized_connection() -> ConnectionEnd {
    ConnectionEnd {
        client_id: "client".to_string(),
        versions: Vec::new(),
        state: ConnectionState::UninitializedUnspecified as i32,
        counterparty: Some(ConnectionCounterparty {
            client_id: "client".to_string(),
            connection_id: "connection".to_string(),
            prefix: Some(MerklePrefix {
                key_prefix: Vec::new(),
            }),
        }),
        delay_period: 0,
    }
}

/// The channel reported before the host has created one.
pub fn uninitialized_channel() -> Channel {
    Channel {
        state: ChannelState::UninitializedUnspecified as i32,
        ordering: Order::Unordered as i32,
        counterparty: Some(ChannelCounterparty {
            port_id: "port".to_string(),
            channel_id: "channel".to_string(),
        }),
        connection_hops: Vec::new(),
        version: "version".to_string(),
        ..Default::default()
    }
}

fn connection_end(c: ConnectionEndData) -> ConnectionEnd {
    ConnectionEnd {
        client_id: c.client_id,
        versions: c
            .versions
            .into_iter()
            .map(|v| Version {
                identifier: v.identifier,
                features: v.features,
            })
            .collect(),
        state: i32::from(c.state),
        counterparty: Some(ConnectionCounterparty {
            client_id: c.counterparty.client_id,
            connection_id: c.counterparty.connection_id,
            prefix: Some(MerklePrefix {
                key_prefix: c.counterparty.prefix.key_prefix.to_vec(),
            }),
        }),
        delay_period: c.delay_period,
    }
}

fn channel_end(c: ChannelData) -> Channel {
    Channel {
        state: i32::from(c.state),
        ordering: i32::from(c.ordering),
        counterparty: Some(ChannelCounterparty {
            port_id: c.counterparty.port_id,
            channel_id: c.counterparty.channel_id,
        }),
        connection_hops: c.connection_hops,
        version: c.version,
        ..Default::default()
    }
}

fn decode_return<C: SolCall>(ret: &[u8]) -> Result<C::Return, ProverError> {
    C::abi_decode_returns(ret, true)
        .map_err(|e| ProverError::Decode(format!("{} returned malformed data: {e}", C::SIGNATURE)))
}

fn decode_any(entity: &str, bytes: &[u8]) -> Result<Any, ProverError> {
    Any::decode(bytes).map_err(|e| ProverError::Decode(format!("{entity} is not an Any: {e}")))
}

/// Reads the IBC host contract at explicit heights.
#[derive(Clone)]
pub struct StateQuery {
    ledger: Arc<dyn LedgerClient>,
    host: Address,
}

impl StateQuery {
    /// Reads the host contract at `host` through `ledger`.
    pub fn new(ledger: Arc<dyn LedgerClient>, host: Address) -> Self {
        Self { ledger, host }
    }

    /// The host contract address.
    pub fn host(&self) -> Address {
        self.host
    }

    /// Pins `height` to a concrete block number, asking the ledger for `Latest`.
    pub async fn resolve(&self, ctx: &CallContext, height: QueryHeight) -> Result<u64, ProverError> {
        match height {
            QueryHeight::At(h) => Ok(h),
            QueryHeight::Latest => self.ledger.block_number(ctx).await,
        }
    }

    async fn eth_call(
        &self,
        ctx: &CallContext,
        data: Vec<u8>,
        height: u64,
    ) -> Result<Bytes, ProverError> {
        self.ledger
            .call(ctx, self.host, Bytes::from(data), BlockTag::Number(height))
            .await
    }

    fn pinned<T>(entity: &str, found: bool, value: T, height: u64) -> HeightPinned<T> {
        tracing::debug!(target: "prover", entity, height, found, "host read");
        if found {
            HeightPinned::found(value, height)
        } else {
            HeightPinned::absent(height)
        }
    }

    /// The `Any`-encoded client state of `client_id`.
    pub async fn client_state(
        &self,
        ctx: &CallContext,
        client_id: &str,
        height: u64,
    ) -> Result<HeightPinned<Any>, ProverError> {
        let call = getClientStateCall {
            clientId: client_id.to_string(),
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getClientStateCall>(&ret)?;
        if !ret.found {
            return Ok(Self::pinned("client state", false, Any::default(), height));
        }
        let any = decode_any("client state", &ret.value)?;
        Ok(Self::pinned("client state", true, any, height))
    }

    /// The `Any`-encoded consensus state `client_id` stores for `counterparty`.
    pub async fn consensus_state(
        &self,
        ctx: &CallContext,
        client_id: &str,
        counterparty: Height,
        height: u64,
    ) -> Result<HeightPinned<Any>, ProverError> {
        let call = getConsensusStateCall {
            clientId: client_id.to_string(),
            height: HeightData {
                revision_number: counterparty.revision_number,
                revision_height: counterparty.revision_height,
            },
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getConsensusStateCall>(&ret)?;
        if !ret.found {
            return Ok(Self::pinned("consensus state", false, Any::default(), height));
        }
        let any = decode_any("consensus state", &ret.value)?;
        Ok(Self::pinned("consensus state", true, any, height))
    }

    /// The connection end stored under `connection_id`.
    pub async fn connection(
        &self,
        ctx: &CallContext,
        connection_id: &str,
        height: u64,
    ) -> Result<HeightPinned<ConnectionEnd>, ProverError> {
        let call = getConnectionCall {
            connectionId: connection_id.to_string(),
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getConnectionCall>(&ret)?;
        Ok(Self::pinned("connection", ret.found, connection_end(ret.value), height))
    }

    /// The channel end stored under `(port_id, channel_id)`.
    pub async fn channel(
        &self,
        ctx: &CallContext,
        port_id: &str,
        channel_id: &str,
        height: u64,
    ) -> Result<HeightPinned<Channel>, ProverError> {
        let call = getChannelCall {
            portId: port_id.to_string(),
            channelId: channel_id.to_string(),
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getChannelCall>(&ret)?;
        Ok(Self::pinned("channel", ret.found, channel_end(ret.value), height))
    }

    /// The commitment of packet `sequence`.
    pub async fn packet_commitment(
        &self,
        ctx: &CallContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        height: u64,
    ) -> Result<HeightPinned<B256>, ProverError> {
        let call = getPacketCommitmentCall {
            portId: port_id.to_string(),
            channelId: channel_id.to_string(),
            sequence,
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getPacketCommitmentCall>(&ret)?;
        Ok(Self::pinned("packet commitment", ret.found, ret.value, height))
    }

    /// The acknowledgement commitment of packet `sequence`.
    pub async fn packet_ack_commitment(
        &self,
        ctx: &CallContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        height: u64,
    ) -> Result<HeightPinned<B256>, ProverError> {
        let call = getPacketAcknowledgementCommitmentCall {
            portId: port_id.to_string(),
            channelId: channel_id.to_string(),
            sequence,
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        let ret = decode_return::<getPacketAcknowledgementCommitmentCall>(&ret)?;
        Ok(Self::pinned(
            "packet acknowledgement commitment",
            ret.found,
            ret.value,
            height,
        ))
    }

    /// Whether the host has recorded a receipt for packet `sequence`.
    pub async fn has_packet_receipt(
        &self,
        ctx: &CallContext,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        height: u64,
    ) -> Result<bool, ProverError> {
        let call = hasPacketReceiptCall {
            portId: port_id.to_string(),
            channelId: channel_id.to_string(),
            sequence,
        };
        let ret = self.eth_call(ctx, call.abi_encode(), height).await?;
        Ok(decode_return::<hasPacketReceiptCall>(&ret)?.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ChannelCounterpartyData, CounterpartyData, MerklePrefixData, VersionData};
    use alloy_sol_types::SolValue;
    use atlas_test_utils::fixtures::HOST;
    use atlas_test_utils::MockLedger;

    fn facade(ledger: Arc<MockLedger>) -> StateQuery {
        StateQuery::new(ledger, HOST)
    }

    #[tokio::test]
    async fn latest_resolves_through_block_number() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_head(1234);
        let q = facade(ledger.clone());
        let ctx = CallContext::background();
        assert_eq!(q.resolve(&ctx, QueryHeight::Latest).await.unwrap(), 1234);
        assert_eq!(q.resolve(&ctx, QueryHeight::At(7)).await.unwrap(), 7);
        assert_eq!(ledger.calls_to("eth_blockNumber"), 1);
    }

    #[tokio::test]
    async fn client_state_is_decoded_as_any() {
        let ledger = Arc::new(MockLedger::new());
        let any = Any {
            type_url: "/ibc.lightclients.map.v1.ClientState".into(),
            value: vec![1, 2, 3],
        };
        let call = getClientStateCall {
            clientId: "map-client-0".into(),
        };
        ledger.set_call(
            HOST,
            call.abi_encode(),
            10,
            (Bytes::from(any.encode_to_vec()), true).abi_encode_params(),
        );
        let q = facade(ledger);
        let ctx = CallContext::background();

        let got = q.client_state(&ctx, "map-client-0", 12).await.unwrap();
        assert_eq!(got.height(), 12);
        assert_eq!(got.into_value(), Some(any));
    }

    #[tokio::test]
    async fn absent_client_state_carries_no_value() {
        let ledger = Arc::new(MockLedger::new());
        let call = getClientStateCall {
            clientId: "map-client-0".into(),
        };
        ledger.set_call(HOST, call.abi_encode(), 0, (Bytes::new(), false).abi_encode_params());
        let got = facade(ledger)
            .client_state(&CallContext::background(), "map-client-0", 5)
            .await
            .unwrap();
        assert!(!got.is_found());
        assert_eq!(got.height(), 5);
    }

    #[tokio::test]
    async fn garbage_client_state_is_a_decode_error() {
        let ledger = Arc::new(MockLedger::new());
        let call = getClientStateCall {
            clientId: "map-client-0".into(),
        };
        ledger.set_call(
            HOST,
            call.abi_encode(),
            0,
            (Bytes::from(vec![0xff, 0xff, 0xff]), true).abi_encode_params(),
        );
        let res = facade(ledger)
            .client_state(&CallContext::background(), "map-client-0", 5)
            .await;
        assert!(matches!(res, Err(ProverError::Decode(_))));
    }

    #[tokio::test]
    async fn connection_fields_map_onto_proto() {
        let ledger = Arc::new(MockLedger::new());
        let data = ConnectionEndData {
            client_id: "map-client-0".into(),
            versions: vec![VersionData {
                identifier: "1".into(),
                features: vec!["ORDER_UNORDERED".into()],
            }],
            state: 3,
            counterparty: CounterpartyData {
                client_id: "07-tendermint-0".into(),
                connection_id: "connection-4".into(),
                prefix: MerklePrefixData {
                    key_prefix: Bytes::from_static(b"ibc"),
                },
            },
            delay_period: 0,
        };
        let call = getConnectionCall {
            connectionId: "connection-0".into(),
        };
        ledger.set_call(HOST, call.abi_encode(), 0, (data, true).abi_encode_params());
        let conn = facade(ledger)
            .connection(&CallContext::background(), "connection-0", 9)
            .await
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(conn.state, ConnectionState::Open as i32);
        assert_eq!(conn.versions[0].identifier, "1");
        let cp = conn.counterparty.unwrap();
        assert_eq!(cp.connection_id, "connection-4");
        assert_eq!(cp.prefix.unwrap().key_prefix, b"ibc".to_vec());
    }

    #[tokio::test]
    async fn reads_are_pinned_to_the_requested_block() {
        let ledger = Arc::new(MockLedger::new());
        let call = getChannelCall {
            portId: "transfer".into(),
            channelId: "channel-0".into(),
        };
        let absent = ChannelData {
            state: 0,
            ordering: 0,
            counterparty: ChannelCounterpartyData {
                port_id: String::new(),
                channel_id: String::new(),
            },
            connection_hops: vec![],
            version: String::new(),
        };
        let open = ChannelData {
            state: 3,
            ordering: 1,
            counterparty: ChannelCounterpartyData {
                port_id: "transfer".into(),
                channel_id: "channel-9".into(),
            },
            connection_hops: vec!["connection-0".into()],
            version: "ics20-1".into(),
        };
        ledger.set_call(HOST, call.abi_encode(), 0, (absent, false).abi_encode_params());
        ledger.set_call(HOST, call.abi_encode(), 100, (open, true).abi_encode_params());
        let q = facade(ledger);
        let ctx = CallContext::background();

        assert!(!q.channel(&ctx, "transfer", "channel-0", 99).await.unwrap().is_found());
        let ch = q.channel(&ctx, "transfer", "channel-0", 100).await.unwrap();
        assert_eq!(ch.value().map(|c| c.version.as_str()), Some("ics20-1"));
    }

    #[test]
    fn placeholders_are_uninitialized() {
        let conn = uninitialized_connection();
        assert_eq!(conn.state, 0);
        assert_eq!(conn.client_id, "client");
        assert!(conn.versions.is_empty());
        let ch = uninitialized_channel();
        assert_eq!(ch.state, 0);
        assert_eq!(ch.ordering, Order::Unordered as i32);
        assert_eq!(ch.version, "version");
        assert_eq!(ch.counterparty.unwrap().port_id, "port");
    }
}
