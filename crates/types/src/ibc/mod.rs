// Path: crates/types/src/ibc/mod.rs
//! Core data structures for proving IBC state held by a contract-based host.

use crate::error::ProverError;
use alloy_primitives::B256;
use ibc_core_host_types::identifiers::{ChannelId, ClientId, ConnectionId, PortId};
use ibc_proto::ibc::core::channel::v1::Packet as RawPacket;
use ibc_proto::ibc::core::client::v1::Height as RawHeight;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parses an ICS-24 identifier, additionally rejecting upper-case characters.
///
/// The host contract hashes identifiers byte-for-byte, so `Channel-0` and
/// `channel-0` would commit to different slots; only the canonical lower-case
/// form is accepted.
pub fn parse_identifier<T>(kind: &'static str, id: &str) -> Result<T, ProverError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if id.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ProverError::InvalidIdentifier {
            kind,
            id: id.to_string(),
            reason: "identifier must be lower-case".into(),
        });
    }
    id.parse::<T>()
        .map_err(|e| ProverError::InvalidIdentifier {
            kind,
            id: id.to_string(),
            reason: e.to_string(),
        })
}

/// The identifiers for one side of a relay path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEnd {
    /// The light client on this chain tracking the counterparty.
    pub client_id: String,
    /// The connection built on `client_id`.
    pub connection_id: String,
    /// The port bound by the application module.
    pub port_id: String,
    /// The channel on `port_id`.
    pub channel_id: String,
}

impl PathEnd {
    /// Creates a new, unvalidated path end.
    pub fn new(
        client_id: impl Into<String>,
        connection_id: impl Into<String>,
        port_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            connection_id: connection_id.into(),
            port_id: port_id.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Checks every identifier against ICS-24 and the canonical-casing rule.
    pub fn validate(&self) -> Result<(), ProverError> {
        self.client()?;
        self.connection()?;
        self.port()?;
        self.channel()?;
        Ok(())
    }

    /// The typed client id.
    pub fn client(&self) -> Result<ClientId, ProverError> {
        parse_identifier("client", &self.client_id)
    }

    /// The typed connection id.
    pub fn connection(&self) -> Result<ConnectionId, ProverError> {
        parse_identifier("connection", &self.connection_id)
    }

    /// The typed port id.
    pub fn port(&self) -> Result<PortId, ProverError> {
        parse_identifier("port", &self.port_id)
    }

    /// The typed channel id.
    pub fn channel(&self) -> Result<ChannelId, ProverError> {
        parse_identifier("channel", &self.channel_id)
    }
}

/// The block a height-pinned read is executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryHeight {
    /// The ledger's current head, resolved to a concrete number before use.
    #[default]
    Latest,
    /// A specific historical block.
    At(u64),
}

impl From<u64> for QueryHeight {
    /// Height zero is the framework's sentinel for "latest".
    fn from(height: u64) -> Self {
        if height == 0 {
            Self::Latest
        } else {
            Self::At(height)
        }
    }
}

impl fmt::Display for QueryHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::At(h) => write!(f, "{h}"),
        }
    }
}

/// The result of a read pinned to one block height.
///
/// `found` is derived from the presence of a value, so an absent result can
/// never carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightPinned<T> {
    value: Option<T>,
    height: u64,
}

impl<T> HeightPinned<T> {
    /// A value that exists at `height`.
    pub fn found(value: T, height: u64) -> Self {
        Self {
            value: Some(value),
            height,
        }
    }

    /// Nothing stored at `height`.
    pub fn absent(height: u64) -> Self {
        Self {
            value: None,
            height,
        }
    }

    /// Whether the entity exists at this height.
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }

    /// The concrete height the read was executed at.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Borrows the value, if present.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Consumes the result, returning the value if present.
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Maps the value while preserving the height.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> HeightPinned<U> {
        HeightPinned {
            value: self.value.map(f),
            height: self.height,
        }
    }

    /// Converts absence into `NotFoundAtHeight` for `entity`.
    pub fn require(self, entity: impl Into<String>) -> Result<T, ProverError> {
        let height = self.height;
        self.value.ok_or_else(|| ProverError::NotFoundAtHeight {
            entity: entity.into(),
            height,
        })
    }
}

/// A storage inclusion proof bound to exactly one slot and one height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    slot: B256,
    height: u64,
    bytes: Vec<u8>,
}

impl Proof {
    /// Binds encoded proof bytes to the slot and height they were produced for.
    pub fn new(slot: B256, height: u64, bytes: Vec<u8>) -> Self {
        Self {
            slot,
            height,
            bytes,
        }
    }

    /// The storage slot the proof covers.
    pub fn slot(&self) -> B256 {
        self.slot
    }

    /// The block height whose state root anchors the proof.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The encoded proof.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the proof, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether this proof may be presented for `slot` at `height`.
    pub fn is_for(&self, slot: B256, height: u64) -> bool {
        self.slot == slot && self.height == height
    }
}

/// A packet timeout expressed as a counterparty height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeoutHeight {
    /// The counterparty revision number.
    pub revision_number: u64,
    /// The counterparty block height within the revision.
    pub revision_height: u64,
}

impl From<TimeoutHeight> for RawHeight {
    fn from(h: TimeoutHeight) -> Self {
        RawHeight {
            revision_number: h.revision_number,
            revision_height: h.revision_height,
        }
    }
}

/// A packet reconstructed from a `SendPacket` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// The packet sequence on the source channel.
    pub sequence: u64,
    /// The sending port.
    pub source_port: String,
    /// The sending channel.
    pub source_channel: String,
    /// The receiving port.
    pub destination_port: String,
    /// The receiving channel.
    pub destination_channel: String,
    /// The opaque application payload.
    pub data: Vec<u8>,
    /// The timeout height on the destination chain.
    pub timeout_height: TimeoutHeight,
    /// The timeout timestamp on the destination chain, in nanoseconds.
    pub timeout_timestamp: u64,
}

impl PacketRecord {
    /// Whether this record is the packet `(port, channel, sequence)`.
    pub fn matches(&self, port: &str, channel: &str, sequence: u64) -> bool {
        self.sequence == sequence && self.is_on(port, channel)
    }

    /// Whether the packet was sent on `(port, channel)`.
    pub fn is_on(&self, port: &str, channel: &str) -> bool {
        self.source_port == port && self.source_channel == channel
    }
}

impl From<PacketRecord> for RawPacket {
    fn from(p: PacketRecord) -> Self {
        RawPacket {
            sequence: p.sequence,
            source_port: p.source_port,
            source_channel: p.source_channel,
            destination_port: p.destination_port,
            destination_channel: p.destination_channel,
            data: p.data,
            timeout_height: Some(p.timeout_height.into()),
            timeout_timestamp: p.timeout_timestamp,
        }
    }
}

/// An acknowledgement reconstructed from a `WriteAcknowledgement` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgementRecord {
    /// The receiving port that wrote the acknowledgement.
    pub destination_port: String,
    /// The receiving channel.
    pub destination_channel: String,
    /// The acknowledged packet sequence.
    pub sequence: u64,
    /// The raw acknowledgement bytes.
    pub acknowledgement: Vec<u8>,
}

impl AcknowledgementRecord {
    /// Whether this record acknowledges `(port, channel, sequence)`.
    pub fn matches(&self, port: &str, channel: &str, sequence: u64) -> bool {
        self.sequence == sequence && self.is_on(port, channel)
    }

    /// Whether the acknowledgement was written on `(port, channel)`.
    pub fn is_on(&self, port: &str, channel: &str) -> bool {
        self.destination_port == port && self.destination_channel == channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathEnd {
        PathEnd::new("map-client-0", "connection-0", "transfer", "channel-0")
    }

    #[test]
    fn valid_path_end_passes() {
        assert!(path().validate().is_ok());
    }

    #[test]
    fn empty_and_uppercase_identifiers_are_rejected() {
        let mut p = path();
        p.client_id.clear();
        assert!(matches!(
            p.validate(),
            Err(ProverError::InvalidIdentifier { kind: "client", .. })
        ));

        let mut p = path();
        p.channel_id = "Channel-0".into();
        match p.validate() {
            Err(ProverError::InvalidIdentifier { kind, reason, .. }) => {
                assert_eq!(kind, "channel");
                assert!(reason.contains("lower-case"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut p = path();
        p.port_id = "trans fer".into();
        assert!(matches!(
            p.validate(),
            Err(ProverError::InvalidIdentifier { kind: "port", .. })
        ));
    }

    #[test]
    fn zero_height_means_latest() {
        assert_eq!(QueryHeight::from(0), QueryHeight::Latest);
        assert_eq!(QueryHeight::from(42), QueryHeight::At(42));
        assert_eq!(QueryHeight::default().to_string(), "latest");
    }

    #[test]
    fn absent_result_has_no_value() {
        let r: HeightPinned<Vec<u8>> = HeightPinned::absent(10);
        assert!(!r.is_found());
        assert_eq!(r.value(), None);
        match r.require("client state") {
            Err(ProverError::NotFoundAtHeight { entity, height }) => {
                assert_eq!(entity, "client state");
                assert_eq!(height, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn proof_is_bound_to_slot_and_height() {
        let slot = B256::repeat_byte(0xab);
        let proof = Proof::new(slot, 99, vec![0xc0]);
        assert!(proof.is_for(slot, 99));
        assert!(!proof.is_for(slot, 100));
        assert!(!proof.is_for(B256::ZERO, 99));
    }

    #[test]
    fn packet_record_converts_to_raw_packet() {
        let rec = PacketRecord {
            sequence: 3,
            source_port: "transfer".into(),
            source_channel: "channel-0".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-7".into(),
            data: b"payload".to_vec(),
            timeout_height: TimeoutHeight {
                revision_number: 1,
                revision_height: 500,
            },
            timeout_timestamp: 0,
        };
        assert!(rec.matches("transfer", "channel-0", 3));
        assert!(!rec.matches("transfer", "channel-7", 3));
        let raw: RawPacket = rec.into();
        assert_eq!(raw.sequence, 3);
        assert_eq!(raw.timeout_height.map(|h| h.revision_height), Some(500));
    }
}
