// Path: crates/relayer/src/events/packets.rs

//! Rebuilds sent packets and written acknowledgements from handler logs.

use super::{EventKind, EventSchemas, LogScanner};
use crate::contracts::{PacketData, SendPacket, WriteAcknowledgement};
use atlas_api::context::CallContext;
use atlas_api::ledger::{BlockTag, RawLog};
use atlas_types::error::ProverError;
use atlas_types::ibc::{AcknowledgementRecord, PacketRecord, TimeoutHeight};
use ibc_core_channel_types::acknowledgement::Acknowledgement;
use ibc_core_channel_types::commitment::{compute_ack_commitment, compute_packet_commitment};
use ibc_core_channel_types::timeout::TimeoutHeight as IbcTimeoutHeight;
use ibc_core_client_types::Height;
use ibc_core_channel_types::timeout::TimeoutTimestamp;
use std::sync::Arc;

/// The ICS-04 packet commitment of `packet`.
///
/// A zero timeout height means "no timeout height"; a zero revision height
/// under a non-zero revision is not a valid height and fails with `Decode`.
pub fn packet_commitment(packet: &PacketRecord) -> Result<Vec<u8>, ProverError> {
    let timeout_height = match packet.timeout_height {
        TimeoutHeight {
            revision_number: 0,
            revision_height: 0,
        } => IbcTimeoutHeight::Never,
        TimeoutHeight {
            revision_number,
            revision_height,
        } => IbcTimeoutHeight::At(Height::new(revision_number, revision_height).map_err(|e| {
            ProverError::Decode(format!("packet {} timeout height: {e}", packet.sequence))
        })?),
    };
    let timeout_timestamp = TimeoutTimestamp::from_nanoseconds(packet.timeout_timestamp);
    Ok(compute_packet_commitment(&packet.data, &timeout_height, &timeout_timestamp).into_vec())
}

/// The ICS-04 acknowledgement commitment. Empty acknowledgements are rejected.
pub fn ack_commitment(acknowledgement: &[u8]) -> Result<Vec<u8>, ProverError> {
    let ack = Acknowledgement::try_from(acknowledgement.to_vec())
        .map_err(|e| ProverError::Decode(format!("acknowledgement: {e}")))?;
    Ok(compute_ack_commitment(&ack).into_vec())
}

fn packet_record(p: PacketData) -> PacketRecord {
    PacketRecord {
        sequence: p.sequence,
        source_port: p.source_port,
        source_channel: p.source_channel,
        destination_port: p.destination_port,
        destination_channel: p.destination_channel,
        data: p.data.to_vec(),
        timeout_height: TimeoutHeight {
            revision_number: p.timeout_height.revision_number,
            revision_height: p.timeout_height.revision_height,
        },
        timeout_timestamp: p.timeout_timestamp,
    }
}

fn ack_record(ev: WriteAcknowledgement) -> AcknowledgementRecord {
    AcknowledgementRecord {
        destination_port: ev.destinationPortId,
        destination_channel: ev.destinationChannel,
        sequence: ev.sequence,
        acknowledgement: ev.acknowledgement.to_vec(),
    }
}

/// Packet and acknowledgement views derived from the handler's event history.
///
/// Every log of the scanned topic is decoded; a single malformed log fails the
/// whole query rather than being skipped.
pub struct PacketReconstructor {
    scanner: Arc<LogScanner>,
    schemas: Arc<EventSchemas>,
}

impl PacketReconstructor {
    /// Reconstructs packets from the logs `scanner` returns, decoded with `schemas`.
    pub fn new(scanner: Arc<LogScanner>, schemas: Arc<EventSchemas>) -> Self {
        Self { scanner, schemas }
    }

    async fn logs(
        &self,
        ctx: &CallContext,
        kind: EventKind,
        up_to: BlockTag,
    ) -> Result<Vec<RawLog>, ProverError> {
        self.scanner
            .scan_schema(ctx, self.schemas.schema(kind), up_to)
            .await
    }

    fn decode_packet(&self, log: &RawLog) -> Result<PacketRecord, ProverError> {
        let ev: SendPacket = self.schemas.schema(EventKind::SendPacket).decode(log)?;
        Ok(packet_record(ev.packet))
    }

    fn decode_ack(&self, log: &RawLog) -> Result<AcknowledgementRecord, ProverError> {
        let ev: WriteAcknowledgement = self
            .schemas
            .schema(EventKind::WriteAcknowledgement)
            .decode(log)?;
        Ok(ack_record(ev))
    }

    /// Every packet sent on `(port, channel)` through `up_to`, in emission order.
    pub async fn list_packets(
        &self,
        ctx: &CallContext,
        port: &str,
        channel: &str,
        up_to: BlockTag,
    ) -> Result<Vec<PacketRecord>, ProverError> {
        let mut packets = Vec::new();
        for log in self.logs(ctx, EventKind::SendPacket, up_to).await? {
            let packet = self.decode_packet(&log)?;
            if packet.is_on(port, channel) {
                packets.push(packet);
            }
        }
        Ok(packets)
    }

    /// The first packet sent as `(port, channel, sequence)` through `up_to`.
    pub async fn find_packet(
        &self,
        ctx: &CallContext,
        port: &str,
        channel: &str,
        sequence: u64,
        up_to: BlockTag,
    ) -> Result<PacketRecord, ProverError> {
        for log in self.logs(ctx, EventKind::SendPacket, up_to).await? {
            let packet = self.decode_packet(&log)?;
            if packet.matches(port, channel, sequence) {
                return Ok(packet);
            }
        }
        Err(ProverError::PacketNotFound {
            port: port.to_string(),
            channel: channel.to_string(),
            sequence,
        })
    }

    /// Every acknowledgement written on `(port, channel)` through `up_to`.
    pub async fn list_acknowledgements(
        &self,
        ctx: &CallContext,
        port: &str,
        channel: &str,
        up_to: BlockTag,
    ) -> Result<Vec<AcknowledgementRecord>, ProverError> {
        let mut acks = Vec::new();
        for log in self.logs(ctx, EventKind::WriteAcknowledgement, up_to).await? {
            let ack = self.decode_ack(&log)?;
            if ack.is_on(port, channel) {
                acks.push(ack);
            }
        }
        Ok(acks)
    }

    /// The first acknowledgement written for `(port, channel, sequence)`.
    pub async fn find_acknowledgement(
        &self,
        ctx: &CallContext,
        port: &str,
        channel: &str,
        sequence: u64,
        up_to: BlockTag,
    ) -> Result<AcknowledgementRecord, ProverError> {
        for log in self.logs(ctx, EventKind::WriteAcknowledgement, up_to).await? {
            let ack = self.decode_ack(&log)?;
            if ack.matches(port, channel, sequence) {
                return Ok(ack);
            }
        }
        Err(ProverError::AcknowledgementNotFound {
            port: port.to_string(),
            channel: channel.to_string(),
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::HeightData;
    use alloy_sol_types::SolEvent;
    use atlas_test_utils::fixtures::HANDLER;
    use atlas_test_utils::{assert_err_code, MockLedger};

    fn send(ledger: &MockLedger, channel: &str, sequence: u64, block: u64) {
        let ev = SendPacket {
            packet: PacketData {
                sequence,
                source_port: "transfer".into(),
                source_channel: channel.into(),
                destination_port: "transfer".into(),
                destination_channel: "channel-7".into(),
                data: vec![sequence as u8; 4].into(),
                timeout_height: HeightData {
                    revision_number: 1,
                    revision_height: 500,
                },
                timeout_timestamp: 0,
            },
        };
        ledger.emit(HANDLER, vec![SendPacket::SIGNATURE_HASH], ev.encode_data(), block);
    }

    fn reconstructor(ledger: Arc<MockLedger>) -> PacketReconstructor {
        PacketReconstructor::new(
            Arc::new(LogScanner::new(ledger)),
            Arc::new(EventSchemas::new(HANDLER)),
        )
    }

    fn record(data: &[u8], revision_number: u64, revision_height: u64, timestamp: u64) -> PacketRecord {
        PacketRecord {
            sequence: 1,
            source_port: "transfer".into(),
            source_channel: "channel-0".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-7".into(),
            data: data.to_vec(),
            timeout_height: TimeoutHeight {
                revision_number,
                revision_height,
            },
            timeout_timestamp: timestamp,
        }
    }

    #[test]
    fn packet_commitment_matches_ics04_vector() {
        let expected: [u8; 32] = [
            0xa9, 0x28, 0xb5, 0x1f, 0x62, 0xbd, 0x54, 0x00, 0x91, 0xec, 0x45, 0x1f, 0x4e, 0xf3,
            0x45, 0x79, 0x4f, 0x05, 0x9e, 0x65, 0x91, 0x08, 0x16, 0x86, 0x61, 0x26, 0xdc, 0x36,
            0x4f, 0x84, 0xcc, 0x15,
        ];
        let got = packet_commitment(&record(b"packet data", 42, 24, 0x42)).unwrap();
        assert_eq!(got, expected.to_vec());
    }

    #[test]
    fn ack_commitment_matches_ics04_vector() {
        let expected: [u8; 32] = [
            0x05, 0x4e, 0xde, 0xc1, 0xd0, 0x21, 0x1f, 0x62, 0x4f, 0xed, 0x0c, 0xbc, 0xa9, 0xd4,
            0xf9, 0x40, 0x0b, 0x0e, 0x49, 0x1c, 0x43, 0x74, 0x2a, 0xf2, 0xc5, 0xb0, 0xab, 0xeb,
            0xf0, 0xc9, 0x90, 0xd8,
        ];
        assert_eq!(ack_commitment(&[0, 1, 2, 3]).unwrap(), expected.to_vec());
        assert_err_code!(ack_commitment(&[]), "PROVER_DECODE_ERROR");
    }

    #[test]
    fn zero_timeout_height_means_no_timeout() {
        let commitment = packet_commitment(&record(b"hello", 0, 0, 9)).unwrap();
        assert_eq!(commitment.len(), 32);
        assert_err_code!(
            packet_commitment(&record(b"hello", 3, 0, 9)),
            "PROVER_DECODE_ERROR"
        );
    }

    #[tokio::test]
    async fn finds_packet_on_its_channel_only() {
        let ledger = Arc::new(MockLedger::new());
        send(&ledger, "channel-1", 1, 3);
        send(&ledger, "channel-0", 1, 4);
        send(&ledger, "channel-0", 2, 5);
        ledger.set_head(10);
        let r = reconstructor(ledger);
        let ctx = CallContext::background();

        let p = r
            .find_packet(&ctx, "transfer", "channel-0", 1, BlockTag::Latest)
            .await
            .unwrap();
        assert_eq!(p.source_channel, "channel-0");
        assert_eq!(p.timeout_height.revision_height, 500);

        let all = r
            .list_packets(&ctx, "transfer", "channel-0", BlockTag::Latest)
            .await
            .unwrap();
        assert_eq!(all.iter().map(|p| p.sequence).collect::<Vec<_>>(), vec![1, 2]);

        // Sequence 2 was sent after block 4.
        assert_err_code!(
            r.find_packet(&ctx, "transfer", "channel-0", 2, BlockTag::Number(4))
                .await,
            "PROVER_PACKET_NOT_FOUND"
        );
    }

    #[tokio::test]
    async fn malformed_log_fails_the_query() {
        let ledger = Arc::new(MockLedger::new());
        send(&ledger, "channel-0", 1, 1);
        ledger.emit(HANDLER, vec![SendPacket::SIGNATURE_HASH], vec![0u8; 7], 2);
        ledger.set_head(5);
        let r = reconstructor(ledger);
        let res = r
            .list_packets(&CallContext::background(), "transfer", "channel-0", BlockTag::Latest)
            .await;
        assert!(matches!(res, Err(ProverError::Decode(_))));
    }

    #[tokio::test]
    async fn acknowledgements_are_matched_by_destination() {
        let ledger = Arc::new(MockLedger::new());
        let ev = WriteAcknowledgement {
            destinationPortId: "transfer".into(),
            destinationChannel: "channel-0".into(),
            sequence: 4,
            acknowledgement: vec![0x01].into(),
        };
        ledger.emit(
            HANDLER,
            vec![WriteAcknowledgement::SIGNATURE_HASH],
            ev.encode_data(),
            2,
        );
        ledger.set_head(3);
        let r = reconstructor(ledger);
        let ctx = CallContext::background();
        let ack = r
            .find_acknowledgement(&ctx, "transfer", "channel-0", 4, BlockTag::Latest)
            .await
            .unwrap();
        assert_eq!(ack.acknowledgement, vec![0x01]);
        assert_err_code!(
            r.find_acknowledgement(&ctx, "transfer", "channel-1", 4, BlockTag::Latest)
                .await,
            "PROVER_ACK_NOT_FOUND"
        );
    }
}
