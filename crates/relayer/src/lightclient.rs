// Path: crates/relayer/src/lightclient.rs

//! Wire messages of the counterparty's light client (`ibc.lightclients.map.v1`).

use atlas_types::error::ProverError;
use ibc_proto::google::protobuf::{Any, Timestamp};
use ibc_proto::ibc::core::client::v1::Height;
use prost::Message;

/// A protobuf message with a fixed `Any` type URL.
pub trait TypedMessage: Message + Default + Sized {
    /// The `google.protobuf.Any` type URL.
    const TYPE_URL: &'static str;

    /// Packs the message into an `Any`.
    fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }

    /// Unpacks an `Any`, rejecting a foreign type URL.
    fn from_any(any: &Any) -> Result<Self, ProverError> {
        if any.type_url != Self::TYPE_URL {
            return Err(ProverError::Decode(format!(
                "expected {}, got {}",
                Self::TYPE_URL,
                any.type_url
            )));
        }
        Ok(Self::decode(any.value.as_slice())?)
    }
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientState {
    #[prost(bool, tag = "1")]
    pub frozen: bool,
    #[prost(uint64, tag = "2")]
    pub latest_epoch: u64,
    #[prost(uint64, tag = "3")]
    pub epoch_size: u64,
    #[prost(uint64, tag = "4")]
    pub latest_height: u64,
    #[prost(string, tag = "5")]
    pub client_identifier: ::prost::alloc::string::String,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusState {
    #[prost(uint64, tag = "1")]
    pub epoch: u64,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub validators: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    /// The state root storage proofs are checked against.
    #[prost(bytes = "vec", tag = "3")]
    pub commitment_root: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub timestamp: ::core::option::Option<Timestamp>,
}

/// The block header fields the light client verifies.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedHeader {
    #[prost(bytes = "vec", tag = "1")]
    pub parent_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub root: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub tx_root: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub receipt_root: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub bloom: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "6")]
    pub number: u64,
    #[prost(uint64, tag = "7")]
    pub gas_limit: u64,
    #[prost(uint64, tag = "8")]
    pub gas_used: u64,
    /// seconds from unix epoch
    #[prost(uint64, tag = "9")]
    pub timestamp: u64,
    #[prost(bytes = "vec", tag = "10")]
    pub extra_data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "11")]
    pub mix_digest: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "12")]
    pub nonce: u64,
    #[prost(uint64, tag = "13")]
    pub base_fee: u64,
}

#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(message, optional, tag = "1")]
    pub signed_header: ::core::option::Option<SignedHeader>,
    /// Left empty; the consensus state carries the root.
    #[prost(bytes = "vec", tag = "2")]
    pub commitment_root: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "3")]
    pub identifier: ::prost::alloc::string::String,
    #[prost(uint64, tag = "4")]
    pub epoch: u64,
}

impl TypedMessage for ClientState {
    const TYPE_URL: &'static str = "/ibc.lightclients.map.v1.ClientState";
}

impl TypedMessage for ConsensusState {
    const TYPE_URL: &'static str = "/ibc.lightclients.map.v1.ConsensusState";
}

impl TypedMessage for Header {
    const TYPE_URL: &'static str = "/ibc.lightclients.map.v1.Header";
}

impl Header {
    /// The block number, or 0 for a header without a signed header.
    pub fn number(&self) -> u64 {
        self.signed_header.as_ref().map_or(0, |h| h.number)
    }

    /// The block's state root.
    pub fn state_root(&self) -> &[u8] {
        self.signed_header.as_ref().map_or(&[][..], |h| h.root.as_slice())
    }

    /// The block timestamp in seconds.
    pub fn timestamp(&self) -> u64 {
        self.signed_header.as_ref().map_or(0, |h| h.timestamp)
    }

    /// The IBC height of this header within `revision_number`.
    pub fn height(&self, revision_number: u64) -> Height {
        Height {
            revision_number,
            revision_height: self.number(),
        }
    }
}
