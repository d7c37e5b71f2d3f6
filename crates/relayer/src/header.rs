// Path: crates/relayer/src/header.rs

//! Builds light-client headers from ledger block headers.

use crate::epoch::epoch_of;
use crate::lightclient::{Header, SignedHeader};
use atlas_api::context::CallContext;
use atlas_api::ledger::{LedgerClient, RawBlockHeader};
use atlas_types::error::ProverError;
use std::num::NonZeroU64;
use std::sync::Arc;

const BLOOM_LEN: usize = 256;

/// Converts a raw block header, tagging it with its epoch and `identifier`.
pub fn synthesize(
    raw: &RawBlockHeader,
    epoch_size: NonZeroU64,
    identifier: &str,
) -> Result<Header, ProverError> {
    let number = raw.number.to::<u64>();
    if !raw.logs_bloom.is_empty() && raw.logs_bloom.len() != BLOOM_LEN {
        return Err(ProverError::InvalidHeader(format!(
            "block {number}: bloom is {} bytes",
            raw.logs_bloom.len()
        )));
    }
    let base_fee = match raw.base_fee_per_gas {
        Some(fee) => u64::try_from(fee).map_err(|_| {
            ProverError::InvalidHeader(format!("block {number}: base fee {fee} overflows u64"))
        })?,
        None => 0,
    };
    Ok(Header {
        signed_header: Some(SignedHeader {
            parent_hash: raw.parent_hash.to_vec(),
            root: raw.state_root.to_vec(),
            tx_root: raw.transactions_root.to_vec(),
            receipt_root: raw.receipts_root.to_vec(),
            bloom: raw.logs_bloom.to_vec(),
            number,
            gas_limit: raw.gas_limit.to::<u64>(),
            gas_used: raw.gas_used.to::<u64>(),
            timestamp: raw.timestamp.to::<u64>(),
            extra_data: raw.extra_data.to_vec(),
            mix_digest: raw.mix_hash.to_vec(),
            nonce: u64::from_be_bytes(raw.nonce.0),
            base_fee,
        }),
        commitment_root: Vec::new(),
        identifier: identifier.to_string(),
        epoch: epoch_of(number, epoch_size),
    })
}

/// Fetches block headers and turns them into light-client headers.
#[derive(Clone)]
pub struct HeaderSynthesizer {
    ledger: Arc<dyn LedgerClient>,
    epoch_size: NonZeroU64,
    identifier: String,
}

impl HeaderSynthesizer {
    /// Headers tagged with `identifier`, with epochs of `epoch_size` blocks.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        epoch_size: NonZeroU64,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            epoch_size,
            identifier: identifier.into(),
        }
    }

    /// The configured epoch length.
    pub fn epoch_size(&self) -> NonZeroU64 {
        self.epoch_size
    }

    /// The header of the current head block.
    pub async fn latest_header(&self, ctx: &CallContext) -> Result<Header, ProverError> {
        let number = self.ledger.block_number(ctx).await?;
        self.header_at(ctx, number).await
    }

    /// The header of block `number`.
    pub async fn header_at(&self, ctx: &CallContext, number: u64) -> Result<Header, ProverError> {
        let raw = self.ledger.header_by_number(ctx, number).await?;
        if raw.number.to::<u64>() != number {
            return Err(ProverError::InvalidHeader(format!(
                "requested block {number}, ledger returned {}",
                raw.number
            )));
        }
        let header = synthesize(&raw, self.epoch_size, &self.identifier)?;
        tracing::debug!(target: "prover", number, epoch = header.epoch, "synthesized header");
        Ok(header)
    }

    /// The epoch of the current head block.
    pub async fn latest_epoch(&self, ctx: &CallContext) -> Result<u64, ProverError> {
        let number = self.ledger.block_number(ctx).await?;
        Ok(epoch_of(number, self.epoch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B64, U256};
    use atlas_test_utils::fixtures::TestFixtures;
    use atlas_test_utils::{assert_err_code, MockLedger};

    fn size() -> NonZeroU64 {
        NonZeroU64::new(1000).unwrap()
    }

    #[test]
    fn fields_are_carried_over() {
        let mut raw = TestFixtures::header(1500);
        raw.nonce = B64::from(0x0102u64.to_be_bytes());
        let h = synthesize(&raw, size(), "identifier").unwrap();
        let sh = h.signed_header.as_ref().unwrap();
        assert_eq!(sh.number, 1500);
        assert_eq!(sh.root, vec![0x02; 32]);
        assert_eq!(sh.timestamp, 1_700_001_500);
        assert_eq!(sh.base_fee, 7);
        assert_eq!(sh.nonce, 0x0102);
        assert_eq!(sh.extra_data, b"atlas".to_vec());
        assert_eq!(h.epoch, 2);
        assert!(h.commitment_root.is_empty());
        assert_eq!(h.identifier, "identifier");
    }

    #[test]
    fn oversized_base_fee_is_rejected() {
        let mut raw = TestFixtures::header(10);
        raw.base_fee_per_gas = Some(U256::from(u64::MAX) + U256::from(1u64));
        assert_err_code!(synthesize(&raw, size(), "identifier"), "PROVER_INVALID_HEADER");
    }

    #[tokio::test]
    async fn latest_header_follows_the_head() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_head(2001);
        ledger.set_header(TestFixtures::header(2001));
        let synth = HeaderSynthesizer::new(ledger, size(), "identifier");
        let ctx = CallContext::background();

        let h = synth.latest_header(&ctx).await.unwrap();
        assert_eq!(h.number(), 2001);
        assert_eq!(h.epoch, 3);
        assert_eq!(synth.latest_epoch(&ctx).await.unwrap(), 3);
    }
}
