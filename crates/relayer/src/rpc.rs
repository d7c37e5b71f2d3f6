// Path: crates/relayer/src/rpc.rs

//! An Ethereum JSON-RPC 2.0 client over HTTP.
//!
//! One POST per call, no batching and no retries: transient failures surface
//! as [`ProverError::Transport`] and the caller owns the retry policy.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use atlas_api::context::CallContext;
use atlas_api::ledger::{AccountProof, BlockTag, LedgerClient, LogFilter, RawBlockHeader, RawLog};
use atlas_types::config::ChainConfig;
use atlas_types::error::ProverError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, Ordering};

/// A JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Serialize)]
struct CallRequest {
    to: Address,
    data: Bytes,
}

/// Builds the request envelope for `method`.
fn envelope(id: u64, method: &str, params: JsonValue) -> JsonValue {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Extracts `result` from a response body, mapping protocol errors.
///
/// `Ok(None)` means the node answered `null`.
fn parse_response<R: DeserializeOwned>(
    method: &str,
    body: &[u8],
) -> Result<Option<R>, ProverError> {
    let resp: RpcResponse<R> = serde_json::from_slice(body).map_err(|e| {
        ProverError::Decode(format!(
            "{method} response did not match its schema: {e}; body='{}'",
            ascii_snippet(body)
        ))
    })?;
    if let Some(err) = resp.error {
        return Err(ProverError::transport(
            method,
            format!("rpc error {}: {}", err.code, err.message),
        ));
    }
    Ok(resp.result)
}

fn ascii_snippet(bytes: &[u8]) -> String {
    let s = String::from_utf8_lossy(bytes);
    let s: String = s.trim().chars().take(160).collect();
    s.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// A [`LedgerClient`] speaking JSON-RPC over HTTP.
pub struct HttpLedgerClient {
    endpoint: String,
    client: Client,
    next_id: AtomicU64,
}

impl HttpLedgerClient {
    /// A client for `endpoint` with reqwest's default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// A client for the configured endpoint, applying the configured timeout.
    pub fn from_config(config: &ChainConfig) -> Result<Self, ProverError> {
        config.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProverError::Config(format!("http client: {e}")))?;
        Ok(Self {
            endpoint: config.rpc_addr.clone(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// The JSON-RPC endpoint requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request<R: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        method: &'static str,
        params: JsonValue,
    ) -> Result<Option<R>, ProverError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = envelope(id, method, params);
        ctx.run(async {
            tracing::trace!(target: "prover.rpc", method, id, "sending request");
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await
                .map_err(|e| ProverError::transport(method, e))?;
            let status = resp.status();
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| ProverError::transport(method, e))?;
            if !status.is_success() {
                tracing::debug!(
                    target: "prover.rpc",
                    method,
                    id,
                    status = status.as_u16(),
                    "rpc request failed"
                );
                return Err(ProverError::transport(
                    method,
                    format!("HTTP {}: {}", status.as_u16(), ascii_snippet(&bytes)),
                ));
            }
            parse_response(method, &bytes)
        })
        .await
    }

    async fn request_some<R: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        method: &'static str,
        params: JsonValue,
    ) -> Result<R, ProverError> {
        self.request(ctx, method, params)
            .await?
            .ok_or_else(|| ProverError::transport(method, "null result"))
    }
}

fn to_json<T: Serialize>(method: &str, value: &T) -> Result<JsonValue, ProverError> {
    serde_json::to_value(value)
        .map_err(|e| ProverError::Decode(format!("{method} params: {e}")))
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn block_number(&self, ctx: &CallContext) -> Result<u64, ProverError> {
        let n: U64 = self.request_some(ctx, "eth_blockNumber", json!([])).await?;
        Ok(n.to::<u64>())
    }

    async fn call(
        &self,
        ctx: &CallContext,
        to: Address,
        data: Bytes,
        block: BlockTag,
    ) -> Result<Bytes, ProverError> {
        let req = to_json("eth_call", &CallRequest { to, data })?;
        self.request_some(ctx, "eth_call", json!([req, block.to_rpc_param()]))
            .await
    }

    async fn get_logs(
        &self,
        ctx: &CallContext,
        filter: &LogFilter,
    ) -> Result<Vec<RawLog>, ProverError> {
        let filter = to_json("eth_getLogs", filter)?;
        self.request_some(ctx, "eth_getLogs", json!([filter])).await
    }

    async fn get_proof(
        &self,
        ctx: &CallContext,
        address: Address,
        slots: &[B256],
        block: BlockTag,
    ) -> Result<AccountProof, ProverError> {
        let slots = to_json("eth_getProof", &slots)?;
        self.request_some(
            ctx,
            "eth_getProof",
            json!([address, slots, block.to_rpc_param()]),
        )
        .await
    }

    async fn header_by_number(
        &self,
        ctx: &CallContext,
        number: u64,
    ) -> Result<RawBlockHeader, ProverError> {
        self.request::<RawBlockHeader>(
            ctx,
            "eth_getBlockByNumber",
            json!([BlockTag::Number(number).to_rpc_param(), false]),
        )
        .await?
        .ok_or_else(|| {
            ProverError::transport("eth_getBlockByNumber", format!("block {number} not found"))
        })
    }
}
