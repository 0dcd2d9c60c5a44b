use std::fmt;
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ChainClient;
use crate::block::{BlockHeader, BlockId};

/// Errors that can occur when talking to an Ethereum-style JSON-RPC endpoint.
#[derive(Debug)]
pub enum RpcError {
    NonHttpUrl,
    Client(String),
    Json(serde_json::Error),
    Status(StatusCode),
    Rpc { code: i64, message: String },
    BlockNotFound(BlockId),
    Quantity { field: &'static str, value: String },
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::NonHttpUrl => write!(f, "only http:// and https:// URLs are supported"),
            RpcError::Client(e) => write!(f, "client error: {e}"),
            RpcError::Json(e) => write!(f, "JSON error: {e}"),
            RpcError::Status(status) => write!(f, "unexpected HTTP status: {status}"),
            RpcError::Rpc { code, message } => {
                write!(f, "RPC error {code}: {message}")
            }
            RpcError::BlockNotFound(id) => write!(f, "block {id} not found"),
            RpcError::Quantity { field, value } => {
                write!(f, "invalid hex quantity for {field}: {value:?}")
            }
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Json(e)
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// Block object returned by `eth_getBlockByNumber` with hydration disabled.
///
/// Chains without proof-of-work may omit `nonce`, `miner` or `difficulty`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    #[serde(default)]
    pub nonce: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub gas_limit: String,
    pub gas_used: String,
    #[serde(default)]
    pub miner: Option<String>,
    #[serde(default)]
    pub transactions: Vec<String>,
}

impl TryFrom<RpcBlock> for BlockHeader {
    type Error = RpcError;

    fn try_from(block: RpcBlock) -> Result<Self, Self::Error> {
        Ok(BlockHeader {
            number: parse_quantity_u64("number", &block.number)?,
            hash: block.hash,
            parent_hash: block.parent_hash,
            nonce: block.nonce.unwrap_or_default(),
            timestamp: parse_quantity_u64("timestamp", &block.timestamp)?,
            difficulty: match block.difficulty {
                Some(d) => parse_quantity_u256("difficulty", &d)?,
                None => U256::ZERO,
            },
            gas_limit: parse_quantity_u256("gasLimit", &block.gas_limit)?,
            gas_used: parse_quantity_u256("gasUsed", &block.gas_used)?,
            miner: block.miner.unwrap_or_default(),
            transactions: block.transactions,
        })
    }
}

/// Minimal JSON-RPC client for an Ethereum-compatible node over HTTP(S).
pub struct RpcClient {
    client: Client,
    url: Url,
}

impl RpcClient {
    /// Creates a client whose requests fail once `timeout` has elapsed.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        Self::build(url, Client::builder().timeout(timeout))
    }

    fn build(url: &str, builder: reqwest::ClientBuilder) -> Result<Self, RpcError> {
        let url = Url::parse(url).map_err(|e| RpcError::Client(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(RpcError::NonHttpUrl);
            }
        }

        let client = builder
            .build()
            .map_err(|e| RpcError::Client(e.to_string()))?;

        Ok(RpcClient { client, url })
    }

    /// Issues a call; a `null` result comes back as `None`.
    async fn call<T>(&self, method: &str, params: &[Value]) -> Result<Option<T>, RpcError>
    where
        T: DeserializeOwned,
    {
        let request_body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let res = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RpcError::Client(e.to_string()))?;

        if !res.status().is_success() {
            return Err(RpcError::Status(res.status()));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| RpcError::Client(e.to_string()))?;
        let rpc_response: JsonRpcResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(err) = rpc_response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(rpc_response.result)
    }

    /// Fetches a block with transaction hashes only (`eth_getBlockByNumber`).
    pub async fn get_block_by_id(&self, id: BlockId) -> Result<BlockHeader, RpcError> {
        let block: Option<RpcBlock> = self
            .call("eth_getBlockByNumber", &[json!(id.to_rpc_tag()), json!(false)])
            .await?;
        block.ok_or(RpcError::BlockNotFound(id))?.try_into()
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn get_block(&self, id: BlockId) -> Result<BlockHeader, RpcError> {
        self.get_block_by_id(id).await
    }
}

fn strip_hex_prefix<'a>(field: &'static str, s: &'a str) -> Result<&'a str, RpcError> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .filter(|digits| !digits.is_empty())
        .ok_or_else(|| RpcError::Quantity {
            field,
            value: s.to_string(),
        })
}

/// Parses a `0x`-prefixed JSON-RPC quantity into a `u64`.
pub fn parse_quantity_u64(field: &'static str, s: &str) -> Result<u64, RpcError> {
    let digits = strip_hex_prefix(field, s)?;
    u64::from_str_radix(digits, 16).map_err(|_| RpcError::Quantity {
        field,
        value: s.to_string(),
    })
}

/// Parses a `0x`-prefixed JSON-RPC quantity into a 256-bit integer.
pub fn parse_quantity_u256(field: &'static str, s: &str) -> Result<U256, RpcError> {
    let digits = strip_hex_prefix(field, s)?;
    U256::from_str_radix(digits, 16).map_err(|_| RpcError::Quantity {
        field,
        value: s.to_string(),
    })
}
