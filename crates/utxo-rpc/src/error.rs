//! Error types for node RPC and proof assembly.

use utxo_core::UtxoError;

/// Errors that can occur when talking to a UTXO node or assembling proofs.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The request never produced a 2xx response.
    #[error("rpc transport error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport {
        /// HTTP status, if a response arrived at all.
        status: Option<u16>,
        message: String,
    },

    /// The node answered with a JSON-RPC error envelope.
    #[error("rpc error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// The response had neither `result` nor `error`.
    #[error("rpc call {method} returned no result")]
    EmptyResult { method: String },

    /// Response body did not match the expected shape.
    #[error("malformed rpc payload: {0}")]
    Decode(String),

    #[error("transaction {txid} is not confirmed")]
    TransactionNotConfirmed { txid: String },

    #[error("output {vout} not found in transaction {txid} ({available} outputs)")]
    OutputNotFound {
        txid: String,
        vout: u32,
        available: usize,
    },

    #[error("transaction {txid} has shielded components")]
    ShieldedUnsupported { txid: String },

    /// Broadcast endpoint rejected the transaction; `body` is the raw reply.
    #[error("broadcast rejected ({status}): {body}")]
    Broadcast { status: u16, body: String },

    /// The block header's Merkle root disagrees with the one rebuilt from its txids.
    #[error("merkle root mismatch in block {block_hash}: header {expected}, computed {computed}")]
    MerkleRootMismatch {
        block_hash: String,
        expected: String,
        computed: String,
    },

    #[error("invalid rpc configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] UtxoError),
}

impl RpcError {
    /// Only transport failures are worth retrying for idempotent reads.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        RpcError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Decode(e.to_string())
    }
}
