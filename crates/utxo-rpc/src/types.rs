//! Wire types for node responses and the proofs handed to the bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 1.0 request body.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Vec<Value>,
}

/// JSON-RPC response envelope. A `null` member counts as absent.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Verbose `getrawtransaction` result, reduced to what proofs need.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInfo {
    pub txid: String,
    /// Serialized transaction.
    pub hex: String,
    /// Containing block; absent while unconfirmed.
    #[serde(default)]
    pub blockhash: Option<String>,
    /// Reported by zcashd and some indexers, not by bitcoind.
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub vout: Vec<TxOutputInfo>,
    #[serde(default)]
    pub vjoinsplit: Vec<Value>,
    #[serde(default, rename = "vShieldedSpend")]
    pub shielded_spends: Vec<Value>,
    #[serde(default, rename = "vShieldedOutput")]
    pub shielded_outputs: Vec<Value>,
    #[serde(default)]
    pub orchard: Option<OrchardBundle>,
}

impl TransactionInfo {
    /// Whether any Sprout, Sapling or Orchard component is present.
    pub fn has_shielded_components(&self) -> bool {
        !self.vjoinsplit.is_empty()
            || !self.shielded_spends.is_empty()
            || !self.shielded_outputs.is_empty()
            || self
                .orchard
                .as_ref()
                .is_some_and(|bundle| !bundle.actions.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchardBundle {
    #[serde(default)]
    pub actions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutputInfo {
    /// Decimal coin amount exactly as the node wrote it.
    pub value: serde_json::Number,
    pub n: u32,
}

/// Verbose (`verbosity = 1`) `getblock` result.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockInfo {
    pub hash: String,
    #[serde(default)]
    pub height: Option<i64>,
    /// Txids in block order.
    #[serde(default)]
    pub tx: Vec<String>,
    /// Header root, checked against the root rebuilt from `tx`.
    #[serde(default)]
    pub merkleroot: Option<String>,
}

/// Proof returned by an indexer's `GET /tx/{txid}/merkle-proof`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMerkleProof {
    pub block_height: i64,
    pub merkle: Vec<String>,
    pub pos: u32,
}

/// Everything the bridge verifier needs to accept a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositProof {
    #[serde(rename = "merkle_proof")]
    pub merkle_path: Vec<String>,
    #[serde(rename = "tx_block_blockhash")]
    pub block_hash: String,
    #[serde(rename = "tx_bytes")]
    pub raw_tx_bytes: Vec<u8>,
    pub tx_index: u32,
    /// Value of the deposited output in smallest units.
    pub amount: u64,
}
