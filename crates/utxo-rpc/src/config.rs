//! Connection settings for a UTXO node.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utxo_core::ChainKind;

use crate::error::RpcError;

/// Local bitcoind JSON-RPC endpoint.
pub const BITCOIN_RPC_URL: &str = "http://127.0.0.1:8332";

/// Local zcashd JSON-RPC endpoint.
pub const ZCASH_RPC_URL: &str = "http://127.0.0.1:8232";

/// Configuration for [`UtxoChainRpcClient`](crate::UtxoChainRpcClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Chain family; selects RPC verbosity encoding and shielded checks.
    pub chain: ChainKind,
    /// JSON-RPC endpoint (`getrawtransaction`, `getblock`).
    pub rpc_url: String,
    /// REST endpoint serving `/tx` broadcast and `/tx/{txid}/...` lookups.
    /// When unset, the chain's public default is used; Zcash has none.
    pub api_url: Option<String>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts for idempotent reads after a transport failure.
    /// Broadcast is never retried.
    pub read_retries: u32,
    /// Pause between read attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        RpcConfig::for_chain(ChainKind::Bitcoin)
    }
}

impl RpcConfig {
    /// Defaults for a local node of the given chain.
    pub fn for_chain(chain: ChainKind) -> Self {
        let rpc_url = match chain {
            ChainKind::Bitcoin => BITCOIN_RPC_URL,
            ChainKind::Zcash => ZCASH_RPC_URL,
        };
        RpcConfig {
            chain,
            rpc_url: rpc_url.to_string(),
            api_url: None,
            rpc_user: None,
            rpc_password: None,
            timeout_secs: 30,
            read_retries: 0,
            retry_delay_ms: 500,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// REST URL for `path`, tolerating a trailing slash on `api_url`.
    pub(crate) fn api_endpoint(&self, path: &str) -> Result<String, RpcError> {
        let base = self
            .api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.chain.default_api_url())
            .ok_or_else(|| RpcError::Config(format!("api_url is not set for {}", self.chain)))?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }
}
