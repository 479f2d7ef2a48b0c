//! JSON-RPC / REST client for a UTXO full node or indexer.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use utxo_core::amount::parse_decimal_amount;
use utxo_core::{build_merkle_proof, ChainKind, MerkleProof};

use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::types::{
    BlockInfo, DepositProof, NodeMerkleProof, RpcRequest, RpcResponse, TransactionInfo,
};

/// Client for one node. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UtxoChainRpcClient {
    config: RpcConfig,
    client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl UtxoChainRpcClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            config,
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    pub fn chain(&self) -> ChainKind {
        self.config.chain
    }

    /// Issue a single JSON-RPC call and deserialize its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let result = self.call_value(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn call_value(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc call");

        let body = RpcRequest {
            jsonrpc: "1.0",
            id,
            method,
            params,
        };
        let mut request = self.client.post(&self.config.rpc_url).json(&body);
        if let Some(ref user) = self.config.rpc_user {
            request = request.basic_auth(user, self.config.rpc_password.as_ref());
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            // bitcoind reports RPC failures as 404/500 with a normal envelope.
            let message = resp.text().await.unwrap_or_default();
            if let Ok(RpcResponse {
                error: Some(error), ..
            }) = serde_json::from_str::<RpcResponse>(&message)
            {
                return Err(RpcError::Protocol {
                    code: error.code,
                    message: error.message,
                });
            }
            return Err(RpcError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        let text = resp.text().await?;
        let envelope: RpcResponse = serde_json::from_str(&text)?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Protocol {
                code: error.code,
                message: error.message,
            });
        }
        envelope.result.ok_or_else(|| RpcError::EmptyResult {
            method: method.to_string(),
        })
    }

    /// Verbose `getrawtransaction`.
    pub async fn get_transaction(&self, txid: &str) -> Result<TransactionInfo, RpcError> {
        self.with_read_retry("getrawtransaction", || {
            self.call(
                "getrawtransaction",
                vec![Value::from(txid), self.config.chain.verbose_flag()],
            )
        })
        .await
    }

    /// Verbose `getblock`; the `tx` list holds txids in block order.
    pub async fn get_block(&self, blockhash: &str) -> Result<BlockInfo, RpcError> {
        self.with_read_retry("getblock", || {
            self.call(
                "getblock",
                vec![Value::from(blockhash), self.config.chain.verbose_flag()],
            )
        })
        .await
    }

    /// Inclusion proof for a confirmed transaction, for withdrawal verification.
    pub async fn build_merkle_proof(&self, txid: &str) -> Result<MerkleProof, RpcError> {
        let (_, _, proof) = self.locate(txid).await?;
        Ok(proof)
    }

    /// Proof that output `vout` of `txid` was paid in a confirmed block.
    pub async fn build_deposit_proof(
        &self,
        txid: &str,
        vout: u32,
    ) -> Result<DepositProof, RpcError> {
        let (tx, block, proof) = self.locate(txid).await?;

        let output = tx
            .vout
            .iter()
            .find(|o| o.n == vout)
            .ok_or_else(|| RpcError::OutputNotFound {
                txid: txid.to_string(),
                vout,
                available: tx.vout.len(),
            })?;
        let amount =
            parse_decimal_amount(&output.value.to_string(), self.config.chain.subunit_digits())?;

        let raw_tx_bytes = hex::decode(tx.hex.trim())
            .map_err(|e| RpcError::Decode(format!("transaction {txid} hex: {e}")))?;

        info!(
            txid,
            vout,
            amount,
            tx_index = proof.position,
            block = %block.hash,
            "built deposit proof"
        );
        Ok(DepositProof {
            merkle_path: proof.path,
            block_hash: block.hash,
            raw_tx_bytes,
            tx_index: proof.position,
            amount,
        })
    }

    /// Fetch the transaction and its block, then build the Merkle proof.
    async fn locate(
        &self,
        txid: &str,
    ) -> Result<(TransactionInfo, BlockInfo, MerkleProof), RpcError> {
        let tx = self.get_transaction(txid).await?;
        if self.config.chain == ChainKind::Zcash && tx.has_shielded_components() {
            return Err(RpcError::ShieldedUnsupported {
                txid: txid.to_string(),
            });
        }

        let blockhash = tx
            .blockhash
            .clone()
            .ok_or_else(|| RpcError::TransactionNotConfirmed {
                txid: txid.to_string(),
            })?;
        let block = self.get_block(&blockhash).await?;

        let height = block.height.or(tx.height).ok_or_else(|| {
            RpcError::Decode(format!("no height reported for block {blockhash}"))
        })?;
        let proof = build_merkle_proof(&block.tx, txid, height)?;
        if let Some(header_root) = block.merkleroot.as_deref() {
            let computed = proof.compute_root(txid)?;
            if !computed.eq_ignore_ascii_case(header_root.trim()) {
                warn!(txid, block = %blockhash, "merkle root mismatch");
                return Err(RpcError::MerkleRootMismatch {
                    block_hash: blockhash,
                    expected: header_root.to_string(),
                    computed,
                });
            }
        }
        debug!(
            txid,
            position = proof.position,
            depth = proof.path.len(),
            "built merkle proof"
        );
        Ok((tx, block, proof))
    }

    /// Submit a signed transaction; returns the txid reported by the node.
    ///
    /// Never retried: a resubmission can be rejected even when the first
    /// attempt was accepted.
    pub async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, RpcError> {
        let url = self.config.api_endpoint("tx")?;
        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(raw_tx_hex.to_string())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "broadcast rejected");
            return Err(RpcError::Broadcast {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let txid = body.trim();
        if txid.is_empty() {
            warn!(status = status.as_u16(), "broadcast accepted without a txid");
            return Err(RpcError::Decode(
                "broadcast response carried no txid".to_string(),
            ));
        }
        info!(%txid, "broadcast accepted");
        Ok(txid.to_string())
    }

    /// Raw transaction hex from the REST endpoint.
    pub async fn get_raw_transaction_hex(&self, txid: &str) -> Result<String, RpcError> {
        let path = format!("tx/{txid}/hex");
        let text = self
            .with_read_retry("tx hex", || self.rest_get(&path))
            .await?;
        Ok(text.trim().to_string())
    }

    /// The indexer's own inclusion proof for `txid`.
    pub async fn get_node_merkle_proof(&self, txid: &str) -> Result<NodeMerkleProof, RpcError> {
        let path = format!("tx/{txid}/merkle-proof");
        let text = self
            .with_read_retry("merkle-proof", || self.rest_get(&path))
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Build a proof locally and compare it with the indexer's.
    ///
    /// Returns `false` on any mismatch in height, position or path.
    pub async fn cross_check_merkle_proof(&self, txid: &str) -> Result<bool, RpcError> {
        let local = self.build_merkle_proof(txid).await?;
        let remote = self.get_node_merkle_proof(txid).await?;

        let matches = local.block_height == remote.block_height
            && local.position == remote.pos
            && local.path.len() == remote.merkle.len()
            && local
                .path
                .iter()
                .zip(&remote.merkle)
                .all(|(a, b)| a.eq_ignore_ascii_case(b));

        if !matches {
            warn!(
                txid,
                local_position = local.position,
                remote_position = remote.pos,
                "merkle proof differs from indexer"
            );
        }
        Ok(matches)
    }

    async fn rest_get(&self, path: &str) -> Result<String, RpcError> {
        let url = self.config.api_endpoint(path)?;
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RpcError::Transport {
                status: Some(status.as_u16()),
                message: body,
            });
        }
        Ok(body)
    }

    /// Run an idempotent read, retrying transport failures up to
    /// `read_retries` extra times.
    async fn with_read_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, RpcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < self.config.read_retries => {
                    attempt += 1;
                    warn!(what, attempt, error = %err, "retrying read");
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                result => return result,
            }
        }
    }
}
