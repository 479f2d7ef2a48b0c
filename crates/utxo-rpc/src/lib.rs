//! Node access for the UTXO bridge.
//!
//! Fetches transactions and blocks over JSON-RPC, assembles deposit and
//! withdrawal-verification proofs with [`utxo_core::merkle`], and broadcasts
//! signed transactions over REST.
//!
//! # Example
//!
//! ```no_run
//! use utxo_rpc::{RpcConfig, UtxoChainRpcClient};
//! use utxo_core::ChainKind;
//!
//! # async fn run() -> Result<(), utxo_rpc::RpcError> {
//! let client = UtxoChainRpcClient::new(RpcConfig {
//!     rpc_user: Some("bridge".to_string()),
//!     rpc_password: Some("secret".to_string()),
//!     ..RpcConfig::for_chain(ChainKind::Zcash)
//! })?;
//! let proof = client.build_deposit_proof("ab".repeat(32).as_str(), 0).await?;
//! # let _ = proof;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;


pub use client::UtxoChainRpcClient;
pub use config::RpcConfig;
pub use error::RpcError;
pub use types::{BlockInfo, DepositProof, NodeMerkleProof, TransactionInfo};
