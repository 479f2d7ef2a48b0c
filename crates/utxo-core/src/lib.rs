//! UTXO-model transaction construction for the bridge.
//!
//! Provides fee estimation, greedy coin selection, unsigned withdrawal plans,
//! Bitcoin-style Merkle inclusion proofs, and exact decimal amount parsing for
//! Bitcoin and Zcash transparent outputs. Everything here is pure: no I/O, no
//! shared state.

pub mod address;
pub mod amount;
pub mod error;
pub mod fee;
pub mod merkle;
pub mod network;
pub mod plan;
pub mod selection;
pub mod utxo;
pub mod zcash_address;

pub use address::{BitcoinAddressCodec, ScriptPubkeyEncoder};
pub use error::UtxoError;
pub use fee::FeeModel;
pub use merkle::{build_merkle_proof, merkle_root, MerkleProof};
pub use network::{BtcNetwork, ChainKind, ZecNetwork};
pub use plan::{PlanOutput, WithdrawalPlan, WithdrawalPlanBuilder};
pub use selection::{select_utxos, SelectionConfig, SelectionPolicy, SelectionResult};
pub use utxo::{NormalizedUtxo, Utxo};
pub use zcash_address::ZcashTransparentCodec;
