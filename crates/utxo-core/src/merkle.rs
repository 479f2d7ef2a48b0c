//! Bitcoin-style Merkle inclusion proofs.
//!
//! Txids and hashes cross this module's boundary in display order (the
//! byte-reversed hex shown by nodes and explorers). Hashing happens on the
//! internal byte order: each pair is `sha256(sha256(left || right))`, and an
//! unpaired trailing node at any level is paired with itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::UtxoError;

/// Audit path proving a transaction's inclusion in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub block_height: i64,
    /// Sibling hashes from the leaf level up, display-order hex.
    pub path: Vec<String>,
    /// Zero-based index of the transaction in the block.
    pub position: u32,
}

impl MerkleProof {
    /// Fold `txid` up the path and return the resulting root (display hex).
    pub fn compute_root(&self, txid: &str) -> Result<String, UtxoError> {
        let mut node = to_internal(txid)?;
        let mut index = self.position;
        for sibling in &self.path {
            let sibling = to_internal(sibling)?;
            node = if index & 1 == 0 {
                hash_pair(&node, &sibling)
            } else {
                hash_pair(&sibling, &node)
            };
            index >>= 1;
        }
        Ok(to_display(&node))
    }

    /// Check the proof against a known block merkle root.
    pub fn verify(&self, txid: &str, merkle_root: &str) -> Result<bool, UtxoError> {
        Ok(self.compute_root(txid)?.eq_ignore_ascii_case(merkle_root.trim()))
    }
}

/// Build the audit path for `target` within a block's ordered txid list.
pub fn build_merkle_proof<S: AsRef<str>>(
    txids: &[S],
    target: &str,
    block_height: i64,
) -> Result<MerkleProof, UtxoError> {
    let position = txids
        .iter()
        .position(|t| t.as_ref().eq_ignore_ascii_case(target))
        .ok_or_else(|| UtxoError::TransactionNotFound {
            txid: target.to_string(),
        })?;

    let mut level = leaves(txids)?;
    let mut index = position;
    let mut path = Vec::new();

    while level.len() > 1 {
        let sibling = level.get(index ^ 1).unwrap_or(&level[index]);
        path.push(to_display(sibling));
        level = next_level(&level);
        index /= 2;
    }

    let position = u32::try_from(position).map_err(|_| {
        UtxoError::InvalidConfiguration(format!("transaction index {position} exceeds u32"))
    })?;

    Ok(MerkleProof {
        block_height,
        path,
        position,
    })
}

/// Merkle root of a block's ordered txid list, display hex.
pub fn merkle_root<S: AsRef<str>>(txids: &[S]) -> Result<String, UtxoError> {
    let mut level = leaves(txids)?;
    if level.is_empty() {
        return Err(UtxoError::InvalidConfiguration(
            "cannot compute merkle root of an empty block".into(),
        ));
    }
    while level.len() > 1 {
        level = next_level(&level);
    }
    Ok(to_display(&level[0]))
}

fn leaves<S: AsRef<str>>(txids: &[S]) -> Result<Vec<[u8; 32]>, UtxoError> {
    txids.iter().map(|t| to_internal(t.as_ref())).collect()
}

fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [single] => hash_pair(single, single),
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    Sha256::digest(hasher.finalize()).into()
}

/// Display-order hex to internal byte order.
fn to_internal(hex_hash: &str) -> Result<[u8; 32], UtxoError> {
    let mut bytes: [u8; 32] = hex::decode(hex_hash.trim())
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            UtxoError::InvalidConfiguration(format!("invalid 32-byte hash {hex_hash:?}"))
        })?;
    bytes.reverse();
    Ok(bytes)
}

fn to_display(hash: &[u8; 32]) -> String {
    let mut bytes = *hash;
    bytes.reverse();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::Txid;
    use std::str::FromStr;

    /// Block 100000.
    const BLOCK_100000_TXIDS: [&str; 4] = [
        "8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87",
        "fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4",
        "6359f0868171b1d194cbee1af2f16ea598ae8fad666d9b012c8ed2b79a236ec4",
        "e9a66845e05d5abc0ad04ec80f774a7e585c6e8db975962d069a522137b80c1d",
    ];
    const BLOCK_100000_ROOT: &str =
        "f3e94742aca4b5ef85488dc37c06c3282295ffec960994b2c0d5ac2a25a95766";

    fn synthetic_txids(n: usize) -> Vec<String> {
        (0..n as u64)
            .map(|i| hex::encode(Sha256::digest(i.to_le_bytes())))
            .collect()
    }

    fn library_root(txids: &[String]) -> String {
        let hashes = txids
            .iter()
            .map(|t| Txid::from_str(t).unwrap().to_raw_hash());
        let root = bitcoin::merkle_tree::calculate_root(hashes).unwrap();
        Txid::from_raw_hash(root).to_string()
    }

    fn ceil_log2(n: usize) -> usize {
        let mut depth = 0;
        while (1usize << depth) < n {
            depth += 1;
        }
        depth
    }

    #[test]
    fn real_block_root_matches_header() {
        assert_eq!(merkle_root(&BLOCK_100000_TXIDS).unwrap(), BLOCK_100000_ROOT);
    }

    #[test]
    fn real_block_proofs_verify() {
        for (i, txid) in BLOCK_100000_TXIDS.iter().enumerate() {
            let proof = build_merkle_proof(&BLOCK_100000_TXIDS, txid, 100_000).unwrap();
            assert_eq!(proof.position as usize, i);
            assert_eq!(proof.path.len(), 2);
            assert!(proof.verify(txid, BLOCK_100000_ROOT).unwrap());
        }
    }

    #[test]
    fn sibling_of_first_leaf_is_second_txid() {
        let proof = build_merkle_proof(&BLOCK_100000_TXIDS, BLOCK_100000_TXIDS[0], 100_000).unwrap();
        assert_eq!(proof.path[0], BLOCK_100000_TXIDS[1]);
    }

    #[test]
    fn roots_match_bitcoin_crate_for_odd_and_even_sizes() {
        for n in 1..=17 {
            let txids = synthetic_txids(n);
            assert_eq!(merkle_root(&txids).unwrap(), library_root(&txids), "n = {n}");
        }
    }

    #[test]
    fn proofs_round_trip_and_have_log_depth() {
        for n in [1, 2, 3, 5, 7, 8, 9, 33] {
            let txids = synthetic_txids(n);
            let root = merkle_root(&txids).unwrap();
            for (i, txid) in txids.iter().enumerate() {
                let proof = build_merkle_proof(&txids, txid, 42).unwrap();
                assert_eq!(proof.position as usize, i);
                assert_eq!(proof.path.len(), ceil_log2(n), "n = {n}");
                assert_eq!(proof.compute_root(txid).unwrap(), root);
            }
        }
    }

    #[test]
    fn trailing_odd_leaf_is_paired_with_itself() {
        let txids = synthetic_txids(3);
        let proof = build_merkle_proof(&txids, &txids[2], 1).unwrap();
        assert_eq!(proof.path[0], txids[2]);
    }

    #[test]
    fn single_transaction_block_has_empty_path() {
        let txids = synthetic_txids(1);
        let proof = build_merkle_proof(&txids, &txids[0], 7).unwrap();
        assert!(proof.path.is_empty());
        assert_eq!(proof.compute_root(&txids[0]).unwrap(), txids[0]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let upper = BLOCK_100000_TXIDS[2].to_uppercase();
        let proof = build_merkle_proof(&BLOCK_100000_TXIDS, &upper, 100_000).unwrap();
        assert_eq!(proof.position, 2);
    }

    #[test]
    fn missing_transaction_is_reported() {
        let missing = "00".repeat(32);
        let err = build_merkle_proof(&BLOCK_100000_TXIDS, &missing, 100_000).unwrap_err();
        assert_eq!(err, UtxoError::TransactionNotFound { txid: missing });
    }

    #[test]
    fn tampered_path_fails_verification() {
        let mut proof =
            build_merkle_proof(&BLOCK_100000_TXIDS, BLOCK_100000_TXIDS[3], 100_000).unwrap();
        proof.path[1] = "11".repeat(32);
        assert!(!proof.verify(BLOCK_100000_TXIDS[3], BLOCK_100000_ROOT).unwrap());
    }

    #[test]
    fn malformed_txid_in_block_is_rejected() {
        let txids = ["abcd".to_string(), "00".repeat(32)];
        assert!(matches!(
            build_merkle_proof(&txids, "abcd", 1),
            Err(UtxoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_block_has_no_root() {
        let txids: [&str; 0] = [];
        assert!(merkle_root(&txids).is_err());
    }
}
