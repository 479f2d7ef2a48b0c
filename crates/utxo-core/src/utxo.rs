use serde::{Deserialize, Deserializer, Serialize};

use crate::error::UtxoError;

/// A single unspent transaction output as supplied by the caller's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in the chain's smallest unit. Accepts a JSON integer or a
    /// decimal-integer string on input.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,
    /// Full previous transaction, hex encoded. Needed by legacy signers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_tx: Option<String>,
}

/// A UTXO that passed validation and is ready for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUtxo {
    pub txid: String,
    pub vout: u32,
    pub amount: u64,
    pub derivation_path: Option<String>,
    pub raw_tx: Option<Vec<u8>>,
}

impl NormalizedUtxo {
    /// `txid:vout` reference as used in withdrawal plans.
    pub fn outpoint(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

impl Utxo {
    pub fn new(txid: impl Into<String>, vout: u32, amount: u64) -> Self {
        Utxo {
            txid: txid.into(),
            vout,
            amount,
            derivation_path: None,
            raw_tx: None,
        }
    }

    /// Validate the txid and decode the optional raw transaction.
    pub fn normalize(&self) -> Result<NormalizedUtxo, UtxoError> {
        if self.txid.len() != 64 || hex::decode(&self.txid).is_err() {
            return Err(UtxoError::InvalidConfiguration(format!(
                "invalid txid {:?}: expected 64 hex characters",
                self.txid
            )));
        }

        let raw_tx = self
            .raw_tx
            .as_deref()
            .map(hex::decode)
            .transpose()
            .map_err(|e| {
                UtxoError::InvalidConfiguration(format!(
                    "invalid raw transaction for {}:{}: {e}",
                    self.txid, self.vout
                ))
            })?;

        Ok(NormalizedUtxo {
            txid: self.txid.to_ascii_lowercase(),
            vout: self.vout,
            amount: self.amount,
            derivation_path: self.derivation_path.clone(),
            raw_tx,
        })
    }
}

/// Normalize a whole snapshot, failing on the first bad entry.
pub fn normalize_all(utxos: &[Utxo]) -> Result<Vec<NormalizedUtxo>, UtxoError> {
    utxos.iter().map(Utxo::normalize).collect()
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("amount {n} is not a non-negative integer"))),
        serde_json::Value::String(s) => parse_integer_amount(&s).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "amount must be an integer or string, got {other}"
        ))),
    }
}

fn parse_integer_amount(s: &str) -> Result<u64, UtxoError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UtxoError::InvalidAmount(format!(
            "{s:?} is not a non-negative integer"
        )));
    }
    trimmed
        .parse::<u64>()
        .map_err(|e| UtxoError::InvalidAmount(format!("{s:?}: {e}")))
}
