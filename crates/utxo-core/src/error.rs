use thiserror::Error;

/// Errors raised while selecting coins, building plans, or building proofs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtxoError {
    #[error("insufficient funds: no UTXOs available")]
    NoUtxos,

    #[error("insufficient funds: have {available} sat, need {required} sat")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("exceeded maximum input count of {max_inputs}")]
    ExceededInputLimit { max_inputs: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("transaction {txid} not found in block")]
    TransactionNotFound { txid: String },

    #[error("address conversion error: {0}")]
    AddressConversion(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl UtxoError {
    /// True for both the empty-snapshot and the ran-out-of-candidates cases.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, UtxoError::NoUtxos | UtxoError::InsufficientFunds { .. })
    }
}
