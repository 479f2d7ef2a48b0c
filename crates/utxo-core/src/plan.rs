use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::ScriptPubkeyEncoder;
use crate::error::UtxoError;
use crate::selection::{select_utxos, SelectionConfig, SelectionResult};
use crate::utxo::{normalize_all, Utxo};

/// One output of an unsigned withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutput {
    pub value: u64,
    /// Locking script, hex encoded.
    pub script_pubkey: String,
}

/// Unsigned withdrawal handed to the external signer.
///
/// Output 0 always pays the recipient; output 1, when present, is change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    /// Spent outpoints as `txid:vout`, in selection order.
    pub inputs: Vec<String>,
    pub outputs: Vec<PlanOutput>,
    pub fee: u64,
}

impl WithdrawalPlan {
    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

/// Builds withdrawal plans from a UTXO snapshot.
#[derive(Debug, Clone)]
pub struct WithdrawalPlanBuilder<E> {
    codec: E,
    config: SelectionConfig,
}

impl<E: ScriptPubkeyEncoder> WithdrawalPlanBuilder<E> {
    pub fn new(codec: E, config: SelectionConfig) -> Self {
        WithdrawalPlanBuilder { codec, config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select inputs for `amount` and lay out the recipient and change outputs.
    ///
    /// Both addresses are encoded before selection so a bad address fails
    /// without touching the snapshot.
    pub fn build(
        &self,
        utxos: &[Utxo],
        recipient: &str,
        amount: u64,
        change_address: &str,
    ) -> Result<WithdrawalPlan, UtxoError> {
        let recipient_script = self.codec.encode_script_pubkey(recipient)?;
        let change_script = self.codec.encode_script_pubkey(change_address)?;

        let candidates = normalize_all(utxos)?;
        let selection = select_utxos(&candidates, amount, &self.config)?;

        let plan = plan_from_selection(&selection, amount, &recipient_script, &change_script)?;
        debug!(
            inputs = plan.inputs.len(),
            outputs = plan.outputs.len(),
            fee = plan.fee,
            "built withdrawal plan"
        );
        Ok(plan)
    }
}

/// Lay out outputs for an existing selection.
pub fn plan_from_selection(
    selection: &SelectionResult,
    amount: u64,
    recipient_script: &[u8],
    change_script: &[u8],
) -> Result<WithdrawalPlan, UtxoError> {
    let mut outputs = vec![output(amount, recipient_script)?];
    if selection.change > 0 {
        outputs.push(output(selection.change, change_script)?);
    }

    Ok(WithdrawalPlan {
        inputs: selection.inputs.iter().map(|u| u.outpoint()).collect(),
        outputs,
        fee: selection.fee,
    })
}

fn output(value: u64, script: &[u8]) -> Result<PlanOutput, UtxoError> {
    if value == 0 {
        return Err(UtxoError::InvalidConfiguration(
            "output value must be positive".into(),
        ));
    }
    Ok(PlanOutput {
        value,
        script_pubkey: hex::encode(script),
    })
}
