use serde::{Deserialize, Serialize};

use crate::error::UtxoError;

/// Milli-satoshis per satoshi; the fee rate is stored at this resolution.
const MSAT_PER_SAT: u64 = 1_000;

/// Linear transaction-size model plus a fee rate.
///
/// `fee(i, o) = ceil((base + i * per_input + o * per_output) * rate)`, with the
/// rate held as an integer number of milli-satoshis per vbyte so the rounding
/// is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeModel {
    pub base_vbytes: u64,
    pub per_input_vbytes: u64,
    pub per_output_vbytes: u64,
    pub rate_msat_per_vbyte: u64,
}

impl FeeModel {
    /// Native SegWit (P2WPKH) sizing at 1 sat/vbyte.
    /// Overhead covers version + locktime + segwit marker/flag + counts;
    /// an input is 41 non-witness bytes plus ~27 witness vbytes.
    pub const P2WPKH: FeeModel = FeeModel {
        base_vbytes: 11,
        per_input_vbytes: 68,
        per_output_vbytes: 31,
        rate_msat_per_vbyte: MSAT_PER_SAT,
    };

    /// Zcash v5 transparent P2PKH sizing at 1 zat/byte.
    pub const ZCASH_TRANSPARENT: FeeModel = FeeModel {
        base_vbytes: 46,
        per_input_vbytes: 148,
        per_output_vbytes: 34,
        rate_msat_per_vbyte: MSAT_PER_SAT,
    };

    /// Build a model with a whole sat/vbyte rate.
    pub fn new(
        base_vbytes: u64,
        per_input_vbytes: u64,
        per_output_vbytes: u64,
        rate_sat_per_vbyte: u64,
    ) -> Result<Self, UtxoError> {
        let rate_msat_per_vbyte = rate_sat_per_vbyte.checked_mul(MSAT_PER_SAT).ok_or_else(|| {
            UtxoError::InvalidConfiguration(format!(
                "fee rate {rate_sat_per_vbyte} sat/vbyte is out of range"
            ))
        })?;
        Self::with_rate_msat_per_vbyte(
            base_vbytes,
            per_input_vbytes,
            per_output_vbytes,
            rate_msat_per_vbyte,
        )
    }

    /// Build a model with a fractional rate expressed in milli-sat/vbyte
    /// (e.g. `1_500` for 1.5 sat/vbyte).
    pub fn with_rate_msat_per_vbyte(
        base_vbytes: u64,
        per_input_vbytes: u64,
        per_output_vbytes: u64,
        rate_msat_per_vbyte: u64,
    ) -> Result<Self, UtxoError> {
        let model = FeeModel {
            base_vbytes,
            per_input_vbytes,
            per_output_vbytes,
            rate_msat_per_vbyte,
        };
        model.validate()?;
        Ok(model)
    }

    /// Same size model at a different whole sat/vbyte rate.
    pub fn at_rate(self, rate_sat_per_vbyte: u64) -> Result<Self, UtxoError> {
        Self::new(
            self.base_vbytes,
            self.per_input_vbytes,
            self.per_output_vbytes,
            rate_sat_per_vbyte,
        )
    }

    /// Reject a zero rate. Models deserialized from config go through here too.
    pub fn validate(&self) -> Result<(), UtxoError> {
        if self.rate_msat_per_vbyte == 0 {
            return Err(UtxoError::InvalidConfiguration(
                "fee rate must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Estimated virtual size of a transaction with the given shape.
    pub fn vsize(&self, input_count: usize, output_count: usize) -> Result<u64, UtxoError> {
        let inputs = (input_count as u64).checked_mul(self.per_input_vbytes);
        let outputs = (output_count as u64).checked_mul(self.per_output_vbytes);
        inputs
            .zip(outputs)
            .and_then(|(i, o)| self.base_vbytes.checked_add(i)?.checked_add(o))
            .ok_or_else(|| {
                UtxoError::InvalidConfiguration(format!(
                    "transaction size overflows for {input_count} inputs and {output_count} outputs"
                ))
            })
    }

    /// Fee for a transaction with the given number of inputs and outputs.
    pub fn fee(&self, input_count: usize, output_count: usize) -> Result<u64, UtxoError> {
        self.validate()?;
        let vsize = self.vsize(input_count, output_count)?;
        let msat = vsize.checked_mul(self.rate_msat_per_vbyte).ok_or_else(|| {
            UtxoError::InvalidConfiguration(format!("fee overflows for {vsize} vbytes"))
        })?;
        Ok(msat.div_ceil(MSAT_PER_SAT))
    }
}

impl Default for FeeModel {
    fn default() -> Self {
        FeeModel::P2WPKH
    }
}
