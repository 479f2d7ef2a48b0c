use bitcoin::address::{Address, NetworkUnchecked};

use crate::error::UtxoError;
use crate::network::BtcNetwork;

/// Turns a destination address into the locking script of an output.
///
/// Implementations must reject malformed addresses and addresses for a
/// different network with [`UtxoError::AddressConversion`].
pub trait ScriptPubkeyEncoder {
    fn encode_script_pubkey(&self, address: &str) -> Result<Vec<u8>, UtxoError>;
}

impl<T: ScriptPubkeyEncoder + ?Sized> ScriptPubkeyEncoder for &T {
    fn encode_script_pubkey(&self, address: &str) -> Result<Vec<u8>, UtxoError> {
        (**self).encode_script_pubkey(address)
    }
}

impl<T: ScriptPubkeyEncoder + ?Sized> ScriptPubkeyEncoder for Box<T> {
    fn encode_script_pubkey(&self, address: &str) -> Result<Vec<u8>, UtxoError> {
        (**self).encode_script_pubkey(address)
    }
}

/// Bitcoin address codec.
///
/// Supports P2PKH, P2SH, P2WPKH, P2WSH, and P2TR address formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitcoinAddressCodec {
    pub network: BtcNetwork,
}

impl BitcoinAddressCodec {
    pub fn new(network: BtcNetwork) -> Self {
        BitcoinAddressCodec { network }
    }
}

impl ScriptPubkeyEncoder for BitcoinAddressCodec {
    fn encode_script_pubkey(&self, address: &str) -> Result<Vec<u8>, UtxoError> {
        let parsed: Address = address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| UtxoError::AddressConversion(format!("invalid address {address}: {e}")))?
            .require_network(self.network.to_bitcoin_network())
            .map_err(|e| {
                UtxoError::AddressConversion(format!(
                    "address {address} is not valid on {}: {e}",
                    self.network
                ))
            })?;

        Ok(parsed.script_pubkey().into_bytes())
    }
}
