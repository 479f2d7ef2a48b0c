use bitcoin::Network;
use serde::{Deserialize, Serialize};

use crate::fee::FeeModel;

/// Default REST endpoint for Bitcoin mainnet.
pub const MAINNET_API: &str = "https://blockstream.info/api";

/// Default REST endpoint for Bitcoin testnet.
pub const TESTNET_API: &str = "https://blockstream.info/testnet/api";

/// Default REST endpoint for Bitcoin signet.
pub const SIGNET_API: &str = "https://mempool.space/signet/api";

/// Number of decimal places between a coin and its smallest unit (satoshi / zatoshi).
pub const SUBUNIT_DIGITS: u32 = 8;

/// UTXO chain family a node speaks for.
///
/// Only affects RPC parameter encoding and default fee sizing; proof logic is
/// identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    Bitcoin,
    Zcash,
}

impl ChainKind {
    /// Verbosity argument for `getrawtransaction` / `getblock`.
    ///
    /// bitcoind takes a boolean, zcashd insists on the integer `1`.
    pub fn verbose_flag(self) -> serde_json::Value {
        match self {
            ChainKind::Bitcoin => serde_json::Value::Bool(true),
            ChainKind::Zcash => serde_json::Value::from(1),
        }
    }

    /// Digits of precision in RPC-reported decimal amounts.
    pub fn subunit_digits(self) -> u32 {
        SUBUNIT_DIGITS
    }

    /// Public REST endpoint for mainnet, if one speaks the expected API.
    ///
    /// There is no Esplora-compatible public Zcash indexer, so Zcash callers
    /// must configure their own.
    pub fn default_api_url(self) -> Option<&'static str> {
        match self {
            ChainKind::Bitcoin => Some(MAINNET_API),
            ChainKind::Zcash => None,
        }
    }

    /// Size model matching this chain's standard single-key spends.
    pub fn default_fee_model(self) -> FeeModel {
        match self {
            ChainKind::Bitcoin => FeeModel::P2WPKH,
            ChainKind::Zcash => FeeModel::ZCASH_TRANSPARENT,
        }
    }
}

impl std::fmt::Display for ChainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainKind::Bitcoin => write!(f, "bitcoin"),
            ChainKind::Zcash => write!(f, "zcash"),
        }
    }
}

/// Supported Bitcoin networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcNetwork {
    Mainnet,
    Testnet,
    Signet,
    Regtest,
}

impl BtcNetwork {
    /// Convert to the `bitcoin` crate's `Network` type.
    pub fn to_bitcoin_network(self) -> Network {
        match self {
            BtcNetwork::Mainnet => Network::Bitcoin,
            BtcNetwork::Testnet => Network::Testnet,
            BtcNetwork::Signet => Network::Signet,
            BtcNetwork::Regtest => Network::Regtest,
        }
    }

    /// Default public REST endpoint, if one exists for this network.
    pub fn default_api_url(self) -> Option<&'static str> {
        match self {
            BtcNetwork::Mainnet => Some(MAINNET_API),
            BtcNetwork::Testnet => Some(TESTNET_API),
            BtcNetwork::Signet => Some(SIGNET_API),
            BtcNetwork::Regtest => None,
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
            BtcNetwork::Testnet => write!(f, "testnet"),
            BtcNetwork::Signet => write!(f, "signet"),
            BtcNetwork::Regtest => write!(f, "regtest"),
        }
    }
}

/// Zcash network for transparent address version prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZecNetwork {
    Mainnet,
    Testnet,
}

/// 2-byte version prefixes for Zcash transparent addresses.
/// Mainnet: P2PKH "t1" (0x1CB8), P2SH "t3" (0x1CBD)
/// Testnet: P2PKH "tm" (0x1D25), P2SH "t2" (0x1CBA)
impl ZecNetwork {
    pub fn p2pkh_version(self) -> [u8; 2] {
        match self {
            ZecNetwork::Mainnet => [0x1C, 0xB8],
            ZecNetwork::Testnet => [0x1D, 0x25],
        }
    }

    pub fn p2sh_version(self) -> [u8; 2] {
        match self {
            ZecNetwork::Mainnet => [0x1C, 0xBD],
            ZecNetwork::Testnet => [0x1C, 0xBA],
        }
    }
}
