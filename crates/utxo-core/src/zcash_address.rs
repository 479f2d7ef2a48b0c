use crate::address::ScriptPubkeyEncoder;
use crate::error::UtxoError;
use crate::network::ZecNetwork;

/// Kind of Zcash transparent address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparentKind {
    P2pkh,
    P2sh,
}

/// Codec for Zcash transparent (t-) addresses.
///
/// Shielded addresses (z-addr, unified) are not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZcashTransparentCodec {
    pub network: ZecNetwork,
}

impl ZcashTransparentCodec {
    pub fn new(network: ZecNetwork) -> Self {
        ZcashTransparentCodec { network }
    }

    /// Decode a t-address into its kind and 20-byte hash, checking the
    /// Base58Check checksum and the network prefix.
    pub fn decode(&self, address: &str) -> Result<(TransparentKind, [u8; 20]), UtxoError> {
        let decoded = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| match e {
                bs58::decode::Error::InvalidChecksum { .. } => {
                    UtxoError::AddressConversion("invalid checksum".into())
                }
                other => UtxoError::AddressConversion(format!("invalid base58: {other}")),
            })?;

        // 2 version + 20 hash
        if decoded.len() != 22 {
            return Err(UtxoError::AddressConversion(format!(
                "expected 22 payload bytes, got {}",
                decoded.len()
            )));
        }

        let version = [decoded[0], decoded[1]];
        let kind = if version == self.network.p2pkh_version() {
            TransparentKind::P2pkh
        } else if version == self.network.p2sh_version() {
            TransparentKind::P2sh
        } else {
            return Err(UtxoError::AddressConversion(format!(
                "address {address} is not a transparent address for {:?}",
                self.network
            )));
        };

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[2..22]);
        Ok((kind, hash))
    }

    /// Base58Check-encode a 20-byte hash as a t-address.
    pub fn encode(&self, kind: TransparentKind, hash: &[u8; 20]) -> String {
        let version = match kind {
            TransparentKind::P2pkh => self.network.p2pkh_version(),
            TransparentKind::P2sh => self.network.p2sh_version(),
        };
        let mut payload = Vec::with_capacity(22);
        payload.extend_from_slice(&version);
        payload.extend_from_slice(hash);
        bs58::encode(payload).with_check().into_string()
    }
}

impl ScriptPubkeyEncoder for ZcashTransparentCodec {
    fn encode_script_pubkey(&self, address: &str) -> Result<Vec<u8>, UtxoError> {
        let (kind, hash) = self.decode(address)?;
        Ok(match kind {
            TransparentKind::P2pkh => p2pkh_script(&hash),
            TransparentKind::P2sh => p2sh_script(&hash),
        })
    }
}

/// OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(0x76); // OP_DUP
    script.push(0xA9); // OP_HASH160
    script.push(0x14); // Push 20 bytes
    script.extend_from_slice(pubkey_hash);
    script.push(0x88); // OP_EQUALVERIFY
    script.push(0xAC); // OP_CHECKSIG
    script
}

/// OP_HASH160 <20-byte hash> OP_EQUAL
fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(23);
    script.push(0xA9);
    script.push(0x14);
    script.extend_from_slice(script_hash);
    script.push(0x87);
    script
}
