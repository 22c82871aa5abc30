use std::fmt;

use rand::{rngs::OsRng, RngCore};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{Error, Result};

// TRON mainnet address version byte
const ADDRESS_PREFIX: u8 = 0x41;
const ADDRESS_SIZE: usize = 21;
const CHECKSUM_SIZE: usize = 4;

/// Freshly generated address with the secret that controls it.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    pub address: String,
    pub private_key: String,
}

// Keeps the secret out of `{:?}` output and therefore out of logs.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

pub trait KeypairSource: Send + Sync {
    /// Produce one independent keypair. An error is fatal for the caller.
    fn generate(&self) -> Result<Keypair>;
}

/// secp256k1 keys with Base58Check TRON addresses.
pub struct TronKeypairSource {
    secp: Secp256k1<All>,
}

impl TronKeypairSource {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    pub fn keypair_from_secret(&self, secret: &SecretKey) -> Keypair {
        let public = PublicKey::from_secret_key(&self.secp, secret);
        Keypair {
            address: derive_address(&public),
            private_key: hex::encode(secret.secret_bytes()),
        }
    }
}

impl Default for TronKeypairSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypairSource for TronKeypairSource {
    fn generate(&self) -> Result<Keypair> {
        let mut seed = [0u8; 32];
        loop {
            OsRng
                .try_fill_bytes(&mut seed)
                .map_err(|e| Error::GenerationFailure(e.to_string()))?;
            // out-of-range scalars are astronomically rare; draw again
            if let Ok(secret) = SecretKey::from_slice(&seed) {
                return Ok(self.keypair_from_secret(&secret));
            }
        }
    }
}

/// Base58Check(0x41 || keccak256(pubkey)[12..]).
pub fn derive_address(public: &PublicKey) -> String {
    let uncompressed = public.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);

    let mut raw = [0u8; ADDRESS_SIZE + CHECKSUM_SIZE];
    raw[0] = ADDRESS_PREFIX;
    raw[1..ADDRESS_SIZE].copy_from_slice(&hash[12..]);

    let checksum = Sha256::digest(Sha256::digest(&raw[..ADDRESS_SIZE]));
    raw[ADDRESS_SIZE..].copy_from_slice(&checksum[..CHECKSUM_SIZE]);

    bs58::encode(raw).into_string()
}
