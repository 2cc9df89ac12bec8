use ed25519_dalek::{Signer, SigningKey};
use emit_core::Address;
use zeroize::Zeroizing;

/// The protocol mint-authority keypair. Loaded once at startup, read-only
/// thereafter, and confined to the Submitter — this crate never verifies
/// with it, only signs. The secret bytes live in a `Zeroizing` wrapper and
/// are wiped on drop, mirroring the reference node's wallet keypair.
pub struct MintAuthorityKeypair {
    signing_key: Zeroizing<[u8; 32]>,
    pub address: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum KeypairLoadError {
    #[error("environment variable {0} is not set")]
    EnvVarMissing(String),
    #[error("secret must be 32 or 64 bytes, hex- or base58-encoded (got {0} bytes)")]
    WrongLength(usize),
    #[error("secret is neither valid hex nor valid base58")]
    UndecodableEncoding,
}

impl MintAuthorityKeypair {
    /// Generate a fresh keypair. Only meaningful for local development —
    /// a freshly generated authority cannot co-sign any transaction a real
    /// chain's mint already recognizes.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let address = Address::from_bytes(signing_key.verifying_key().to_bytes());
        Self {
            signing_key: Zeroizing::new(signing_key.to_bytes()),
            address,
        }
    }

    /// Load the protocol mint-authority secret from the named environment
    /// variable. Accepts hex or base58 encoding of either a bare 32-byte seed
    /// or a 64-byte `secret || public` keyfile, the latter taking only its
    /// first 32 bytes as the seed.
    pub fn load_from_env(var_name: &str) -> Result<Self, KeypairLoadError> {
        let raw = std::env::var(var_name)
            .map_err(|_| KeypairLoadError::EnvVarMissing(var_name.to_string()))?;
        Self::from_encoded(&raw)
    }

    fn from_encoded(raw: &str) -> Result<Self, KeypairLoadError> {
        let trimmed = raw.trim();
        let bytes = hex::decode(trimmed)
            .ok()
            .or_else(|| bs58::decode(trimmed).into_vec().ok())
            .ok_or(KeypairLoadError::UndecodableEncoding)?;
        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.try_into().unwrap(),
            64 => bytes[..32].try_into().unwrap(),
            other => return Err(KeypairLoadError::WrongLength(other)),
        };
        let signing_key = SigningKey::from_bytes(&seed);
        let address = Address::from_bytes(signing_key.verifying_key().to_bytes());
        Ok(Self {
            signing_key: Zeroizing::new(seed),
            address,
        })
    }

    /// Partially sign `message` as the protocol mint authority.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signing_key = SigningKey::from_bytes(&self.signing_key);
        signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for MintAuthorityKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MintAuthorityKeypair {{ address: {:?} }}", self.address)
    }
}
