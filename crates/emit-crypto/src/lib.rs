//! emit-crypto
//!
//! Ed25519 signature verification, SHA-256 transaction fingerprinting, and
//! the protocol mint-authority keypair.

pub mod ed25519;
pub mod fingerprint;
pub mod keypair;

pub use ed25519::verify_detached;
pub use fingerprint::fingerprint;
pub use keypair::MintAuthorityKeypair;
