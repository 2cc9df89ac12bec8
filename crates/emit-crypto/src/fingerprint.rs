use emit_core::Fingerprint;
use sha2::{Digest, Sha256};

/// SHA-256 of the canonical serialized unsigned transaction message — the
/// thing the user's wallet signs and the thing Confirm re-hashes to detect
/// tampering. Callers must pass exactly the message bytes, never a larger
/// envelope (e.g. not the signature section).
pub fn fingerprint(message_bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(message_bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Fingerprint(out)
}
