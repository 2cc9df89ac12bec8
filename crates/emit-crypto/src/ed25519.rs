use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use emit_core::{Address, EmissionError};

/// Ed25519 detached-signature verification: `signature` over `message`,
/// checked against `signer`'s public key. The only failure path is
/// `SignatureInvalid` — an absent signer is a distinct, earlier check
/// (`SignerAbsent`) performed by the caller before this is ever reached.
pub fn verify_detached(
    signer: &Address,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), EmissionError> {
    let verifying_key =
        VerifyingKey::from_bytes(signer.as_bytes()).map_err(|_| EmissionError::SignatureInvalid)?;

    let sig_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| EmissionError::SignatureInvalid)?;
    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| EmissionError::SignatureInvalid)
}
