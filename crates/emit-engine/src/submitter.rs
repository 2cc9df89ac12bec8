//! Co-signs a verified claim transaction with the protocol mint authority
//! and drives it to a terminal outcome (spec §4.7). The caller — `ClaimEngine`
//! — owns the per-token lock and the registry entry for the whole call;
//! this module only ever reports a result, it never touches either.

use std::time::Duration;

use emit_core::EmissionError;

use crate::builder::SignedTransaction;
use crate::collaborators::{ChainGateway, Commitment, ConfirmationStatus, SendOptions};

pub struct Submitter;

/// What the chain eventually reported, beyond a bare success/failure — kept
/// separate from `EmissionError` so a caller can log the signature even on
/// the success path.
pub struct SubmissionOutcome {
    pub signature: String,
    pub status: ConfirmationStatus,
}

impl Submitter {
    /// Attaches the protocol mint-authority's signature, submits, and polls
    /// for a terminal status. `poll_interval` and `max_attempts` come from
    /// `EngineConfig` so tests can drive this with near-zero waits.
    pub async fn submit(
        verified: &SignedTransaction,
        authority: &emit_crypto::MintAuthorityKeypair,
        chain: &dyn ChainGateway,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Result<SubmissionOutcome, EmissionError> {
        let message_bytes = verified.message.canonical_bytes();
        let authority_signature = authority.sign(&message_bytes);

        // The wire bytes sent on are the message plus both signatures, in a
        // fixed order (user, then authority) — deterministic so a retried
        // send always produces byte-identical input.
        let mut wire = message_bytes;
        wire.extend_from_slice(&verified.signature);
        wire.extend_from_slice(&authority_signature);

        let opts = SendOptions {
            skip_preflight: false,
            preflight_commitment: Commitment::Processed,
        };
        let signature = chain.send_raw_transaction(&wire, opts).await?;

        for _ in 0..max_attempts {
            if let Some(status) = chain.get_signature_status(&signature).await? {
                if status.is_terminal_success() {
                    return Ok(SubmissionOutcome { signature, status });
                }
                if status.is_terminal_failure() {
                    return Err(EmissionError::TransactionFailed(
                        status.err.unwrap_or_else(|| "unknown chain error".to_string()),
                    ));
                }
            }
            tokio::time::sleep(poll_interval).await;
        }

        Err(EmissionError::ConfirmationTimeout)
    }
}
