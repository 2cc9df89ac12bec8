//! The six ordered Confirm-time checks (spec §4.6). Order matters: a
//! stale blockhash is reported as such even if the signature underneath it
//! also happens to be garbage, because that is the cheaper and more
//! actionable failure for a client to see first.

use emit_core::{Address, Amount, Authorization, EmissionError, Eligibility};

use crate::builder::SignedTransaction;
use crate::collaborators::{ChainGateway, IdentityRegistry};
use crate::eligibility::EligibilityCalculator;
use emit_core::{EngineConfig, PreparedClaim, Timestamp};

pub struct Verifier;

impl Verifier {
    /// Runs all six checks against a prepared claim and the transaction the
    /// client returned. On success, returns the re-computed authorization
    /// and eligibility so the caller can use them in the actual submission
    /// (never the Prepare-time copies, which may be stale).
    #[allow(clippy::too_many_arguments)]
    pub async fn verify(
        prepared: &PreparedClaim,
        signed: &SignedTransaction,
        chain: &dyn ChainGateway,
        identity_registry: &dyn IdentityRegistry,
        now: Timestamp,
        config: &EngineConfig,
    ) -> Result<(Authorization, Eligibility), EmissionError> {
        // 1. Blockhash liveness.
        if !chain
            .is_blockhash_valid(&signed.message.recent_blockhash)
            .await?
        {
            return Err(EmissionError::BlockhashExpired);
        }

        // 2. Signer identification.
        let signer_index = signed
            .message
            .signer_index(&prepared.user_wallet)
            .ok_or(EmissionError::SignerAbsent)?;
        debug_assert_eq!(signer_index, 0, "user wallet is always the fee payer");

        // 3. Signature validity.
        let message_bytes = signed.message.canonical_bytes();
        emit_crypto::verify_detached(&prepared.user_wallet, &message_bytes, &signed.signature)
            .map_err(|_| EmissionError::SignatureInvalid)?;

        // 4. Tamper detection: the signed message must hash to exactly the
        // fingerprint recorded at Prepare time.
        let fingerprint = emit_crypto::fingerprint(&message_bytes);
        if fingerprint.0 != prepared.fingerprint.0 {
            return Err(EmissionError::TransactionModified);
        }

        // 5. Re-authorization: the authorized wallet/mode may have changed
        // since Prepare (a designation could have been assigned or
        // revoked).
        let authorization =
            crate::authorizer::Authorizer::authorize(&prepared.token, &prepared.user_wallet, identity_registry)
                .await?;

        // 6. Re-eligibility: the requested amount must still fit within the
        // currently-available claimable amount.
        let launch = identity_registry
            .get_token_launch_time(&prepared.token)
            .await?
            .ok_or(EmissionError::TokenUnknown(prepared.token.to_string()))?;
        let total_minted = identity_registry.get_total_minted(&prepared.token).await?;
        let eligibility = EligibilityCalculator::compute(launch, now, &total_minted, config);
        if requested_exceeds_available(&prepared.requested_amount, &eligibility.available_to_claim) {
            return Err(EmissionError::EligibilityChanged);
        }

        Ok((authorization, eligibility))
    }
}

fn requested_exceeds_available(requested: &Amount, available: &Amount) -> bool {
    requested.exceeds(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Instruction, Message};
    use crate::testing::{FakeChainGateway, FakeIdentityRegistry};
    use emit_core::{ClaimMode, Fingerprint};

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn cfg() -> EngineConfig {
        let mut c = EngineConfig::default();
        c.tokens_per_period = Amount::from_u64(1_000_000);
        c.inflation_period_secs = 3_600;
        c.admin_wallet = Some(addr(250));
        c
    }

    fn signing_key_for(seed: u8) -> ed25519_dalek::SigningKey {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[0] = seed;
        ed25519_dalek::SigningKey::from_bytes(&seed_bytes)
    }

    struct Fixture {
        prepared: PreparedClaim,
        signed: SignedTransaction,
        chain: FakeChainGateway,
        identity: FakeIdentityRegistry,
        config: EngineConfig,
    }

    fn fixture() -> Fixture {
        let token = addr(1);
        let user_key = signing_key_for(7);
        let user_wallet = Address::from_bytes(user_key.verifying_key().to_bytes());
        let blockhash = [9u8; 32];

        let message = Message {
            fee_payer: user_wallet,
            recent_blockhash: blockhash,
            account_keys: vec![user_wallet, addr(250)],
            instructions: vec![Instruction::CreateIdempotentTokenAccount {
                payer: user_wallet,
                owner: addr(250),
                mint: token,
            }],
        };
        let bytes = message.canonical_bytes();
        let fingerprint = emit_crypto::fingerprint(&bytes);
        let signature = {
            use ed25519_dalek::Signer;
            user_key.sign(&bytes).to_bytes()
        };

        let chain = FakeChainGateway::new();
        chain.set_blockhash(blockhash);

        let identity = FakeIdentityRegistry::new();
        identity.set_launch_time(token, 0);
        identity.set_creator(token, user_wallet);
        identity.set_total_minted(token, Amount::zero());

        let prepared = PreparedClaim {
            token,
            user_wallet,
            requested_amount: Amount::from_u64(100),
            decimals: 6,
            prepared_at_ms: 0,
            fingerprint,
            mode: ClaimMode::Creator,
        };

        Fixture {
            prepared,
            signed: SignedTransaction { message, signature },
            chain,
            identity,
            config: cfg(),
        }
    }

    #[tokio::test]
    async fn happy_path_verifies() {
        let f = fixture();
        let (auth, elig) = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap();
        assert_eq!(auth.mode, ClaimMode::Creator);
        assert!(elig.available_to_claim.exceeds(&Amount::zero()) || elig.available_to_claim == Amount::zero());
    }

    #[tokio::test]
    async fn expired_blockhash_rejected() {
        let f = fixture();
        f.chain.set_blockhash([0u8; 32]); // no longer matches signed.message's hash
        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::BlockhashExpired));
    }

    #[tokio::test]
    async fn signer_absent_when_user_not_in_account_keys() {
        let mut f = fixture();
        f.signed.message.account_keys.remove(0);
        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::SignerAbsent));
    }

    #[tokio::test]
    async fn forged_signature_rejected() {
        let mut f = fixture();
        f.signed.signature[0] ^= 0xFF;
        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::SignatureInvalid));
    }

    #[tokio::test]
    async fn tampered_message_detected_after_resigning() {
        let mut f = fixture();
        // Mutate and re-sign with the legitimate key, so check 3 (signature
        // validity) passes but check 4 (fingerprint match) must fail.
        if let Instruction::CreateIdempotentTokenAccount { owner, .. } =
            &mut f.signed.message.instructions[0]
        {
            *owner = addr(251);
        }
        let user_key = signing_key_for(7);
        let bytes = f.signed.message.canonical_bytes();
        use ed25519_dalek::Signer;
        f.signed.signature = user_key.sign(&bytes).to_bytes();

        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::TransactionModified));
    }

    #[tokio::test]
    async fn reauthorization_failure_propagates() {
        let f = fixture();
        // Replace the on-file creator with someone else: the user is no
        // longer authorized even though Prepare once allowed it.
        f.identity.set_creator(f.prepared.token, addr(200));
        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 3 * 3_600, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::CreatorForbidden));
    }

    #[tokio::test]
    async fn eligibility_changed_when_amount_no_longer_available() {
        let f = fixture();
        // Immediately after launch, with the default 1-hour period, nothing
        // has accrued yet.
        let err = Verifier::verify(
            &f.prepared, &f.signed, &f.chain, &f.identity, 0, &f.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EmissionError::EligibilityChanged));
    }
}
