//! `ClaimEngine` wires the seven components into the Prepare/Confirm state
//! machine of spec §4.7. It owns the registry and the lock table; every
//! other collaborator is borrowed behind a trait object so `emit-node` can
//! substitute real implementations without this crate knowing about them.

use std::sync::Arc;
use std::time::Duration;

use emit_core::{
    Address, Amount, Authorization, EmissionError, Eligibility, EngineConfig, MonotonicMs,
    PreparedClaim, Timestamp, TransactionKey,
};
use tracing::{info, warn};

use crate::authorizer::Authorizer;
use crate::builder::{BuiltClaim, SignedTransaction, TransactionBuilder};
use crate::collaborators::{AuditStore, ChainGateway, IdentityRegistry};
use crate::eligibility::EligibilityCalculator;
use crate::lock::ClaimLock;
use crate::registry::PendingClaimRegistry;
use crate::submitter::Submitter;
use crate::verifier::Verifier;

pub struct ClaimEngine {
    chain: Arc<dyn ChainGateway>,
    identity: Arc<dyn IdentityRegistry>,
    audit: Arc<dyn AuditStore>,
    authority: emit_crypto::MintAuthorityKeypair,
    registry: PendingClaimRegistry,
    lock: ClaimLock,
    config: EngineConfig,
}

/// Everything a Prepare caller needs to assemble and sign a transaction
/// client-side.
pub struct PrepareOutcome {
    pub transaction_key: TransactionKey,
    pub built: BuiltClaim,
    pub eligibility: Eligibility,
    pub decimals: u8,
    pub mode: emit_core::ClaimMode,
}

pub struct ConfirmOutcome {
    pub signature: String,
    pub token: Address,
    pub requested_amount: Amount,
    pub authorization: Authorization,
    pub eligibility: Eligibility,
    pub status: crate::collaborators::ConfirmationStatus,
}

/// §6 `GET claims/{token}` response material: the token's launch instant
/// plus the eligibility computed against it at the same `now`.
pub struct EligibilitySnapshot {
    pub launch: Timestamp,
    pub eligibility: Eligibility,
}

impl ClaimEngine {
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        identity: Arc<dyn IdentityRegistry>,
        audit: Arc<dyn AuditStore>,
        authority: emit_crypto::MintAuthorityKeypair,
        config: EngineConfig,
    ) -> Self {
        Self {
            chain,
            identity,
            audit,
            registry: PendingClaimRegistry::new(config.prepared_ttl_secs),
            lock: ClaimLock::new(),
            authority,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// §4.1 + §4.2 + §4.3: check eligibility and authorization, build the
    /// unsigned transaction, and register it for a matching Confirm.
    pub async fn prepare_claim(
        &self,
        token: Address,
        user_wallet: Address,
        requested_amount: Amount,
        now: Timestamp,
        now_ms: MonotonicMs,
        rng: &mut impl rand::RngCore,
    ) -> Result<PrepareOutcome, EmissionError> {
        if requested_amount.is_zero() {
            return Err(EmissionError::InvalidAmountValue);
        }
        if requested_amount.exceeds(&self.config.safe_max_amount) {
            return Err(EmissionError::AmountTooLarge);
        }

        let authorization = Authorizer::authorize(&token, &user_wallet, self.identity.as_ref()).await?;

        let launch = self
            .identity
            .get_token_launch_time(&token)
            .await?
            .ok_or_else(|| EmissionError::TokenUnknown(token.to_string()))?;
        let total_minted = self.identity.get_total_minted(&token).await?;
        let eligibility = EligibilityCalculator::compute(launch, now, &total_minted, &self.config);

        if !eligibility.can_claim_now {
            return Err(EmissionError::NoTokensAvailable {
                next_inflation_time: eligibility.next_inflation_time,
            });
        }
        if requested_amount.exceeds(&eligibility.available_to_claim) {
            return Err(EmissionError::AmountExceedsAvailable {
                requested: requested_amount,
                available: eligibility.available_to_claim,
            });
        }

        let creator_wallet = self.resolve_split_creator_wallet(&token).await?;
        let mint_info = self.chain.get_mint(&token).await?;
        let admin_wallet = self
            .config
            .admin_wallet
            .ok_or_else(|| EmissionError::Misconfiguration("adminWallet is required".into()))?;
        let blockhash = self.chain.get_latest_blockhash().await?;

        let built = TransactionBuilder::build(
            &token,
            &user_wallet,
            &requested_amount,
            &creator_wallet,
            &mint_info,
            &self.authority.address,
            &admin_wallet,
            blockhash,
            &self.config,
        )?;

        let transaction_key = TransactionKey::new(&token, now_ms, rng);
        let prepared = PreparedClaim {
            token,
            user_wallet,
            requested_amount: requested_amount.clone(),
            decimals: mint_info.decimals,
            prepared_at_ms: now_ms,
            fingerprint: built.fingerprint,
            mode: authorization.mode,
        };

        // Sweep-before-insert: a stale entry is never allowed to linger
        // past a fresh Prepare observing it.
        self.registry.sweep(now_ms);
        self.registry.insert(transaction_key, prepared);

        info!(
            token = %token,
            user = %user_wallet,
            mode = ?authorization.mode,
            "claim prepared"
        );

        Ok(PrepareOutcome {
            transaction_key,
            built,
            eligibility,
            decimals: mint_info.decimals,
            mode: authorization.mode,
        })
    }

    /// §4.4 - §4.7: look up the prepared claim, serialize access per token,
    /// verify the signed transaction, and submit it.
    pub async fn confirm_claim(
        &self,
        transaction_key: TransactionKey,
        signed: SignedTransaction,
        now: Timestamp,
        now_ms: MonotonicMs,
    ) -> Result<ConfirmOutcome, EmissionError> {
        self.registry.sweep(now_ms);
        let prepared = self
            .registry
            .take(&transaction_key, now_ms)
            .ok_or(EmissionError::UnknownTransactionKey)?;

        // Held for the rest of this call. A second Confirm for the same
        // token queues here even though its registry entry (if any) is
        // already gone — the lock, not the registry, is what makes the
        // chain-submission step itself at-most-once-in-flight per token.
        let _guard = self.lock.acquire(prepared.token).await;

        if self
            .audit
            .has_recent_claim(&prepared.token, self.config.recency_window_secs)
            .await?
        {
            return Err(EmissionError::RecentClaimBlocked);
        }

        // Pre-record inside the lock, before verification/submission, so a
        // concurrent Confirm on another replica observes this claim via the
        // recency check even though nothing has reached the chain yet.
        self.audit
            .pre_record_claim(&prepared.user_wallet, &prepared.token, &prepared.requested_amount)
            .await?;

        let verify_result = Verifier::verify(
            &prepared,
            &signed,
            self.chain.as_ref(),
            self.identity.as_ref(),
            now,
            &self.config,
        )
        .await;

        let (authorization, eligibility) = match verify_result {
            Ok(pair) => pair,
            Err(err) => {
                warn!(token = %prepared.token, kind = err.kind(), "claim verification failed");
                return Err(err);
            }
        };

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let outcome = Submitter::submit(
            &signed,
            &self.authority,
            self.chain.as_ref(),
            poll_interval,
            self.config.poll_max_attempts,
        )
        .await;

        match outcome {
            Ok(outcome) => {
                info!(token = %prepared.token, signature = %outcome.signature, "claim confirmed");
                Ok(ConfirmOutcome {
                    signature: outcome.signature,
                    token: prepared.token,
                    requested_amount: prepared.requested_amount,
                    authorization,
                    eligibility,
                    status: outcome.status,
                })
            }
            Err(err) => {
                warn!(token = %prepared.token, kind = err.kind(), "claim submission failed");
                Err(err)
            }
        }
    }

    /// §6 `GET claims/{token}`: the read-only eligibility snapshot. Does
    /// not touch the registry or the lock — it is a pure read against the
    /// identity registry plus `EligibilityCalculator`.
    pub async fn get_eligibility(
        &self,
        token: Address,
        now: Timestamp,
    ) -> Result<EligibilitySnapshot, EmissionError> {
        let launch = self
            .identity
            .get_token_launch_time(&token)
            .await?
            .ok_or_else(|| EmissionError::TokenUnknown(token.to_string()))?;
        let total_minted = self.identity.get_total_minted(&token).await?;
        let eligibility = EligibilityCalculator::compute(launch, now, &total_minted, &self.config);
        Ok(EligibilitySnapshot { launch, eligibility })
    }

    /// Split recipients for the claimers' share always go to the original
    /// creator wallet, even when a designated identity has been granted
    /// claim rights — designation reassigns who may *invoke* the claim, not
    /// who is economically the token's creator.
    async fn resolve_split_creator_wallet(&self, token: &Address) -> Result<Address, EmissionError> {
        if let Some(designated) = self.identity.get_designated_claim(token).await? {
            return Ok(designated.original_launcher);
        }
        self.identity
            .get_token_creator_wallet(token)
            .await?
            .ok_or(EmissionError::CreatorUnknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAuditStore, FakeChainGateway, FakeIdentityRegistry};
    use emit_core::ClaimMode;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn signing_key_for(seed: u8) -> ed25519_dalek::SigningKey {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[0] = seed;
        ed25519_dalek::SigningKey::from_bytes(&seed_bytes)
    }

    struct Harness {
        engine: ClaimEngine,
        token: Address,
        user_wallet: Address,
        user_key: ed25519_dalek::SigningKey,
        audit: Arc<FakeAuditStore>,
    }

    fn harness() -> Harness {
        let token = addr(1);
        let user_key = signing_key_for(42);
        let user_wallet = Address::from_bytes(user_key.verifying_key().to_bytes());

        let identity = FakeIdentityRegistry::new();
        identity.set_launch_time(token, 0);
        identity.set_creator(token, user_wallet);
        identity.set_total_minted(token, Amount::zero());

        let chain = FakeChainGateway::new();
        let authority = emit_crypto::MintAuthorityKeypair::generate();
        chain.set_mint(
            token,
            crate::collaborators::MintInfo {
                decimals: 0,
                mint_authority: authority.address,
            },
        );
        chain.set_blockhash([5u8; 32]);

        let audit = Arc::new(FakeAuditStore::new());

        let mut config = EngineConfig::default();
        config.tokens_per_period = Amount::from_u64(1_000_000);
        config.inflation_period_secs = 3_600;
        config.admin_wallet = Some(addr(250));
        config.split_percent_to_claimers = 90;

        let engine = ClaimEngine::new(
            Arc::new(chain),
            Arc::new(identity),
            audit.clone(),
            authority,
            config,
        );

        Harness {
            engine,
            token,
            user_wallet,
            user_key,
            audit,
        }
    }

    fn sign(key: &ed25519_dalek::SigningKey, message: &[u8]) -> [u8; 64] {
        use ed25519_dalek::Signer;
        key.sign(message).to_bytes()
    }

    #[tokio::test]
    async fn prepare_then_confirm_succeeds_end_to_end() {
        let mut rng = rand::rngs::mock::StepRng::new(1, 1);
        let h = harness();

        let prepared = h
            .engine
            .prepare_claim(
                h.token,
                h.user_wallet,
                Amount::from_u64(1_000_000),
                3 * 3_600,
                1_000,
                &mut rng,
            )
            .await
            .unwrap();
        assert_eq!(prepared.mode, ClaimMode::Creator);

        let message_bytes = prepared.built.message.canonical_bytes();
        let signature = sign(&h.user_key, &message_bytes);
        let signed = SignedTransaction {
            message: prepared.built.message,
            signature,
        };

        let outcome = h
            .engine
            .confirm_claim(prepared.transaction_key, signed, 3 * 3_600, 1_100)
            .await
            .unwrap();
        assert!(!outcome.signature.is_empty());
    }

    #[tokio::test]
    async fn confirm_with_unknown_key_fails() {
        let h = harness();
        let bogus_message = crate::builder::Message {
            fee_payer: h.user_wallet,
            recent_blockhash: [0u8; 32],
            account_keys: vec![h.user_wallet],
            instructions: vec![],
        };
        let signed = SignedTransaction {
            message: bogus_message,
            signature: [0u8; 64],
        };
        let mut rng = rand::rngs::mock::StepRng::new(9, 1);
        let bogus_key = TransactionKey::new(&h.token, 0, &mut rng);

        let err = h
            .engine
            .confirm_claim(bogus_key, signed, 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EmissionError::UnknownTransactionKey));
    }

    #[tokio::test]
    async fn recent_claim_blocks_confirm() {
        let mut rng = rand::rngs::mock::StepRng::new(1, 1);
        let h = harness();

        let prepared = h
            .engine
            .prepare_claim(
                h.token,
                h.user_wallet,
                Amount::from_u64(100),
                3 * 3_600,
                1_000,
                &mut rng,
            )
            .await
            .unwrap();

        // A prior claim for this token was already recorded within the
        // recency window — the check happens at Confirm, under the lock,
        // not at Prepare.
        h.audit.set_recent_claim(h.token, true);

        let message_bytes = prepared.built.message.canonical_bytes();
        let signature = sign(&h.user_key, &message_bytes);
        let signed = SignedTransaction {
            message: prepared.built.message,
            signature,
        };

        let err = h
            .engine
            .confirm_claim(prepared.transaction_key, signed, 3 * 3_600, 1_100)
            .await
            .unwrap_err();
        assert!(matches!(err, EmissionError::RecentClaimBlocked));
    }
}
