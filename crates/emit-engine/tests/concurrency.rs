//! Property-style concurrency tests for `ClaimEngine` (spec §8): at-most-once
//! per prepared claim under real concurrent `Confirm` calls, and lock
//! release after every outcome. Run with the `testing` feature:
//!
//!   cargo test -p emit-engine --features testing --test concurrency

use std::sync::Arc;

use emit_core::{Address, Amount, EmissionError, EngineConfig};
use emit_engine::testing::{FakeAuditStore, FakeChainGateway, FakeIdentityRegistry};
use emit_engine::{ClaimEngine, SignedTransaction};

fn addr(b: u8) -> Address {
    Address::from_bytes([b; 32])
}

fn signing_key_for(seed: u8) -> ed25519_dalek::SigningKey {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    ed25519_dalek::SigningKey::from_bytes(&seed_bytes)
}

/// A single token's engine, wired so every concurrent caller races the same
/// per-token lock and the same pending-claim registry.
fn build_engine() -> (Arc<ClaimEngine>, Address, Address, ed25519_dalek::SigningKey) {
    let token = addr(7);
    let user_key = signing_key_for(11);
    let user_wallet = Address::from_bytes(user_key.verifying_key().to_bytes());

    let identity = FakeIdentityRegistry::new();
    identity.set_launch_time(token, 0);
    identity.set_creator(token, user_wallet);
    identity.set_total_minted(token, Amount::zero());

    let chain = FakeChainGateway::new();
    let authority = emit_crypto::MintAuthorityKeypair::generate();
    chain.set_mint(
        token,
        emit_engine::collaborators::MintInfo { decimals: 0, mint_authority: authority.address },
    );
    chain.set_blockhash([3u8; 32]);

    let mut config = EngineConfig::default();
    config.tokens_per_period = Amount::from_u64(1_000_000_000);
    config.inflation_period_secs = 3_600;
    config.admin_wallet = Some(addr(250));
    config.split_percent_to_claimers = 90;
    config.recency_window_secs = 0;

    let engine =
        ClaimEngine::new(Arc::new(chain), Arc::new(identity), Arc::new(FakeAuditStore::new()), authority, config);

    (Arc::new(engine), token, user_wallet, user_key)
}

/// N tasks race to Confirm the *same* prepared claim (same transaction key,
/// same signed bytes). Only one may observe the registry entry — the rest
/// must see it already gone.
#[tokio::test]
async fn at_most_one_confirm_succeeds_for_a_single_prepared_claim() {
    let (engine, token, user_wallet, user_key) = build_engine();
    let now = 3 * 3_600;

    let mut rng = rand::rngs::mock::StepRng::new(1, 1);
    let prepared = engine
        .prepare_claim(token, user_wallet, Amount::from_u64(10), now, 1_000, &mut rng)
        .await
        .expect("prepare should succeed");

    let signature = {
        use ed25519_dalek::Signer;
        user_key.sign(&prepared.built.message.canonical_bytes()).to_bytes()
    };
    let signed = SignedTransaction { message: prepared.built.message, signature };

    const N: usize = 16;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let engine = Arc::clone(&engine);
        let signed = signed.clone();
        let key = prepared.transaction_key;
        handles.push(tokio::spawn(async move { engine.confirm_claim(key, signed, now, 2_000).await }));
    }

    let mut successes = 0;
    let mut unknown_key_failures = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(EmissionError::UnknownTransactionKey) => unknown_key_failures += 1,
            Err(other) => panic!("unexpected error racing Confirm: {other:?}"),
        }
    }

    assert_eq!(successes, 1, "exactly one racer should win the prepared claim");
    assert_eq!(unknown_key_failures, N - 1, "every other racer should see the entry already taken");
}

/// After a Confirm storm resolves, the per-token lock must be fully
/// released so a brand new Prepare/Confirm for the same token still goes
/// through without deadlocking.
#[tokio::test]
async fn lock_is_releasable_after_a_concurrent_storm() {
    let (engine, token, user_wallet, user_key) = build_engine();
    let now = 3 * 3_600;

    let mut rng = rand::rngs::mock::StepRng::new(1, 1);
    let prepared = engine
        .prepare_claim(token, user_wallet, Amount::from_u64(10), now, 1_000, &mut rng)
        .await
        .unwrap();
    let signature = {
        use ed25519_dalek::Signer;
        user_key.sign(&prepared.built.message.canonical_bytes()).to_bytes()
    };
    let signed = SignedTransaction { message: prepared.built.message, signature };

    const N: usize = 8;
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let engine = Arc::clone(&engine);
        let signed = signed.clone();
        let key = prepared.transaction_key;
        handles.push(tokio::spawn(async move { engine.confirm_claim(key, signed, now, 2_000).await }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    // A fresh Prepare/Confirm for the same token must still go through —
    // the per-token lock was released regardless of the storm's outcome.
    let mut rng2 = rand::rngs::mock::StepRng::new(2, 1);
    let prepared2 = engine
        .prepare_claim(token, user_wallet, Amount::from_u64(10), now + 10_000, 3_000, &mut rng2)
        .await
        .unwrap();
    let signature2 = {
        use ed25519_dalek::Signer;
        user_key.sign(&prepared2.built.message.canonical_bytes()).to_bytes()
    };
    let signed2 = SignedTransaction { message: prepared2.built.message, signature: signature2 };

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        engine.confirm_claim(prepared2.transaction_key, signed2, now + 10_000, 4_000),
    )
    .await;
    assert!(result.is_ok(), "confirm_claim must not deadlock after a prior Confirm storm");
    assert!(result.unwrap().is_ok(), "a fresh prepared claim must still confirm successfully");
}
