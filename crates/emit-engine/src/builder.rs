//! Builds the unsigned claim transaction and its tamper-detection
//! fingerprint (spec §4.3). The wire shape modeled here — `Message` as a
//! flat, deterministically-ordered instruction list plus an account-key
//! list for signer lookup — stands in for a concrete chain SDK's
//! transaction format; what matters for the spec's guarantees is that the
//! same bytes are both hashed into the fingerprint and signed by the
//! user's wallet, and that instruction order is a pure function of the
//! inputs.

use emit_core::{Address, Amount, EmissionError, EngineConfig, Fingerprint, SplitRecipient};
use serde::{Deserialize, Serialize};

use crate::collaborators::MintInfo;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Instruction {
    /// Create `owner`'s associated token account for `mint` if it does not
    /// already exist; a no-op otherwise. Payer covers rent.
    CreateIdempotentTokenAccount {
        payer: Address,
        owner: Address,
        mint: Address,
    },
    /// Mint `raw_amount` (already scaled by `10^decimals`) of `mint` into
    /// `owner`'s token account, signed by `authority`.
    MintTo {
        mint: Address,
        authority: Address,
        owner: Address,
        raw_amount: Amount,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub fee_payer: Address,
    pub recent_blockhash: [u8; 32],
    /// Account keys considered signers, index 0 is always `fee_payer`.
    /// Signer lookup (`Verifier` step 2) is a search over this list.
    pub account_keys: Vec<Address>,
    pub instructions: Vec<Instruction>,
}

impl Message {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Message serialization is infallible")
    }

    pub fn signer_index(&self, wallet: &Address) -> Option<usize> {
        self.account_keys.iter().position(|k| k == wallet)
    }
}

/// A transaction signed by the user's wallet, as submitted to Confirm. The
/// protocol mint-authority signature is added later, inside the Submitter —
/// it never appears in what the client sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub message: Message,
    pub signature: [u8; 64],
}

/// The outcome of a successful build: the unsigned message, its
/// fingerprint, and the concrete per-recipient split (needed by callers to
/// report `claimAmount`/recipient breakdowns without recomputing it).
pub struct BuiltClaim {
    pub message: Message,
    pub fingerprint: Fingerprint,
    pub claimer_recipients: Vec<SplitRecipient>,
    pub admin_recipient: SplitRecipient,
}

pub struct TransactionBuilder;

impl TransactionBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        token: &Address,
        user_wallet: &Address,
        requested_amount: &Amount,
        creator_wallet: &Address,
        mint_info: &MintInfo,
        protocol_mint_authority: &Address,
        admin_wallet: &Address,
        recent_blockhash: [u8; 32],
        config: &EngineConfig,
    ) -> Result<BuiltClaim, EmissionError> {
        if requested_amount.is_zero() {
            return Err(EmissionError::InvalidAmountValue);
        }
        if requested_amount.exceeds(&config.safe_max_amount) {
            return Err(EmissionError::AmountTooLarge);
        }
        if mint_info.mint_authority != *protocol_mint_authority {
            return Err(EmissionError::MintAuthorityMismatch);
        }
        if !creator_wallet.is_on_curve() {
            return Err(EmissionError::CreatorWalletInvalid);
        }

        let claimers_total =
            requested_amount.mul_div_floor(config.split_percent_to_claimers, 100);
        let admin_amount = requested_amount
            .checked_sub(&claimers_total)
            .expect("claimers_total computed as a floor of requested_amount, never exceeds it");

        // Split policy is N-ary by construction: today a single "Developer"
        // recipient takes the whole claimers' share, but `distribute`
        // supports an arbitrary weighted list with the integer-division
        // residue absorbed into the last (distinguished) recipient.
        let claimer_shares = vec![(*creator_wallet, 1u64, Some("Developer".to_string()))];
        let mut claimer_recipients = distribute(&claimers_total, &claimer_shares);
        for r in &mut claimer_recipients {
            r.raw_amount = r.raw_amount.scale_by_decimals(mint_info.decimals);
        }

        let admin_recipient = SplitRecipient {
            wallet: *admin_wallet,
            raw_amount: admin_amount.scale_by_decimals(mint_info.decimals),
            label: Some("Admin".to_string()),
        };

        let mut account_keys = vec![*user_wallet];
        let mut instructions = Vec::with_capacity(1 + claimer_recipients.len() * 2 + 1);

        // 1. Idempotent-create admin token account.
        instructions.push(Instruction::CreateIdempotentTokenAccount {
            payer: *user_wallet,
            owner: admin_recipient.wallet,
            mint: *token,
        });
        push_unique(&mut account_keys, admin_recipient.wallet);

        // 2. Per claimer recipient, in fixed order: create then mint.
        for r in &claimer_recipients {
            instructions.push(Instruction::CreateIdempotentTokenAccount {
                payer: *user_wallet,
                owner: r.wallet,
                mint: *token,
            });
            instructions.push(Instruction::MintTo {
                mint: *token,
                authority: *protocol_mint_authority,
                owner: r.wallet,
                raw_amount: r.raw_amount.clone(),
            });
            push_unique(&mut account_keys, r.wallet);
        }

        // 3. Mint the admin's share.
        instructions.push(Instruction::MintTo {
            mint: *token,
            authority: *protocol_mint_authority,
            owner: admin_recipient.wallet,
            raw_amount: admin_recipient.raw_amount.clone(),
        });
        push_unique(&mut account_keys, *protocol_mint_authority);

        let message = Message {
            fee_payer: *user_wallet,
            recent_blockhash,
            account_keys,
            instructions,
        };
        let bytes = message.canonical_bytes();
        let fingerprint = emit_crypto::fingerprint(&bytes);

        Ok(BuiltClaim {
            message,
            fingerprint,
            claimer_recipients,
            admin_recipient,
        })
    }
}

fn push_unique(keys: &mut Vec<Address>, addr: Address) {
    if !keys.contains(&addr) {
        keys.push(addr);
    }
}

/// Distribute `total` across `shares` (wallet, weight, label) such that the
/// sum of distributed amounts is exactly `total` — any integer-division
/// residue is absorbed into the last share.
fn distribute(total: &Amount, shares: &[(Address, u64, Option<String>)]) -> Vec<SplitRecipient> {
    let total_weight: u64 = shares.iter().map(|(_, w, _)| *w).sum();
    let mut allocated = Amount::zero();
    let last = shares.len().saturating_sub(1);

    shares
        .iter()
        .enumerate()
        .map(|(i, (wallet, weight, label))| {
            let raw_amount = if i == last {
                total
                    .checked_sub(&allocated)
                    .expect("cumulative shares before the last never exceed total")
            } else {
                let portion = total.mul_div_floor(*weight, total_weight);
                allocated = &allocated + &portion;
                portion
            };
            SplitRecipient {
                wallet: *wallet,
                raw_amount,
                label: label.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emit_core::EngineConfig;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn valid_curve_addr(seed: u8) -> Address {
        // Derive a guaranteed-on-curve address from an Ed25519 keypair
        // rather than a raw byte pattern, which is virtually never a valid
        // curve point.
        use ed25519_dalek::SigningKey;
        let mut seed_bytes = [0u8; 32];
        seed_bytes[0] = seed;
        let sk = SigningKey::from_bytes(&seed_bytes);
        Address::from_bytes(sk.verifying_key().to_bytes())
    }

    fn cfg() -> EngineConfig {
        let mut c = EngineConfig::default();
        c.admin_wallet = Some(addr(250));
        c.split_percent_to_claimers = 90;
        c
    }

    #[test]
    fn happy_path_split_and_fingerprint() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let admin = addr(250);
        let protocol_authority = addr(9);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: protocol_authority,
        };
        let cfg = cfg();

        let built = TransactionBuilder::build(
            &token,
            &user,
            &Amount::from_u64(2_000_000),
            &creator,
            &mint_info,
            &protocol_authority,
            &admin,
            [7u8; 32],
            &cfg,
        )
        .unwrap();

        assert_eq!(built.claimer_recipients.len(), 1);
        let claimer_raw = &built.claimer_recipients[0].raw_amount;
        let admin_raw = &built.admin_recipient.raw_amount;
        // 1_800_000 * 10^6 and 200_000 * 10^6.
        assert_eq!(*claimer_raw, Amount::from_u64(1_800_000).scale_by_decimals(6));
        assert_eq!(*admin_raw, Amount::from_u64(200_000).scale_by_decimals(6));
    }

    #[test]
    fn amount_conservation_holds_across_range() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let admin = addr(250);
        let protocol_authority = addr(9);
        let mint_info = MintInfo {
            decimals: 0,
            mint_authority: protocol_authority,
        };
        let cfg = cfg();

        for raw in [1u64, 7, 10, 99, 1_000, 999_999, 1_000_000] {
            let requested = Amount::from_u64(raw);
            let built = TransactionBuilder::build(
                &token,
                &user,
                &requested,
                &creator,
                &mint_info,
                &protocol_authority,
                &admin,
                [0u8; 32],
                &cfg,
            )
            .unwrap();
            let claimer_sum: Amount = built
                .claimer_recipients
                .iter()
                .fold(Amount::zero(), |acc, r| &acc + &r.raw_amount);
            let total = &claimer_sum + &built.admin_recipient.raw_amount;
            assert_eq!(total, requested, "conservation failed for {raw}");
        }
    }

    #[test]
    fn zero_amount_rejected() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: addr(9),
        };
        let cfg = cfg();
        let err = TransactionBuilder::build(
            &token,
            &user,
            &Amount::zero(),
            &creator,
            &mint_info,
            &addr(9),
            &addr(250),
            [0u8; 32],
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, EmissionError::InvalidAmountValue));
    }

    #[test]
    fn above_safe_max_rejected() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: addr(9),
        };
        let mut cfg = cfg();
        cfg.safe_max_amount = Amount::from_u64(100);
        let err = TransactionBuilder::build(
            &token,
            &user,
            &Amount::from_u64(101),
            &creator,
            &mint_info,
            &addr(9),
            &addr(250),
            [0u8; 32],
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, EmissionError::AmountTooLarge));
    }

    #[test]
    fn mint_authority_mismatch_rejected() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: addr(9),
        };
        let cfg = cfg();
        let err = TransactionBuilder::build(
            &token,
            &user,
            &Amount::from_u64(10),
            &creator,
            &mint_info,
            &addr(99), // does not match mint_info.mint_authority
            &addr(250),
            [0u8; 32],
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, EmissionError::MintAuthorityMismatch));
    }

    #[test]
    fn invalid_creator_wallet_rejected() {
        let token = addr(1);
        let user = addr(2);
        // All-0xAA bytes are not a valid curve point with overwhelming
        // probability.
        let creator = addr(0xAA);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: addr(9),
        };
        let cfg = cfg();
        let err = TransactionBuilder::build(
            &token,
            &user,
            &Amount::from_u64(10),
            &creator,
            &mint_info,
            &addr(9),
            &addr(250),
            [0u8; 32],
            &cfg,
        )
        .unwrap_err();
        assert!(matches!(err, EmissionError::CreatorWalletInvalid));
    }

    #[test]
    fn fingerprint_is_sensitive_to_amount_tamper() {
        let token = addr(1);
        let user = addr(2);
        let creator = valid_curve_addr(3);
        let admin = addr(250);
        let protocol_authority = addr(9);
        let mint_info = MintInfo {
            decimals: 6,
            mint_authority: protocol_authority,
        };
        let cfg = cfg();

        let built = TransactionBuilder::build(
            &token, &user, &Amount::from_u64(1_000_000), &creator, &mint_info,
            &protocol_authority, &admin, [1u8; 32], &cfg,
        )
        .unwrap();

        let mut tampered = built.message.clone();
        if let Instruction::MintTo { raw_amount, .. } = &mut tampered.instructions[1] {
            *raw_amount = raw_amount.clone() + Amount::from_u64(1);
        }
        let tampered_fp = emit_crypto::fingerprint(&tampered.canonical_bytes());
        assert_ne!(tampered_fp.0, built.fingerprint.0);
    }
}
