//! Trait boundaries to the external collaborators named in spec.md §1/§6:
//! the chain gateway, the identity registry, and the audit store. The
//! engine depends only on these traits; `emit-node` wires in real
//! implementations, tests wire in the fakes under `testing`.

use async_trait::async_trait;
use emit_core::{Address, Amount, EmissionError, Timestamp};
use serde::Serialize;

/// On-chain mint metadata as reported by `getMint`.
#[derive(Debug, Clone, Copy)]
pub struct MintInfo {
    pub decimals: u8,
    pub mint_authority: Address,
}

/// A designated-claim record: the token's claim rights have been reassigned
/// away from the original launcher to a socially verified identity.
#[derive(Debug, Clone, Copy)]
pub struct DesignatedClaim {
    pub original_launcher: Address,
    pub verified_external_wallet: Option<Address>,
    pub verified_embedded_wallet: Option<Address>,
}

impl DesignatedClaim {
    pub fn is_verified_wallet(&self, wallet: &Address) -> bool {
        self.verified_external_wallet.as_ref() == Some(wallet)
            || self.verified_embedded_wallet.as_ref() == Some(wallet)
    }

    pub fn has_any_verified_wallet(&self) -> bool {
        self.verified_external_wallet.is_some() || self.verified_embedded_wallet.is_some()
    }
}

/// The terminal status of a submitted transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationStatus {
    pub err: Option<String>,
    pub confirmation_status: Option<String>,
}

impl ConfirmationStatus {
    pub fn is_terminal_success(&self) -> bool {
        self.err.is_none()
            && matches!(
                self.confirmation_status.as_deref(),
                Some("confirmed") | Some("finalized")
            )
    }

    pub fn is_terminal_failure(&self) -> bool {
        self.err.is_some()
    }
}

/// Options passed to `send_raw_transaction`, mirroring the chain gateway's
/// preflight/commitment knobs named in §4.7.
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

/// Submits transactions and reports chain-level facts: blockhash validity,
/// mint metadata, signature status.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], EmissionError>;
    async fn is_blockhash_valid(&self, blockhash: &[u8; 32]) -> Result<bool, EmissionError>;
    async fn get_mint(&self, token: &Address) -> Result<MintInfo, EmissionError>;
    async fn send_raw_transaction(
        &self,
        signed_tx_bytes: &[u8],
        opts: SendOptions,
    ) -> Result<String, EmissionError>;
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<ConfirmationStatus>, EmissionError>;
}

/// Maps a token to its launch time, creator wallet, and designation state.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    async fn get_token_launch_time(&self, token: &Address) -> Result<Option<Timestamp>, EmissionError>;
    async fn get_token_creator_wallet(&self, token: &Address) -> Result<Option<Address>, EmissionError>;
    async fn get_designated_claim(
        &self,
        token: &Address,
    ) -> Result<Option<DesignatedClaim>, EmissionError>;
    /// Observed on-chain total minted so far for this token, in
    /// claim-portion units (pre-decimal-scaling) — the `M` of §4.1.
    async fn get_total_minted(&self, token: &Address) -> Result<Amount, EmissionError>;
}

/// Records pre-claim rows and answers the recency predicate.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn has_recent_claim(
        &self,
        token: &Address,
        window_secs: i64,
    ) -> Result<bool, EmissionError>;
    async fn pre_record_claim(
        &self,
        user: &Address,
        token: &Address,
        amount: &Amount,
    ) -> Result<(), EmissionError>;
}
