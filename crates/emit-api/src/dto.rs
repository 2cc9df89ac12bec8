//! Wire DTOs for the three ingress contracts of spec.md §6. Every amount
//! crosses the wire as a decimal string (`emit_core::Amount`'s own
//! `Serialize`/`Deserialize` impls already do this) — never a JSON number.

use emit_core::{Address, Amount, Timestamp, TransactionKey};
use serde::{Deserialize, Serialize};

// ── GET claims/{token} ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub wallet: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub wallet_address: String,
    pub token_address: String,
    pub total_claimed: Amount,
    pub available_to_claim: Amount,
    pub max_claimable_now: Amount,
    pub tokens_per_period: Amount,
    pub inflation_periods: u64,
    pub token_launch_time: Timestamp,
    pub next_inflation_time: Timestamp,
    pub can_claim_now: bool,
    pub time_until_next_claim: i64,
}

// ── POST claims/mint ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub token_address: String,
    pub user_wallet: String,
    pub claim_amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    pub success: bool,
    pub transaction: String,
    pub transaction_key: TransactionKey,
    pub claim_amount: Amount,
    pub message: String,
}

// ── POST claims/confirm ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub signed_transaction: String,
    pub transaction_key: TransactionKey,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationStatusDto {
    pub err: Option<String>,
    pub confirmation_status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub transaction_signature: String,
    pub token_address: String,
    pub claim_amount: Amount,
    pub confirmation: ConfirmationStatusDto,
}

// ── GET claims/{token}/config ────────────────────────────────────────────
//
// Supplemented read-only surface (SPEC_FULL §11): the non-secret slice of
// `EngineConfig` the wallet UI needs to render claim copy without
// re-deriving protocol constants client-side.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigResponse {
    pub tokens_per_period: Amount,
    pub inflation_period_secs: i64,
    pub split_percent_to_claimers: u64,
    pub recency_window_secs: i64,
    pub prepared_ttl_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
}

pub fn parse_address(field: &'static str, raw: &str) -> Result<Address, emit_core::EmissionError> {
    raw.parse::<Address>()
        .map_err(|_| emit_core::EmissionError::InvalidAddressFormat(field))
}
