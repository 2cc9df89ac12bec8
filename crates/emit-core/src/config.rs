//! Typed configuration surface for the claim engine (§6 of the spec).
//!
//! Loaded the way the reference node loads genesis parameters: an optional
//! JSON file for the protocol/numeric knobs, overridden in a few places by
//! CLI flags (`emit-node`'s concern), with the mint-authority secret kept
//! out of both and read from an environment variable instead.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::{Address, Amount};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Emission per inflation period, claim-portion units (pre-decimal-scaling).
    pub tokens_per_period: Amount,
    /// Seconds per inflation period.
    pub inflation_period_secs: i64,
    /// Integer percent of a claim routed to claimers; residue to admin.
    pub split_percent_to_claimers: u64,
    /// Recency window in seconds.
    pub recency_window_secs: i64,
    /// Prepared-claim TTL in seconds.
    pub prepared_ttl_secs: u64,
    /// Confirmation poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum confirmation poll attempts.
    pub poll_max_attempts: u32,
    /// Safe upper bound on a single requested claim amount.
    pub safe_max_amount: Amount,
    /// Recipient of the admin split. Required; validated at load time.
    pub admin_wallet: Option<Address>,
    /// Name of the environment variable holding the protocol mint-authority
    /// secret key (hex or base58, 32 or 64 bytes). Never the secret itself.
    pub mint_authority_secret_env: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tokens_per_period: Amount::from_u64(DEFAULT_TOKENS_PER_PERIOD),
            inflation_period_secs: DEFAULT_INFLATION_PERIOD_SECS,
            split_percent_to_claimers: DEFAULT_SPLIT_PERCENT_TO_CLAIMERS,
            recency_window_secs: DEFAULT_RECENCY_WINDOW_SECS,
            prepared_ttl_secs: DEFAULT_PREPARED_TTL_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            safe_max_amount: Amount::from_u64(DEFAULT_SAFE_MAX_AMOUNT),
            admin_wallet: None,
            mint_authority_secret_env: "EMIT_MINT_AUTHORITY_SECRET".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then overlay a JSON config file if one is given.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::EmissionError> {
        let mut cfg = Self::default();
        if let Some(p) = path {
            let text = std::fs::read_to_string(p).map_err(|e| {
                crate::error::EmissionError::Misconfiguration(format!(
                    "reading config file {}: {e}",
                    p.display()
                ))
            })?;
            cfg = serde_json::from_str(&text).map_err(|e| {
                crate::error::EmissionError::Misconfiguration(format!(
                    "parsing config file {}: {e}",
                    p.display()
                ))
            })?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), crate::error::EmissionError> {
        if self.admin_wallet.is_none() {
            return Err(crate::error::EmissionError::Misconfiguration(
                "adminWallet is required".to_string(),
            ));
        }
        if self.split_percent_to_claimers > 100 {
            return Err(crate::error::EmissionError::Misconfiguration(
                "splitPercentToClaimers must be <= 100".to_string(),
            ));
        }
        Ok(())
    }
}
