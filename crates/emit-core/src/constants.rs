//! ─── Emission Claim Engine defaults ─────────────────────────────────────
//!
//! Every value here is an `EngineConfig` default and may be overridden at
//! startup (see `config.rs`). None of these are protocol-immutable the way
//! the reference node's genesis constants are — they are operator knobs.

/// Emission per inflation period, in claim-portion units (pre-decimal
/// scaling — see the Open Question this resolves in DESIGN.md).
pub const DEFAULT_TOKENS_PER_PERIOD: u64 = 1_000_000;

/// Seconds per inflation period.
pub const DEFAULT_INFLATION_PERIOD_SECS: i64 = 3_600;

/// Integer percent of a claim that goes to claimers; the residue goes to
/// the admin wallet.
pub const DEFAULT_SPLIT_PERCENT_TO_CLAIMERS: u64 = 90;

/// Recency window, in seconds: any prior successful claim for a token
/// within this window blocks new claims regardless of eligibility.
pub const DEFAULT_RECENCY_WINDOW_SECS: i64 = 360;

/// TTL, in seconds, for a `PreparedClaim` sitting in the registry.
pub const DEFAULT_PREPARED_TTL_SECS: u64 = 300;

/// Confirmation poll interval, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Maximum confirmation poll attempts (≈4s at the default interval).
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 20;

/// Implementation-defined safe maximum for a single claim's requested
/// amount, pre-decimal-scaling. Chosen well above any plausible
/// `tokensPerPeriod * inflationPeriods` so it only ever rejects malformed
/// or adversarial input, never a legitimate claim.
pub const DEFAULT_SAFE_MAX_AMOUNT: u64 = 1_000_000_000_000;
