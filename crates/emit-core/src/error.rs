use thiserror::Error;

use crate::types::{Amount, Timestamp};

/// Every error the engine can produce, end to end — HTTP handlers down to
/// collaborator calls all return `Result<_, EmissionError>`. No kind is
/// silently swallowed; §7 of the specification is authoritative for which
/// kind maps to which HTTP status.
#[derive(Debug, Error)]
pub enum EmissionError {
    // ── Eligibility ──────────────────────────────────────────────────────
    #[error("token unknown to identity registry: {0}")]
    TokenUnknown(String),

    // ── Request shape ───────────────────────────────────────────────────
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {0} is not a valid address")]
    InvalidAddressFormat(&'static str),

    #[error("amount is not a valid decimal integer")]
    InvalidAmountFormat,

    #[error("amount must be greater than zero")]
    InvalidAmountValue,

    #[error("amount exceeds the maximum a single claim may request")]
    AmountTooLarge,

    #[error("requested amount {requested} exceeds available {available}")]
    AmountExceedsAvailable { requested: Amount, available: Amount },

    #[error("no tokens available to claim yet; next inflation at {next_inflation_time}")]
    NoTokensAvailable { next_inflation_time: Timestamp },

    // ── Builder / mint authority ─────────────────────────────────────────
    #[error("configured mint authority does not match on-chain mint authority")]
    MintAuthorityMismatch,

    #[error("creator wallet on file is not a valid on-curve address")]
    CreatorWalletInvalid,

    #[error("chain gateway unavailable: {0}")]
    ChainUnavailable(String),

    // ── Authorization ────────────────────────────────────────────────────
    #[error("token has no creator on file")]
    CreatorUnknown,

    #[error("wallet is not the creator of this token")]
    CreatorForbidden,

    #[error("token has been designated but no verified wallet is on file")]
    DesignatedUnverified,

    #[error("wallet is not the designated identity's verified wallet")]
    DesignatedForbidden,

    #[error("the original launcher may not claim a designated token")]
    DesignatedDeniedToLauncher,

    // ── Registry / verification ──────────────────────────────────────────
    #[error("unknown or expired transaction key")]
    UnknownTransactionKey,

    #[error("authorized signer not present in transaction account keys")]
    SignerAbsent,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("blockhash is no longer valid")]
    BlockhashExpired,

    #[error("transaction message does not match the prepared fingerprint")]
    TransactionModified,

    #[error("eligibility changed since prepare")]
    EligibilityChanged,

    #[error("a claim for this token was recorded within the recency window")]
    RecentClaimBlocked,

    // ── Submission ────────────────────────────────────────────────────────
    #[error("transaction failed on-chain: {0}")]
    TransactionFailed(String),

    #[error("timed out waiting for confirmation")]
    ConfirmationTimeout,

    // ── Operational ──────────────────────────────────────────────────────
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EmissionError {
    /// Stable, client-facing kind name — the identifier the API surfaces in
    /// JSON error bodies (and that tests assert against). Never the
    /// `Display` message, which may carry interpolated detail.
    pub fn kind(&self) -> &'static str {
        match self {
            EmissionError::TokenUnknown(_) => "TokenUnknown",
            EmissionError::MissingField(_) => "MissingField",
            EmissionError::InvalidAddressFormat(_) => "InvalidAddressFormat",
            EmissionError::InvalidAmountFormat => "InvalidAmountFormat",
            EmissionError::InvalidAmountValue => "InvalidAmountValue",
            EmissionError::AmountTooLarge => "AmountTooLarge",
            EmissionError::AmountExceedsAvailable { .. } => "AmountExceedsAvailable",
            EmissionError::NoTokensAvailable { .. } => "NoTokensAvailable",
            EmissionError::MintAuthorityMismatch => "MintAuthorityMismatch",
            EmissionError::CreatorWalletInvalid => "CreatorWalletInvalid",
            EmissionError::ChainUnavailable(_) => "ChainUnavailable",
            EmissionError::CreatorUnknown => "CreatorUnknown",
            EmissionError::CreatorForbidden => "CreatorForbidden",
            EmissionError::DesignatedUnverified => "DesignatedUnverified",
            EmissionError::DesignatedForbidden => "DesignatedForbidden",
            EmissionError::DesignatedDeniedToLauncher => "DesignatedDeniedToLauncher",
            EmissionError::UnknownTransactionKey => "UnknownTransactionKey",
            EmissionError::SignerAbsent => "SignerAbsent",
            EmissionError::SignatureInvalid => "SignatureInvalid",
            EmissionError::BlockhashExpired => "BlockhashExpired",
            EmissionError::TransactionModified => "TransactionModified",
            EmissionError::EligibilityChanged => "EligibilityChanged",
            EmissionError::RecentClaimBlocked => "RecentClaimBlocked",
            EmissionError::TransactionFailed(_) => "TransactionFailed",
            EmissionError::ConfirmationTimeout => "ConfirmationTimeout",
            EmissionError::Misconfiguration(_) => "Misconfiguration",
            EmissionError::Internal(_) => "Internal",
        }
    }
}
