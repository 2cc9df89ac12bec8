//! emit-engine
//!
//! The claim state machine: eligibility arithmetic, authorization, unsigned
//! transaction building, the pending-claim registry, per-token locking,
//! Confirm-time verification, and chain submission — wired together by
//! `ClaimEngine`.

pub mod authorizer;
pub mod builder;
pub mod collaborators;
pub mod eligibility;
pub mod engine;
pub mod lock;
pub mod registry;
pub mod submitter;
pub mod verifier;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use authorizer::Authorizer;
pub use builder::{BuiltClaim, Instruction, Message, SignedTransaction, TransactionBuilder};
pub use collaborators::{
    AuditStore, ChainGateway, Commitment, ConfirmationStatus, DesignatedClaim, IdentityRegistry,
    MintInfo, SendOptions,
};
pub use eligibility::EligibilityCalculator;
pub use engine::{ClaimEngine, ConfirmOutcome, EligibilitySnapshot, PrepareOutcome};
pub use lock::{ClaimLock, LockGuard};
pub use registry::PendingClaimRegistry;
pub use submitter::{SubmissionOutcome, Submitter};
pub use verifier::Verifier;
