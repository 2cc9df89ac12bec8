//! emit-core
//!
//! Wire-agnostic value types, the workspace-wide error enum, protocol
//! defaults, and the `EngineConfig` loader for the Emission Claim Engine.
//! Every other crate in the workspace depends on this one and nothing
//! flows the other way.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::EmissionError;
pub use types::{
    Address, Amount, Authorization, ClaimMode, Eligibility, Fingerprint, MonotonicMs,
    PreparedClaim, SplitRecipient, Timestamp, TransactionKey,
};
