//! emit-api
//!
//! The HTTP ingress surface: wraps a `ClaimEngine` behind the JSON contract
//! wallets and front-ends speak to mint an emission claim.

pub mod dto;
pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{router, serve, AppState};
