//! The HTTP ingress surface of spec.md §6: three JSON endpoints plus the
//! supplemented `/health` and `/claims/{token}/config` surface from
//! SPEC_FULL.md §11. Built on `axum`, layered with the same
//! `tower`/`tower-http` CORS middleware the reference node's RPC server
//! uses (see `chronx-rpc::server::RpcServer::start`).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use emit_core::{Amount, EmissionError, MonotonicMs, Timestamp};
use emit_engine::{BuiltClaim, ClaimEngine, SignedTransaction};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::dto::{
    parse_address, ConfirmRequest, ConfirmResponse, ConfirmationStatusDto, EligibilityQuery,
    EligibilityResponse, MintRequest, MintResponse, PublicConfigResponse,
};
use crate::error::ApiError;

pub struct AppState {
    pub engine: Arc<ClaimEngine>,
    started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<ClaimEngine>) -> Self {
        Self { engine, started_at: Instant::now() }
    }

    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }

    fn now_ms(&self) -> MonotonicMs {
        self.started_at.elapsed().as_millis() as MonotonicMs
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/claims/:token", get(get_eligibility))
        .route("/claims/:token/config", get(get_public_config))
        .route("/claims/mint", post(post_mint))
        .route("/claims/confirm", post(post_confirm))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "claim engine API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_public_config(State(state): State<Arc<AppState>>) -> Json<PublicConfigResponse> {
    let cfg = state.engine.config();
    Json(PublicConfigResponse {
        tokens_per_period: cfg.tokens_per_period.clone(),
        inflation_period_secs: cfg.inflation_period_secs,
        split_percent_to_claimers: cfg.split_percent_to_claimers,
        recency_window_secs: cfg.recency_window_secs,
        prepared_ttl_secs: cfg.prepared_ttl_secs,
        poll_interval_ms: cfg.poll_interval_ms,
        poll_max_attempts: cfg.poll_max_attempts,
    })
}

async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    Path(token_raw): Path<String>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let wallet_raw = query.wallet.ok_or(EmissionError::MissingField("wallet"))?;
    let token = parse_address("tokenAddress", &token_raw)?;
    let wallet = parse_address("wallet", &wallet_raw)?;

    let now = state.now();
    let snapshot = state.engine.get_eligibility(token, now).await?;
    let e = snapshot.eligibility;
    let time_until_next_claim = (e.next_inflation_time - now).max(0);

    Ok(Json(EligibilityResponse {
        wallet_address: wallet.to_base58(),
        token_address: token.to_base58(),
        total_claimed: e.total_minted,
        available_to_claim: e.available_to_claim,
        max_claimable_now: e.max_claimable_now,
        tokens_per_period: state.engine.config().tokens_per_period.clone(),
        inflation_periods: e.inflation_periods,
        token_launch_time: snapshot.launch,
        next_inflation_time: e.next_inflation_time,
        can_claim_now: e.can_claim_now,
        time_until_next_claim,
    }))
}

async fn post_mint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MintRequest>,
) -> Result<Json<MintResponse>, ApiError> {
    let token = parse_address("tokenAddress", &req.token_address)?;
    let user_wallet = parse_address("userWallet", &req.user_wallet)?;
    let claim_amount =
        Amount::parse_decimal(&req.claim_amount).map_err(|_| EmissionError::InvalidAmountFormat)?;

    let now = state.now();
    let now_ms = state.now_ms();
    let mut rng = rand::rngs::OsRng;

    let outcome = state
        .engine
        .prepare_claim(token, user_wallet, claim_amount.clone(), now, now_ms, &mut rng)
        .await
        .map_err(|err| {
            warn!(token = %token, user = %user_wallet, kind = err.kind(), "prepare rejected");
            err
        })?;

    let transaction = encode_message(&outcome.built);

    Ok(Json(MintResponse {
        success: true,
        transaction,
        transaction_key: outcome.transaction_key,
        claim_amount,
        message: "sign the returned transaction and submit it to claims/confirm".to_string(),
    }))
}

async fn post_confirm(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let signed = decode_signed_transaction(&req.signed_transaction)?;

    let now = state.now();
    let now_ms = state.now_ms();

    let outcome = state
        .engine
        .confirm_claim(req.transaction_key, signed, now, now_ms)
        .await
        .map_err(|err| {
            warn!(kind = err.kind(), "confirm rejected");
            err
        })?;

    Ok(Json(ConfirmResponse {
        success: true,
        transaction_signature: outcome.signature,
        token_address: outcome.token.to_base58(),
        claim_amount: outcome.requested_amount,
        confirmation: ConfirmationStatusDto {
            err: outcome.status.err,
            confirmation_status: outcome.status.confirmation_status,
        },
    }))
}

fn encode_message(built: &BuiltClaim) -> String {
    let bytes = bincode::serialize(&built.message).expect("Message serialization is infallible");
    bs58::encode(bytes).into_string()
}

fn decode_signed_transaction(encoded: &str) -> Result<SignedTransaction, EmissionError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|_| EmissionError::InvalidAmountFormat)?;
    bincode::deserialize(&bytes).map_err(|_| EmissionError::TransactionModified)
}
