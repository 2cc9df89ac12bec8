//! Maps `EmissionError` to HTTP status + the stable JSON error `kind`
//! string clients match against (spec.md §7). This is the single place
//! that decision happens — no handler hand-rolls a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use emit_core::EmissionError;
use serde::Serialize;
use serde_json::{json, Value};

pub struct ApiError(pub EmissionError);

impl From<EmissionError> for ApiError {
    fn from(err: EmissionError) -> Self {
        Self(err)
    }
}

fn status_for(err: &EmissionError) -> StatusCode {
    use EmissionError::*;
    match err {
        TokenUnknown(_) => StatusCode::NOT_FOUND,
        MissingField(_) | InvalidAddressFormat(_) | InvalidAmountFormat | InvalidAmountValue | AmountTooLarge
        | AmountExceedsAvailable { .. } | NoTokensAvailable { .. } | MintAuthorityMismatch
        | CreatorWalletInvalid | UnknownTransactionKey | SignerAbsent | SignatureInvalid
        | BlockhashExpired | TransactionModified | EligibilityChanged | RecentClaimBlocked => {
            StatusCode::BAD_REQUEST
        }
        CreatorUnknown | CreatorForbidden => StatusCode::BAD_REQUEST,
        DesignatedUnverified | DesignatedForbidden | DesignatedDeniedToLauncher => {
            StatusCode::FORBIDDEN
        }
        ChainUnavailable(_) | TransactionFailed(_) | ConfirmationTimeout | Misconfiguration(_)
        | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Extra fields a handful of error kinds carry per §7 (e.g.
/// `NoTokensAvailable` includes `nextInflationTime`).
fn extra_fields(err: &EmissionError) -> Value {
    match err {
        EmissionError::NoTokensAvailable { next_inflation_time } => {
            json!({ "nextInflationTime": next_inflation_time })
        }
        EmissionError::AmountExceedsAvailable { requested, available } => {
            json!({ "requested": requested.to_string(), "available": available.to_string() })
        }
        _ => Value::Null,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(flatten, skip_serializing_if = "Value::is_null")]
    extra: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ErrorBody {
            success: false,
            error: self.0.kind(),
            message: self.0.to_string(),
            extra: extra_fields(&self.0),
        };
        (status, Json(body)).into_response()
    }
}
