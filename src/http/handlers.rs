//! Route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::lookup::PostalCode;
use crate::resilience::BreakerSnapshot;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub breaker: BreakerSnapshot,
}

/// `GET /infocep/{cep}`: always 200 with a record, unless strict validation
/// rejects the code.
pub async fn lookup_address(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> Response {
    let code = PostalCode::from(cep);

    if state.strict_validation && !code.is_well_formed() {
        tracing::warn!(cep = %code, "Rejected malformed postal code");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: format!("invalid postal code '{}'", code),
            }),
        )
            .into_response();
    }

    let record = state.gateway.resolve(&code).await;
    (StatusCode::OK, Json(record)).into_response()
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        breaker: state.gateway.breaker(),
    })
}
