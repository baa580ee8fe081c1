//! Axum HTTP server: stateless optimization endpoints.
//!
//! Every request is self-contained — rates, tensor, and search state live
//! and die inside the handler, so there is no shared application state to
//! carry. The pipeline is CPU-bound and runs under `spawn_blocking` to keep
//! the async executor responsive.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/optimize` | Rank the top-N batting orders for nine hitters |
//! | POST | `/score` | Score one caller-specified batting order |

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::error::OptimizerError;
use crate::optimizer;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn create_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/optimize", post(handle_optimize))
        .route("/score", post(handle_score))
        .layer(cors)
}

/// Wire status for each error kind. 499 (client closed request) covers both
/// the request deadline and the hard cap.
fn status_for(err: &OptimizerError) -> StatusCode {
    match err {
        OptimizerError::MalformedRequest(_)
        | OptimizerError::MalformedConstraints(_)
        | OptimizerError::InvalidStats { .. }
        | OptimizerError::RateOverflow { .. } => StatusCode::BAD_REQUEST,
        OptimizerError::InfeasibleConstraints | OptimizerError::NoFeasibleLineup => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        OptimizerError::Cancelled(_) | OptimizerError::Deadline(_) => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT)
        }
        OptimizerError::NumericInstability => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &OptimizerError) -> ApiError {
    (
        status_for(err),
        Json(serde_json::json!({ "error": err.to_string(), "kind": err.kind() })),
    )
}

fn join_failure() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "optimization task failed", "kind": "Internal" })),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_optimize(
    Json(body): Json<serde_json::Value>,
) -> Result<Json<api::WireResponse>, ApiError> {
    let request = api::parse_optimize_request(body).map_err(|e| error_response(&e))?;

    let computation = tokio::task::spawn_blocking(move || {
        let ranked = optimizer::optimize(&request)?;
        Ok::<_, OptimizerError>(api::to_wire_response(&ranked, &request.hitters))
    });

    match computation.await {
        Ok(Ok(response)) => Ok(Json(response)),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(_) => Err(join_failure()),
    }
}

async fn handle_score(
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (hitters, order) = api::parse_score_request(body).map_err(|e| error_response(&e))?;

    let computation =
        tokio::task::spawn_blocking(move || optimizer::score_order(&hitters, &order));

    match computation.await {
        Ok(Ok(score)) => Ok(Json(serde_json::json!({ "score": score }))),
        Ok(Err(err)) => Err(error_response(&err)),
        Err(_) => Err(join_failure()),
    }
}
