//! HTTP routes of the internal API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use zkvote_prover::{ProofProvider, ProofRequest};
use zkvote_salt::{
    ApiEnvelope, SaltCache, SaltError, SaltLookupRequest, SaltProvider, StoreUserRequest,
    UserSalt, SALT_LOOKUP_PATH, STORE_USER_PATH,
};

use crate::ApiMetrics;

pub const PROOF_PATH: &str = "/api/zkp/get";

/// Shared state available to all handlers.
pub struct ApiState {
    /// Answers salt lookups.
    pub salts: Arc<dyn SaltProvider>,
    /// Backing cache written by the store endpoint. Should be the cache the
    /// salt provider reads from.
    pub cache: Arc<dyn SaltCache>,
    pub prover: Arc<dyn ProofProvider>,
    pub metrics: Arc<ApiMetrics>,
}

/// Build the router with all routes and the CORS layer.
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route(SALT_LOOKUP_PATH, post(lookup_salt))
        .route(STORE_USER_PATH, post(store_user))
        .route(PROOF_PATH, post(get_proof))
        .with_state(Arc::new(state))
        .layer(cors)
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics(State(state): State<Arc<ApiState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ── Salt ─────────────────────────────────────────────────────────────────

/// Reply with an envelope; the HTTP status mirrors `envelope.status`.
fn envelope<T: Serialize>(envelope: ApiEnvelope<T>) -> Response {
    let status = StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

fn failure(status: StatusCode, text: String) -> Response {
    envelope(ApiEnvelope {
        status: status.as_u16(),
        status_text: text,
        data: String::new(),
    })
}

/// POST /api/userinfo/get/salt: `{ subject, jwt }` → `{ subject, salt }`.
async fn lookup_salt(State(state): State<Arc<ApiState>>, body: Bytes) -> Response {
    let request = match SaltLookupRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            state.metrics.salt_lookup_rejections.inc();
            tracing::debug!(error = %e, "rejected salt lookup");
            return envelope(ApiEnvelope::validation_failure(e.to_string()));
        }
    };

    match state.salts.salt_for(&request.subject, &request.jwt).await {
        Ok(salt) => {
            state.metrics.salt_lookups.inc();
            envelope(ApiEnvelope::ok(salt))
        }
        Err(e) => {
            state.metrics.salt_lookup_failures.inc();
            tracing::warn!(subject = %request.subject, error = %e, "salt lookup failed");
            let status = if matches!(e, SaltError::SaltUnavailable(_)) {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            failure(status, e.to_string())
        }
    }
}

/// POST /api/userinfo/store: record a subject's salt in the cache.
///
/// The `jwt` must decode to a token whose `sub` is `subject`. A subject's
/// first salt is final: storing the same salt again is a no-op, storing a
/// different one is answered with 409 and changes nothing.
async fn store_user(State(state): State<Arc<ApiState>>, body: Bytes) -> Response {
    let request = match StoreUserRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            state.metrics.user_store_rejections.inc();
            return envelope(ApiEnvelope::validation_failure(e.to_string()));
        }
    };

    let claims = match zkvote_identity::decode(&request.jwt) {
        Ok(claims) => claims,
        Err(e) => {
            state.metrics.user_store_rejections.inc();
            return envelope(ApiEnvelope::validation_failure(e.to_string()));
        }
    };
    if claims.sub != request.subject {
        state.metrics.user_store_rejections.inc();
        tracing::warn!(subject = %request.subject, "store request token belongs to another subject");
        return envelope(ApiEnvelope::validation_failure(
            "jwt subject does not match the request subject",
        ));
    }

    let held = match state.cache.put(&request.subject, &request.salt) {
        Ok(held) => held,
        Err(e) => {
            tracing::error!(subject = %request.subject, error = %e, "cannot store user salt");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    if held != request.salt {
        state.metrics.user_store_rejections.inc();
        tracing::warn!(subject = %request.subject, "refusing to replace the subject's salt");
        return failure(
            StatusCode::CONFLICT,
            "subject already has a different salt".to_string(),
        );
    }
    state.metrics.users_stored.inc();
    tracing::info!(subject = %request.subject, "stored user salt");

    envelope(ApiEnvelope::ok(UserSalt {
        subject: request.subject,
        salt: held,
    }))
}

// ── Proof ────────────────────────────────────────────────────────────────

/// POST /api/zkp/get: forward a proof request; `{ zkp }` on success.
async fn get_proof(State(state): State<Arc<ApiState>>, body: Bytes) -> Response {
    let request: ProofRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("wrong body format: {e}") })),
            )
                .into_response()
        }
    };

    state.metrics.proof_requests.inc();
    match state.prover.request_proof(&request).await {
        Ok(zkp) => Json(json!({ "zkp": zkp })).into_response(),
        Err(e) => {
            state.metrics.proof_failures.inc();
            tracing::warn!(max_epoch = request.max_epoch, error = %e, "proof request failed");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
