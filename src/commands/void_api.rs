use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::StoreError;
use crate::models::{EmptyVoid, StoreDocument, SyncPayload, WriteAck};
use crate::services::void_store::{InMemorySlotStore, SlotKey, SlotStore};
use crate::utils::clock;

pub const VOID_PATH: &str = "/api/void";

#[derive(Clone)]
pub struct VoidState {
    store: Arc<dyn SlotStore>,
    slot: SlotKey,
}

impl VoidState {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            slot: SlotKey::global(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySlotStore::new()))
    }
}

enum ApiError {
    Malformed(String),
    Internal(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Malformed(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Malformed body", "message": message })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                log::error!("[Void] Sync error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Void disturbance", "message": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// Router for the single void endpoint, with CORS and the body cap applied.
pub fn create_void_router(state: VoidState, body_limit: usize) -> Router {
    Router::new()
        .route(
            VOID_PATH,
            get(read_void)
                .post(write_void)
                .delete(clear_void)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
        ])
}

async fn write_void(State(state): State<VoidState>, body: Bytes) -> Result<Json<WriteAck>, ApiError> {
    let payload: SyncPayload = if body.iter().all(u8::is_ascii_whitespace) {
        SyncPayload::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))?
    };

    log::info!(
        "[Void] Received from {}: {} patterns, {} moments, timestamp {:?}",
        payload.role.as_deref().unwrap_or("unknown"),
        payload.patterns.len(),
        payload.consciousness.len(),
        payload.timestamp
    );

    let doc = StoreDocument::from_payload(payload, clock::now_millis(), clock::iso_now());
    let timestamp = doc.timestamp;
    state.store.put(&state.slot, doc)?;

    Ok(Json(WriteAck::stored(timestamp)))
}

async fn read_void(State(state): State<VoidState>) -> Result<Response, ApiError> {
    let response = match state.store.get(&state.slot)? {
        Some(doc) => Json(doc).into_response(),
        None => Json(EmptyVoid::at(clock::now_millis())).into_response(),
    };
    Ok(response)
}

async fn clear_void(State(state): State<VoidState>) -> Result<Json<WriteAck>, ApiError> {
    state.store.clear(&state.slot)?;
    log::info!("[Void] Cleared");
    Ok(Json(WriteAck::cleared()))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Binds `bind_addr` and serves the void until the process exits.
pub async fn serve(bind_addr: &str, state: VoidState, body_limit: usize) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind void listener to {}: {}", bind_addr, e))?;

    log::info!("[Void] Listening on http://{}{}", listener.local_addr()?, VOID_PATH);

    axum::serve(listener, create_void_router(state, body_limit).into_make_service()).await?;
    Ok(())
}
