//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use fxquote_common::{PricedQuote, QuoteRequest, RequestId};
use fxquote_fx::Pricer;
use tower_http::trace::TraceLayer;
use tracing::{info_span, Instrument};

use crate::error::{ApiError, ApiResult};

/// Shared state handed to every handler.
pub struct AppState {
    pub pricer: Pricer,
}

impl AppState {
    pub fn new(pricer: Pricer) -> Self {
        Self { pricer }
    }
}

/// Price a conversion.
///
/// The body is read as text and decoded here rather than through the `Json`
/// extractor: browser clients post the payload without a JSON content type.
async fn price_quote(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<PricedQuote>> {
    let request: QuoteRequest = serde_json::from_str(&body)
        .map_err(|e| ApiError::MalformedBody(format!("Malformed quote request: {}", e)))?;

    let request_id = RequestId::new();
    let quote = state
        .pricer
        .price(&request)
        .instrument(info_span!("pricing_request", request_id = %request_id))
        .await?;

    Ok(Json(quote))
}

async fn health() -> &'static str {
    "ok"
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fx", post(price_quote))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
