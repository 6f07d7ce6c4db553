//! HTTP surface: the rates route plus a liveness root.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::aggregator::{RateAggregator, RatesResponse};

pub struct AppState {
    pub aggregator: RateAggregator,
}

#[derive(Debug, Serialize)]
struct Liveness {
    service: &'static str,
    version: &'static str,
    status: &'static str,
}

/// `GET /` - liveness envelope.
async fn root() -> Json<Liveness> {
    Json(Liveness {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// `GET /rates` - fetch and reshape the three bolivar rates.
///
/// Always answers `200 OK` with a well-formed envelope; failures below the
/// HTTP layer are folded into the body by the aggregator.
async fn get_rates(State(state): State<Arc<AppState>>) -> Json<RatesResponse> {
    Json(state.aggregator.collect().await)
}

pub fn app_router(state: Arc<AppState>) -> Router {
    // The service is consumed by browser dashboards on arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/rates", get(get_rates))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
