//! OrderLens API Library
//!
//! Interactive analytics engine for restaurant order volume: a pure
//! aggregation/forecast/hit-test core behind a thin HTTP surface.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ml;
pub mod openapi;
pub mod series;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::services::dashboard::DashboardService;
use crate::store::EventLogStore;

/// Shared application state: the read-only event log plus the single
/// interactive dashboard session. User actions serialize through the session
/// lock, so no action begins before the previous one's state mutation
/// completes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventLogStore>,
    pub config: config::AppConfig,
    pub dashboard: Arc<Mutex<DashboardService>>,
}

impl AppState {
    pub fn new(store: Arc<EventLogStore>, config: config::AppConfig) -> Self {
        let dashboard = Arc::new(Mutex::new(DashboardService::new(store.clone())));
        Self { store, config, dashboard }
    }
}

// Common response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Full v1 API: status/health plus the dashboard surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(handlers::dashboard::dashboard_routes())
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "service": "orderlens-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    // The store is immutable and fully resident once startup succeeds.
    let (start, end) = state.store.date_range();
    let health_data = json!({
        "status": "healthy",
        "dataset": {
            "rows": state.store.len(),
            "dishes": state.store.dishes().len(),
            "start": start,
            "end": end,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}
