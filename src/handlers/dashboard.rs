//! HTTP surface for the interactive dashboard.
//!
//! This is the chart-surface contract: `GET /view` returns the series layers
//! to render, `POST /view/click` accepts a click translated to a timestamp by
//! the chart, and the remaining routes mutate the filter or reset the view.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::series::{SeriesPoint, SeriesRole};
use crate::services::aggregation::DishFilter;
use crate::services::analytics::Report;
use crate::services::dashboard::{ClickOutcome, DrillState, FilterState, ViewSnapshot};
use crate::{ApiResponse, AppState};

/// Build the dashboard Router scoped under `/api/v1`.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/view", get(get_view))
        .route("/view/filters", put(update_filters))
        .route("/view/click", post(click))
        .route("/view/reset", post(reset))
        .route("/dishes", get(list_dishes))
}

/// One renderable chart layer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartLayer {
    pub role: SeriesRole,
    pub points: Vec<SeriesPoint>,
}

/// The current view: filter, drill level, and the layers to draw.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ViewResponse {
    pub filter: FilterState,
    pub drill: DrillState,
    pub layers: Vec<ChartLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl From<ViewSnapshot> for ViewResponse {
    fn from(snapshot: ViewSnapshot) -> Self {
        let mut layers = Vec::new();
        if !snapshot.historical.is_empty() {
            layers.push(ChartLayer {
                role: SeriesRole::Historical,
                points: snapshot.historical.points().to_vec(),
            });
        }
        if let Some(forecast) = &snapshot.forecast {
            layers.push(ChartLayer {
                role: SeriesRole::Forecast,
                points: forecast.points().to_vec(),
            });
        }
        Self {
            filter: snapshot.filter,
            drill: snapshot.drill,
            layers,
            diagnostic: snapshot.diagnostic,
        }
    }
}

/// A click event, already translated from screen space to a time value by
/// the chart surface.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClickRequest {
    pub timestamp: NaiveDateTime,
}

/// What the click did.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickResponse {
    Drilled {
        view: ViewResponse,
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<Report>,
    },
    Report { report: Report },
    Unavailable { message: String },
    Miss,
}

impl From<ClickOutcome> for ClickResponse {
    fn from(outcome: ClickOutcome) -> Self {
        match outcome {
            ClickOutcome::Drilled { view, report } => {
                ClickResponse::Drilled { view: view.into(), report }
            }
            ClickOutcome::Report(report) => ClickResponse::Report { report },
            ClickOutcome::Unavailable { message } => ClickResponse::Unavailable { message },
            ClickOutcome::Miss => ClickResponse::Miss,
        }
    }
}

/// Dish names offered by the filter control, `All` first.
#[derive(Debug, Serialize, ToSchema)]
pub struct DishesResponse {
    pub dishes: Vec<String>,
}

/// Get the currently rendered view.
#[utoipa::path(
    get,
    path = "/api/v1/view",
    responses(
        (status = 200, description = "Current view", body = ApiResponse<ViewResponse>)
    ),
    tag = "Dashboard"
)]
pub async fn get_view(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ViewResponse>>, ServiceError> {
    let dashboard = state.dashboard.lock().await;
    Ok(Json(ApiResponse::success(dashboard.snapshot().into())))
}

/// Replace the filter state. The drill level is preserved and the series
/// recomputed.
#[utoipa::path(
    put,
    path = "/api/v1/view/filters",
    request_body = FilterState,
    responses(
        (status = 200, description = "Updated view", body = ApiResponse<ViewResponse>),
        (status = 404, description = "Unknown dish", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn update_filters(
    State(state): State<AppState>,
    Json(filter): Json<FilterState>,
) -> Result<Json<ApiResponse<ViewResponse>>, ServiceError> {
    if let DishFilter::Dish(name) = &filter.dish {
        if !state.store.dishes().iter().any(|d| d == name) {
            return Err(ServiceError::NotFound(format!("dish {}", name)));
        }
    }

    let mut dashboard = state.dashboard.lock().await;
    Ok(Json(ApiResponse::success(dashboard.set_filter(filter).into())))
}

/// Deliver a click; responds with a drill transition, a point report, a
/// "no data" notice, or a miss.
#[utoipa::path(
    post,
    path = "/api/v1/view/click",
    request_body = ClickRequest,
    responses(
        (status = 200, description = "Click outcome", body = ApiResponse<ClickResponse>)
    ),
    tag = "Dashboard"
)]
pub async fn click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<ApiResponse<ClickResponse>>, ServiceError> {
    let mut dashboard = state.dashboard.lock().await;
    let outcome = dashboard.click(request.timestamp);
    Ok(Json(ApiResponse::success(outcome.into())))
}

/// Reset to the yearly overview with Daily aggregation.
#[utoipa::path(
    post,
    path = "/api/v1/view/reset",
    responses(
        (status = 200, description = "Reset view", body = ApiResponse<ViewResponse>)
    ),
    tag = "Dashboard"
)]
pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ViewResponse>>, ServiceError> {
    let mut dashboard = state.dashboard.lock().await;
    Ok(Json(ApiResponse::success(dashboard.reset().into())))
}

/// List the dish filter options.
#[utoipa::path(
    get,
    path = "/api/v1/dishes",
    responses(
        (status = 200, description = "Dish filter options", body = ApiResponse<DishesResponse>)
    ),
    tag = "Dashboard"
)]
pub async fn list_dishes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DishesResponse>>, ServiceError> {
    let mut dishes = vec!["All".to_string()];
    dishes.extend(state.store.dishes().iter().cloned());
    Ok(Json(ApiResponse::success(DishesResponse { dishes })))
}
