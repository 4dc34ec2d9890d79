use utoipa::OpenApi;

use crate::handlers::dashboard;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OrderLens API",
        version = "0.3.0",
        description = "Interactive analytics for restaurant order volume: \
            dish filtering, Daily/Weekly/Monthly aggregation, ARIMA/SARIMA \
            forecast overlays, and click-driven drill-down from the yearly \
            overview into historical or forecast months.",
        license(name = "MIT")
    ),
    paths(
        dashboard::get_view,
        dashboard::update_filters,
        dashboard::click,
        dashboard::reset,
        dashboard::list_dishes,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::ml::ForecastModel,
        crate::series::Granularity,
        crate::series::SeriesPoint,
        crate::series::SeriesRole,
        crate::series::TimeSeries,
        crate::services::analytics::ForecastMonthReport,
        crate::services::analytics::ForecastReport,
        crate::services::analytics::HistoricalReport,
        crate::services::analytics::Report,
        crate::services::analytics::Trend,
        crate::services::dashboard::DrillState,
        crate::services::dashboard::FilterState,
        dashboard::ChartLayer,
        dashboard::ClickRequest,
        dashboard::ClickResponse,
        dashboard::DishesResponse,
        dashboard::ViewResponse,
    )),
    tags(
        (name = "Dashboard", description = "Interactive order volume exploration")
    )
)]
pub struct ApiDoc;
