//! View state machine for the interactive dashboard.
//!
//! Owns the current `FilterState` and `DrillState`, orchestrates the
//! aggregation and forecast pipelines, and resolves clicks into either a
//! drill transition or an analytics report. Both state values are replaced
//! wholesale on each transition, never partially mutated mid-computation.

use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::ml::forecasting::{self, MonthForecastError};
use crate::ml::ForecastModel;
use crate::series::{Granularity, TimeSeries};
use crate::services::aggregation::{aggregate, DishFilter};
use crate::services::analytics::{
    summarize_forecast, summarize_forecast_month, summarize_historical, Report,
};
use crate::services::hit_test::{resolve_click, Hit};
use crate::store::EventLogStore;

/// Complete filter selection. Always fully defined; no partial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterState {
    #[schema(value_type = String)]
    pub dish: DishFilter,
    pub aggregation: Granularity,
    pub forecast_enabled: bool,
    pub model: ForecastModel,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            dish: DishFilter::All,
            aggregation: Granularity::Daily,
            forecast_enabled: false,
            model: ForecastModel::NonSeasonalArima,
        }
    }
}

/// Active drill level. Exactly one at a time; `Year` is the initial and reset
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum DrillState {
    Year,
    Month { month: u32 },
    ForecastMonth { month: u32, year: i32 },
}

/// Everything the chart surface needs to draw the current view.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ViewSnapshot {
    pub filter: FilterState,
    pub drill: DrillState,
    pub historical: TimeSeries,
    pub forecast: Option<TimeSeries>,
    /// Non-blocking notice when the forecast layer was dropped.
    pub diagnostic: Option<String>,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The view drilled down; the month digest accompanies a forecast-month
    /// drill.
    Drilled { view: ViewSnapshot, report: Option<Report> },
    /// No transition; a point report for the presentation layer.
    Report(Report),
    /// The requested drill had no data; the view is unchanged.
    Unavailable { message: String },
    /// Nothing within tolerance; no-op.
    Miss,
}

/// The interactive dashboard session.
pub struct DashboardService {
    store: Arc<EventLogStore>,
    filter: FilterState,
    drill: DrillState,
}

impl DashboardService {
    pub fn new(store: Arc<EventLogStore>) -> Self {
        Self {
            store,
            filter: FilterState::default(),
            drill: DrillState::Year,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn drill(&self) -> DrillState {
        self.drill
    }

    /// Replace the filter wholesale. The drill level is preserved; series and
    /// forecast are recomputed.
    #[instrument(skip(self, filter))]
    pub fn set_filter(&mut self, filter: FilterState) -> ViewSnapshot {
        self.filter = filter;
        self.snapshot()
    }

    /// Return to the yearly overview, forcing aggregation back to Daily.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> ViewSnapshot {
        self.filter = FilterState {
            aggregation: Granularity::Daily,
            ..self.filter.clone()
        };
        self.drill = DrillState::Year;
        info!("view reset to yearly overview");
        self.snapshot()
    }

    /// Recompute the rendered view. A pure function of the event log, the
    /// filter, and the drill state.
    pub fn snapshot(&self) -> ViewSnapshot {
        match self.drill {
            DrillState::Year => {
                let historical = aggregate(
                    self.store.events(),
                    &self.filter.dish,
                    None,
                    self.filter.aggregation,
                );
                let (forecast, diagnostic) = if self.filter.forecast_enabled {
                    match forecasting::forecast(
                        &historical,
                        self.filter.model,
                        self.filter.aggregation,
                    ) {
                        Ok(series) => (Some(series), None),
                        Err(e) => {
                            warn!(error = %e, "forecast overlay dropped");
                            (None, Some(format!("forecast unavailable: {}", e)))
                        }
                    }
                } else {
                    (None, None)
                };
                ViewSnapshot {
                    filter: self.filter.clone(),
                    drill: self.drill,
                    historical,
                    forecast,
                    diagnostic,
                }
            }
            // A fixed historical slice: the forecast layer is never computed
            // here, even with forecasting enabled.
            DrillState::Month { month } => ViewSnapshot {
                filter: self.filter.clone(),
                drill: self.drill,
                historical: aggregate(
                    self.store.events(),
                    &self.filter.dish,
                    Some(month),
                    self.filter.aggregation,
                ),
                forecast: None,
                diagnostic: None,
            },
            DrillState::ForecastMonth { month, year } => {
                let (forecast, diagnostic) = match self.month_forecast(month, year) {
                    Ok(series) => (Some(series), None),
                    Err(e) => {
                        warn!(error = %e, "forecast month view degraded");
                        (None, Some(e.to_string()))
                    }
                };
                ViewSnapshot {
                    filter: self.filter.clone(),
                    drill: self.drill,
                    historical: TimeSeries::empty(),
                    forecast,
                    diagnostic,
                }
            }
        }
    }

    /// Resolve a click against the current view and apply the transition
    /// table. Drill transitions happen only from the yearly view at Daily
    /// aggregation; everywhere else a hit produces an analytics report.
    #[instrument(skip(self), fields(at = %at))]
    pub fn click(&mut self, at: NaiveDateTime) -> ClickOutcome {
        let view = self.snapshot();
        let Some(hit) = resolve_click(at, &view.historical, view.forecast.as_ref()) else {
            return ClickOutcome::Miss;
        };

        match (self.drill, hit) {
            (DrillState::Year, Hit::Forecast { point, .. })
                if self.filter.aggregation == Granularity::Daily =>
            {
                let (month, year) = (point.date.month(), point.date.year());
                match self.month_forecast(month, year) {
                    Ok(series) => {
                        self.drill = DrillState::ForecastMonth { month, year };
                        info!(month, year, "drilled into forecast month");
                        let report = summarize_forecast_month(&series, month, year);
                        ClickOutcome::Drilled { view: self.snapshot(), report: Some(report) }
                    }
                    Err(e @ MonthForecastError::EmptyWindow { .. }) => {
                        ClickOutcome::Unavailable { message: e.to_string() }
                    }
                    Err(MonthForecastError::Fit(e)) => {
                        ClickOutcome::Unavailable { message: format!("forecast unavailable: {}", e) }
                    }
                }
            }
            (DrillState::Year, Hit::Historical { point, .. })
                if self.filter.aggregation == Granularity::Daily =>
            {
                self.drill = DrillState::Month { month: point.date.month() };
                info!(month = point.date.month(), "drilled into month");
                ClickOutcome::Drilled { view: self.snapshot(), report: None }
            }
            (_, hit) => ClickOutcome::Report(self.point_report(hit, &view)),
        }
    }

    /// Report for a hit that does not drill.
    fn point_report(&self, hit: Hit, view: &ViewSnapshot) -> Report {
        match hit {
            Hit::Historical { point, .. } => summarize_historical(
                &point,
                &view.historical,
                &self.filter.dish,
                self.filter.aggregation,
            ),
            Hit::Forecast { point, .. } => summarize_forecast(
                &point,
                self.filter.model,
                self.last_observed(),
                &self.filter.dish,
                self.filter.aggregation,
            ),
        }
    }

    /// Last value of the full (non-month-filtered) series at the current
    /// aggregation; the baseline for forecast trend labels.
    fn last_observed(&self) -> f64 {
        aggregate(
            self.store.events(),
            &self.filter.dish,
            None,
            self.filter.aggregation,
        )
        .last()
        .map_or(0.0, |p| p.value)
    }

    /// Month drill-down forecast, always from the full-year daily series.
    fn month_forecast(&self, month: u32, year: i32) -> Result<TimeSeries, MonthForecastError> {
        let daily = aggregate(
            self.store.events(),
            &self.filter.dish,
            None,
            Granularity::Daily,
        );
        forecasting::forecast_month(&daily, self.filter.model, month, year)
    }
}
