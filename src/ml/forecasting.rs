//! Forecast engine: fixed-order ARIMA models over aggregated order series.
//!
//! `forecast` powers the year-view overlay; `forecast_month` powers the
//! forecast-month drill-down. Both are pure functions of the input series and
//! the selected model.

use chrono::{Datelike, Duration};
use tracing::{debug, instrument};

use super::{arima, FitError, ForecastModel};
use crate::series::{Granularity, SeriesPoint, TimeSeries};

/// Daily steps requested when drilling into a forecast month. Kept fixed even
/// when the target month is further out; months beyond the horizon come back
/// as [`MonthForecastError::EmptyWindow`].
pub const MONTH_DRILL_HORIZON: usize = 60;

/// Outcome of a month drill-down forecast that produced no usable points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonthForecastError {
    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(
        "no forecast data for month {month} of {year}: the target lies beyond the {MONTH_DRILL_HORIZON}-day horizon"
    )]
    EmptyWindow { month: u32, year: i32 },
}

/// Fit `model` on `series` and predict exactly `granularity.horizon()`
/// periods, starting strictly after the last historical timestamp.
#[instrument(skip(series), fields(model = %model, granularity = %granularity, observations = series.len()))]
pub fn forecast(
    series: &TimeSeries,
    model: ForecastModel,
    granularity: Granularity,
) -> Result<TimeSeries, FitError> {
    let horizon = granularity.horizon();
    let fitted = arima::fit(&series.values(), &model.spec())?;
    let predicted = fitted.forecast(horizon)?;

    let last = series
        .last()
        .ok_or(FitError::InsufficientHistory { have: 0, need: 1 })?
        .date;

    let mut date = last;
    let points = predicted
        .into_iter()
        .map(|value| {
            date = granularity.advance(date);
            SeriesPoint { date, value }
        })
        .collect();

    debug!(horizon, "forecast fitted");
    Ok(TimeSeries::new(points))
}

/// Drill-down forecast for a single calendar month: fit on the full-year
/// *daily* series (never month-filtered), predict a fixed 60-day horizon, and
/// keep only the points falling inside the target month.
#[instrument(skip(daily_series), fields(model = %model))]
pub fn forecast_month(
    daily_series: &TimeSeries,
    model: ForecastModel,
    month: u32,
    year: i32,
) -> Result<TimeSeries, MonthForecastError> {
    let fitted = arima::fit(&daily_series.values(), &model.spec())?;
    let predicted = fitted.forecast(MONTH_DRILL_HORIZON)?;

    let last = daily_series
        .last()
        .ok_or(FitError::InsufficientHistory { have: 0, need: 1 })?
        .date;

    let mut date = last;
    let points: Vec<SeriesPoint> = predicted
        .into_iter()
        .filter_map(|value| {
            date += Duration::days(1);
            (date.month() == month && date.year() == year).then_some(SeriesPoint { date, value })
        })
        .collect();

    if points.is_empty() {
        return Err(MonthForecastError::EmptyWindow { month, year });
    }

    debug!(points = points.len(), "month forecast retained");
    Ok(TimeSeries::new(points))
}
