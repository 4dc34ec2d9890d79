//! Analytics summarizer: turns a single selected point into a structured
//! report for the presentation layer. Pure functions, no side effects.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ml::ForecastModel;
use crate::series::{Granularity, SeriesPoint, TimeSeries};
use crate::services::aggregation::DishFilter;

/// Qualitative confidence attached to every forecast report.
pub const FORECAST_CONFIDENCE: &str = "Medium";

/// Qualitative direction of a forecast point relative to the last historical
/// observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Trend {
    Rising,
    Falling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoricalReport {
    pub dish: String,
    pub granularity: Granularity,
    pub date: NaiveDate,
    pub value: f64,
    pub series_mean: f64,
    pub deviation: f64,
    /// Deviation as a percentage of the mean; 0 when the mean is 0.
    pub deviation_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastReport {
    pub dish: String,
    pub granularity: Granularity,
    pub model: String,
    pub date: NaiveDate,
    pub value: f64,
    pub trend: Trend,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastMonthReport {
    pub month: u32,
    pub year: i32,
    pub average_daily: f64,
    pub estimated_total: f64,
    pub days_forecasted: usize,
}

/// A structured report for the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Historical(HistoricalReport),
    Forecast(ForecastReport),
    ForecastMonth(ForecastMonthReport),
}

/// Summarize a historical point against its series: raw value, series mean,
/// signed deviation, and deviation as a percentage of the mean.
pub fn summarize_historical(
    point: &SeriesPoint,
    series: &TimeSeries,
    dish: &DishFilter,
    granularity: Granularity,
) -> Report {
    let series_mean = series.mean();
    let deviation = point.value - series_mean;
    let deviation_pct = if series_mean == 0.0 {
        0.0
    } else {
        deviation / series_mean * 100.0
    };

    Report::Historical(HistoricalReport {
        dish: dish.label().to_string(),
        granularity,
        date: point.date,
        value: point.value,
        series_mean,
        deviation,
        deviation_pct,
    })
}

/// Summarize a forecast point: model label, trend against the last historical
/// observation, and a fixed qualitative confidence.
pub fn summarize_forecast(
    point: &SeriesPoint,
    model: ForecastModel,
    last_observed: f64,
    dish: &DishFilter,
    granularity: Granularity,
) -> Report {
    let trend = if point.value > last_observed {
        Trend::Rising
    } else {
        Trend::Falling
    };

    Report::Forecast(ForecastReport {
        dish: dish.label().to_string(),
        granularity,
        model: model.label().to_string(),
        date: point.date,
        value: point.value,
        trend,
        confidence: FORECAST_CONFIDENCE.to_string(),
    })
}

/// Month-level digest shown when entering a forecast-month drill-down.
pub fn summarize_forecast_month(series: &TimeSeries, month: u32, year: i32) -> Report {
    Report::ForecastMonth(ForecastMonthReport {
        month,
        year,
        average_daily: series.mean(),
        estimated_total: series.total(),
        days_forecasted: series.len(),
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Historical(r) => {
                writeln!(f, "--- HISTORICAL ANALYTICS ---")?;
                writeln!(f, "Dish: {}", r.dish)?;
                writeln!(f, "Time: {} ({})", r.date, r.granularity)?;
                writeln!(f, "Orders: {:.2}", r.value)?;
                write!(
                    f,
                    "Vs Average: {}{:.2} ({:.1}%)",
                    if r.deviation >= 0.0 { "+" } else { "" },
                    r.deviation,
                    r.deviation_pct
                )
            }
            Report::Forecast(r) => {
                writeln!(f, "--- PREDICTED ANALYTICS ---")?;
                writeln!(f, "Dish: {}", r.dish)?;
                writeln!(f, "Time: {} ({})", r.date, r.granularity)?;
                writeln!(f, "Orders: {:.2}", r.value)?;
                writeln!(f, "Model: {}", r.model)?;
                writeln!(f, "Confidence: {}", r.confidence)?;
                write!(f, "Trend: {:?}", r.trend)
            }
            Report::ForecastMonth(r) => {
                writeln!(f, "--- FORECAST MONTH ANALYTICS ---")?;
                writeln!(f, "Month: {}/{}", r.month, r.year)?;
                writeln!(f, "Average Daily Orders: {:.2}", r.average_daily)?;
                writeln!(f, "Estimated Total: {:.0}", r.estimated_total)?;
                write!(f, "Days Forecasted: {}", r.days_forecasted)
            }
        }
    }
}
