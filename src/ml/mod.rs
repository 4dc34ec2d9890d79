//! Statistical forecasting models for aggregated order series.

pub mod arima;
pub mod forecasting;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two selectable forecasting parameterizations. A closed enumeration
/// with a typed mapping to fixed orders; never matched by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
pub enum ForecastModel {
    NonSeasonalArima,
    SeasonalArima,
}

impl ForecastModel {
    /// Fixed (p, d, q) and seasonal parameterization for each model.
    pub fn spec(self) -> ModelSpec {
        match self {
            ForecastModel::NonSeasonalArima => ModelSpec { order: (5, 1, 0), seasonal: None },
            ForecastModel::SeasonalArima => ModelSpec {
                order: (1, 1, 1),
                seasonal: Some(SeasonalOrder { order: (1, 1, 1), period: 7 }),
            },
        }
    }

    /// Human-readable label used in analytics reports.
    pub fn label(self) -> &'static str {
        match self {
            ForecastModel::NonSeasonalArima => "ARIMA (5,1,0)",
            ForecastModel::SeasonalArima => "SARIMA (1,1,1)x(1,1,1,7)",
        }
    }
}

/// Non-seasonal (p, d, q) order plus an optional seasonal extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub order: (usize, usize, usize),
    pub seasonal: Option<SeasonalOrder>,
}

/// Seasonal (P, D, Q) order at a fixed periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalOrder {
    pub order: (usize, usize, usize),
    pub period: usize,
}

/// Why a model fit was rejected. Callers degrade to a historical-only render
/// instead of crashing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("insufficient history: {have} observations, need at least {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("model failed to converge: {0}")]
    NonConvergence(String),
}
