//! Forecast engine contracts: horizons, continuation dates, failure modes.

mod common;

use assert_matches::assert_matches;
use chrono::{Datelike, NaiveDate};
use orderlens_api::ml::forecasting::{forecast, forecast_month, MonthForecastError};
use orderlens_api::ml::{FitError, ForecastModel};
use orderlens_api::series::Granularity;
use orderlens_api::services::aggregation::{aggregate, DishFilter};
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[rstest]
#[case(ForecastModel::NonSeasonalArima, Granularity::Daily, 30)]
#[case(ForecastModel::NonSeasonalArima, Granularity::Weekly, 5)]
#[case(ForecastModel::NonSeasonalArima, Granularity::Monthly, 3)]
#[case(ForecastModel::SeasonalArima, Granularity::Daily, 30)]
#[case(ForecastModel::SeasonalArima, Granularity::Weekly, 5)]
fn horizon_is_exact_never_partial(
    #[case] model: ForecastModel,
    #[case] granularity: Granularity,
    #[case] expected: usize,
) {
    let store = common::year_store();
    let series = aggregate(store.events(), &DishFilter::All, None, granularity);
    let result = forecast(&series, model, granularity).unwrap();
    assert_eq!(result.len(), expected);
    assert!(result.points().iter().all(|p| p.value.is_finite()));
}

#[test]
fn seasonal_daily_forecast_fills_january_2024() {
    let store = common::year_store();
    let series = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);
    let result = forecast(&series, ForecastModel::SeasonalArima, Granularity::Daily).unwrap();

    assert_eq!(result.len(), 30);
    assert_eq!(result.first().unwrap().date, date(2024, 1, 1));
    assert_eq!(result.last().unwrap().date, date(2024, 1, 30));
}

#[test]
fn forecast_timestamps_start_strictly_after_history() {
    let store = common::year_store();
    for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
        let series = aggregate(store.events(), &DishFilter::All, None, granularity);
        let result = forecast(&series, ForecastModel::NonSeasonalArima, granularity).unwrap();
        let last_historical = series.last().unwrap().date;
        assert!(result.first().unwrap().date > last_historical);
        for pair in result.points().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}

#[test]
fn insufficient_history_yields_a_fit_error() {
    let store = common::build_store(date(2023, 6, 1), 10);
    let series = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);
    let err = forecast(&series, ForecastModel::NonSeasonalArima, Granularity::Daily).unwrap_err();
    assert_matches!(err, FitError::InsufficientHistory { have: 10, .. });
}

#[test]
fn seasonal_model_needs_more_history_than_nonseasonal() {
    let store = common::build_store(date(2023, 6, 1), 20);
    let series = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);
    assert!(forecast(&series, ForecastModel::NonSeasonalArima, Granularity::Daily).is_ok());
    let err = forecast(&series, ForecastModel::SeasonalArima, Granularity::Daily).unwrap_err();
    assert_matches!(err, FitError::InsufficientHistory { .. });
}

#[test]
fn month_drill_retains_only_the_target_month() {
    let store = common::year_store();
    let daily = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);

    let january = forecast_month(&daily, ForecastModel::NonSeasonalArima, 1, 2024).unwrap();
    assert_eq!(january.len(), 31);
    assert!(january.points().iter().all(|p| p.date.month() == 1 && p.date.year() == 2024));

    // The 60-day horizon past 2023-12-31 reaches 29 days into leap February.
    let february = forecast_month(&daily, ForecastModel::NonSeasonalArima, 2, 2024).unwrap();
    assert_eq!(february.len(), 29);
}

#[test]
fn month_beyond_the_horizon_reports_an_empty_window() {
    let store = common::year_store();
    let daily = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);
    let err = forecast_month(&daily, ForecastModel::NonSeasonalArima, 3, 2024).unwrap_err();
    assert_matches!(err, MonthForecastError::EmptyWindow { month: 3, year: 2024 });
}

#[test]
fn month_drill_works_for_filtered_dishes() {
    let store = common::year_store();
    let daily = aggregate(
        store.events(),
        &DishFilter::Dish("Cheeseburger".into()),
        None,
        Granularity::Daily,
    );
    let result = forecast_month(&daily, ForecastModel::SeasonalArima, 1, 2024).unwrap();
    assert_eq!(result.len(), 31);
}

#[test]
fn forecasting_is_deterministic() {
    let store = common::year_store();
    let series = aggregate(store.events(), &DishFilter::All, None, Granularity::Daily);
    let a = forecast(&series, ForecastModel::SeasonalArima, Granularity::Daily).unwrap();
    let b = forecast(&series, ForecastModel::SeasonalArima, Granularity::Daily).unwrap();
    assert_eq!(a, b);
}
