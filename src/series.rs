use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Time-aggregation granularity of a displayed series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Number of future periods a forecast covers at this granularity.
    pub fn horizon(self) -> usize {
        match self {
            Granularity::Daily => 30,
            Granularity::Weekly => 5,
            Granularity::Monthly => 3,
        }
    }

    /// Label of the bucket containing `date`. Weekly buckets are end-of-week
    /// aligned (week ending Sunday); monthly buckets are labeled by the last
    /// day of the calendar month.
    pub fn bucket_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date + Duration::days((6 - date.weekday().num_days_from_monday()) as i64)
            }
            Granularity::Monthly => last_day_of_month(date.year(), date.month()),
        }
    }

    /// The bucket label one period after `date`, which must itself be a
    /// bucket label at this granularity.
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date + Duration::days(1),
            Granularity::Weekly => date + Duration::days(7),
            Granularity::Monthly => {
                let next = date + Duration::days(1);
                last_day_of_month(next.year(), next.month())
            }
        }
    }
}

/// Last calendar day of the given month. `month` must be in 1..=12.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .expect("valid calendar month")
}

/// Visual role of a rendered chart layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Historical,
    Forecast,
}

/// A single dated observation or prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered, gap-free series at a fixed granularity. Timestamps are strictly
/// increasing with no duplicates; recomputed on every filter or drill change,
/// never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].date < w[1].date),
            "series timestamps must be strictly increasing"
        );
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Arithmetic mean of the values; 0 for an empty series.
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            0.0
        } else {
            self.total() / self.points.len() as f64
        }
    }
}
