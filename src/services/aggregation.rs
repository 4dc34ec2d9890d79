//! Aggregation pipeline: order-ingredient events in, gap-free order-count
//! series out.
//!
//! Orders are counted by distinct order id per calendar day (a dish with four
//! ingredient rows in one order counts once), the covered window is
//! zero-filled, and Weekly/Monthly granularities roll the daily counts up
//! into calendar buckets.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::series::{last_day_of_month, Granularity, SeriesPoint, TimeSeries};
use crate::store::OrderEvent;

/// Dish restriction applied before counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DishFilter {
    All,
    Dish(String),
}

impl DishFilter {
    pub fn matches(&self, dish_name: &str) -> bool {
        match self {
            DishFilter::All => true,
            DishFilter::Dish(name) => name == dish_name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DishFilter::All => "All",
            DishFilter::Dish(name) => name,
        }
    }
}

impl From<String> for DishFilter {
    fn from(value: String) -> Self {
        if value == "All" {
            DishFilter::All
        } else {
            DishFilter::Dish(value)
        }
    }
}

impl From<DishFilter> for String {
    fn from(value: DishFilter) -> Self {
        value.label().to_string()
    }
}

/// Aggregate the event log into an ordered, zero-filled count series.
///
/// `month` restricts events to a calendar month (month-of-year, any year) and
/// widens the reindex window to the full month. Without it the window spans
/// the filtered data's min..max date. Identical inputs always produce
/// identical output.
pub fn aggregate(
    events: &[OrderEvent],
    dish: &DishFilter,
    month: Option<u32>,
    granularity: Granularity,
) -> TimeSeries {
    let mut orders_per_day: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
    let mut latest_dish_day: Option<NaiveDate> = None;

    for event in events {
        if !dish.matches(&event.dish_name) {
            continue;
        }
        latest_dish_day = Some(latest_dish_day.map_or(event.date, |d| d.max(event.date)));
        if month.map_or(true, |m| event.date.month() == m) {
            orders_per_day
                .entry(event.date)
                .or_default()
                .insert(event.order_id.as_str());
        }
    }

    let window = match month {
        Some(m) => month_window(m, &orders_per_day, latest_dish_day),
        None => match (
            orders_per_day.keys().next().copied(),
            orders_per_day.keys().next_back().copied(),
        ) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        },
    };
    let Some((start, end)) = window else {
        return TimeSeries::empty();
    };

    let mut daily = Vec::new();
    let mut day = start;
    while day <= end {
        let count = orders_per_day.get(&day).map_or(0, HashSet::len);
        daily.push(SeriesPoint { date: day, value: count as f64 });
        day += Duration::days(1);
    }

    match granularity {
        Granularity::Daily => TimeSeries::new(daily),
        bucketed => rollup(&daily, bucketed),
    }
}

/// The full calendar month to reindex over. The year comes from the latest
/// matching event, falling back to the latest dish-filtered event when the
/// month has no rows at all.
fn month_window(
    month: u32,
    orders_per_day: &BTreeMap<NaiveDate, HashSet<&str>>,
    latest_dish_day: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let year = orders_per_day
        .keys()
        .next_back()
        .map(|d| d.year())
        .or(latest_dish_day.map(|d| d.year()))?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((start, last_day_of_month(year, month)))
}

fn rollup(daily: &[SeriesPoint], granularity: Granularity) -> TimeSeries {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in daily {
        *buckets.entry(granularity.bucket_end(point.date)).or_insert(0.0) += point.value;
    }
    TimeSeries::new(
        buckets
            .into_iter()
            .map(|(date, value)| SeriesPoint { date, value })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(d: NaiveDate, order_id: &str, dish: &str, ingredient: &str) -> OrderEvent {
        OrderEvent {
            date: d,
            order_id: order_id.to_string(),
            dish_name: dish.to_string(),
            ingredient: ingredient.to_string(),
            quantity_used: 1.0,
            unit: "kg".to_string(),
            stock_available: 10.0,
        }
    }

    #[test]
    fn ingredient_rows_of_one_order_count_once() {
        let d = date(2023, 5, 1);
        let events = vec![
            event(d, "ORD-1", "Cheeseburger", "Bun"),
            event(d, "ORD-1", "Cheeseburger", "Patty"),
            event(d, "ORD-1", "Cheeseburger", "Cheese"),
            event(d, "ORD-1", "Cheeseburger", "Lettuce"),
            event(d, "ORD-2", "Cheeseburger", "Bun"),
        ];
        let series = aggregate(&events, &DishFilter::All, None, Granularity::Daily);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 2.0);
    }

    #[test]
    fn gaps_are_zero_filled() {
        let events = vec![
            event(date(2023, 5, 1), "ORD-1", "Pizza", "Dough"),
            event(date(2023, 5, 4), "ORD-2", "Pizza", "Dough"),
        ];
        let series = aggregate(&events, &DishFilter::All, None, Granularity::Daily);
        let values: Vec<f64> = series.values();
        assert_eq!(values, vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn dish_filter_drops_other_dishes() {
        let d = date(2023, 5, 1);
        let events = vec![
            event(d, "ORD-1", "Pizza", "Dough"),
            event(d, "ORD-2", "Salad", "Lettuce"),
        ];
        let series = aggregate(
            &events,
            &DishFilter::Dish("Pizza".into()),
            None,
            Granularity::Daily,
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value, 1.0);
    }

    #[test]
    fn month_filter_reindexes_the_full_month() {
        let events = vec![
            event(date(2023, 3, 10), "ORD-1", "Pizza", "Dough"),
            event(date(2023, 4, 2), "ORD-2", "Pizza", "Dough"),
        ];
        let series = aggregate(&events, &DishFilter::All, Some(3), Granularity::Daily);
        assert_eq!(series.len(), 31);
        assert_eq!(series.first().unwrap().date, date(2023, 3, 1));
        assert_eq!(series.last().unwrap().date, date(2023, 3, 31));
        assert_eq!(series.total(), 1.0);
    }

    #[test]
    fn empty_month_still_covers_the_month_when_the_dish_has_data() {
        let events = vec![event(date(2023, 4, 2), "ORD-1", "Pizza", "Dough")];
        let series = aggregate(&events, &DishFilter::All, Some(3), Granularity::Daily);
        assert_eq!(series.len(), 31);
        assert_eq!(series.total(), 0.0);
    }

    #[test]
    fn empty_filtered_set_yields_empty_series() {
        let events = vec![event(date(2023, 4, 2), "ORD-1", "Pizza", "Dough")];
        let series = aggregate(
            &events,
            &DishFilter::Dish("Ramen".into()),
            None,
            Granularity::Daily,
        );
        assert!(series.is_empty());
    }

    #[test]
    fn weekly_rollup_sums_into_sunday_buckets() {
        // 2023-05-01 is a Monday; the week ends Sunday 2023-05-07.
        let events = vec![
            event(date(2023, 5, 1), "ORD-1", "Pizza", "Dough"),
            event(date(2023, 5, 3), "ORD-2", "Pizza", "Dough"),
            event(date(2023, 5, 8), "ORD-3", "Pizza", "Dough"),
        ];
        let series = aggregate(&events, &DishFilter::All, None, Granularity::Weekly);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, date(2023, 5, 7));
        assert_eq!(series.points()[0].value, 2.0);
        assert_eq!(series.points()[1].date, date(2023, 5, 14));
        assert_eq!(series.points()[1].value, 1.0);
    }

    #[test]
    fn monthly_rollup_labels_month_ends() {
        let events = vec![
            event(date(2023, 1, 5), "ORD-1", "Pizza", "Dough"),
            event(date(2023, 1, 20), "ORD-2", "Pizza", "Dough"),
            event(date(2023, 2, 1), "ORD-3", "Pizza", "Dough"),
        ];
        let series = aggregate(&events, &DishFilter::All, None, Granularity::Monthly);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, date(2023, 1, 31));
        assert_eq!(series.points()[0].value, 2.0);
        assert_eq!(series.points()[1].date, date(2023, 2, 28));
        assert_eq!(series.points()[1].value, 1.0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let events: Vec<OrderEvent> = (0..200)
            .map(|i| {
                event(
                    date(2023, 1, 1) + Duration::days(i % 60),
                    &format!("ORD-{}", i % 40),
                    if i % 2 == 0 { "Pizza" } else { "Salad" },
                    "Dough",
                )
            })
            .collect();
        let a = aggregate(&events, &DishFilter::All, None, Granularity::Weekly);
        let b = aggregate(&events, &DishFilter::All, None, Granularity::Weekly);
        assert_eq!(a, b);
    }

    #[test]
    fn dish_filter_round_trips_through_strings() {
        assert_eq!(DishFilter::from("All".to_string()), DishFilter::All);
        assert_eq!(
            DishFilter::from("Pizza".to_string()),
            DishFilter::Dish("Pizza".into())
        );
        assert_eq!(String::from(DishFilter::All), "All");
    }
}
