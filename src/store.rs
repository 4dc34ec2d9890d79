use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::errors::ServiceError;

/// One row of the order-ingredient log: a single ingredient consumed by a
/// single order. Rows sharing an `order_id` and date belong to one
/// transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEvent {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Dish_Name")]
    pub dish_name: String,
    #[serde(rename = "Ingredient_Name")]
    pub ingredient: String,
    #[serde(rename = "Quantity_Used")]
    pub quantity_used: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Stock_Available")]
    pub stock_available: f64,
}

/// In-memory order event log. Loaded once at startup, read-only thereafter.
#[derive(Debug)]
pub struct EventLogStore {
    events: Vec<OrderEvent>,
    dishes: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl EventLogStore {
    /// Load the dataset from a CSV file. Any problem here is fatal to
    /// startup: a missing, unreadable, malformed, or empty dataset leaves
    /// nothing to explore.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            ServiceError::DataLoad(format!("cannot open dataset {}: {}", path.display(), e))
        })?;

        let mut events = Vec::new();
        for row in reader.deserialize::<OrderEvent>() {
            let event =
                row.map_err(|e| ServiceError::DataLoad(format!("malformed dataset row: {}", e)))?;
            events.push(event);
        }

        Self::from_events(events)
    }

    /// Build a store from already-parsed events.
    pub fn from_events(events: Vec<OrderEvent>) -> Result<Self, ServiceError> {
        let first = events
            .first()
            .ok_or_else(|| ServiceError::DataLoad("dataset contains no order events".into()))?;

        let mut start = first.date;
        let mut end = first.date;
        for event in &events {
            start = start.min(event.date);
            end = end.max(event.date);
        }

        let dishes: Vec<String> = events
            .iter()
            .map(|e| e.dish_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        info!(
            rows = events.len(),
            dishes = dishes.len(),
            start = %start,
            end = %end,
            "order event log loaded"
        );

        Ok(Self { events, dishes, start, end })
    }

    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    /// Distinct dish names, sorted.
    pub fn dishes(&self) -> &[String] {
        &self.dishes
    }

    /// Inclusive calendar range covered by the log.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
