//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use orderlens_api::store::{EventLogStore, OrderEvent};

pub const DISHES: &[&str] = &["Caesar Salad", "Cheeseburger", "Margherita Pizza"];

/// A full 2023 log: every dish is ordered every day, with a deterministic
/// per-day variation, and every order carries two ingredient rows.
pub fn year_store() -> Arc<EventLogStore> {
    build_store(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 365)
}

pub fn build_store(start: NaiveDate, days: u32) -> Arc<EventLogStore> {
    let mut events = Vec::new();
    for offset in 0..days {
        let date = start + Duration::days(offset as i64);
        for (dish_index, dish) in DISHES.iter().enumerate() {
            let orders = 1 + ((offset as usize + dish_index * dish_index) % 3);
            for seq in 0..orders {
                let order_id = format!("ORD-{}-{}-{}", date.format("%Y%m%d"), dish_index, seq);
                for ingredient in ["Base", "Topping"] {
                    events.push(OrderEvent {
                        date,
                        order_id: order_id.clone(),
                        dish_name: dish.to_string(),
                        ingredient: ingredient.to_string(),
                        quantity_used: 0.5,
                        unit: "kg".to_string(),
                        stock_available: 25.0,
                    });
                }
            }
        }
    }
    Arc::new(EventLogStore::from_events(events).expect("fixture store"))
}

/// Expected distinct-order count for a single day of the fixture, all dishes.
pub fn expected_daily_total(offset: usize) -> f64 {
    DISHES
        .iter()
        .enumerate()
        .map(|(dish_index, _)| 1 + ((offset + dish_index * dish_index) % 3))
        .sum::<usize>() as f64
}
