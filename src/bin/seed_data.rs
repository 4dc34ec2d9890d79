//! Seed data script - generates a synthetic order-ingredient dataset
//!
//! Run with: cargo run --bin seed-data -- --out restaurant_data.csv
//!
//! Simulates a year of restaurant orders over a fixed menu: each order picks
//! a dish, consumes its recipe from ingredient stock, and emits one CSV row
//! per ingredient. Stock restocks at the start of a day when it falls under
//! its threshold; an order that cannot be cooked is lost.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

#[derive(Parser)]
#[command(name = "seed-data", about = "Generate a synthetic restaurant order dataset")]
struct Args {
    /// Output CSV path
    #[arg(long, default_value = "restaurant_data.csv")]
    out: PathBuf,

    /// First simulated day
    #[arg(long, default_value = "2023-01-01")]
    start: NaiveDate,

    /// Number of days to simulate
    #[arg(long, default_value_t = 365)]
    days: u32,

    /// RNG seed; identical seeds reproduce identical datasets
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (name, unit, initial stock, restock amount, restock threshold)
const INGREDIENTS: &[(&str, &str, f64, f64, f64)] = &[
    ("Pizza Dough", "ball", 100.0, 50.0, 20.0),
    ("Tomato Sauce", "liter", 50.0, 20.0, 10.0),
    ("Mozzarella Cheese", "kg", 30.0, 15.0, 5.0),
    ("Pepperoni", "kg", 20.0, 10.0, 5.0),
    ("Pasta", "kg", 50.0, 25.0, 10.0),
    ("Ground Beef", "kg", 40.0, 20.0, 10.0),
    ("Lettuce", "head", 50.0, 30.0, 10.0),
    ("Tomatoes", "kg", 30.0, 15.0, 5.0),
    ("Burger Bun", "piece", 100.0, 50.0, 20.0),
    ("Burger Patty", "piece", 80.0, 40.0, 15.0),
    ("Onion", "kg", 25.0, 10.0, 5.0),
];

/// (dish, recipe as (ingredient, quantity) pairs)
const MENU: &[(&str, &[(&str, f64)])] = &[
    (
        "Margherita Pizza",
        &[("Pizza Dough", 1.0), ("Tomato Sauce", 0.2), ("Mozzarella Cheese", 0.25)],
    ),
    (
        "Pepperoni Pizza",
        &[
            ("Pizza Dough", 1.0),
            ("Tomato Sauce", 0.2),
            ("Mozzarella Cheese", 0.2),
            ("Pepperoni", 0.1),
        ],
    ),
    (
        "Spaghetti Bolognese",
        &[("Pasta", 0.2), ("Tomato Sauce", 0.15), ("Ground Beef", 0.15), ("Onion", 0.05)],
    ),
    (
        "Caesar Salad",
        &[("Lettuce", 0.5), ("Tomatoes", 0.2), ("Mozzarella Cheese", 0.05)],
    ),
    (
        "Cheeseburger",
        &[
            ("Burger Bun", 1.0),
            ("Burger Patty", 1.0),
            ("Mozzarella Cheese", 0.05),
            ("Lettuce", 0.1),
            ("Tomatoes", 0.05),
            ("Onion", 0.02),
        ],
    ),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let units: HashMap<&str, &str> = INGREDIENTS.iter().map(|(n, u, ..)| (*n, *u)).collect();
    let mut stock: HashMap<&str, f64> =
        INGREDIENTS.iter().map(|(n, _, initial, ..)| (*n, *initial)).collect();

    let mut writer = csv::Writer::from_path(&args.out)?;
    writer.write_record([
        "Date",
        "Order_ID",
        "Dish_Name",
        "Ingredient_Name",
        "Quantity_Used",
        "Unit",
        "Stock_Available",
    ])?;

    let mut rows = 0usize;
    let mut lost_orders = 0usize;

    for day in 0..args.days {
        let date = args.start + Duration::days(day as i64);
        let date_str = date.format("%Y-%m-%d").to_string();

        // Restock at the start of the day
        for &(name, _, _, restock_amount, threshold) in INGREDIENTS {
            let level = stock.get_mut(name).expect("known ingredient");
            if *level < threshold {
                *level += restock_amount;
            }
        }

        let num_orders = rng.gen_range(20..=50);
        for seq in 0..num_orders {
            let (dish, recipe) = MENU[rng.gen_range(0..MENU.len())];

            let can_make = recipe.iter().all(|&(ing, needed)| stock[ing] >= needed);
            if !can_make {
                lost_orders += 1;
                continue;
            }

            let order_id = format!("ORD-{}-{:04}", date.format("%Y%m%d"), 1000 + seq);
            for &(ing, needed) in recipe {
                let level = stock.get_mut(ing).expect("known ingredient");
                *level = (*level - needed).max(0.0);
                let remaining = format!("{:.2}", level);
                let quantity = needed.to_string();
                writer.write_record([
                    date_str.as_str(),
                    order_id.as_str(),
                    dish,
                    ing,
                    quantity.as_str(),
                    units[ing],
                    remaining.as_str(),
                ])?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    info!(
        rows,
        lost_orders,
        out = %args.out.display(),
        "dataset generation complete"
    );

    Ok(())
}
