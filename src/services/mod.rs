// Core analytics services
pub mod aggregation;
pub mod analytics;
pub mod dashboard;
