//! MarketPulse-X - prediction-market arbitrage and anomaly monitor.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/             # Reusable library components
//! │   ├── domain/       # Pure domain types
//! │   ├── venue/        # Venue client + order-book cache
//! │   ├── ingestion/     # Tick ingestion scheduler loop
//! │   ├── rules/          # Rule engine: DSL loader, predicates, breaker, KPIs
//! │   ├── intents/         # Intent planners + risk gauntlet
//! │   ├── alerts/           # Alert transport
//! │   ├── metrics/           # Counters/gauges collaborator
//! │   └── db/ store/          # Diesel schema + store traits
//! └── app/              # Application orchestration
//! ```

pub mod app;
pub mod cli;
pub mod core;
pub mod error;
