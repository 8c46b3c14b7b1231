// Car Offer - Core Library
// Pricing engine plus the storage, validation and scheduling around it

pub mod vehicle;
pub mod tables;
pub mod offer;
pub mod catalog;
pub mod schema;
pub mod db;
pub mod pickup;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "tui")]
pub mod ui;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Re-export commonly used types
pub use vehicle::{Condition, VehicleDescriptor};
pub use offer::{
    calculate_condition_adjustment, calculate_mileage_adjustment, calculate_offer,
    calculate_offer_at, format_currency, get_market_value, Offer, RoundedOffer,
};
pub use db::{
    NewValuation, QuoteRow, Valuation, VehicleExtras,
    setup_database, insert_valuation, get_all_valuations, get_valuation_by_id,
    get_valuations_by_user, verify_count, seed_sample_valuations, load_csv,
};
pub use schema::{validate_descriptor, validate_new_valuation, ValidationError, ValidationResult};
pub use pickup::{schedule_pickup, Pickup, PickupError, PickupRequest};
pub use config::{load_config, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `default_level` when set. Call once per process.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
