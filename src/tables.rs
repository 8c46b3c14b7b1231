// 📋 Reference Tables - static pricing data
// Compiled in, read-only, shared by every quote

use crate::vehicle::Condition;

/// Key of the fallback entry in [`BASE_VALUES`]
pub const DEFAULT_MAKE: &str = "default";

/// New-car base value per make, in dollars
pub const BASE_VALUES: &[(&str, f64)] = &[
    ("toyota", 25000.0),
    ("honda", 23000.0),
    ("ford", 28000.0),
    ("chevrolet", 27000.0),
    ("nissan", 22000.0),
    ("bmw", 45000.0),
    ("mercedes", 50000.0),
    ("audi", 42000.0),
    ("hyundai", 20000.0),
    ("kia", 19000.0),
    ("volkswagen", 26000.0),
    ("subaru", 24000.0),
    ("mazda", 23000.0),
    ("lexus", 40000.0),
    ("acura", 35000.0),
    ("infiniti", 36000.0),
    ("cadillac", 45000.0),
    ("lincoln", 42000.0),
    ("buick", 30000.0),
    ("jeep", 32000.0),
    ("ram", 33000.0),
    ("dodge", 29000.0),
    ("chrysler", 28000.0),
    ("gmc", 32000.0),
    ("volvo", 38000.0),
    ("porsche", 65000.0),
    ("jaguar", 48000.0),
    ("land rover", 55000.0),
    ("tesla", 52000.0),
    ("mini", 28000.0),
    (DEFAULT_MAKE, 25000.0),
];

// Depreciation
pub const DEPRECIATION_PER_YEAR: f64 = 0.10;
pub const MAX_DEPRECIATION: f64 = 0.80;

// Mileage policy
pub const MILEAGE_THRESHOLD: i64 = 50_000;
pub const MILEAGE_CAP: i64 = 150_000;
pub const EXPECTED_MILES_PER_YEAR: i64 = 15_000;
pub const EXCESS_MILE_RATE: f64 = -0.10;
pub const MAX_MILEAGE_PENALTY: f64 = -5000.0;
pub const UNDER_MILE_RATE: f64 = -0.05;
pub const UNDER_MILEAGE_CAP: f64 = 2000.0;

/// Mileage adjustment may never take more than this share of the initial offer
pub const MAX_MILEAGE_SHARE_OF_OFFER: f64 = 0.5;

/// Share of market value offered before adjustments (37% acquisition discount)
pub const INITIAL_OFFER_RATIO: f64 = 0.63;

// Non-drivable vehicles
pub const NON_DRIVABLE_RATE: f64 = 0.05;
pub const NON_DRIVABLE_CAP: f64 = 900.0;

/// Base value for a make, falling back to the `default` entry
pub fn base_value(make: &str) -> f64 {
    lookup_base_value(make)
        .or_else(|| lookup_base_value(DEFAULT_MAKE))
        .unwrap_or(0.0)
}

fn lookup_base_value(make: &str) -> Option<f64> {
    BASE_VALUES
        .iter()
        .find(|(key, _)| *key == make)
        .map(|(_, value)| *value)
}

/// Signed fractional adjustment for a condition. Unknown labels adjust nothing.
pub fn condition_factor(condition: &Condition) -> f64 {
    match condition {
        Condition::Great => 0.05,
        Condition::Good => 0.0,
        Condition::Fair => -0.05,
        Condition::Bad => -0.15,
        Condition::NonDrivable => -0.40,
        Condition::Unrecognized(_) => 0.0,
    }
}
