// 🚗 Vehicle Descriptor - what the seller tells us about the car
// Value objects only: the pricing engine never mutates them

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONDITION
// ============================================================================

/// Seller-reported condition of the vehicle.
///
/// Parsing is total: anything outside the five known labels becomes
/// `Unrecognized` and prices with a zero condition factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Great,
    Good,
    Fair,
    Bad,
    NonDrivable,
    Unrecognized(String),
}

impl Condition {
    /// The five conditions offered by the valuation form, best first
    pub const ALL: [Condition; 5] = [
        Condition::Great,
        Condition::Good,
        Condition::Fair,
        Condition::Bad,
        Condition::NonDrivable,
    ];

    /// Exact label match. `"Non-Drivable"` or `" good"` stay unrecognized
    /// and price with a zero factor.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "great" => Condition::Great,
            "good" => Condition::Good,
            "fair" => Condition::Fair,
            "bad" => Condition::Bad,
            "non-drivable" => Condition::NonDrivable,
            _ => Condition::Unrecognized(raw.to_string()),
        }
    }

    /// Forgiving parse for hand-typed input (CLI flags, CSV cells): trims,
    /// lower-cases and accepts `non_drivable` / `nondrivable`
    pub fn parse_lenient(raw: &str) -> Self {
        let label = raw.trim().to_lowercase();
        match label.as_str() {
            "non_drivable" | "nondrivable" => Condition::NonDrivable,
            _ => match Condition::parse(&label) {
                Condition::Unrecognized(_) => Condition::Unrecognized(raw.to_string()),
                known => known,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Great => "great",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Bad => "bad",
            Condition::NonDrivable => "non-drivable",
            Condition::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Condition::Unrecognized(_))
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Condition::parse(&raw)
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::parse(raw)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// VEHICLE DESCRIPTOR
// ============================================================================

fn default_true() -> bool {
    true
}

/// Everything the offer engine needs to price one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDescriptor {
    /// Lower-cased key into the base value table
    pub make: String,

    /// Informational only, never priced
    pub model: String,

    pub year: i32,

    pub mileage: i64,

    pub condition: Condition,

    #[serde(default = "default_true", alias = "catalyticConverter")]
    pub has_catalytic_converter: bool,
}

impl VehicleDescriptor {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage: i64,
        condition: impl Into<Condition>,
        has_catalytic_converter: bool,
    ) -> Self {
        VehicleDescriptor {
            make: make.into(),
            model: model.into(),
            year,
            mileage,
            condition: condition.into(),
            has_catalytic_converter,
        }
    }

    /// Condition used for pricing. A missing catalytic converter always
    /// means non-drivable, whatever the seller picked.
    pub fn effective_condition(&self) -> Condition {
        if self.has_catalytic_converter {
            self.condition.clone()
        } else {
            Condition::NonDrivable
        }
    }
}
