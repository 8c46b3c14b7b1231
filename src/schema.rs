// 📐 Shape Layer - Insert Validation
// Rejects malformed valuation requests before they reach storage or the engine

use crate::db::NewValuation;
use crate::vehicle::{Condition, VehicleDescriptor};
use serde::Serialize;

/// Oldest model year the form accepts
pub const MIN_YEAR: i32 = 2000;

/// Photos a seller may attach to one valuation
pub const MAX_PHOTOS: usize = 5;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// RULES
// ============================================================================

fn check_vehicle(
    errors: &mut Vec<ValidationError>,
    make: &str,
    model: &str,
    year: i32,
    mileage: i64,
    condition: &Condition,
) {
    if make.trim().is_empty() {
        errors.push(ValidationError::new("make", "Make is required"));
    }

    if model.trim().is_empty() {
        errors.push(ValidationError::new("model", "Model is required"));
    }

    if year < MIN_YEAR {
        errors.push(ValidationError::new("year", "Year must be 2000 or later"));
    }

    if mileage < 0 {
        errors.push(ValidationError::new("mileage", "Mileage cannot be negative"));
    }

    if !condition.is_recognized() {
        errors.push(ValidationError::new("condition", "Invalid condition selected"));
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a vehicle before quoting it
pub fn validate_descriptor(vehicle: &VehicleDescriptor) -> ValidationResult {
    let mut errors = Vec::new();

    check_vehicle(
        &mut errors,
        &vehicle.make,
        &vehicle.model,
        vehicle.year,
        vehicle.mileage,
        &vehicle.condition,
    );

    finish(errors)
}

/// Validate a valuation insert; every failing field is reported
pub fn validate_new_valuation(valuation: &NewValuation) -> ValidationResult {
    let mut errors = Vec::new();

    check_vehicle(
        &mut errors,
        &valuation.make,
        &valuation.model,
        valuation.year,
        valuation.mileage,
        &valuation.condition,
    );

    if let Some(photos) = &valuation.photo_urls {
        if photos.len() > MAX_PHOTOS {
            errors.push(ValidationError::new(
                "photoUrls",
                "At most 5 photos may be attached",
            ));
        }
    }

    finish(errors)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_valuation() -> NewValuation {
        NewValuation {
            make: "toyota".to_string(),
            model: "camry".to_string(),
            year: 2018,
            mileage: 45000,
            condition: Condition::Good,
            body_type: Some("sedan".to_string()),
            color: None,
            transmission: true,
            catalytic_converter: true,
            market_value: 18500,
            initial_offer: 11655,
            mileage_adjustment: 0,
            condition_adjustment: 0,
            final_offer: 11655,
            photo_urls: None,
            user_id: None,
        }
    }

    #[test]
    fn test_valid_valuation() {
        assert!(validate_new_valuation(&valid_valuation()).is_ok());
    }

    #[test]
    fn test_missing_make_and_model() {
        let mut valuation = valid_valuation();
        valuation.make = String::new();
        valuation.model = "  ".to_string();

        let errors = validate_new_valuation(&valuation).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Make is required");
        assert_eq!(errors[1].field, "model");
    }

    #[test]
    fn test_year_before_2000() {
        let mut valuation = valid_valuation();
        valuation.year = 1999;

        let errors = validate_new_valuation(&valuation).unwrap_err();
        assert_eq!(errors, vec![ValidationError::new("year", "Year must be 2000 or later")]);

        valuation.year = 2000;
        assert!(validate_new_valuation(&valuation).is_ok());
    }

    #[test]
    fn test_negative_mileage() {
        let mut valuation = valid_valuation();
        valuation.mileage = -1;

        let errors = validate_new_valuation(&valuation).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "mileage"));
    }

    #[test]
    fn test_unrecognized_condition() {
        let mut valuation = valid_valuation();
        valuation.condition = Condition::parse("excellent");

        let errors = validate_new_valuation(&valuation).unwrap_err();
        assert_eq!(errors[0].to_string(), "condition: Invalid condition selected");
    }

    #[test]
    fn test_too_many_photos() {
        let mut valuation = valid_valuation();
        valuation.photo_urls = Some((0..6).map(|i| format!("https://example.com/{}.jpg", i)).collect());

        let errors = validate_new_valuation(&valuation).unwrap_err();
        assert_eq!(errors[0].field, "photoUrls");

        valuation.photo_urls.as_mut().unwrap().pop();
        assert!(validate_new_valuation(&valuation).is_ok());
    }

    #[test]
    fn test_descriptor_collects_all_errors() {
        let vehicle = VehicleDescriptor::new("", "", 1990, -5, "shiny", true);

        let errors = validate_descriptor(&vehicle).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["make", "model", "year", "mileage", "condition"]);
    }

    #[test]
    fn test_future_year_accepted() {
        // The form offers next year's models; the engine prices them as-is
        let vehicle = VehicleDescriptor::new("kia", "EV9", 2099, 0, "great", true);
        assert!(validate_descriptor(&vehicle).is_ok());
    }
}
