// 💵 Offer Calculator - the pricing engine
// Pure functions: vehicle attributes in, five-line offer out. No I/O, no state.

use crate::tables::{
    self, DEPRECIATION_PER_YEAR, EXCESS_MILE_RATE, EXPECTED_MILES_PER_YEAR, INITIAL_OFFER_RATIO,
    MAX_DEPRECIATION, MAX_MILEAGE_PENALTY, MAX_MILEAGE_SHARE_OF_OFFER, MILEAGE_CAP,
    MILEAGE_THRESHOLD, NON_DRIVABLE_CAP, NON_DRIVABLE_RATE, UNDER_MILEAGE_CAP, UNDER_MILE_RATE,
};
use crate::vehicle::{Condition, VehicleDescriptor};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

// ============================================================================
// OFFER
// ============================================================================

/// Result of pricing one vehicle. All amounts are dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Age-depreciated base price for the make
    pub market_value: f64,

    /// 63% of market value; zero for non-drivable vehicles
    pub initial_offer: f64,

    pub mileage_adjustment: f64,

    pub condition_adjustment: f64,

    pub final_offer: f64,
}

/// Offer rounded to whole dollars, the way it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedOffer {
    pub market_value: i64,
    pub initial_offer: i64,
    pub mileage_adjustment: i64,
    pub condition_adjustment: i64,
    pub final_offer: i64,
}

impl Offer {
    pub fn rounded(&self) -> RoundedOffer {
        RoundedOffer {
            market_value: self.market_value.round() as i64,
            initial_offer: self.initial_offer.round() as i64,
            mileage_adjustment: self.mileage_adjustment.round() as i64,
            condition_adjustment: self.condition_adjustment.round() as i64,
            final_offer: self.final_offer.round() as i64,
        }
    }
}

// ============================================================================
// MARKET VALUE
// ============================================================================

/// Current calendar year on the local clock
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Market value for `make` built in `year`, as of this calendar year
pub fn get_market_value(make: &str, year: i32) -> f64 {
    market_value_at(make, year, current_year())
}

/// Market value as of `current_year`.
///
/// 10% straight-line depreciation per year of age, capped at 80%, so any
/// car eight or more years old keeps a fifth of its base value. A future
/// model year gives a negative age and a value above base; rejecting it is
/// the caller's job.
pub fn market_value_at(make: &str, year: i32, current_year: i32) -> f64 {
    let base_value = tables::base_value(make);
    let age = i64::from(current_year) - i64::from(year);
    let depreciation = MAX_DEPRECIATION.min(age as f64 * DEPRECIATION_PER_YEAR);

    base_value * (1.0 - depreciation)
}

// ============================================================================
// MILEAGE ADJUSTMENT
// ============================================================================

/// Signed dollar delta for odometer reading vs. what the car's age predicts
pub fn calculate_mileage_adjustment(mileage: i64, year: i32) -> f64 {
    mileage_adjustment_at(mileage, year, current_year())
}

/// Mileage adjustment as of `current_year`.
///
/// Below 50,000 miles nothing changes. Above it the reading is capped at
/// 150,000 and compared with 15,000 miles per year of age:
/// - over expectation: -$0.10 per excess mile, floored at -$5,000
/// - under expectation: -$0.05 per missing mile; `min` against 2,000 leaves
///   the negative product untouched
pub fn mileage_adjustment_at(mileage: i64, year: i32, current_year: i32) -> f64 {
    if mileage < MILEAGE_THRESHOLD {
        return 0.0;
    }

    let capped_mileage = mileage.min(MILEAGE_CAP);
    let age = i64::from(current_year) - i64::from(year);
    let expected_mileage = age * EXPECTED_MILES_PER_YEAR;
    let diff = capped_mileage - expected_mileage;

    if diff > 0 {
        MAX_MILEAGE_PENALTY.max(diff as f64 * EXCESS_MILE_RATE)
    } else if diff < 0 {
        UNDER_MILEAGE_CAP.min(diff.unsigned_abs() as f64 * UNDER_MILE_RATE)
    } else {
        0.0
    }
}

// ============================================================================
// CONDITION ADJUSTMENT
// ============================================================================

/// `market_value × factor`; unrecognized conditions contribute nothing
pub fn calculate_condition_adjustment(condition: &Condition, market_value: f64) -> f64 {
    market_value * tables::condition_factor(condition)
}

// ============================================================================
// OFFER ASSEMBLY
// ============================================================================

/// Price a vehicle as of this calendar year
pub fn calculate_offer(vehicle: &VehicleDescriptor) -> Offer {
    calculate_offer_at(vehicle, current_year())
}

/// Price a vehicle as of `current_year`.
///
/// Non-drivable vehicles (including any without a catalytic converter) skip
/// the 63% baseline and are bought for 5% of market value, never above $900.
/// Everything else gets the baseline plus clamped mileage and condition
/// adjustments, floored at zero.
pub fn calculate_offer_at(vehicle: &VehicleDescriptor, current_year: i32) -> Offer {
    let condition = vehicle.effective_condition();
    let market_value = market_value_at(&vehicle.make, vehicle.year, current_year);

    if condition == Condition::NonDrivable {
        let condition_adjustment = NON_DRIVABLE_CAP.min(market_value * NON_DRIVABLE_RATE);

        return Offer {
            market_value,
            initial_offer: 0.0,
            mileage_adjustment: 0.0,
            condition_adjustment,
            final_offer: NON_DRIVABLE_CAP.min(condition_adjustment),
        };
    }

    let initial_offer = market_value * INITIAL_OFFER_RATIO;

    let raw_mileage_adjustment = mileage_adjustment_at(vehicle.mileage, vehicle.year, current_year);
    let mileage_adjustment =
        raw_mileage_adjustment.max(initial_offer * -MAX_MILEAGE_SHARE_OF_OFFER);

    let condition_adjustment = calculate_condition_adjustment(&condition, market_value);

    let final_offer = (initial_offer + mileage_adjustment + condition_adjustment).max(0.0);

    Offer {
        market_value,
        initial_offer,
        mileage_adjustment,
        condition_adjustment,
        final_offer,
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

/// Whole dollars with thousands separators: `$15,750`, `-$1,449`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;
    const EPSILON: f64 = 1e-6;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn vehicle(make: &str, year: i32, mileage: i64, condition: &str, converter: bool) -> VehicleDescriptor {
        VehicleDescriptor::new(make, "Any", year, mileage, condition, converter)
    }

    // ------------------------------------------------------------------------
    // Market value
    // ------------------------------------------------------------------------

    #[test]
    fn test_market_value_new_car_is_base_value() {
        assert_close(market_value_at("toyota", YEAR, YEAR), 25000.0);
    }

    #[test]
    fn test_market_value_linear_depreciation() {
        assert_close(market_value_at("toyota", YEAR - 3, YEAR), 17500.0);
        assert_close(market_value_at("bmw", YEAR - 5, YEAR), 22500.0);
    }

    #[test]
    fn test_market_value_depreciation_capped_at_eighty_percent() {
        for age in [8, 9, 100] {
            assert_close(market_value_at("honda", YEAR - age, YEAR), 23000.0 * 0.20);
        }
    }

    #[test]
    fn test_market_value_unknown_make_uses_default() {
        assert_close(market_value_at("delorean", YEAR, YEAR), 25000.0);
    }

    #[test]
    fn test_market_value_future_year_not_rejected() {
        // Age -1 appreciates by 10%
        assert_close(market_value_at("toyota", YEAR + 1, YEAR), 27500.0);
    }

    // ------------------------------------------------------------------------
    // Mileage adjustment
    // ------------------------------------------------------------------------

    #[test]
    fn test_mileage_below_threshold_is_zero() {
        for year in [YEAR, YEAR - 1, YEAR - 10, YEAR - 30] {
            assert_eq!(mileage_adjustment_at(49_999, year, YEAR), 0.0);
            assert_eq!(mileage_adjustment_at(0, year, YEAR), 0.0);
        }
    }

    #[test]
    fn test_mileage_over_expected_penalized() {
        // Age 2 expects 30k; 60k is 30k over
        assert_close(mileage_adjustment_at(60_000, YEAR - 2, YEAR), -3000.0);
    }

    #[test]
    fn test_mileage_penalty_floored() {
        // Age 0 expects nothing; 120k over would be -12k
        assert_close(mileage_adjustment_at(120_000, YEAR, YEAR), -5000.0);
    }

    #[test]
    fn test_mileage_capped_before_comparison() {
        let at_cap = mileage_adjustment_at(150_000, YEAR - 9, YEAR);
        let far_over = mileage_adjustment_at(900_000, YEAR - 9, YEAR);
        assert_close(far_over, at_cap);
        // 150k vs 135k expected
        assert_close(at_cap, -1500.0);
    }

    #[test]
    fn test_mileage_under_expected_still_negative() {
        // Age 10 expects 150k; 80k is 70k under
        assert_close(mileage_adjustment_at(80_000, YEAR - 10, YEAR), -3500.0);
    }

    #[test]
    fn test_mileage_exactly_expected_is_zero() {
        assert_eq!(mileage_adjustment_at(60_000, YEAR - 4, YEAR), 0.0);
    }

    // ------------------------------------------------------------------------
    // Condition adjustment
    // ------------------------------------------------------------------------

    #[test]
    fn test_condition_adjustment_table() {
        assert_close(calculate_condition_adjustment(&Condition::Great, 10000.0), 500.0);
        assert_close(calculate_condition_adjustment(&Condition::Good, 10000.0), 0.0);
        assert_close(calculate_condition_adjustment(&Condition::Fair, 10000.0), -500.0);
        assert_close(calculate_condition_adjustment(&Condition::Bad, 10000.0), -1500.0);
        assert_close(calculate_condition_adjustment(&Condition::NonDrivable, 10000.0), -4000.0);
    }

    #[test]
    fn test_condition_adjustment_unknown_is_zero() {
        let condition = Condition::parse("showroom");
        assert_eq!(calculate_condition_adjustment(&condition, 10000.0), 0.0);
    }

    // ------------------------------------------------------------------------
    // Assembly
    // ------------------------------------------------------------------------

    #[test]
    fn test_new_low_mileage_toyota() {
        let offer = calculate_offer_at(&vehicle("toyota", YEAR, 10_000, "good", true), YEAR);

        assert_close(offer.market_value, 25000.0);
        assert_close(offer.initial_offer, 15750.0);
        assert_close(offer.mileage_adjustment, 0.0);
        assert_close(offer.condition_adjustment, 0.0);
        assert_close(offer.final_offer, 15750.0);
    }

    #[test]
    fn test_old_honda_mileage_clamped_to_half_offer() {
        let offer = calculate_offer_at(&vehicle("honda", YEAR - 10, 80_000, "great", true), YEAR);

        assert_close(offer.market_value, 4600.0);
        assert_close(offer.initial_offer, 2898.0);
        assert_close(offer.mileage_adjustment, -1449.0);
        assert_close(offer.condition_adjustment, 230.0);
        assert_close(offer.final_offer, 1679.0);
    }

    #[test]
    fn test_missing_converter_caps_offer() {
        for condition in ["great", "good", "fair", "bad", "non-drivable", "whatever"] {
            let offer = calculate_offer_at(&vehicle("porsche", YEAR, 5_000, condition, false), YEAR);

            assert_eq!(offer.initial_offer, 0.0);
            assert_eq!(offer.mileage_adjustment, 0.0);
            assert_close(offer.condition_adjustment, 900.0);
            assert_close(offer.final_offer, 900.0);
        }
    }

    #[test]
    fn test_non_drivable_cheap_car_gets_five_percent() {
        // 8+ years old kia: 19000 * 0.2 = 3800, 5% = 190
        let offer = calculate_offer_at(&vehicle("kia", YEAR - 12, 200_000, "non-drivable", true), YEAR);

        assert_close(offer.market_value, 3800.0);
        assert_close(offer.condition_adjustment, 190.0);
        assert_close(offer.final_offer, 190.0);
    }

    #[test]
    fn test_unknown_condition_prices_as_drivable() {
        let offer = calculate_offer_at(&vehicle("toyota", YEAR, 10_000, "pristine", true), YEAR);

        assert_close(offer.initial_offer, 15750.0);
        assert_eq!(offer.condition_adjustment, 0.0);
        assert_close(offer.final_offer, 15750.0);
    }

    #[test]
    fn test_condition_label_must_match_exactly() {
        // Case variants are unrecognized: drivable branch, zero factor
        for condition in ["Non-Drivable", "GREAT"] {
            let offer = calculate_offer_at(&vehicle("toyota", YEAR, 10_000, condition, true), YEAR);

            assert_close(offer.initial_offer, 15750.0);
            assert_eq!(offer.condition_adjustment, 0.0);
            assert_close(offer.final_offer, 15750.0);
        }
    }

    #[test]
    fn test_extreme_years_still_price() {
        for year in [i32::MIN, i32::MAX] {
            let offer = calculate_offer_at(&vehicle("toyota", year, 60_000, "good", true), YEAR);

            assert!(offer.market_value.is_finite());
            assert!(offer.final_offer >= 0.0, "{} -> {:?}", year, offer);
        }

        assert_close(market_value_at("toyota", i32::MIN, i32::MAX), 5000.0);
        assert_close(mileage_adjustment_at(60_000, i32::MAX, i32::MIN), -5000.0);
    }

    #[test]
    fn test_model_does_not_affect_price() {
        let a = VehicleDescriptor::new("ford", "F-150", YEAR - 3, 70_000, "fair", true);
        let b = VehicleDescriptor::new("ford", "Fiesta", YEAR - 3, 70_000, "fair", true);
        assert_eq!(calculate_offer_at(&a, YEAR), calculate_offer_at(&b, YEAR));
    }

    #[test]
    fn test_offer_invariants_hold_across_inputs() {
        let makes = ["toyota", "porsche", "kia", "nobody"];
        let conditions = ["great", "good", "fair", "bad", "non-drivable", "???"];
        let mileages = [0, 49_999, 50_000, 75_000, 150_000, 1_000_000];
        let ages = [-1, 0, 1, 5, 8, 20];

        for make in makes {
            for condition in conditions {
                for mileage in mileages {
                    for age in ages {
                        for converter in [true, false] {
                            let v = vehicle(make, YEAR - age, mileage, condition, converter);
                            let offer = calculate_offer_at(&v, YEAR);

                            assert!(offer.final_offer >= 0.0, "{:?} -> {:?}", v, offer);

                            if v.effective_condition() == Condition::NonDrivable {
                                assert!(offer.final_offer <= 900.0);
                                assert_eq!(offer.initial_offer, 0.0);
                                assert_eq!(offer.mileage_adjustment, 0.0);
                            } else {
                                assert!(offer.mileage_adjustment >= offer.initial_offer * -0.5);
                            }

                            if mileage < 50_000 {
                                assert_eq!(offer.mileage_adjustment, 0.0);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let v = vehicle("audi", YEAR - 6, 140_000, "bad", true);
        let first = calculate_offer_at(&v, YEAR);
        let second = calculate_offer_at(&v, YEAR);

        assert_eq!(first.final_offer.to_bits(), second.final_offer.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_calculate_offer_uses_current_year() {
        let v = vehicle("toyota", current_year(), 10_000, "good", true);
        assert_close(calculate_offer(&v).market_value, 25000.0);
        assert_close(get_market_value("toyota", current_year()), 25000.0);
        assert_eq!(calculate_mileage_adjustment(10_000, current_year()), 0.0);
    }

    // ------------------------------------------------------------------------
    // Rounding & display
    // ------------------------------------------------------------------------

    #[test]
    fn test_rounded_offer() {
        let offer = calculate_offer_at(&vehicle("honda", YEAR - 10, 80_000, "great", true), YEAR);
        let rounded = offer.rounded();

        assert_eq!(rounded.market_value, 4600);
        assert_eq!(rounded.initial_offer, 2898);
        assert_eq!(rounded.mileage_adjustment, -1449);
        assert_eq!(rounded.condition_adjustment, 230);
        assert_eq!(rounded.final_offer, 1679);
    }

    #[test]
    fn test_offer_serializes_camel_case() {
        let offer = calculate_offer_at(&vehicle("toyota", YEAR, 10_000, "good", true), YEAR);
        let json = serde_json::to_value(offer).unwrap();

        assert!(json.get("marketValue").is_some());
        assert!(json.get("finalOffer").is_some());
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(15750.0), "$15,750");
        assert_eq!(format_currency(900.0), "$900");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(1234567.4), "$1,234,567");
        assert_eq!(format_currency(-1449.0), "-$1,449");
    }
}
