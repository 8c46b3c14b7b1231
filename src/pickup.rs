// 🚚 Pickup Scheduling - accepting an offer
// Validates the sell-now form and books a pickup against a stored valuation

use crate::db;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Latest pickup date the calendar allows, counted from today
pub const PICKUP_WINDOW_DAYS: i64 = 30;

/// How long an offer can be accepted after the valuation was stored
pub const OFFER_VALIDITY_DAYS: i64 = 7;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PickupError {
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Without a title the vehicle has to be re-quoted as non-drivable
    #[error("a title is required; without one the vehicle is valued as non-drivable")]
    TitleRequired,

    #[error("pickup date {date} must be between {earliest} and {latest}")]
    DateOutOfWindow {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("car valuation {0} not found")]
    ValuationNotFound(i64),

    #[error("offer for valuation {valuation_id} expired on {expired_at}")]
    OfferExpired {
        valuation_id: i64,
        expired_at: DateTime<Utc>,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

// ============================================================================
// REQUEST & RECORD
// ============================================================================

fn default_true() -> bool {
    true
}

/// The sell-now form as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default = "default_true")]
    pub has_title: bool,
    #[serde(default)]
    pub pickup_date: Option<NaiveDate>,
}

/// A booked pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    /// UUID v4 confirmation id
    pub id: String,
    pub valuation_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub pickup_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check the form on its own, without touching storage.
///
/// Returns the pickup date on success so callers don't unwrap it again.
pub fn validate_pickup(request: &PickupRequest, today: NaiveDate) -> Result<NaiveDate, PickupError> {
    let required = [
        ("fullName", &request.full_name),
        ("email", &request.email),
        ("phone", &request.phone),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(PickupError::MissingField(field));
        }
    }

    let date = request.pickup_date.ok_or(PickupError::MissingField("pickupDate"))?;

    if !request.has_title {
        return Err(PickupError::TitleRequired);
    }

    let latest = today + Duration::days(PICKUP_WINDOW_DAYS);
    if date < today || date > latest {
        return Err(PickupError::DateOutOfWindow {
            date,
            earliest: today,
            latest,
        });
    }

    Ok(date)
}

// ============================================================================
// SCHEDULING
// ============================================================================

/// Accept the offer on `valuation_id` and book the pickup
pub fn schedule_pickup(
    conn: &Connection,
    valuation_id: i64,
    request: &PickupRequest,
    now: DateTime<Utc>,
) -> Result<Pickup, PickupError> {
    let pickup_date = validate_pickup(request, now.date_naive())?;

    let valuation =
        db::get_valuation_by_id(conn, valuation_id)?.ok_or(PickupError::ValuationNotFound(valuation_id))?;

    let expired_at = valuation.created_at + Duration::days(OFFER_VALIDITY_DAYS);
    if now > expired_at {
        return Err(PickupError::OfferExpired {
            valuation_id,
            expired_at,
        });
    }

    let pickup = Pickup {
        id: uuid::Uuid::new_v4().to_string(),
        valuation_id,
        full_name: request.full_name.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: request.phone.trim().to_string(),
        address: request.address.trim().to_string(),
        city: request.city.trim().to_string(),
        state: request.state.trim().to_string(),
        zip: request.zip.trim().to_string(),
        pickup_date,
        created_at: now,
    };

    db::insert_pickup(conn, &pickup)?;

    info!(
        pickup_id = %pickup.id,
        valuation_id,
        pickup_date = %pickup.pickup_date,
        final_offer = valuation.final_offer,
        "Pickup scheduled"
    );

    Ok(pickup)
}
