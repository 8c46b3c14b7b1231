// REST API with Axum
// Thin HTTP layer: validates, calls the engine or storage, wraps the result

use crate::catalog;
use crate::db::{self, NewValuation, Valuation};
use crate::offer::{self, Offer};
use crate::pickup::{self, Pickup, PickupError, PickupRequest};
use crate::schema::{self, ValidationError};
use crate::vehicle::VehicleDescriptor;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}

// ============================================================================
// Response envelope & errors
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: String, errors: Option<Vec<ValidationError>>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Well-formed request that breaks a business rule
    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<PickupError> for AppError {
    fn from(err: PickupError) -> Self {
        match err {
            PickupError::ValuationNotFound(_) => AppError::NotFound(err.to_string()),
            PickupError::Storage(inner) => AppError::Internal(inner),
            other => AppError::Unprocessable(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("Validation failed".to_string(), Some(errors)),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiResponse::failure(msg, None)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::failure(msg, None)),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::failure(msg, None),
            ),
            AppError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure("Internal server error".to_string(), None),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// `Json` body whose rejections (bad syntax, missing or mistyped fields)
/// come back in the `ApiResponse` envelope as 400s
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

fn parse_id(raw: &str, message: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(message.to_string()))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/quote - Price a vehicle without storing it
async fn quote(ApiJson(vehicle): ApiJson<VehicleDescriptor>) -> Result<Json<ApiResponse<Offer>>, AppError> {
    schema::validate_descriptor(&vehicle).map_err(AppError::Validation)?;

    let offer = offer::calculate_offer(&vehicle);
    info!(make = %vehicle.make, year = vehicle.year, final_offer = offer.final_offer, "Quoted vehicle");

    Ok(Json(ApiResponse::ok(offer)))
}

/// POST /api/car-valuation - Store a computed valuation
async fn create_valuation(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewValuation>,
) -> Result<(StatusCode, Json<ApiResponse<Valuation>>), AppError> {
    schema::validate_new_valuation(&new).map_err(AppError::Validation)?;

    let conn = state.conn()?;
    let stored = db::insert_valuation(&conn, &new)?;
    info!(id = stored.id, final_offer = stored.final_offer, "Car valuation created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

/// GET /api/car-valuations - All valuations, newest first
async fn list_valuations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Valuation>>>, AppError> {
    let conn = state.conn()?;
    let valuations = db::get_all_valuations(&conn)?;

    Ok(Json(ApiResponse::ok(valuations)))
}

/// GET /api/car-valuation/:id - One valuation
async fn get_valuation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Valuation>>, AppError> {
    let id = parse_id(&raw_id, "Invalid ID format")?;

    let conn = state.conn()?;
    let valuation = db::get_valuation_by_id(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Car valuation not found".to_string()))?;

    Ok(Json(ApiResponse::ok(valuation)))
}

/// GET /api/user/:user_id/car-valuations - Valuations owned by a user
async fn user_valuations(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Valuation>>>, AppError> {
    let user_id = parse_id(&raw_user_id, "Invalid user ID format")?;

    let conn = state.conn()?;
    let valuations = db::get_valuations_by_user(&conn, user_id)?;

    Ok(Json(ApiResponse::ok(valuations)))
}

/// GET /api/makes - Makes the form offers
async fn list_makes() -> impl IntoResponse {
    let makes: Vec<&'static str> = catalog::makes().collect();
    Json(ApiResponse::ok(makes))
}

/// GET /api/makes/:make/models - Model options for one make
async fn make_models(
    Path(make): Path<String>,
) -> Result<Json<ApiResponse<&'static [&'static str]>>, AppError> {
    let models = catalog::models_for(&make.to_lowercase())
        .ok_or_else(|| AppError::NotFound(format!("Unknown make: {}", make)))?;

    Ok(Json(ApiResponse::ok(models)))
}

/// POST /api/car-valuation/:id/pickup - Accept the offer and book a pickup
async fn create_pickup(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(request): ApiJson<PickupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Pickup>>), AppError> {
    let valuation_id = parse_id(&raw_id, "Invalid ID format")?;

    let conn = state.conn()?;
    let pickup = pickup::schedule_pickup(&conn, valuation_id, &request, Utc::now())?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(pickup))))
}

/// GET /api/car-valuation/:id/pickups - Pickups booked against a valuation
async fn list_pickups(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Pickup>>>, AppError> {
    let valuation_id = parse_id(&raw_id, "Invalid ID format")?;

    let conn = state.conn()?;
    if db::get_valuation_by_id(&conn, valuation_id)?.is_none() {
        return Err(AppError::NotFound("Car valuation not found".to_string()));
    }

    let pickups = db::get_pickups_for_valuation(&conn, valuation_id)?;

    Ok(Json(ApiResponse::ok(pickups)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/quote", post(quote))
        .route("/car-valuation", post(create_valuation))
        .route("/car-valuations", get(list_valuations))
        .route("/car-valuation/:id", get(get_valuation))
        .route("/car-valuation/:id/pickup", post(create_pickup))
        .route("/car-valuation/:id/pickups", get(list_pickups))
        .route("/user/:user_id/car-valuations", get(user_valuations))
        .route("/makes", get(list_makes))
        .route("/makes/:make/models", get(make_models))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
