use crate::offer::Offer;
use crate::pickup::Pickup;
use crate::vehicle::{Condition, VehicleDescriptor};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Columns of `car_valuations` in the order `row_to_valuation` reads them
const VALUATION_COLUMNS: &str = "id, make, model, year, mileage, condition,
    body_type, color, transmission, catalytic_converter,
    market_value, initial_offer, mileage_adjustment, condition_adjustment, final_offer,
    photo_urls, created_at, user_id";

const PICKUP_COLUMNS: &str = "pickup_id, valuation_id, full_name, email, phone,
    address, city, state, zip, pickup_date, created_at";

// ============================================================================
// VALUATION RECORDS
// ============================================================================

/// A stored valuation: the vehicle as described plus the offer rounded to
/// whole dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub condition: Condition,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub transmission: bool,
    pub catalytic_converter: bool,
    pub market_value: i64,
    pub initial_offer: i64,
    pub mileage_adjustment: i64,
    pub condition_adjustment: i64,
    pub final_offer: i64,
    pub photo_urls: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
}

/// Insert payload for `car_valuations`, as posted by the valuation form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewValuation {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub condition: Condition,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub transmission: bool,
    #[serde(default)]
    pub catalytic_converter: bool,
    pub market_value: i64,
    pub initial_offer: i64,
    pub mileage_adjustment: i64,
    pub condition_adjustment: i64,
    pub final_offer: i64,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Optional form fields that ride along with a quote but are never priced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleExtras {
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub transmission: bool,
    #[serde(default)]
    pub photo_urls: Option<Vec<String>>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl NewValuation {
    /// Build an insert from an engine result, rounding every amount
    pub fn from_quote(vehicle: &VehicleDescriptor, offer: &Offer, extras: VehicleExtras) -> Self {
        let rounded = offer.rounded();

        NewValuation {
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            mileage: vehicle.mileage,
            condition: vehicle.effective_condition(),
            body_type: extras.body_type,
            color: extras.color,
            transmission: extras.transmission,
            catalytic_converter: vehicle.has_catalytic_converter,
            market_value: rounded.market_value,
            initial_offer: rounded.initial_offer,
            mileage_adjustment: rounded.mileage_adjustment,
            condition_adjustment: rounded.condition_adjustment,
            final_offer: rounded.final_offer,
            photo_urls: extras.photo_urls,
            user_id: extras.user_id,
        }
    }
}

// ============================================================================
// CSV IMPORT ROWS
// ============================================================================

fn default_true() -> bool {
    true
}

/// One vehicle to quote from a bulk-import CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteRow {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub condition: String,
    #[serde(default = "default_true")]
    pub catalytic_converter: bool,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub transmission: bool,
}

impl QuoteRow {
    pub fn descriptor(&self) -> VehicleDescriptor {
        VehicleDescriptor::new(
            self.make.trim().to_lowercase(),
            self.model.trim(),
            self.year,
            self.mileage,
            Condition::parse_lenient(&self.condition),
            self.catalytic_converter,
        )
    }

    pub fn extras(&self) -> VehicleExtras {
        VehicleExtras {
            body_type: self.body_type.clone().filter(|s| !s.is_empty()),
            color: self.color.clone().filter(|s| !s.is_empty()),
            transmission: self.transmission,
            photo_urls: None,
            user_id: None,
        }
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<QuoteRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize::<QuoteRow>().enumerate() {
        // Header is line 1
        let row = result.with_context(|| format!("Failed to deserialize CSV row {}", line + 2))?;
        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS car_valuations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            mileage INTEGER NOT NULL,
            condition TEXT NOT NULL,
            body_type TEXT,
            color TEXT,
            transmission INTEGER NOT NULL DEFAULT 0,
            catalytic_converter INTEGER NOT NULL DEFAULT 0,
            market_value INTEGER NOT NULL,
            initial_offer INTEGER NOT NULL,
            mileage_adjustment INTEGER NOT NULL,
            condition_adjustment INTEGER NOT NULL,
            final_offer INTEGER NOT NULL,
            photo_urls TEXT,
            created_at TEXT NOT NULL,
            user_id INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pickup_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pickup_id TEXT UNIQUE NOT NULL,
            valuation_id INTEGER NOT NULL REFERENCES car_valuations(id),
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            zip TEXT NOT NULL,
            pickup_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_valuations_created_at ON car_valuations(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_valuations_user ON car_valuations(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pickups_valuation ON pickup_requests(valuation_id)",
        [],
    )?;

    Ok(())
}

// Fixed-width UTC timestamps sort lexicographically in time order
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// VALUATIONS
// ============================================================================

fn row_to_valuation(row: &Row) -> rusqlite::Result<Valuation> {
    let condition: String = row.get(5)?;

    let photo_urls_json: Option<String> = row.get(15)?;
    let photo_urls = photo_urls_json
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(15, Type::Text, Box::new(e)))?;

    let created_at_str: String = row.get(16)?;
    let created_at = parse_timestamp(16, &created_at_str)?;

    Ok(Valuation {
        id: row.get(0)?,
        make: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        mileage: row.get(4)?,
        condition: Condition::parse(&condition),
        body_type: row.get(6)?,
        color: row.get(7)?,
        transmission: row.get(8)?,
        catalytic_converter: row.get(9)?,
        market_value: row.get(10)?,
        initial_offer: row.get(11)?,
        mileage_adjustment: row.get(12)?,
        condition_adjustment: row.get(13)?,
        final_offer: row.get(14)?,
        photo_urls,
        created_at,
        user_id: row.get(17)?,
    })
}

/// Store a valuation and return it with its id and creation time
pub fn insert_valuation(conn: &Connection, valuation: &NewValuation) -> Result<Valuation> {
    // Stored at microsecond precision; keep the returned value identical
    let created_at = Utc::now().trunc_subsecs(6);
    let photo_urls_json = valuation
        .photo_urls
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to serialize photo URLs")?;

    conn.execute(
        "INSERT INTO car_valuations (
            make, model, year, mileage, condition,
            body_type, color, transmission, catalytic_converter,
            market_value, initial_offer, mileage_adjustment, condition_adjustment, final_offer,
            photo_urls, created_at, user_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            valuation.make,
            valuation.model,
            valuation.year,
            valuation.mileage,
            valuation.condition.as_str(),
            valuation.body_type,
            valuation.color,
            valuation.transmission,
            valuation.catalytic_converter,
            valuation.market_value,
            valuation.initial_offer,
            valuation.mileage_adjustment,
            valuation.condition_adjustment,
            valuation.final_offer,
            photo_urls_json,
            timestamp(&created_at),
            valuation.user_id,
        ],
    )
    .context("Failed to insert car valuation")?;

    let id = conn.last_insert_rowid();
    debug!(id, make = %valuation.make, final_offer = valuation.final_offer, "Stored car valuation");

    Ok(Valuation {
        id,
        make: valuation.make.clone(),
        model: valuation.model.clone(),
        year: valuation.year,
        mileage: valuation.mileage,
        condition: valuation.condition.clone(),
        body_type: valuation.body_type.clone(),
        color: valuation.color.clone(),
        transmission: valuation.transmission,
        catalytic_converter: valuation.catalytic_converter,
        market_value: valuation.market_value,
        initial_offer: valuation.initial_offer,
        mileage_adjustment: valuation.mileage_adjustment,
        condition_adjustment: valuation.condition_adjustment,
        final_offer: valuation.final_offer,
        photo_urls: valuation.photo_urls.clone(),
        created_at,
        user_id: valuation.user_id,
    })
}

/// All valuations, newest first
pub fn get_all_valuations(conn: &Connection) -> Result<Vec<Valuation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM car_valuations ORDER BY created_at DESC, id DESC",
        VALUATION_COLUMNS
    ))?;

    let valuations = stmt
        .query_map([], row_to_valuation)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(valuations)
}

pub fn get_valuation_by_id(conn: &Connection, id: i64) -> Result<Option<Valuation>> {
    let valuation = conn
        .query_row(
            &format!("SELECT {} FROM car_valuations WHERE id = ?1", VALUATION_COLUMNS),
            [id],
            row_to_valuation,
        )
        .optional()
        .with_context(|| format!("Failed to load car valuation {}", id))?;

    Ok(valuation)
}

/// Valuations owned by one user, newest first
pub fn get_valuations_by_user(conn: &Connection, user_id: i64) -> Result<Vec<Valuation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM car_valuations WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        VALUATION_COLUMNS
    ))?;

    let valuations = stmt
        .query_map([user_id], row_to_valuation)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(valuations)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM car_valuations", [], |row| row.get(0))?;

    Ok(count)
}

/// Demo valuations for an empty database. Returns how many were inserted.
pub fn seed_sample_valuations(conn: &Connection) -> Result<usize> {
    if verify_count(conn)? > 0 {
        info!("Skipping seeding car valuations - data already exists");
        return Ok(0);
    }

    info!("Seeding sample car valuations...");

    let samples = sample_valuations();
    for sample in &samples {
        insert_valuation(conn, sample)?;
    }

    info!(count = samples.len(), "Car valuations seeded");
    Ok(samples.len())
}

fn sample_valuations() -> Vec<NewValuation> {
    fn sample(
        make: &str,
        model: &str,
        year: i32,
        mileage: i64,
        condition: Condition,
        body_type: &str,
        color: &str,
        amounts: [i64; 5],
        photo: &str,
    ) -> NewValuation {
        NewValuation {
            make: make.to_string(),
            model: model.to_string(),
            year,
            mileage,
            condition,
            body_type: Some(body_type.to_string()),
            color: Some(color.to_string()),
            transmission: true,
            catalytic_converter: true,
            market_value: amounts[0],
            initial_offer: amounts[1],
            mileage_adjustment: amounts[2],
            condition_adjustment: amounts[3],
            final_offer: amounts[4],
            photo_urls: Some(vec![photo.to_string()]),
            user_id: None,
        }
    }

    vec![
        sample(
            "toyota", "camry", 2018, 45000, Condition::Good, "sedan", "silver",
            [18500, 11655, 0, 0, 11655],
            "https://example.com/toyota-camry-1.jpg",
        ),
        sample(
            "ford", "f-150", 2015, 78000, Condition::Fair, "truck", "blue",
            [22000, 13860, -1200, -1100, 11560],
            "https://example.com/ford-f150-1.jpg",
        ),
        sample(
            "honda", "civic", 2020, 25000, Condition::Great, "sedan", "white",
            [19800, 12474, 500, 990, 13964],
            "https://example.com/honda-civic-1.jpg",
        ),
    ]
}

// ============================================================================
// PICKUP REQUESTS
// ============================================================================

fn row_to_pickup(row: &Row) -> rusqlite::Result<Pickup> {
    let pickup_date_str: String = row.get(9)?;
    let pickup_date = NaiveDate::parse_from_str(&pickup_date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    let created_at_str: String = row.get(10)?;

    Ok(Pickup {
        id: row.get(0)?,
        valuation_id: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        state: row.get(7)?,
        zip: row.get(8)?,
        pickup_date,
        created_at: parse_timestamp(10, &created_at_str)?,
    })
}

pub fn insert_pickup(conn: &Connection, pickup: &Pickup) -> Result<()> {
    conn.execute(
        "INSERT INTO pickup_requests (
            pickup_id, valuation_id, full_name, email, phone,
            address, city, state, zip, pickup_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            pickup.id,
            pickup.valuation_id,
            pickup.full_name,
            pickup.email,
            pickup.phone,
            pickup.address,
            pickup.city,
            pickup.state,
            pickup.zip,
            pickup.pickup_date.format("%Y-%m-%d").to_string(),
            timestamp(&pickup.created_at),
        ],
    )
    .context("Failed to insert pickup request")?;

    Ok(())
}

/// Pickups scheduled for a valuation, earliest pickup date first
pub fn get_pickups_for_valuation(conn: &Connection, valuation_id: i64) -> Result<Vec<Pickup>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM pickup_requests WHERE valuation_id = ?1 ORDER BY pickup_date ASC, id ASC",
        PICKUP_COLUMNS
    ))?;

    let pickups = stmt
        .query_map([valuation_id], row_to_pickup)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(pickups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::calculate_offer_at;
    use std::io::Write;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn quoted(make: &str, mileage: i64, user_id: Option<i64>) -> NewValuation {
        let vehicle = VehicleDescriptor::new(make, "Test", 2020, mileage, "good", true);
        let offer = calculate_offer_at(&vehicle, 2025);
        NewValuation::from_quote(
            &vehicle,
            &offer,
            VehicleExtras {
                user_id,
                ..VehicleExtras::default()
            },
        )
    }

    #[test]
    fn test_insert_and_fetch_by_id() {
        let conn = test_db();

        let mut new = quoted("toyota", 60000, None);
        new.photo_urls = Some(vec!["https://example.com/a.jpg".to_string()]);
        new.body_type = Some("sedan".to_string());

        let stored = insert_valuation(&conn, &new).unwrap();
        assert!(stored.id > 0);

        let fetched = get_valuation_by_id(&conn, stored.id).unwrap().unwrap();
        assert_eq!(fetched.make, "toyota");
        assert_eq!(fetched.condition, Condition::Good);
        assert_eq!(fetched.final_offer, new.final_offer);
        assert_eq!(fetched.photo_urls, new.photo_urls);
        assert_eq!(fetched.body_type.as_deref(), Some("sedan"));
        assert_eq!(fetched.created_at, stored.created_at);
    }

    #[test]
    fn test_corrupt_photo_urls_is_an_error() {
        let conn = test_db();
        let stored = insert_valuation(&conn, &quoted("toyota", 60000, None)).unwrap();

        conn.execute(
            "UPDATE car_valuations SET photo_urls = 'not json' WHERE id = ?1",
            [stored.id],
        )
        .unwrap();

        assert!(get_valuation_by_id(&conn, stored.id).is_err());
    }

    #[test]
    fn test_missing_id_is_none() {
        let conn = test_db();
        assert!(get_valuation_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_from_quote_rounds_and_records_effective_condition() {
        let vehicle = VehicleDescriptor::new("honda", "Civic", 2015, 80000, "great", false);
        let offer = calculate_offer_at(&vehicle, 2025);
        let new = NewValuation::from_quote(&vehicle, &offer, VehicleExtras::default());

        assert_eq!(new.condition, Condition::NonDrivable);
        assert!(!new.catalytic_converter);
        assert_eq!(new.initial_offer, 0);
        assert_eq!(new.final_offer, 230);
    }

    #[test]
    fn test_all_valuations_newest_first() {
        let conn = test_db();

        let first = insert_valuation(&conn, &quoted("toyota", 10000, None)).unwrap();
        let second = insert_valuation(&conn, &quoted("honda", 10000, None)).unwrap();
        let third = insert_valuation(&conn, &quoted("ford", 10000, None)).unwrap();

        let all = get_all_valuations(&conn).unwrap();
        let ids: Vec<i64> = all.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_valuations_by_user() {
        let conn = test_db();

        insert_valuation(&conn, &quoted("toyota", 10000, Some(7))).unwrap();
        insert_valuation(&conn, &quoted("honda", 10000, Some(8))).unwrap();
        let latest = insert_valuation(&conn, &quoted("ford", 10000, Some(7))).unwrap();

        let mine = get_valuations_by_user(&conn, 7).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, latest.id);
        assert!(mine.iter().all(|v| v.user_id == Some(7)));

        assert!(get_valuations_by_user(&conn, 99).unwrap().is_empty());
    }

    #[test]
    fn test_seed_only_when_empty() {
        let conn = test_db();

        assert_eq!(seed_sample_valuations(&conn).unwrap(), 3);
        assert_eq!(verify_count(&conn).unwrap(), 3);

        assert_eq!(seed_sample_valuations(&conn).unwrap(), 0);
        assert_eq!(verify_count(&conn).unwrap(), 3);

        let all = get_all_valuations(&conn).unwrap();
        let ford = all.iter().find(|v| v.make == "ford").unwrap();
        assert_eq!(ford.final_offer, 11560);
        assert_eq!(ford.mileage_adjustment, -1200);
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "make,model,year,mileage,condition,catalytic_converter,body_type,color,transmission").unwrap();
        writeln!(file, "Toyota,Camry,2019,62000,Good,true,sedan,red,true").unwrap();
        writeln!(file, "kia,Soul,2016,140000,bad,false,,,false").unwrap();
        file.flush().unwrap();

        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);

        let camry = rows[0].descriptor();
        assert_eq!(camry.make, "toyota");
        assert_eq!(camry.condition, Condition::Good);
        assert_eq!(rows[0].extras().color.as_deref(), Some("red"));

        let soul = &rows[1];
        assert!(!soul.catalytic_converter);
        assert!(soul.extras().body_type.is_none());
    }

    #[test]
    fn test_load_csv_reports_bad_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "make,model,year,mileage,condition").unwrap();
        writeln!(file, "toyota,Camry,not-a-year,1000,good").unwrap();
        file.flush().unwrap();

        let err = load_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_pickup_round_trip() {
        let conn = test_db();
        let valuation = insert_valuation(&conn, &quoted("toyota", 10000, None)).unwrap();

        let pickup = Pickup {
            id: uuid::Uuid::new_v4().to_string(),
            valuation_id: valuation.id,
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            city: "Cartown".to_string(),
            state: "CA".to_string(),
            zip: "90210".to_string(),
            pickup_date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            created_at: Utc::now(),
        };

        insert_pickup(&conn, &pickup).unwrap();

        let pickups = get_pickups_for_valuation(&conn, valuation.id).unwrap();
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].id, pickup.id);
        assert_eq!(pickups[0].pickup_date, pickup.pickup_date);
    }
}
