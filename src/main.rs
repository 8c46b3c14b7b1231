use anyhow::{Context, Result};
use car_offer::{
    calculate_offer, format_currency, get_all_valuations, get_valuation_by_id, insert_valuation,
    load_config, load_csv, seed_sample_valuations, setup_database, validate_descriptor,
    verify_count, Condition, NewValuation, Settings, Valuation, VehicleDescriptor, VehicleExtras,
};
use car_offer::catalog::is_known_make;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "car-offer")]
#[command(version, about = "Instant cash offers for used vehicles")]
struct Cli {
    /// Path to the TOML settings file
    #[arg(short, long, env = "CAR_OFFER_CONFIG", default_value = car_offer::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one vehicle and print the breakdown
    Quote {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        mileage: i64,
        /// great, good, fair, bad or non-drivable
        #[arg(long, default_value = "good")]
        condition: String,
        #[arg(long)]
        no_catalytic_converter: bool,
        /// Store the quote as a valuation
        #[arg(long)]
        save: bool,
    },
    /// Price every row of a CSV file and store the results
    Import { csv: PathBuf },
    /// Insert the demo valuations into an empty database
    Seed,
    /// Print stored valuations, newest first
    List,
    /// Print one stored valuation
    Show { id: i64 },
    /// Browse stored valuations in the terminal
    Ui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_config(&cli.config)?;

    let command = cli.command.unwrap_or(Commands::Ui);

    // The TUI owns the terminal; log lines would tear the screen
    if !matches!(command, Commands::Ui) {
        car_offer::init_tracing(&settings.logging.level);
    }

    match command {
        Commands::Quote {
            make,
            model,
            year,
            mileage,
            condition,
            no_catalytic_converter,
            save,
        } => {
            let vehicle = VehicleDescriptor::new(
                make.trim().to_lowercase(),
                model,
                year,
                mileage,
                Condition::parse_lenient(&condition),
                !no_catalytic_converter,
            );
            run_quote(&settings, &vehicle, save)
        }
        Commands::Import { csv } => run_import(&settings, &csv),
        Commands::Seed => run_seed(&settings),
        Commands::List => run_list(&settings),
        Commands::Show { id } => run_show(&settings, id),
        Commands::Ui => run_ui_mode(&settings),
    }
}

fn open_database(settings: &Settings) -> Result<Connection> {
    let conn = Connection::open(&settings.database.path)
        .with_context(|| format!("Failed to open database at {}", settings.database.path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_quote(settings: &Settings, vehicle: &VehicleDescriptor, save: bool) -> Result<()> {
    if let Err(errors) = validate_descriptor(vehicle) {
        for error in &errors {
            eprintln!("✗ {}", error);
        }
        anyhow::bail!("Vehicle failed validation ({} errors)", errors.len());
    }

    if !is_known_make(&vehicle.make) {
        warn!(make = %vehicle.make, "Unknown make, pricing with the default base value");
    }

    let offer = calculate_offer(vehicle);
    let rounded = offer.rounded();

    println!(
        "{} {} {} ({} miles, {})",
        vehicle.year,
        vehicle.make,
        vehicle.model,
        vehicle.mileage,
        vehicle.effective_condition()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Market Value:          {:>12}", format_currency(offer.market_value));
    println!("  Initial Offer:         {:>12}", format_currency(offer.initial_offer));
    println!("  Mileage Adjustment:    {:>12}", format_currency(offer.mileage_adjustment));
    println!("  Condition Adjustment:  {:>12}", format_currency(offer.condition_adjustment));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Final Offer:           {:>12}", format_currency(offer.final_offer));

    if save {
        let conn = open_database(settings)?;
        let new = NewValuation::from_quote(vehicle, &offer, VehicleExtras::default());
        let stored = insert_valuation(&conn, &new)?;
        info!(id = stored.id, final_offer = rounded.final_offer, "Saved valuation");
        println!("\n✓ Saved as valuation #{}", stored.id);
    }

    Ok(())
}

fn run_import(settings: &Settings, csv_path: &Path) -> Result<()> {
    let rows = load_csv(csv_path)?;
    info!(rows = rows.len(), path = %csv_path.display(), "Loaded CSV");

    let conn = open_database(settings)?;

    let mut imported = 0usize;
    let mut rejected = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let vehicle = row.descriptor();

        if let Err(errors) = validate_descriptor(&vehicle) {
            let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            warn!(row = index + 1, reasons = %reasons.join("; "), "Skipping invalid row");
            rejected += 1;
            continue;
        }

        if !is_known_make(&vehicle.make) {
            warn!(row = index + 1, make = %vehicle.make, "Unknown make, pricing with the default base value");
        }

        let offer = calculate_offer(&vehicle);
        let new = NewValuation::from_quote(&vehicle, &offer, row.extras());
        insert_valuation(&conn, &new)?;
        imported += 1;
    }

    let count = verify_count(&conn)?;
    info!(imported, rejected, total = count, "Import finished");

    println!("✓ Imported {} valuations ({} rejected)", imported, rejected);
    println!("✓ Database contains {} valuations", count);

    Ok(())
}

fn run_seed(settings: &Settings) -> Result<()> {
    let conn = open_database(settings)?;
    let inserted = seed_sample_valuations(&conn)?;

    if inserted == 0 {
        println!("Database already has valuations, nothing seeded");
    } else {
        println!("✓ Seeded {} sample valuations", inserted);
    }

    Ok(())
}

fn print_summary(valuation: &Valuation) {
    println!(
        "#{:<5} {:<14} {:<18} {:>4} {:>8} mi  {:<12} {:>10}",
        valuation.id,
        valuation.make,
        valuation.model,
        valuation.year,
        valuation.mileage,
        valuation.condition,
        format_currency(valuation.final_offer as f64)
    );
}

fn run_list(settings: &Settings) -> Result<()> {
    let conn = open_database(settings)?;
    let valuations = get_all_valuations(&conn)?;

    if valuations.is_empty() {
        println!("No valuations stored yet");
        return Ok(());
    }

    for valuation in &valuations {
        print_summary(valuation);
    }

    Ok(())
}

fn run_show(settings: &Settings, id: i64) -> Result<()> {
    let conn = open_database(settings)?;
    let valuation = get_valuation_by_id(&conn, id)?
        .with_context(|| format!("Car valuation {} not found", id))?;

    println!("{}", serde_json::to_string_pretty(&valuation)?);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    let conn = open_database(settings)?;

    let valuations = get_all_valuations(&conn)?;
    let total_count = verify_count(&conn)?;

    let mut app = car_offer::ui::App::new(valuations, total_count);
    car_offer::ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin offer-server --features server");
    std::process::exit(1);
}
