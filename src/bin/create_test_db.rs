use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use maaser::{Category, Transaction, create_transaction, initialize_db};

/// A utility for creating a test database for the maaser tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// `(days ago, amount, description, category, source)` for each sample transaction.
const SAMPLE_TRANSACTIONS: [(i64, f64, &str, Category, &str); 8] = [
    (400, 3100.0, "Salaire", Category::Income, "ING"),
    (380, -310.0, "Don Maaser", Category::MaaserGiven, "ING"),
    (95, 3250.0, "Salaire", Category::Income, "ING"),
    (90, -82.45, "Delhaize", Category::Expense, "ING"),
    (60, 450.0, "Freelance invoice", Category::Income, "Manual"),
    (45, -180.0, "Tzedaka box", Category::MaaserGiven, "Manual"),
    (30, 3250.0, "Salaire", Category::Income, "AI Parsed"),
    (3, -54.3, "Pharmacie", Category::Expense, "AI Parsed"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();

    for (days_ago, amount, description, category, source) in SAMPLE_TRANSACTIONS {
        let transaction = Transaction::build(
            amount,
            today - Duration::days(days_ago),
            description,
            category,
        )
        .source(source);

        create_transaction(transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
