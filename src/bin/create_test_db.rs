use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use ledger_rs::{NewTransaction, count_transactions, create_transaction, initialize_db};

/// A utility for creating a test database for the REST API server of ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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

    for (amount, category, description, is_income, date) in [
        (3200.0, "salary", "Pay day", true, "2024-01-01"),
        (42.5, "food", "lunch", false, "2024-01-02"),
        (1200.0, "housing", "Rent", false, "2024-01-03"),
        (15.99, "entertainment", "Streaming subscription", false, "2024-01-05"),
        (250.0, "side job", "Logo design", true, "2024-01-08"),
    ] {
        create_transaction(
            &NewTransaction {
                amount,
                category: category.to_owned(),
                description: description.to_owned(),
                is_income,
                date: date.to_owned(),
            },
            &conn,
        )?;
    }

    println!("Created {} transactions.", count_transactions(&conn)?);
    println!("Success!");

    Ok(())
}
