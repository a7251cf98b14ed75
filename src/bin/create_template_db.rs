use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use forbo::{NewPeriod, PeriodInsert, create_period, initialize_db, parse_period_name};

/// A utility for creating a template database for the forbo server.
///
/// The server copies the template when it has to create a new database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Periods to add to the template, e.g. `--period 2024 --period 2025`.
    #[arg(long)]
    period: Vec<String>,
}

/// Create a database with the app's schema and the given periods.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'template.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'template.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let mut names = Vec::with_capacity(args.period.len());
    for text in &args.period {
        match parse_period_name(text) {
            Ok(name) => names.push(name),
            Err(error) => {
                eprintln!("Invalid period name {text:?}: {error}");
                exit(1);
            }
        }
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    for name in &names {
        match create_period(&NewPeriod::named(name), &conn)? {
            PeriodInsert::Inserted => println!("Added period {name}"),
            PeriodInsert::AlreadyExists => println!("Period {name} was given more than once"),
        }
    }

    println!("Success!");

    Ok(())
}
