use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error, amount::optional_decimal_from_row, invoice::AttachmentStore, sanitize::sanitize,
};

/// A named accounting interval, e.g. a fiscal year.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// The unique name of the period.
    pub name: String,
    /// The bank balance at the start of the period.
    pub opening_balance: Option<Decimal>,
    /// The bank balance at the end of the period.
    pub closing_balance: Option<Decimal>,
    /// Free-text notes about the period.
    pub notes: Option<String>,
}

/// The data needed to create a period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPeriod {
    /// The period name, see [parse_period_name].
    pub name: String,
    /// The bank balance at the start of the period.
    pub opening_balance: Option<Decimal>,
    /// The bank balance at the end of the period.
    pub closing_balance: Option<Decimal>,
    /// Free-text notes shown on the home page.
    pub notes: Option<String>,
}

impl NewPeriod {
    /// A period with just a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
}

/// The outcome of [create_period].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodInsert {
    /// The period was added.
    Inserted,
    /// A period with the same name exists, nothing was changed.
    AlreadyExists,
}

pub fn create_period_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS period (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            opening_balance TEXT,
            closing_balance TEXT,
            notes TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_period(row: &Row) -> Result<Period, rusqlite::Error> {
    Ok(Period {
        name: row.get(0)?,
        opening_balance: optional_decimal_from_row(row, 1)?,
        closing_balance: optional_decimal_from_row(row, 2)?,
        notes: row.get(3)?,
    })
}

/// Check that `name` can be used as a period name, which is also the name of
/// the period's attachment directory.
///
/// # Errors
/// Returns [Error::EmptyPeriodName] for a blank name and
/// [Error::InvalidPeriodName] for names made of dots only, such as "..".
pub fn validate_period_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyPeriodName);
    }

    if name.chars().all(|c| c == '.') || name.contains(['/', '\\']) {
        return Err(Error::InvalidPeriodName(name.to_owned()));
    }

    Ok(name.to_owned())
}

/// Sanitize user-supplied text and check that the result is a valid period name.
///
/// # Errors
/// Returns the errors of [validate_period_name].
pub fn parse_period_name(text: &str) -> Result<String, Error> {
    validate_period_name(&sanitize(text))
}

/// Insert a period. Inserting a name that already exists changes nothing and
/// returns [PeriodInsert::AlreadyExists].
pub fn create_period(new_period: &NewPeriod, connection: &Connection) -> Result<PeriodInsert, Error> {
    let result = connection.execute(
        "INSERT INTO period (name, opening_balance, closing_balance, notes) VALUES (?1, ?2, ?3, ?4)",
        params![
            new_period.name,
            new_period.opening_balance.map(|balance| balance.to_string()),
            new_period.closing_balance.map(|balance| balance.to_string()),
            new_period.notes,
        ],
    );

    match result {
        Ok(_) => Ok(PeriodInsert::Inserted),
        // Code 2067 occurs when a UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(error, Some(_))) if error.extended_code == 2067 => {
            tracing::debug!("Period \"{}\" already exists", new_period.name);
            Ok(PeriodInsert::AlreadyExists)
        }
        Err(error) => Err(error.into()),
    }
}

/// Get all periods ordered by name.
pub fn get_all_periods(connection: &Connection) -> Result<Vec<Period>, Error> {
    connection
        .prepare(
            "SELECT name, opening_balance, closing_balance, notes FROM period ORDER BY name ASC",
        )?
        .query_map([], map_row_to_period)?
        .map(|maybe_period| maybe_period.map_err(Error::from))
        .collect()
}

/// Get all periods ordered by name. If there are none, a period named after
/// the current year is created first, so the result is never empty.
pub fn list_periods(connection: &Connection) -> Result<Vec<Period>, Error> {
    list_periods_or_create(&current_year(), connection)
}

fn list_periods_or_create(default_name: &str, connection: &Connection) -> Result<Vec<Period>, Error> {
    let periods = get_all_periods(connection)?;

    if !periods.is_empty() {
        return Ok(periods);
    }

    tracing::info!("No periods found, creating the period \"{default_name}\"");
    create_period(&NewPeriod::named(default_name), connection)?;

    get_all_periods(connection)
}

fn current_year() -> String {
    OffsetDateTime::now_utc().year().to_string()
}

pub fn period_exists(name: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM period WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Delete a period together with its invoices, their attachments and the
/// period's attachment directory. Returns the number of deleted invoices.
///
/// Attachment files are removed on a best-effort basis, missing files are
/// ignored.
///
/// # Errors
/// Returns [Error::PeriodNotFound] if there is no period called `name`.
pub fn delete_period(
    name: &str,
    connection: &Connection,
    attachments: &AttachmentStore,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let attachment_paths = transaction
        .prepare("SELECT attachment FROM invoice WHERE period = ?1 AND attachment IS NOT NULL")?
        .query_map([name], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for path in &attachment_paths {
        if let Err(error) = attachments.remove(path) {
            tracing::warn!("Could not remove attachment {path}: {error}");
        }
    }

    let invoice_count = transaction.execute("DELETE FROM invoice WHERE period = ?1", [name])?;
    let period_count = transaction.execute("DELETE FROM period WHERE name = ?1", [name])?;

    if period_count == 0 {
        return Err(Error::PeriodNotFound(name.to_owned()));
    }

    transaction.commit()?;

    if let Err(error) = attachments.remove_period_dir(name) {
        tracing::warn!("Could not remove the attachment directory of period {name}: {error}");
    }

    tracing::info!("Deleted period \"{name}\" and {invoice_count} invoices");

    Ok(invoice_count)
}
