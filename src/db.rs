//! Creating and opening the application's SQLite store.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, OpenFlags, TransactionBehavior, Transaction as SqlTransaction};
use time::{OffsetDateTime, macros::format_description};

use crate::{Error, invoice::create_invoice_table, period::create_period_table};

/// Create the tables for the domain models if they do not exist and turn on
/// foreign key enforcement for `connection`.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_period_table(&transaction)?;
    create_invoice_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Open the store at `path`, creating it first if needed.
///
/// A new store is copied from `template` when given, otherwise it is created
/// with the built-in schema. A file at `path` that is not a usable store is
/// moved to a timestamped backup (see [backup_path]) instead of being
/// overwritten.
///
/// # Errors
/// Returns [Error::StoreInitError] if the file system operations fail, or an
/// SQL error if the schema cannot be created.
pub fn open_store(path: &Path, template: Option<&Path>) -> Result<Connection, Error> {
    if path.exists() {
        if is_usable_store(path) {
            tracing::debug!("Opening existing store at {}", path.display());
            return open_and_initialize(path);
        }

        let backup = backup_path(path, OffsetDateTime::now_utc());
        tracing::warn!(
            "{} is not a usable store, moving it to {}",
            path.display(),
            backup.display()
        );
        fs::rename(path, &backup).map_err(|error| {
            Error::StoreInitError(format!(
                "could not back up {} to {}: {error}",
                path.display(),
                backup.display()
            ))
        })?;
    }

    if let Some(template) = template {
        tracing::info!(
            "Creating store at {} from template {}",
            path.display(),
            template.display()
        );
        fs::copy(template, path).map_err(|error| {
            Error::StoreInitError(format!(
                "could not copy template {} to {}: {error}",
                template.display(),
                path.display()
            ))
        })?;
    } else {
        tracing::info!("Creating empty store at {}", path.display());
    }

    open_and_initialize(path)
}

fn open_and_initialize(path: &Path) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    initialize(&connection)?;

    Ok(connection)
}

/// Whether `path` is an SQLite database containing the period and invoice tables.
fn is_usable_store(path: &Path) -> bool {
    let Ok(connection) = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
    else {
        return false;
    };

    connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('period', 'invoice')",
            [],
            |row| row.get::<_, i64>(0),
        )
        .is_ok_and(|table_count| table_count == 2)
}

/// The path a replaced store is moved to, e.g. `forbo.db.20240131T235959.bak`.
pub fn backup_path(path: &Path, now: OffsetDateTime) -> PathBuf {
    let timestamp = now
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]"
        ))
        .unwrap_or_else(|_| now.unix_timestamp().to_string());

    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(format!(".{timestamp}.bak"));

    path.with_file_name(file_name)
}
