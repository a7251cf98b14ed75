//! The invoice model and its database operations.

use std::collections::BTreeSet;

use axum::body::Bytes;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    amount::{Direction, decimal_from_row},
    invoice::AttachmentStore,
    period::period_exists,
};

pub type InvoiceId = i64;

/// A recorded transaction in a period.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// Assigned by the database, increases with every new invoice.
    pub id: InvoiceId,
    /// The name of the period the invoice belongs to.
    pub period: String,
    /// When the transaction happened.
    pub date: Option<Date>,
    /// Positive for deposits, negative for withdrawals.
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub notes: String,
    /// Path of the attached file relative to the attachment root.
    pub attachment: Option<String>,
}

impl Invoice {
    pub fn direction(&self) -> Direction {
        Direction::of(self.amount)
    }
}

/// The data needed to create an invoice. The amount should already be signed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub period: String,
    pub date: Option<Date>,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub notes: String,
}

/// A file uploaded together with a new invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// The invoices of one period split by direction, each in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoices {
    pub deposits: Vec<Invoice>,
    pub withdrawals: Vec<Invoice>,
}

impl Invoices {
    pub fn total_in(&self) -> Decimal {
        self.deposits.iter().map(|invoice| invoice.amount).sum()
    }

    pub fn total_out(&self) -> Decimal {
        self.withdrawals.iter().map(|invoice| invoice.amount).sum()
    }

    /// The sum of all amounts in the period.
    pub fn net(&self) -> Decimal {
        self.total_in() + self.total_out()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty() && self.withdrawals.is_empty()
    }
}

pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            period TEXT NOT NULL,
            date TEXT,
            amount TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            attachment TEXT,
            FOREIGN KEY(period) REFERENCES period(name) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_invoice_period ON invoice(period);",
    )?;

    Ok(())
}

pub fn map_row_to_invoice(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        period: row.get(1)?,
        date: row.get(2)?,
        amount: decimal_from_row(row, 3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        notes: row.get(6)?,
        attachment: row.get(7)?,
    })
}

/// Create an invoice and, if `upload` is given, store its attachment.
///
/// The insert and the attachment path are committed together: if the file
/// cannot be written the insert is rolled back. A crash after the file is
/// written but before the commit can leave an orphaned file in the period's
/// attachment directory.
///
/// # Errors
/// Returns [Error::PeriodNotFound] if the invoice's period does not exist.
pub fn create_invoice(
    new_invoice: NewInvoice,
    upload: Option<Upload>,
    connection: &Connection,
    attachments: &AttachmentStore,
) -> Result<Invoice, Error> {
    if !period_exists(&new_invoice.period, connection)? {
        return Err(Error::PeriodNotFound(new_invoice.period));
    }

    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO invoice (period, date, amount, description, category, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_invoice.period,
            new_invoice.date,
            new_invoice.amount.to_string(),
            new_invoice.description,
            new_invoice.category,
            new_invoice.notes,
        ],
    )?;

    let id = transaction.last_insert_rowid();

    let attachment = match upload {
        Some(upload) => {
            let path = attachments.write(&new_invoice.period, id, &upload.file_name, &upload.bytes)?;

            let recorded = transaction
                .execute(
                    "UPDATE invoice SET attachment = ?1 WHERE id = ?2",
                    params![path, id],
                )
                .and_then(|_| transaction.commit());

            if let Err(error) = recorded {
                remove_orphaned_attachment(attachments, &path);
                return Err(error.into());
            }

            Some(path)
        }
        None => {
            transaction.commit()?;
            None
        }
    };

    Ok(Invoice {
        id,
        period: new_invoice.period,
        date: new_invoice.date,
        amount: new_invoice.amount,
        description: new_invoice.description,
        category: new_invoice.category,
        notes: new_invoice.notes,
        attachment,
    })
}

/// Remove an attachment whose invoice was rolled back.
fn remove_orphaned_attachment(attachments: &AttachmentStore, path: &str) {
    if let Err(error) = attachments.remove(path) {
        tracing::warn!("Could not remove orphaned attachment {path}: {error}");
    }
}

/// Retrieve a single invoice by ID.
pub fn get_invoice(id: InvoiceId, connection: &Connection) -> Result<Invoice, Error> {
    connection
        .prepare(
            "SELECT id, period, date, amount, description, category, notes, attachment
            FROM invoice WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_invoice)
        .map_err(Error::from)
}

/// Get the invoices of `period` split into deposits and withdrawals.
pub fn list_invoices(period: &str, connection: &Connection) -> Result<Invoices, Error> {
    let invoices = connection
        .prepare(
            "SELECT id, period, date, amount, description, category, notes, attachment
            FROM invoice WHERE period = ?1 ORDER BY id ASC",
        )?
        .query_map([period], map_row_to_invoice)?
        .collect::<Result<Vec<_>, _>>()?;

    let (deposits, withdrawals) = invoices
        .into_iter()
        .partition(|invoice| invoice.direction() == Direction::In);

    Ok(Invoices {
        deposits,
        withdrawals,
    })
}

/// Delete an invoice and its attachment file. The record is deleted even if
/// the file is already gone.
///
/// # Errors
/// Returns [Error::NotFound] if there is no invoice with `id`.
pub fn delete_invoice(
    id: InvoiceId,
    connection: &Connection,
    attachments: &AttachmentStore,
) -> Result<(), Error> {
    let invoice = get_invoice(id, connection)?;

    if let Some(path) = &invoice.attachment {
        if let Err(error) = attachments.remove(path) {
            tracing::warn!("Could not remove attachment {path} of invoice {id}: {error}");
        }
    }

    let rows_affected = connection.execute("DELETE FROM invoice WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The union of the categories used by stored invoices and `predefined`, sorted
/// and without duplicates or blanks.
pub fn distinct_categories(
    predefined: &[String],
    connection: &Connection,
) -> Result<Vec<String>, Error> {
    let mut categories: BTreeSet<String> = connection
        .prepare("SELECT DISTINCT category FROM invoice")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    categories.extend(predefined.iter().cloned());
    categories.retain(|category| !category.trim().is_empty());

    Ok(categories.into_iter().collect())
}
