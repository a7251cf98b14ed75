//! Defines the endpoint for submitting a new transaction with an optional attachment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    amount::{Direction, parse_amount},
    html::format_amount,
    invoice::{AttachmentStore, NewInvoice, Upload, create_invoice},
    notice::Notice,
    sanitize::sanitize,
};

/// The state needed for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub attachments: AttachmentStore,
}

impl FromRef<AppState> for CreateInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            attachments: state.attachments.clone(),
        }
    }
}

/// The raw fields of the add transaction form.
#[derive(Debug, Default)]
struct InvoiceSubmission {
    period: String,
    direction: String,
    date: String,
    amount: String,
    description: String,
    category: String,
    notes: String,
    upload: Option<Upload>,
}

/// Handle the add transaction form.
///
/// Text fields are sanitized and the sign of the amount is set by the
/// direction. Nothing is stored if the amount or date cannot be parsed or the
/// period does not exist.
pub async fn create_invoice_endpoint(
    State(state): State<CreateInvoiceState>,
    multipart: Multipart,
) -> Response {
    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(error) => {
            tracing::debug!("Could not read the transaction form: {error}");
            return error.into_notice_response();
        }
    };

    let (new_invoice, upload) = match parse_submission(submission) {
        Ok(parsed) => parsed,
        Err(error) => return error.into_notice_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_notice_response();
        }
    };

    match create_invoice(new_invoice, upload, &connection, &state.attachments) {
        Ok(invoice) => {
            tracing::info!(
                "Created invoice {} in period \"{}\"",
                invoice.id,
                invoice.period
            );

            let kind = match invoice.direction() {
                Direction::In => "Insättning",
                Direction::Out => "Utbetalning",
            };

            Notice::Success {
                message: "Transaktionen har sparats".to_owned(),
                details: format!(
                    "{kind} på {} i perioden \"{}\".",
                    format_amount(invoice.amount),
                    invoice.period
                ),
            }
            .into_response()
        }
        Err(error) => error.into_notice_response(),
    }
}

async fn read_submission(mut multipart: Multipart) -> Result<InvoiceSubmission, Error> {
    let mut submission = InvoiceSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "file" {
            // Browsers send an empty file name when no file was chosen.
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|error| Error::MultipartError(error.to_string()))?;

            if !file_name.is_empty() {
                submission.upload = Some(Upload { file_name, bytes });
            }

            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        match name.as_str() {
            "period" => submission.period = text,
            "direction" => submission.direction = text,
            "date" => submission.date = text,
            "amount" => submission.amount = text,
            "description" => submission.description = text,
            "category" => submission.category = text,
            "notes" => submission.notes = text,
            other => tracing::debug!("Ignoring unknown form field \"{other}\""),
        }
    }

    Ok(submission)
}

fn parse_submission(
    submission: InvoiceSubmission,
) -> Result<(NewInvoice, Option<Upload>), Error> {
    let direction = Direction::parse_or_default(&submission.direction);
    let amount = parse_amount(&sanitize(&submission.amount), direction)?;
    let date = parse_date(&submission.date)?;

    let new_invoice = NewInvoice {
        period: sanitize(&submission.period),
        date,
        amount,
        description: sanitize(&submission.description),
        category: sanitize(&submission.category),
        notes: sanitize(&submission.notes),
    };

    Ok((new_invoice, submission.upload))
}

/// Parse an ISO 8601 date such as "2024-01-31". A blank date means no date.
fn parse_date(text: &str) -> Result<Option<Date>, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}
