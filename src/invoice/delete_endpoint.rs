//! Defines the endpoint for deleting an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    invoice::{AttachmentStore, InvoiceId, delete_invoice},
    notice::Notice,
    sanitize::sanitize,
};

/// The state needed for deleting an invoice.
#[derive(Debug, Clone)]
pub struct DeleteInvoiceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub attachments: AttachmentStore,
}

impl FromRef<AppState> for DeleteInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            attachments: state.attachments.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteInvoiceForm {
    #[serde(default)]
    pub id: String,
}

/// A route handler for deleting an invoice and its attachment.
pub async fn delete_invoice_endpoint(
    State(state): State<DeleteInvoiceState>,
    Form(form): Form<DeleteInvoiceForm>,
) -> Response {
    let Ok(id) = sanitize(&form.id).parse::<InvoiceId>() else {
        tracing::debug!("Invalid invoice ID \"{}\"", form.id);
        return Error::NotFound.into_notice_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_notice_response();
        }
    };

    match delete_invoice(id, &connection, &state.attachments) {
        Ok(()) => {
            tracing::info!("Deleted invoice {id}");

            Notice::Success {
                message: "Transaktionen har tagits bort".to_owned(),
                details: String::new(),
            }
            .into_response()
        }
        Err(error) => error.into_notice_response(),
    }
}
