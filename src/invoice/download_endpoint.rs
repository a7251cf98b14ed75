//! Defines the endpoint for downloading the attachment of an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    invoice::{AttachmentStore, InvoiceId, get_invoice, original_file_name},
    sanitize::sanitize,
};

/// The state needed for downloading attachments.
#[derive(Debug, Clone)]
pub struct DownloadAttachmentState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub attachments: AttachmentStore,
}

impl FromRef<AppState> for DownloadAttachmentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            attachments: state.attachments.clone(),
        }
    }
}

/// A route handler that sends the attachment of an invoice as a file download
/// named after the originally uploaded file.
///
/// Responds with the 404 page if the invoice does not exist, has no
/// attachment, or the file is gone.
pub async fn download_attachment_endpoint(
    State(state): State<DownloadAttachmentState>,
    Path(invoice_id): Path<String>,
) -> Result<Response, Error> {
    let id: InvoiceId = sanitize(&invoice_id)
        .parse()
        .map_err(|_| Error::NotFound)?;

    let attachment = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_invoice(id, &connection)?
            .attachment
            .ok_or(Error::AttachmentNotFound)?
    };

    let bytes = state
        .attachments
        .read(&attachment)
        .inspect_err(|error| tracing::warn!("Could not read attachment {attachment}: {error}"))?;

    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_owned()),
            (
                CONTENT_DISPOSITION,
                content_disposition(original_file_name(&attachment)),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// The `Content-Disposition` value for downloading a file called `file_name`.
///
/// Non-ASCII names are sent percent-encoded in `filename*` (RFC 6266) with an
/// ASCII approximation in `filename` for older clients.
fn content_disposition(file_name: &str) -> String {
    let ascii_name: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded_name = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded_name.push(byte as char);
        } else {
            encoded_name.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded_name}")
}

#[cfg(test)]
mod download_attachment_endpoint_tests {
    use std::{
        fs,
        sync::{Arc, Mutex},
    };

    use axum::{
        extract::{Path, State},
        http::{StatusCode, header::CONTENT_DISPOSITION},
        response::{IntoResponse, Response},
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::{
        db::initialize,
        invoice::{AttachmentStore, NewInvoice, Upload, create_invoice},
        period::{NewPeriod, create_period},
        test_utils::{assert_content_type, get_header},
    };

    use super::{DownloadAttachmentState, content_disposition, download_attachment_endpoint};

    fn get_download_state(dir: &TempDir) -> DownloadAttachmentState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_period(&NewPeriod::named("2024"), &connection).unwrap();

        DownloadAttachmentState {
            db_connection: Arc::new(Mutex::new(connection)),
            attachments: AttachmentStore::new(dir.path()),
        }
    }

    fn create_test_invoice(state: &DownloadAttachmentState, upload: Option<Upload>) -> i64 {
        create_invoice(
            NewInvoice {
                period: "2024".to_owned(),
                date: None,
                amount: Decimal::new(10, 0),
                description: String::new(),
                category: String::new(),
                notes: String::new(),
            },
            upload,
            &state.db_connection.lock().unwrap(),
            &state.attachments,
        )
        .unwrap()
        .id
    }

    async fn download(state: &DownloadAttachmentState, id: &str) -> Response {
        download_attachment_endpoint(State(state.clone()), Path(id.to_owned()))
            .await
            .into_response()
    }

    #[tokio::test]
    async fn sends_file_with_original_name() {
        let dir = TempDir::new().unwrap();
        let state = get_download_state(&dir);
        let content = vec![0u8, 1, 2, 254, 255];
        let id = create_test_invoice(
            &state,
            Some(Upload {
                file_name: "kvitto.pdf".to_owned(),
                bytes: content.clone().into(),
            }),
        );

        let response = download(&state, &id.to_string()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "application/octet-stream");
        assert_eq!(
            get_header(&response, CONTENT_DISPOSITION.as_str()),
            "attachment; filename=\"kvitto.pdf\"; filename*=UTF-8''kvitto.pdf"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.to_vec(), content);
    }

    #[tokio::test]
    async fn invoice_without_attachment_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = get_download_state(&dir);
        let id = create_test_invoice(&state, None);

        let response = download(&state, &id.to_string()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn removed_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = get_download_state(&dir);
        let id = create_test_invoice(
            &state,
            Some(Upload {
                file_name: "kvitto.pdf".to_owned(),
                bytes: "data".into(),
            }),
        );
        fs::remove_file(dir.path().join(format!("2024/{id}_kvitto.pdf"))).unwrap();

        let response = download(&state, &id.to_string()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = get_download_state(&dir);

        assert_eq!(download(&state, "42").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            download(&state, "abc").await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn non_ascii_names_are_percent_encoded() {
        assert_eq!(
            content_disposition("höst räkning.pdf"),
            "attachment; filename=\"h_st r_kning.pdf\"; filename*=UTF-8''h%C3%B6st%20r%C3%A4kning.pdf"
        );
    }
}
