//! Defines the app level error type and conversions to rendered HTML pages and notices.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{internal_server_error::InternalServerError, not_found::NotFoundError, notice::Notice};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The amount field of a submitted transaction was empty.
    #[error("the amount is missing")]
    MissingAmount,

    /// The amount of a submitted transaction could not be parsed as a decimal number.
    #[error("could not parse \"{0}\" as an amount")]
    InvalidAmount(String),

    /// An opening or closing balance could not be parsed as a decimal number.
    #[error("could not parse \"{0}\" as a balance")]
    InvalidBalance(String),

    /// The date of a submitted transaction is not a valid ISO 8601 date.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// An empty string was used as the name of a new period.
    #[error("period name cannot be empty")]
    EmptyPeriodName,

    /// The period name cannot be used as a directory name, e.g. "..".
    #[error("\"{0}\" cannot be used as a period name")]
    InvalidPeriodName(String),

    /// The period that a transaction refers to does not exist.
    #[error("the period \"{0}\" does not exist")]
    PeriodNotFound(String),

    /// The period form did not ask for exactly one of adding or removing a period.
    #[error("the period form must either add or remove a period")]
    InvalidPeriodAction,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The invoice has no attachment, or the attachment file is gone.
    #[error("the attachment could not be found")]
    AttachmentNotFound,

    /// The multipart form could not be read.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// A request or response body could not be buffered, e.g. because it is
    /// larger than the upload limit.
    #[error("could not read body: {0}")]
    BodyReadError(String),

    /// Reading or writing an attachment failed.
    #[error("attachment I/O failed: {0}")]
    AttachmentIo(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The backing store file could not be prepared.
    #[error("could not initialize the store: {0}")]
    StoreInitError(String),

    /// The site configuration could not be read or written.
    #[error("invalid site configuration: {0}")]
    ConfigError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::NotFound => Error::AttachmentNotFound,
            _ => Error::AttachmentIo(value.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::AttachmentNotFound => NotFoundError.into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with a localized notice page.
    pub fn into_notice_response(self) -> Response {
        let (status_code, notice) = match self {
            Error::MissingAmount => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Belopp saknas".to_owned(),
                    details: "Ange ett belopp för transaktionen, till exempel 150,00.".to_owned(),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Ogiltigt belopp".to_owned(),
                    details: format!(
                        "\"{amount}\" är inte ett giltigt belopp. Ange ett tal, till exempel 150,00."
                    ),
                },
            ),
            Error::InvalidBalance(balance) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Ogiltigt saldo".to_owned(),
                    details: format!("\"{balance}\" är inte ett giltigt saldo."),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Ogiltigt datum".to_owned(),
                    details: format!("\"{date}\" är inte ett giltigt datum (ÅÅÅÅ-MM-DD)."),
                },
            ),
            Error::EmptyPeriodName => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Periodnamn saknas".to_owned(),
                    details: "Ange ett namn för den nya perioden.".to_owned(),
                },
            ),
            Error::InvalidPeriodName(name) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Ogiltigt periodnamn".to_owned(),
                    details: format!("\"{name}\" kan inte användas som namn på en period."),
                },
            ),
            Error::PeriodNotFound(name) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Perioden finns inte".to_owned(),
                    details: format!("Det finns ingen period med namnet \"{name}\"."),
                },
            ),
            Error::InvalidPeriodAction => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Ogiltig åtgärd".to_owned(),
                    details: "Välj antingen att lägga till eller att ta bort en period.".to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Notice::Error {
                    message: "Hittades inte".to_owned(),
                    details: "Transaktionen kunde inte hittas. \
                    Den kan redan ha tagits bort."
                        .to_owned(),
                },
            ),
            Error::AttachmentNotFound => (
                StatusCode::NOT_FOUND,
                Notice::Error {
                    message: "Bilagan hittades inte".to_owned(),
                    details: "Transaktionen saknar bilaga.".to_owned(),
                },
            ),
            Error::MultipartError(_) => (
                StatusCode::BAD_REQUEST,
                Notice::Error {
                    message: "Formuläret kunde inte läsas".to_owned(),
                    details: "Försök att skicka formuläret igen.".to_owned(),
                },
            ),
            Error::BodyReadError(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Notice::Error {
                    message: "Förfrågan kunde inte läsas".to_owned(),
                    details: "Förfrågan är för stor eller avbröts. \
                    Bilagor får vara högst 32 MiB."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Notice::Error {
                        message: "Något gick fel".to_owned(),
                        details: "Ett oväntat fel inträffade, se serverns loggar för detaljer."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, notice.into_html()).into_response()
    }
}
