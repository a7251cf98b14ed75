//! The endpoint for adding and removing periods.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    amount::parse_balance,
    current_period::{clear_current_period, set_current_period},
    invoice::AttachmentStore,
    notice::Notice,
    period::{NewPeriod, PeriodInsert, create_period, delete_period, parse_period_name},
    sanitize::sanitize,
};

/// The state needed for adding and removing periods.
#[derive(Debug, Clone)]
pub struct PeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub attachments: AttachmentStore,
}

impl FromRef<AppState> for PeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            attachments: state.attachments.clone(),
        }
    }
}

/// The period form on the home view.
///
/// The submit button that was pressed decides the action: `add_period` adds
/// `new_period`, `remove_period` removes `period`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PeriodForm {
    pub new_period: String,
    pub opening_balance: String,
    pub closing_balance: String,
    pub notes: String,
    pub period: String,
    pub add_period: Option<String>,
    pub remove_period: Option<String>,
}

/// Add or remove a period and respond with a notice.
pub async fn period_endpoint(
    State(state): State<PeriodState>,
    jar: CookieJar,
    Form(form): Form<PeriodForm>,
) -> Response {
    match (form.add_period.is_some(), form.remove_period.is_some()) {
        (true, false) => add_period(&state, jar, &form),
        (false, true) => remove_period(&state, jar, &form.period),
        _ => Error::InvalidPeriodAction.into_notice_response(),
    }
}

fn add_period(state: &PeriodState, jar: CookieJar, form: &PeriodForm) -> Response {
    let new_period = match parse_new_period(form) {
        Ok(new_period) => new_period,
        Err(error) => return error.into_notice_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_notice_response();
        }
    };

    match create_period(&new_period, &connection) {
        Ok(PeriodInsert::Inserted) => {
            let name = new_period.name;
            tracing::info!("Created period \"{name}\"");

            if let Err(error) = state.attachments.create_period_dir(&name) {
                // The directory is created again when the first attachment is written.
                tracing::warn!("Could not create the attachment directory for \"{name}\": {error}");
            }

            let notice = Notice::Success {
                message: "Perioden har lagts till".to_owned(),
                details: format!("Perioden \"{name}\" är nu vald."),
            };

            (set_current_period(jar, &name), notice.into_html()).into_response()
        }
        Ok(PeriodInsert::AlreadyExists) => Notice::Info {
            message: "Perioden finns redan".to_owned(),
            details: format!(
                "Det finns redan en period med namnet \"{}\".",
                new_period.name
            ),
        }
        .into_response(),
        Err(error) => error.into_notice_response(),
    }
}

fn parse_new_period(form: &PeriodForm) -> Result<NewPeriod, Error> {
    let name = parse_period_name(&form.new_period)?;
    let opening_balance = parse_balance(&sanitize(&form.opening_balance))?;
    let closing_balance = parse_balance(&sanitize(&form.closing_balance))?;
    let notes = Some(sanitize(&form.notes)).filter(|notes| !notes.is_empty());

    Ok(NewPeriod {
        name,
        opening_balance,
        closing_balance,
        notes,
    })
}

fn remove_period(state: &PeriodState, jar: CookieJar, period: &str) -> Response {
    let name = sanitize(period);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_notice_response();
        }
    };

    match delete_period(&name, &connection, &state.attachments) {
        Ok(invoice_count) => {
            let notice = Notice::Success {
                message: "Perioden har tagits bort".to_owned(),
                details: format!(
                    "Perioden \"{name}\" och dess {invoice_count} transaktioner har tagits bort."
                ),
            };

            (clear_current_period(jar), notice.into_html()).into_response()
        }
        Err(error) => error.into_notice_response(),
    }
}

#[cfg(test)]
mod period_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{StatusCode, header::SET_COOKIE},
        response::Response,
    };
    use axum_extra::extract::{CookieJar, cookie::Cookie};
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::{
        db::initialize,
        invoice::AttachmentStore,
        period::{NewPeriod, create_period, get_all_periods},
        test_utils::{get_header, must_get_notice_message, parse_html_document},
    };

    use super::{PeriodForm, PeriodState, period_endpoint};

    fn get_period_state(dir: &TempDir) -> PeriodState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        PeriodState {
            db_connection: Arc::new(Mutex::new(connection)),
            attachments: AttachmentStore::new(dir.path()),
        }
    }

    fn add_form(name: &str) -> PeriodForm {
        PeriodForm {
            new_period: name.to_owned(),
            add_period: Some("Lägg till".to_owned()),
            ..Default::default()
        }
    }

    fn remove_form(name: &str) -> PeriodForm {
        PeriodForm {
            period: name.to_owned(),
            remove_period: Some("Ta bort".to_owned()),
            ..Default::default()
        }
    }

    async fn submit(state: &PeriodState, form: PeriodForm) -> Response {
        period_endpoint(State(state.clone()), CookieJar::new(), Form(form)).await
    }

    #[tokio::test]
    async fn add_period_selects_it_and_creates_directory() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);
        let form = PeriodForm {
            opening_balance: "1 000,50".to_owned(),
            notes: "Första året".to_owned(),
            ..add_form("2024")
        };

        let response = submit(&state, form).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(get_header(&response, SET_COOKIE.as_str()).contains("current_period=2024"));
        assert!(state.attachments.period_dir("2024").is_dir());
        let html = parse_html_document(response).await;
        assert_eq!(must_get_notice_message(&html), "Perioden har lagts till");

        let periods = get_all_periods(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].opening_balance, Some(Decimal::new(100050, 2)));
        assert_eq!(periods[0].closing_balance, None);
        assert_eq!(periods[0].notes.as_deref(), Some("Första året"));
    }

    #[tokio::test]
    async fn add_existing_period_is_informational() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);
        create_period(
            &NewPeriod::named("2024"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = submit(&state, add_form("2024")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_eq!(must_get_notice_message(&html), "Perioden finns redan");
        assert_eq!(
            get_all_periods(&state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn add_period_requires_name() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);

        let response = submit(&state, add_form("  ")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(
            get_all_periods(&state.db_connection.lock().unwrap()).unwrap(),
            vec![]
        );
    }

    #[tokio::test]
    async fn add_period_rejects_invalid_balance() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);
        let form = PeriodForm {
            closing_balance: "mycket".to_owned(),
            ..add_form("2024")
        };

        let response = submit(&state, form).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_eq!(must_get_notice_message(&html), "Ogiltigt saldo");
    }

    #[tokio::test]
    async fn remove_period_clears_cookie() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);
        submit(&state, add_form("2024")).await;
        let jar = CookieJar::new().add(Cookie::new("current_period", "2024"));

        let response = period_endpoint(State(state.clone()), jar, Form(remove_form("2024"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = get_header(&response, SET_COOKIE.as_str());
        assert!(cookie.starts_with("current_period="), "got {cookie}");
        assert!(!cookie.contains("current_period=2024"), "got {cookie}");
        assert!(!state.attachments.period_dir("2024").exists());
        assert_eq!(
            get_all_periods(&state.db_connection.lock().unwrap()).unwrap(),
            vec![]
        );
    }

    #[tokio::test]
    async fn remove_unknown_period_fails() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);

        let response = submit(&state, remove_form("1999")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_eq!(must_get_notice_message(&html), "Perioden finns inte");
    }

    #[tokio::test]
    async fn form_must_pick_one_action() {
        let dir = TempDir::new().unwrap();
        let state = get_period_state(&dir);
        let both = PeriodForm {
            remove_period: Some("Ta bort".to_owned()),
            ..add_form("2024")
        };

        let neither = submit(&state, PeriodForm::default()).await;
        let both = submit(&state, both).await;

        assert_eq!(neither.status(), StatusCode::BAD_REQUEST);
        assert_eq!(both.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_all_periods(&state.db_connection.lock().unwrap()).unwrap(),
            vec![]
        );
    }
}
