//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    home_page::get_home_page,
    invoice::{
        create_invoice_endpoint, delete_invoice_endpoint, download_attachment_endpoint,
        get_add_invoice_page, get_add_invoice_page_with_direction,
    },
    not_found::get_404_not_found,
    period::period_endpoint,
};

/// The largest request body accepted when uploading a transaction with an attachment.
pub const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_home_page))
        .route(endpoints::ADD_INVOICE_VIEW, get(get_add_invoice_page))
        .route(
            endpoints::ADD_INVOICE_DIRECTION_VIEW,
            get(get_add_invoice_page_with_direction),
        )
        .route(
            endpoints::INVOICES,
            post(create_invoice_endpoint).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(endpoints::DELETE_INVOICE, post(delete_invoice_endpoint))
        .route(endpoints::ATTACHMENT, get(download_attachment_endpoint))
        .route(endpoints::PERIODS, post(period_endpoint))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
