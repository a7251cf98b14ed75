//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/invoices/{invoice_id}/attachment', use [format_endpoint].

/// The home view with the invoices of the current period.
pub const ROOT: &str = "/";
/// The page for adding a transaction.
pub const ADD_INVOICE_VIEW: &str = "/add";
/// The page for adding a transaction with the direction preselected, "in" or "out".
pub const ADD_INVOICE_DIRECTION_VIEW: &str = "/add/{direction}";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an invoice.
pub const INVOICES: &str = "/invoices";
/// The route to delete an invoice, the ID is sent in the form.
pub const DELETE_INVOICE: &str = "/invoices/delete";
/// The route to download the attachment of an invoice.
pub const ATTACHMENT: &str = "/invoices/{invoice_id}/attachment";
/// The route to add or remove a period.
pub const PERIODS: &str = "/periods";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/invoices/{invoice_id}', '{invoice_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::ADD_INVOICE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::ADD_INVOICE_DIRECTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);
        assert_endpoint_is_valid_uri(endpoints::INVOICES);
        assert_endpoint_is_valid_uri(endpoints::DELETE_INVOICE);
        assert_endpoint_is_valid_uri(endpoints::ATTACHMENT);
        assert_endpoint_is_valid_uri(endpoints::PERIODS);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn formats_direction_parameter() {
        let formatted_path = format_endpoint(endpoints::ADD_INVOICE_DIRECTION_VIEW, "in");

        assert_eq!(formatted_path, "/add/in");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::ATTACHMENT, 12);

        assert_eq!(formatted_path, "/invoices/12/attachment");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
