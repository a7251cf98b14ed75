//! Full page notices that confirm an action or report why it failed.
//!
//! Successful actions render a confirmation that sends the browser back to
//! the home view after [REDIRECT_DELAY_SECONDS] seconds. Failed actions render
//! the reason together with a link back.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, link},
};

/// How long a confirmation is shown before the browser returns to the home view.
pub const REDIRECT_DELAY_SECONDS: u32 = 2;

/// A notice shown to the user after submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The action succeeded.
    Success { message: String, details: String },
    /// Nothing changed, but the request was not an error, e.g. adding a period
    /// that already exists.
    Info { message: String, details: String },
    /// The action failed and no state was changed.
    Error { message: String, details: String },
}

impl Notice {
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }

    fn into_markup(self) -> Markup {
        let (message, details, heading_style, redirects) = match self {
            Notice::Success { message, details } => (
                message,
                details,
                "text-green-700 dark:text-green-400",
                true,
            ),
            Notice::Info { message, details } => (
                message,
                details,
                "text-blue-700 dark:text-blue-400",
                true,
            ),
            Notice::Error { message, details } => {
                (message, details, "text-red-700 dark:text-red-400", false)
            }
        };

        let content = html! {
            div class=(PAGE_CONTAINER_STYLE)
            {
                div id="notice" class="w-full max-w-md p-6 bg-white rounded-lg shadow dark:bg-gray-800"
                {
                    h1 class={"text-xl font-bold " (heading_style)} { (message) }

                    @if !details.is_empty() {
                        p class="mt-1 text-sm opacity-80" { (details) }
                    }

                    p class="mt-4"
                    {
                        @if redirects {
                            "Du skickas tillbaka till startsidan. "
                        }
                        (link(endpoints::ROOT, "Tillbaka till startsidan"))
                    }
                }
            }
        };

        let head_elements = if redirects {
            vec![HeadElement::Refresh {
                seconds: REDIRECT_DELAY_SECONDS,
                url: endpoints::ROOT.to_owned(),
            }]
        } else {
            Vec::new()
        };

        base(&message, &head_elements, &content)
    }
}

impl IntoResponse for Notice {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
