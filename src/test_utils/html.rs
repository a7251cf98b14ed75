use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The heading of the notice on a notice page.
#[track_caller]
pub(crate) fn must_get_notice_message(html: &Html) -> String {
    html.select(&Selector::parse("#notice h1").unwrap())
        .next()
        .expect("No notice found")
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}
