//! Defines the route handlers for the page for adding a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    amount::Direction,
    config::SiteConfig,
    current_period::resolve_current_period,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    invoice::distinct_categories,
    navigation::NavBar,
    period::{Period, list_periods},
};

/// The state needed for the add transaction page.
#[derive(Debug, Clone)]
pub struct AddInvoicePageState {
    /// The database connection for reading periods and categories.
    pub db_connection: Arc<Mutex<Connection>>,
    pub site_config: Arc<SiteConfig>,
}

impl FromRef<AppState> for AddInvoicePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            site_config: state.site_config.clone(),
        }
    }
}

/// Renders the page for adding a withdrawal.
pub async fn get_add_invoice_page(
    State(state): State<AddInvoicePageState>,
    jar: CookieJar,
) -> Result<Response, Error> {
    render_add_invoice_page(&state, jar, Direction::default())
}

/// Renders the page for adding a transaction in the direction given in the
/// path, "in" or "out". Any other value is treated as "out".
pub async fn get_add_invoice_page_with_direction(
    State(state): State<AddInvoicePageState>,
    Path(direction): Path<String>,
    jar: CookieJar,
) -> Result<Response, Error> {
    render_add_invoice_page(&state, jar, Direction::parse_or_default(&direction))
}

fn render_add_invoice_page(
    state: &AddInvoicePageState,
    jar: CookieJar,
    direction: Direction,
) -> Result<Response, Error> {
    let (periods, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let periods = list_periods(&connection)?;
        let categories =
            distinct_categories(&state.site_config.predefined_categories(), &connection)?;

        (periods, categories)
    };

    let (jar, current_period) = resolve_current_period(jar, None, &periods);
    let view = AddInvoiceView {
        site_name: &state.site_config.site_name,
        periods: &periods,
        current_period: current_period.as_deref().unwrap_or_default(),
        categories: &categories,
        direction,
    };

    Ok((jar, view.into_html()).into_response())
}

struct AddInvoiceView<'a> {
    site_name: &'a str,
    periods: &'a [Period],
    current_period: &'a str,
    categories: &'a [String],
    direction: Direction,
}

impl AddInvoiceView<'_> {
    fn into_html(self) -> Markup {
        let active_endpoint = format_endpoint(endpoints::ADD_INVOICE_DIRECTION_VIEW, self.direction);
        let nav_bar = NavBar::new(self.site_name, &active_endpoint).into_html();
        let heading = match self.direction {
            Direction::In => "Ny insättning",
            Direction::Out => "Ny utbetalning",
        };
        let today = OffsetDateTime::now_utc().date();

        let content = html! {
            (nav_bar)

            div class=(FORM_CONTAINER_STYLE)
            {
                form
                    action=(endpoints::INVOICES)
                    method="post"
                    enctype="multipart/form-data"
                    class="w-full space-y-4 md:space-y-6"
                {
                    h2 class="text-xl font-bold" { (heading) }

                    div
                    {
                        label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                        select name="period" id="period" required class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for period in self.periods {
                                option
                                    value=(period.name)
                                    selected[period.name == self.current_period]
                                {
                                    (period.name)
                                }
                            }
                        }
                    }

                    fieldset
                    {
                        legend class=(FORM_LABEL_STYLE) { "Typ" }

                        div class="flex gap-6"
                        {
                            label class="flex items-center gap-2"
                            {
                                input
                                    type="radio"
                                    name="direction"
                                    value=(Direction::In)
                                    checked[self.direction == Direction::In]
                                    class=(FORM_RADIO_INPUT_STYLE);
                                "Insättning"
                            }

                            label class="flex items-center gap-2"
                            {
                                input
                                    type="radio"
                                    name="direction"
                                    value=(Direction::Out)
                                    checked[self.direction == Direction::Out]
                                    class=(FORM_RADIO_INPUT_STYLE);
                                "Utbetalning"
                            }
                        }
                    }

                    div
                    {
                        label for="date" class=(FORM_LABEL_STYLE) { "Datum" }

                        input
                            name="date"
                            id="date"
                            type="date"
                            value=(today)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Belopp" }

                        input
                            name="amount"
                            id="amount"
                            type="text"
                            inputmode="decimal"
                            placeholder="0,00"
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="description" class=(FORM_LABEL_STYLE) { "Beskrivning" }

                        input
                            name="description"
                            id="description"
                            type="text"
                            placeholder="Beskrivning"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="category" class=(FORM_LABEL_STYLE) { "Kategori" }

                        input
                            name="category"
                            id="category"
                            type="text"
                            list="categories"
                            class=(FORM_TEXT_INPUT_STYLE);

                        datalist id="categories"
                        {
                            @for category in self.categories {
                                option value=(category) {}
                            }
                        }
                    }

                    div
                    {
                        label for="notes" class=(FORM_LABEL_STYLE) { "Anteckningar" }

                        textarea name="notes" id="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE) {}
                    }

                    div
                    {
                        label for="file" class=(FORM_LABEL_STYLE) { "Bilaga" }

                        input name="file" id="file" type="file" class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Spara" }
                }
            }
        };

        base(heading, &[], &content)
    }
}
