//! The home view: the invoices of the current period and the forms for managing periods.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    amount::Direction,
    config::SiteConfig,
    current_period::resolve_current_period,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, PLACEHOLDER, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TAG_BADGE_STYLE, base, format_amount, link,
        or_placeholder,
    },
    invoice::{Invoice, Invoices, distinct_categories, list_invoices},
    navigation::NavBar,
    period::{Period, list_periods},
};

/// The state needed for the home view.
#[derive(Debug, Clone)]
pub struct HomePageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub site_config: Arc<SiteConfig>,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            site_config: state.site_config.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Switch to this period if it exists.
    pub period: Option<String>,
}

/// Render the home view for the current period.
///
/// The current period is taken from the `period` query parameter, then the
/// `current_period` cookie, and otherwise the last period by name.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    Query(query): Query<HomeQuery>,
    jar: CookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let periods = list_periods(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve periods: {error}"))?;

    let (jar, current_period) = resolve_current_period(jar, query.period.as_deref(), &periods);
    let current_period = periods
        .iter()
        .find(|period| Some(&period.name) == current_period.as_ref());

    let invoices = match current_period {
        Some(period) => list_invoices(&period.name, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve invoices: {error}"))?,
        None => Invoices::default(),
    };

    let categories = distinct_categories(&state.site_config.predefined_categories(), &connection)?;

    let view = HomeView {
        site_name: &state.site_config.site_name,
        periods: &periods,
        current_period,
        invoices: &invoices,
        categories: &categories,
    };

    Ok((jar, view.into_html()).into_response())
}

/// An invoice prepared for display, with placeholders for empty fields.
struct InvoiceRow<'a> {
    id: i64,
    date: String,
    amount: String,
    description: &'a str,
    category: &'a str,
    notes: &'a str,
    attachment_url: Option<String>,
}

impl<'a> From<&'a Invoice> for InvoiceRow<'a> {
    fn from(invoice: &'a Invoice) -> Self {
        Self {
            id: invoice.id,
            date: invoice
                .date
                .map(|date| date.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_owned()),
            amount: format_amount(invoice.amount),
            description: or_placeholder(&invoice.description),
            category: invoice.category.trim(),
            notes: or_placeholder(&invoice.notes),
            attachment_url: invoice
                .attachment
                .as_ref()
                .map(|_| format_endpoint(endpoints::ATTACHMENT, invoice.id)),
        }
    }
}

struct HomeView<'a> {
    site_name: &'a str,
    periods: &'a [Period],
    current_period: Option<&'a Period>,
    invoices: &'a Invoices,
    categories: &'a [String],
}

impl HomeView<'_> {
    fn into_html(self) -> Markup {
        let nav_bar = NavBar::new(self.site_name, endpoints::ROOT).into_html();
        let current_name = self
            .current_period
            .map(|period| period.name.as_str())
            .unwrap_or_default();

        let content = html! {
            (nav_bar)

            main class=(PAGE_CONTAINER_STYLE)
            {
                section class="w-full lg:max-w-5xl space-y-6"
                {
                    header class="flex justify-between flex-wrap items-end gap-4"
                    {
                        h1 class="text-xl font-bold" { "Period " (current_name) }

                        (period_selector(self.periods, current_name))
                    }

                    @if let Some(period) = self.current_period {
                        (period_summary(period, self.invoices))
                    }

                    (invoice_table(
                        "deposits",
                        "Insättningar",
                        &self.invoices.deposits,
                        Direction::In,
                    ))

                    (invoice_table(
                        "withdrawals",
                        "Utbetalningar",
                        &self.invoices.withdrawals,
                        Direction::Out,
                    ))

                    @if !self.categories.is_empty() {
                        section
                        {
                            h2 class="text-lg font-semibold mb-2" { "Kategorier" }

                            ul id="categories" class="flex flex-wrap gap-2"
                            {
                                @for category in self.categories {
                                    li class=(TAG_BADGE_STYLE) { (category) }
                                }
                            }
                        }
                    }

                    (period_forms(current_name))
                }
            }
        };

        base(self.site_name, &[], &content)
    }
}

fn period_selector(periods: &[Period], current_name: &str) -> Markup {
    html! {
        form id="select-period" action=(endpoints::ROOT) method="get" class="flex gap-2 items-end"
        {
            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Välj period" }

                select name="period" id="period" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in periods {
                        option value=(period.name) selected[period.name == current_name]
                        {
                            (period.name)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Visa" }
        }
    }
}

fn period_summary(period: &Period, invoices: &Invoices) -> Markup {
    let balance = |balance: Option<rust_decimal::Decimal>| {
        balance
            .map(format_amount)
            .unwrap_or_else(|| PLACEHOLDER.to_owned())
    };

    html! {
        dl id="totals" class="grid grid-cols-2 lg:grid-cols-3 gap-4 text-sm"
        {
            div { dt { "Ingående saldo" } dd id="opening-balance" { (balance(period.opening_balance)) } }
            div { dt { "Utgående saldo" } dd id="closing-balance" { (balance(period.closing_balance)) } }
            div
            {
                dt { "Anteckningar" }
                dd id="period-notes" { (or_placeholder(period.notes.as_deref().unwrap_or_default())) }
            }
            div { dt { "Summa in" } dd id="total-in" { (format_amount(invoices.total_in())) } }
            div { dt { "Summa ut" } dd id="total-out" { (format_amount(invoices.total_out())) } }
            div { dt { "Netto" } dd id="net" class="font-bold" { (format_amount(invoices.net())) } }
        }
    }
}

fn invoice_table(id: &str, title: &str, invoices: &[Invoice], direction: Direction) -> Markup {
    let add_url = format_endpoint(endpoints::ADD_INVOICE_DIRECTION_VIEW, direction);
    let rows: Vec<InvoiceRow> = invoices.iter().map(InvoiceRow::from).collect();

    html! {
        section class="dark:bg-gray-800"
        {
            header class="flex justify-between items-end mb-2"
            {
                h2 class="text-lg font-semibold" { (title) }
                a href=(add_url) class=(LINK_STYLE) { "Lägg till" }
            }

            div class="overflow-x-auto"
            {
                table id=(id) class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Datum" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Belopp" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Beskrivning" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Kategori" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Anteckningar" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Bilaga" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Åtgärd" }
                        }
                    }

                    tbody
                    {
                        @for row in &rows {
                            (invoice_row(row))
                        }

                        @if rows.is_empty() {
                            tr
                            {
                                td colspan="7" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "Inga transaktioner i perioden."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn invoice_row(row: &InvoiceRow) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE) data-invoice-id=(row.id)
        {
            td class=(TABLE_CELL_STYLE) { (row.date) }
            td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap"} { (row.amount) }
            td class=(TABLE_CELL_STYLE) { (row.description) }
            td class=(TABLE_CELL_STYLE)
            {
                @if row.category.is_empty() {
                    (PLACEHOLDER)
                } @else {
                    span class=(TAG_BADGE_STYLE) { (row.category) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (row.notes) }
            td class=(TABLE_CELL_STYLE)
            {
                @match &row.attachment_url {
                    Some(url) => { (link(url, "Ladda ner")) }
                    None => { (PLACEHOLDER) }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                form action=(endpoints::DELETE_INVOICE) method="post"
                {
                    input type="hidden" name="id" value=(row.id);
                    button
                        type="submit"
                        class=(BUTTON_DELETE_STYLE)
                        onclick="return confirm('Vill du ta bort transaktionen?')"
                    {
                        "Ta bort"
                    }
                }
            }
        }
    }
}

fn period_forms(current_name: &str) -> Markup {
    html! {
        section class="grid gap-6 lg:grid-cols-2"
        {
            form id="add-period" action=(endpoints::PERIODS) method="post" class="space-y-4"
            {
                h2 class="text-lg font-semibold" { "Ny period" }

                div
                {
                    label for="new_period" class=(FORM_LABEL_STYLE) { "Namn" }
                    input
                        type="text"
                        name="new_period"
                        id="new_period"
                        placeholder="t.ex. 2025"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="opening_balance" class=(FORM_LABEL_STYLE) { "Ingående saldo" }
                    input
                        type="text"
                        inputmode="decimal"
                        name="opening_balance"
                        id="opening_balance"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="closing_balance" class=(FORM_LABEL_STYLE) { "Utgående saldo" }
                    input
                        type="text"
                        inputmode="decimal"
                        name="closing_balance"
                        id="closing_balance"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="period_notes_input" class=(FORM_LABEL_STYLE) { "Anteckningar" }
                    input
                        type="text"
                        name="notes"
                        id="period_notes_input"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" name="add_period" value="1" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Lägg till period"
                }
            }

            form id="remove-period" action=(endpoints::PERIODS) method="post" class="space-y-4"
            {
                h2 class="text-lg font-semibold" { "Ta bort period" }

                p class="text-sm"
                {
                    "Tar bort perioden \"" (current_name) "\" med alla transaktioner och bilagor."
                }

                input type="hidden" name="period" value=(current_name);

                button
                    type="submit"
                    name="remove_period"
                    value="1"
                    class=(BUTTON_DELETE_STYLE)
                    onclick="return confirm('Vill du ta bort perioden och alla dess transaktioner?')"
                {
                    "Ta bort period"
                }
            }
        }
    }
}
