//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{aggregation::summarize, cards::summary_cards_view, period::FiscalPeriod},
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::today_in,
};

const TOGGLE_ACTIVE_STYLE: &str = "px-4 py-2 text-sm font-medium rounded-lg \
    bg-blue-600 text-white";
const TOGGLE_INACTIVE_STYLE: &str = "px-4 py-2 text-sm font-medium rounded-lg \
    bg-gray-100 text-gray-900 hover:bg-gray-200 dark:bg-gray-700 dark:text-white \
    dark:hover:bg-gray-600";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jerusalem".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters accepted by the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Either "gregorian" (the default) or "hebrew".
    pub period: Option<String>,
}

/// Display the maaser owed for the current fiscal year.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let period = FiscalPeriod::from_query(query.period.as_deref());
    let today = today_in(&state.local_timezone)?;
    let (start, end) = period.bounds(today);

    let summary = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        summarize(start, &connection)
            .inspect_err(|error| tracing::error!("could not summarize transactions: {error}"))?
    };

    let title = period.title(today);
    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex flex-col md:flex-row md:justify-between md:items-center gap-4 mb-6 w-full"
            {
                div
                {
                    h1 class="text-2xl font-bold" { "Maaser" }
                    p class="text-gray-600 dark:text-gray-400" data-period-title
                    {
                        (title) ", " (start) " to " (end)
                    }
                }

                (period_toggle(period))
            }

            (summary_cards_view(&summary, period.label()))
        }
    };

    Ok(base("Dashboard", &[], &content).into_response())
}

fn period_toggle(active: FiscalPeriod) -> Markup {
    html! {
        nav class="flex gap-2" aria-label="Fiscal year"
        {
            @for period in [FiscalPeriod::Gregorian, FiscalPeriod::Hebrew] {
                @let href = format!("{}?period={}", endpoints::DASHBOARD_VIEW, period.as_str());
                @if period == active {
                    a href=(href) class=(TOGGLE_ACTIVE_STYLE) aria-current="page" { (period.label()) }
                } @else {
                    a href=(href) class=(TOGGLE_INACTIVE_STYLE) { (period.label()) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::Duration;

    use crate::{
        db::initialize,
        hebrew_calendar::{hebrew_year_of, new_year},
        test_utils::{assert_content_type, assert_status_ok, assert_valid_html, parse_html_document},
        timezone::today_in,
        transaction::{Category, Transaction, create_transaction},
    };

    use super::{DashboardQuery, DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert(state: &DashboardState, amount: f64, date: time::Date, category: Category) {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(Transaction::build(amount, date, "", category), &connection).unwrap();
    }

    async fn render(state: DashboardState, period: Option<&str>) -> Html {
        let query = DashboardQuery {
            period: period.map(str::to_owned),
        };
        let response = get_dashboard_page(State(state), Query(query)).await.unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[track_caller]
    fn card_amount(html: &Html, key: &str) -> String {
        let selector = Selector::parse(&format!("[data-summary={key}] [data-amount]")).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("No card found for {key}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[track_caller]
    fn period_title(html: &Html) -> String {
        html.select(&Selector::parse("[data-period-title]").unwrap())
            .next()
            .expect("No period title found")
            .text()
            .collect()
    }

    #[tokio::test]
    async fn shows_owed_for_gregorian_year() {
        let state = get_test_state();
        let today = today_in("Etc/UTC").unwrap();
        insert(&state, 1000.0, today, Category::Income);
        insert(&state, -50.0, today, Category::MaaserGiven);

        let html = render(state, None).await;

        assert_eq!(card_amount(&html, "income"), "€1,000.00");
        assert_eq!(card_amount(&html, "maaser-given"), "€50.00");
        assert_eq!(card_amount(&html, "owed"), "€50.00");
        assert!(period_title(&html).contains(&format!("Gregorian year {}", today.year())));
    }

    #[tokio::test]
    async fn income_before_period_is_ignored() {
        let state = get_test_state();
        let today = today_in("Etc/UTC").unwrap();
        let last_year = today - Duration::days(i64::from(today.ordinal()));
        insert(&state, 400.0, last_year, Category::Income);
        insert(&state, 100.0, today, Category::Income);

        let html = render(state, Some("gregorian")).await;

        assert_eq!(card_amount(&html, "income"), "€100.00");
        assert_eq!(card_amount(&html, "owed"), "€10.00");
    }

    #[tokio::test]
    async fn hebrew_period_starts_at_rosh_hashana() {
        let state = get_test_state();
        let today = today_in("Etc/UTC").unwrap();
        let hebrew_year = hebrew_year_of(today);
        let rosh_hashana = new_year(hebrew_year);
        insert(&state, 300.0, rosh_hashana, Category::Income);
        insert(&state, 700.0, rosh_hashana - Duration::days(1), Category::Income);

        let html = render(state, Some("hebrew")).await;

        assert_eq!(card_amount(&html, "income"), "€300.00");
        let title = period_title(&html);
        assert!(title.contains(&format!("({hebrew_year})")));
        assert!(title.contains(&format!(
            "{rosh_hashana} to {}",
            new_year(hebrew_year + 1) - Duration::days(1)
        )));
    }

    #[tokio::test]
    async fn overpaid_maaser_shows_negative_owed() {
        let state = get_test_state();
        let today = today_in("Etc/UTC").unwrap();
        insert(&state, 100.0, today, Category::Income);
        insert(&state, -25.0, today, Category::MaaserGiven);

        let html = render(state, None).await;

        assert_eq!(card_amount(&html, "owed"), "-€15.00");
    }

    #[tokio::test]
    async fn toggle_marks_active_period() {
        let state = get_test_state();

        let html = render(state, Some("hebrew")).await;

        let active = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .filter(|link| link.value().attr("href").unwrap_or_default().contains("period="))
            .map(|link| link.value().attr("href").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(active, vec!["/dashboard?period=hebrew".to_owned()]);
    }
}
