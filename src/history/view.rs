//! HTML rendering for the history page.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, error_alert, loading_spinner,
    },
};

use super::{
    format::{NumberLocale, format_currency, format_day, month_name, truncate_label},
    expansion::YearMonth,
    projection::{CategoryRow, MonthBlock, YearBlock, project},
    session::{HistoryData, HistorySession, ViewId},
    summary::{BalanceSign, Totals},
};

/// The ID of the element the history fragment is swapped into.
pub(crate) const CONTENT_ID: &str = "history-content";

fn balance_class(sign: BalanceSign) -> &'static str {
    match sign {
        BalanceSign::NonNegative => "text-green-700 dark:text-green-300",
        BalanceSign::Negative => "text-red-700 dark:text-red-300",
    }
}

/// How long a loading fragment waits before asking for the history again.
const LOADING_POLL_DELAY: &str = "1s";

/// The routes of one page visit.
#[derive(Debug, Clone, Copy)]
struct ViewRoutes<'a> {
    user_id: &'a str,
    view_id: ViewId,
}

impl ViewRoutes<'_> {
    fn content(&self) -> String {
        format_endpoint(endpoints::HISTORY_CONTENT, &[&self.user_id, &self.view_id])
    }

    fn snapshot(&self) -> String {
        format_endpoint(endpoints::HISTORY_SNAPSHOT, &[&self.user_id, &self.view_id])
    }

    fn toggle_year(&self, year: i32) -> String {
        format_endpoint(endpoints::TOGGLE_YEAR, &[&self.user_id, &self.view_id, &year])
    }

    fn toggle_month(&self, key: YearMonth) -> String {
        format_endpoint(
            endpoints::TOGGLE_MONTH,
            &[&self.user_id, &self.view_id, &key.year, &key.month],
        )
    }
}

/// The full page. The history itself is loaded by htmx once the page is shown.
pub(crate) fn history_page(user_id: &str, view_id: ViewId) -> Markup {
    let content_route = ViewRoutes { user_id, view_id }.content();

    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full space-y-4 lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Histórico de Transações" }

                    a href=(endpoints::ROOT) class=(LINK_STYLE) { "Trocar usuário" }
                }

                div
                    id=(CONTENT_ID)
                    class="rounded bg-white dark:bg-gray-800 shadow"
                    hx-get=(content_route)
                    hx-trigger="load"
                    hx-swap="innerHTML"
                {
                    (loading_indicator())
                }
            }
        }
    };

    base("Histórico", &content)
}

fn loading_indicator() -> Markup {
    html! {
        p class="px-6 py-4 text-gray-500 dark:text-gray-400" data-loading
        {
            (loading_spinner())
            "Carregando transações..."
        }
    }
}

/// The loading indicator for fragments rendered while a fetch is in flight.
///
/// Asks for the history again after a moment, so the page recovers even if
/// this fragment arrives after the fetched history.
fn polling_loading_indicator(routes: ViewRoutes<'_>) -> Markup {
    html! {
        div
            hx-get=(routes.snapshot())
            hx-trigger={ "load delay:" (LOADING_POLL_DELAY) }
            hx-target={ "#" (CONTENT_ID) }
            hx-swap="innerHTML"
        {
            (loading_indicator())
        }
    }
}

/// The fragment swapped into the page: loading, failed, empty or the history itself.
pub(crate) fn history_content(
    view_id: ViewId,
    session: &HistorySession,
    locale: NumberLocale,
) -> Markup {
    let routes = ViewRoutes {
        user_id: session.user_id(),
        view_id,
    };

    match session.data() {
        HistoryData::Loading => polling_loading_indicator(routes),
        HistoryData::Failed(message) => failed_view(routes, message),
        HistoryData::Loaded(history) if history.is_empty() => html! {
            p class="px-6 py-4 text-gray-500 dark:text-gray-400" data-empty-state
            {
                "Nenhuma transação registrada ainda."
            }
        },
        HistoryData::Loaded(history) => html! {
            @for year in project(history, session.expansion())
            {
                (year_view(routes, &year, locale))
            }
        },
    }
}

fn failed_view(routes: ViewRoutes<'_>, message: &str) -> Markup {
    html! {
        div class="p-4"
        {
            (error_alert("Não foi possível carregar o histórico.", message))

            button
                type="button"
                class=(LINK_STYLE)
                hx-get=(routes.content())
                hx-target={ "#" (CONTENT_ID) }
                hx-swap="innerHTML"
            {
                "Tentar novamente"
            }
        }
    }
}

/// Income, expenses and balance, as shown in year and month headers.
fn totals_view(totals: &Totals, balance_sign: BalanceSign, locale: NumberLocale) -> Markup {
    html! {
        div class="flex space-x-6 text-sm"
        {
            span class="text-green-600" data-income
            {
                "+" (format_currency(totals.income, locale))
            }
            span class="text-red-600" data-expenses
            {
                "-" (format_currency(totals.expenses, locale))
            }
            span class={ "font-semibold " (balance_class(balance_sign)) } data-balance
            {
                (format_currency(totals.balance(), locale))
            }
        }
    }
}

fn year_view(routes: ViewRoutes<'_>, year: &YearBlock<'_>, locale: NumberLocale) -> Markup {
    html! {
        div class="border-b last:border-b-0 dark:border-gray-700" data-year=(year.year)
        {
            button
                type="button"
                class="flex w-full items-center px-6 py-4 hover:bg-gray-50 dark:hover:bg-gray-700"
                hx-post=(routes.toggle_year(year.year))
                hx-target={ "#" (CONTENT_ID) }
                hx-swap="innerHTML"
                aria-expanded=(year.is_expanded().to_string())
            {
                span class="flex-1 text-left text-lg font-semibold" { (year.year) }
                (totals_view(&year.totals, year.balance_sign, locale))
            }

            @if let Some(months) = &year.months
            {
                div class="bg-gray-50 dark:bg-gray-900"
                {
                    @for month in months
                    {
                        (month_view(routes, month, locale))
                    }
                }
            }
        }
    }
}

fn month_view(routes: ViewRoutes<'_>, month: &MonthBlock<'_>, locale: NumberLocale) -> Markup {
    let key = month.key;
    let name = month_name(key.month).unwrap_or_default();

    html! {
        div class="border-t dark:border-gray-700" data-month=(key.to_string())
        {
            button
                type="button"
                class="flex w-full items-center px-6 py-3 pl-12 hover:bg-gray-100 dark:hover:bg-gray-700"
                hx-post=(routes.toggle_month(key))
                hx-target={ "#" (CONTENT_ID) }
                hx-swap="innerHTML"
                aria-expanded=(month.is_expanded().to_string())
            {
                span class="flex-1 text-left font-medium" { (name) }
                (totals_view(&month.totals, month.balance_sign, locale))
            }

            @if let Some(rows) = &month.rows
            {
                div class="grid grid-cols-1 gap-6 px-6 py-3 lg:grid-cols-2 lg:pl-20"
                {
                    (category_table("Entradas", &rows.income, "text-green-600", locale))
                    (category_table("Saídas", &rows.expenses, "text-red-600", locale))
                }
            }
        }
    }
}

fn category_table(
    heading: &str,
    rows: &[CategoryRow<'_>],
    value_class: &str,
    locale: NumberLocale,
) -> Markup {
    html! {
        section data-category-list=(heading)
        {
            h4 class="mb-2 text-sm font-medium text-gray-500 dark:text-gray-400" { (heading) }

            @if rows.is_empty()
            {
                p class="text-sm text-gray-500 dark:text-gray-400" data-empty-placeholder
                {
                    "Nenhuma entrada"
                }
            }
            @else
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Categoria" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Dia" }
                            th scope="col" class="px-6 py-4 text-right" { "Valor" }
                            th scope="col" class="px-6 py-4 text-right" { "%" }
                        }
                    }

                    tbody
                    {
                        @for row in rows
                        {
                            (category_row(row, value_class, locale))
                        }
                    }
                }
            }
        }
    }
}

fn category_row(row: &CategoryRow<'_>, value_class: &str, locale: NumberLocale) -> Markup {
    let (label, full_label) = truncate_label(row.label);

    html! {
        tr class=(TABLE_ROW_STYLE) data-category-row
        {
            td class=(TABLE_CELL_STYLE) title=[full_label] { (label) }
            td class=(TABLE_CELL_STYLE) { (format_day(row.day)) }
            td class={ "px-6 py-4 text-right " (value_class) }
            {
                (format_currency(row.value, locale))
            }
            td class="px-6 py-4 text-right" { (row.percent) "%" }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};

    use crate::{
        history::{
            aggregation::aggregate,
            expansion::YearMonth,
            format::NumberLocale,
            record::{TransactionRecord, TransactionType},
            session::{HistorySession, ViewId},
        },
        test_utils::assert_valid_html,
    };

    use super::{history_content, history_page};

    fn record(
        year: i32,
        month: u8,
        day: u8,
        transaction_type: TransactionType,
        value: Decimal,
        label: &str,
    ) -> TransactionRecord {
        TransactionRecord {
            id: format!("{year}-{month}-{day}-{label}"),
            user_id: "u1".to_owned(),
            transaction_type,
            value,
            day,
            month,
            year,
            category_label: label.to_owned(),
        }
    }

    const VIEW_ID: ViewId = 7;

    fn loaded_session(records: &[TransactionRecord]) -> HistorySession {
        let mut session = HistorySession::new("u1", YearMonth::new(2024, 1));
        let token = session.begin_fetch();
        session.apply(token, Ok(aggregate(records)));
        session
    }

    fn render(session: &HistorySession) -> Html {
        let html = Html::parse_fragment(
            &history_content(VIEW_ID, session, NumberLocale::PtBr).into_string(),
        );
        assert_valid_html(&html);
        html
    }

    fn texts(html: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn page_loads_content_with_htmx() {
        let html = Html::parse_document(&history_page("u1", VIEW_ID).into_string());
        assert_valid_html(&html);

        let container = html
            .select(&Selector::parse("#history-content").unwrap())
            .next()
            .expect("history container missing");

        assert_eq!(
            container.value().attr("hx-get"),
            Some("/users/u1/history/views/7/content")
        );
        assert_eq!(container.value().attr("hx-trigger"), Some("load"));
        assert_eq!(texts(&html, "[data-loading]").len(), 1);
    }

    #[test]
    fn renders_current_month_expanded() {
        let session = loaded_session(&[
            record(2024, 1, 5, TransactionType::Income, Decimal::from(3000), "Salário"),
            record(2024, 1, 10, TransactionType::Expense, Decimal::new(123456, 2), "Aluguel"),
        ]);

        let html = render(&session);

        assert_eq!(texts(&html, "[data-year] > button > span:first-child"), ["2024"]);
        assert_eq!(texts(&html, "[data-month] > button > span:first-child"), ["Janeiro"]);
        assert_eq!(
            texts(&html, "[data-year] > button [data-income]"),
            ["+R$ 3.000,00"]
        );
        assert_eq!(
            texts(&html, "[data-year] > button [data-expenses]"),
            ["-R$ 1.234,56"]
        );
        assert_eq!(
            texts(&html, "[data-year] > button [data-balance]"),
            ["R$ 1.765,44"]
        );
        assert_eq!(
            texts(&html, "[data-category-row] td:nth-child(2)"),
            ["05", "10"]
        );
        assert_eq!(
            texts(&html, "[data-category-row] td:nth-child(4)"),
            ["100%", "100%"]
        );
    }

    #[test]
    fn toggle_buttons_post_to_toggle_routes() {
        let session = loaded_session(&[record(
            2024,
            1,
            1,
            TransactionType::Income,
            Decimal::ONE,
            "A",
        )]);

        let html = render(&session);
        let buttons = Selector::parse("button[hx-post]").unwrap();
        let routes: Vec<_> = html
            .select(&buttons)
            .filter_map(|button| button.value().attr("hx-post"))
            .collect();

        assert_eq!(
            routes,
            [
                "/users/u1/history/views/7/years/2024/toggle",
                "/users/u1/history/views/7/months/2024/1/toggle"
            ]
        );
    }

    #[test]
    fn negative_balance_uses_negative_class() {
        let session = loaded_session(&[
            record(2024, 1, 1, TransactionType::Income, Decimal::from(10), "A"),
            record(2024, 1, 1, TransactionType::Expense, Decimal::from(30), "B"),
        ]);

        let html = render(&session);
        let balance = html
            .select(&Selector::parse("[data-year] > button [data-balance]").unwrap())
            .next()
            .unwrap();

        assert!(balance.value().attr("class").unwrap().contains("text-red-700"));
        assert_eq!(balance.text().collect::<String>().trim(), "-R$ 20,00");
    }

    #[test]
    fn month_without_income_shows_placeholder() {
        let session = loaded_session(&[record(
            2024,
            1,
            3,
            TransactionType::Expense,
            Decimal::from(50),
            "Mercado",
        )]);

        let html = render(&session);

        assert_eq!(texts(&html, "[data-empty-placeholder]"), ["Nenhuma entrada"]);
    }

    #[test]
    fn empty_history_shows_empty_state() {
        let session = loaded_session(&[]);

        let html = render(&session);

        assert_eq!(texts(&html, "[data-empty-state]").len(), 1);
        assert!(texts(&html, "[data-year]").is_empty());
    }

    #[test]
    fn failed_fetch_shows_alert_with_retry() {
        let mut session = HistorySession::new("u1", YearMonth::new(2024, 1));
        let token = session.begin_fetch();
        session.apply(
            token,
            Err(crate::Error::Fetch("the server responded with 500".to_owned())),
        );

        let html = render(&session);
        let alert = texts(&html, "[role='alert']");

        assert_eq!(alert.len(), 1);
        assert!(alert[0].contains("Não foi possível acessar a API financeira"));
        assert!(!alert[0].contains("server responded"));
        assert!(texts(&html, "[data-year]").is_empty());
        let retry = html
            .select(&Selector::parse("button[hx-get]").unwrap())
            .next()
            .expect("retry button missing");
        assert_eq!(
            retry.value().attr("hx-get"),
            Some("/users/u1/history/views/7/content")
        );
    }

    #[test]
    fn loading_fragment_asks_for_the_history_again() {
        let session = HistorySession::new("u1", YearMonth::new(2024, 1));

        let html = render(&session);
        let poller = html
            .select(&Selector::parse("[hx-trigger]").unwrap())
            .next()
            .expect("loading fragment does not poll");

        assert_eq!(texts(&html, "[data-loading]").len(), 1);
        assert_eq!(poller.value().attr("hx-get"), Some("/users/u1/history/views/7"));
        assert_eq!(poller.value().attr("hx-trigger"), Some("load delay:1s"));
        assert_eq!(poller.value().attr("hx-target"), Some("#history-content"));
    }

    #[test]
    fn long_labels_are_truncated_with_tooltip() {
        let label = "Alimentação (Supermercado do bairro perto de casa)";
        let session = loaded_session(&[record(
            2024,
            1,
            3,
            TransactionType::Expense,
            Decimal::from(50),
            label,
        )]);

        let html = render(&session);
        let cell = html
            .select(&Selector::parse("[data-category-row] td[title]").unwrap())
            .next()
            .expect("truncated label missing tooltip");

        assert_eq!(cell.value().attr("title"), Some(label));
        assert!(cell.text().collect::<String>().ends_with("..."));
    }
}
