//! The annual report: income, expenses, and balance for each month of a year.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Month;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_reais,
    },
    month::MonthKey,
    navigation::NavBar,
    user::UserId,
};

/// The state needed by the annual report route handler.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One month's totals in the annual report.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotals {
    /// The month the totals are for.
    pub month: MonthKey,
    /// The sum of all income in the month.
    pub income: f64,
    /// The sum of all expense magnitudes in the month.
    pub expenses: f64,
}

impl MonthTotals {
    fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Route handler for the annual report page.
pub async fn get_annual_report_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserId>,
    Path(year): Path<i32>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let totals = match get_month_totals(user_id, year, &connection) {
        Ok(totals) => totals,
        Err(error) => return error.into_response(),
    };

    annual_report_page(year, &totals).into_response()
}

/// Tally income and expenses for every month of `year`, in calendar order.
/// Months without transactions appear with zero totals.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_month_totals(
    user_id: UserId,
    year: i32,
    connection: &Connection,
) -> Result<Vec<MonthTotals>, Error> {
    let mut totals: Vec<MonthTotals> = (1u8..=12)
        .map(|ordinal| {
            let month =
                Month::try_from(ordinal).expect("ordinals 1 through 12 are valid months");

            MonthTotals {
                month: MonthKey::new(year, month),
                income: 0.0,
                expenses: 0.0,
            }
        })
        .collect();

    let mut statement = connection.prepare(
        "SELECT year_month,
            SUM(CASE WHEN amount >= 0 THEN amount ELSE 0 END),
            SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END)
         FROM \"transaction\"
         WHERE user_id = :user_id AND year_month BETWEEN :first AND :last
         GROUP BY year_month",
    )?;

    let first = MonthKey::new(year, Month::January);
    let last = MonthKey::new(year, Month::December);

    let rows = statement.query_map(
        rusqlite::named_params! {
            ":user_id": user_id.as_i64(),
            ":first": first,
            ":last": last,
        },
        |row| {
            Ok((
                row.get::<_, MonthKey>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        },
    )?;

    for row in rows {
        let (month, income, expenses) = row?;

        if let Some(entry) = totals.iter_mut().find(|entry| entry.month == month) {
            entry.income = income;
            entry.expenses = expenses;
        }
    }

    Ok(totals)
}

fn annual_report_page(year: i32, totals: &[MonthTotals]) -> Markup {
    let total_income: f64 = totals.iter().map(|entry| entry.income).sum();
    let total_expenses: f64 = totals.iter().map(|entry| entry.expenses).sum();
    let previous_url = endpoints::ANNUAL_REPORT_VIEW.replace("{year}", &(year - 1).to_string());
    let next_url = endpoints::ANNUAL_REPORT_VIEW.replace("{year}", &(year + 1).to_string());

    let content = html! {
        (NavBar::new(endpoints::ANNUAL_REPORT_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="mb-4 flex items-center justify-between"
            {
                a href=(previous_url) class=(LINK_STYLE) { "← " (year - 1) }

                h1 class="text-2xl font-semibold" { "Relatório " (year) }

                a href=(next_url) class=(LINK_STYLE) { (year + 1) " →" }
            }

            table class="w-full text-left text-sm"
            {
                thead
                {
                    tr
                    {
                        th class=(TABLE_HEADER_STYLE) { "Mês" }
                        th class=(TABLE_HEADER_STYLE) { "Entradas" }
                        th class=(TABLE_HEADER_STYLE) { "Saídas" }
                        th class=(TABLE_HEADER_STYLE) { "Saldo" }
                    }
                }

                tbody
                {
                    @for entry in totals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(format!(
                                        "{}?month={}",
                                        endpoints::DASHBOARD_VIEW,
                                        entry.month
                                    ))
                                    class=(LINK_STYLE)
                                {
                                    (entry.month.label())
                                }
                            }

                            td class=(TABLE_CELL_STYLE) { (format_reais(entry.income)) }
                            td class=(TABLE_CELL_STYLE) { (format_reais(entry.expenses)) }

                            td class={
                                (TABLE_CELL_STYLE) " "
                                (if entry.balance() < 0.0 { "text-red-600" } else { "text-green-600" })
                            }
                            {
                                (format_reais(entry.balance()))
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold"
                    {
                        td class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(TABLE_CELL_STYLE) { (format_reais(total_income)) }
                        td class=(TABLE_CELL_STYLE) { (format_reais(total_expenses)) }
                        td class=(TABLE_CELL_STYLE) { (format_reais(total_income - total_expenses)) }
                    }
                }
            }
        }
    };

    base(&format!("Relatório {year}"), &content)
}

#[cfg(test)]
mod report_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        transaction::{Transaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::get_month_totals;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn test_user_id(connection: &Connection) -> UserId {
        create_user("test", PasswordHash::new_unchecked("hunter2"), connection)
            .unwrap()
            .id
    }

    #[test]
    fn covers_all_twelve_months() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        let totals = get_month_totals(user_id, 2024, &connection).unwrap();

        assert_eq!(totals.len(), 12);
        assert!(totals.iter().all(|entry| entry.income == 0.0));
    }

    #[test]
    fn totals_land_in_the_right_month() {
        let connection = get_test_connection();
        let user_id = test_user_id(&connection);

        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Income,
                5000.0,
                date!(2024 - 03 - 01),
                "Salário",
            ),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                1200.0,
                date!(2024 - 03 - 05),
                "Aluguel",
            ),
            &connection,
        )
        .unwrap();
        // A different year must not leak into the report.
        create_transaction(
            Transaction::build(
                user_id,
                TransactionKind::Expense,
                999.0,
                date!(2023 - 03 - 05),
                "Aluguel antigo",
            ),
            &connection,
        )
        .unwrap();

        let totals = get_month_totals(user_id, 2024, &connection).unwrap();

        let march = &totals[2];
        assert_eq!(march.income, 5000.0);
        assert_eq!(march.expenses, 1200.0);

        let february = &totals[1];
        assert_eq!(february.expenses, 0.0);
    }
}