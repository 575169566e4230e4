//! A calendar month key in `YYYY-MM` form.
//!
//! Transactions and generation-log rows are bucketed by month using this
//! string form, so the key parses and prints exactly as it is stored.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::{Date, Month};

use crate::Error;

/// A year and month pair, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    /// Create a month key from a year and month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `text` is not a valid `YYYY-MM`
    /// string.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year_text, month_text) = text.split_once('-').ok_or_else(invalid)?;

        if year_text.len() != 4 || month_text.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year_text.parse().map_err(|_| invalid())?;
        let month_number: u8 = month_text.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month_number).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The number of days in this month, accounting for leap years.
    pub fn last_day(&self) -> u8 {
        match self.month {
            Month::January
            | Month::March
            | Month::May
            | Month::July
            | Month::August
            | Month::October
            | Month::December => 31,
            Month::April | Month::June | Month::September | Month::November => 30,
            Month::February => {
                if time::util::is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
        }
    }

    /// The date for `day` of this month, clamped to the last valid day.
    ///
    /// A rule pinned to day 31 lands on Feb 28 (or 29) when generated into
    /// February.
    pub fn date_for_day(&self, day: u8) -> Date {
        let day = day.clamp(1, self.last_day());

        Date::from_calendar_date(self.year, self.month, day)
            .expect("day is clamped to the month's valid range")
    }

    /// The month's name and year as shown to the user, e.g. "Março 2024".
    pub fn label(&self) -> String {
        let name = match self.month {
            Month::January => "Janeiro",
            Month::February => "Fevereiro",
            Month::March => "Março",
            Month::April => "Abril",
            Month::May => "Maio",
            Month::June => "Junho",
            Month::July => "Julho",
            Month::August => "Agosto",
            Month::September => "Setembro",
            Month::October => "Outubro",
            Month::November => "Novembro",
            Month::December => "Dezembro",
        };

        format!("{name} {}", self.year)
    }

    /// The month immediately before this one.
    pub fn previous(&self) -> Self {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    /// The month immediately after this one.
    pub fn next(&self) -> Self {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl ToSql for MonthKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for MonthKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        MonthKey::parse(text).map_err(|_| FromSqlError::Other("invalid month key".into()))
    }
}
