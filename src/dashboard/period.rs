//! The fiscal year that income is counted over.

use time::{Date, Duration, util::days_in_year};

use crate::hebrew_calendar::{hebrew_year_of, year_bounds, year_numeral};

/// Which calendar the fiscal year follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FiscalPeriod {
    /// From 1 January of the current year.
    #[default]
    Gregorian,
    /// From 1 Tishrei (Rosh Hashana) of the current Hebrew year.
    Hebrew,
}

impl FiscalPeriod {
    /// Read the period from the `period` query parameter.
    ///
    /// Anything other than "hebrew" selects the Gregorian year.
    pub fn from_query(period: Option<&str>) -> Self {
        match period {
            Some(period) if period.eq_ignore_ascii_case("hebrew") => FiscalPeriod::Hebrew,
            _ => FiscalPeriod::Gregorian,
        }
    }

    /// The value used for the `period` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            FiscalPeriod::Gregorian => "gregorian",
            FiscalPeriod::Hebrew => "hebrew",
        }
    }

    /// The name shown on the period toggle.
    pub fn label(self) -> &'static str {
        match self {
            FiscalPeriod::Gregorian => "Gregorian year",
            FiscalPeriod::Hebrew => "Hebrew year",
        }
    }

    /// The first and last days of the fiscal year that contains `today`.
    pub fn bounds(self, today: Date) -> (Date, Date) {
        match self {
            FiscalPeriod::Gregorian => {
                let first_day = today - Duration::days(i64::from(today.ordinal()) - 1);
                let year_length = i64::from(days_in_year(today.year()));
                let last_day = first_day + Duration::days(year_length - 1);

                (first_day, last_day)
            }
            FiscalPeriod::Hebrew => year_bounds(hebrew_year_of(today)),
        }
    }

    /// A heading for the fiscal year that contains `today`, e.g. "Hebrew year תשפ״ו (5786)".
    pub fn title(self, today: Date) -> String {
        match self {
            FiscalPeriod::Gregorian => format!("Gregorian year {}", today.year()),
            FiscalPeriod::Hebrew => {
                let hebrew_year = hebrew_year_of(today);
                format!("Hebrew year {} ({hebrew_year})", year_numeral(hebrew_year))
            }
        }
    }
}
