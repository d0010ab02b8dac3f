// src/forecast/granularity.rs

use crate::domain::sale::ParseEnumError;
use chrono::{Datelike, Days, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket width used both for aggregation and for stepping the forecast.
/// Every period is identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "Day",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
            Granularity::Quarter => "Quarter",
            Granularity::Year => "Year",
        }
    }

    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Granularity::Month => first_of_month(date.year(), date.month()),
            Granularity::Quarter => first_of_month(date.year(), date.month0() / 3 * 3 + 1),
            Granularity::Year => first_of_month(date.year(), 1),
        }
    }

    /// Start of the period following the one starting at `start`.
    /// `None` only when the calendar runs out.
    pub fn next_period(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => start.succ_opt(),
            Granularity::Week => start.checked_add_days(Days::new(7)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
            Granularity::Quarter => start.checked_add_months(Months::new(3)),
            Granularity::Year => start.checked_add_months(Months::new(12)),
        }
    }

    /// Whole periods from `from` to `to`; both must already be period starts.
    pub fn periods_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
            - i64::from(from.month());
        match self {
            Granularity::Day => (to - from).num_days(),
            Granularity::Week => (to - from).num_days().div_euclid(7),
            Granularity::Month => months,
            Granularity::Quarter => months.div_euclid(3),
            Granularity::Year => i64::from(to.year() - from.year()),
        }
    }

    /// Length of the seasonal cycle, in periods. Weeks use a fixed 52, so the
    /// cycle slips by one week in 53-week years.
    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            Granularity::Day => Some(7),
            Granularity::Week => Some(52),
            Granularity::Month => Some(12),
            Granularity::Quarter => Some(4),
            Granularity::Year => None,
        }
    }

    /// Human label for a period, as shown in decision summaries.
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Week => format!("Week of {}", start.format("%Y-%m-%d")),
            Granularity::Month => start.format("%B").to_string(),
            Granularity::Quarter => format!("Q{}", start.month0() / 3 + 1),
            Granularity::Year => start.format("%Y").to_string(),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 exists in every month")
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "quarter" => Ok(Granularity::Quarter),
            "year" => Ok(Granularity::Year),
            _ => Err(ParseEnumError::new("granularity", s)),
        }
    }
}
