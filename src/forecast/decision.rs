// src/forecast/decision.rs

use crate::domain::sale::ParseEnumError;
use crate::forecast::errors::ForecastError;
use crate::forecast::forecaster::ForecastPoint;
use crate::forecast::granularity::Granularity;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            _ => Err(ParseEnumError::new("action", s)),
        }
    }
}

/// Best and worst period to act within one year of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionSummary {
    pub action: Action,
    pub year: i32,
    pub best_period: String,
    pub best_time: NaiveDate,
    pub best_price: i64,
    pub worst_period: String,
    pub worst_time: NaiveDate,
    pub worst_price: i64,
    /// Highest minus lowest forecast price in the year, for either action.
    pub differential: i64,
}

impl DecisionSummary {
    /// One-line verdict, e.g. "Buying in March would be $90.000 cheaper compared to buying in May."
    pub fn headline(&self) -> String {
        let amount = format_price(self.differential);
        match self.action {
            Action::Buy => format!(
                "Buying in {} would be {amount} cheaper compared to buying in {}.",
                self.best_period, self.worst_period
            ),
            Action::Sell => format!(
                "Selling in {} would be {amount} more profitable compared to selling in {}.",
                self.best_period, self.worst_period
            ),
        }
    }
}

/// Whole dollars with `.` as the thousands separator: `$1.250.000`.
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if price < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Picks the cheapest and the most expensive forecast period in `target_year`.
///
/// Buying is best at the cheapest period, selling at the most expensive one.
/// Ties go to the earliest period.
pub fn summarize(
    forecast: &[ForecastPoint],
    granularity: Granularity,
    target_year: i32,
    action: Action,
) -> Result<DecisionSummary, ForecastError> {
    let mut in_year = forecast.iter().filter(|p| p.time.year() == target_year);

    let first = in_year
        .next()
        .ok_or(ForecastError::NoForecastForYear(target_year))?;

    let (highest, lowest) = in_year.fold((first, first), |(hi, lo), p| {
        let hi = if p.price > hi.price || (p.price == hi.price && p.time < hi.time) {
            p
        } else {
            hi
        };
        let lo = if p.price < lo.price || (p.price == lo.price && p.time < lo.time) {
            p
        } else {
            lo
        };
        (hi, lo)
    });

    let (best, worst) = match action {
        Action::Buy => (lowest, highest),
        Action::Sell => (highest, lowest),
    };

    Ok(DecisionSummary {
        action,
        year: target_year,
        best_period: granularity.label(best.time),
        best_time: best.time,
        best_price: best.price,
        worst_period: granularity.label(worst.time),
        worst_time: worst.time,
        worst_price: worst.price,
        differential: highest.price - lowest.price,
    })
}

/// Number of periods to forecast after `last_period` so that the forecast covers
/// the whole of `target_year`. Zero when that year ends before the next period.
pub fn horizon_to_year_end(last_period: NaiveDate, target_year: i32, granularity: Granularity) -> usize {
    let year_end = match NaiveDate::from_ymd_opt(target_year, 12, 31) {
        Some(date) => date,
        None => return 0,
    };
    let from = granularity.period_start(last_period);
    let to = granularity.period_start(year_end);
    usize::try_from(granularity.periods_between(from, to)).unwrap_or(0)
}
