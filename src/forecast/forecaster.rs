// src/forecast/forecaster.rs

use crate::forecast::aggregate::{round_price, AggregatedSeries};
use crate::forecast::errors::ForecastError;
use crate::forecast::granularity::Granularity;
use crate::forecast::model::predict;
use chrono::NaiveDate;
use serde::Serialize;

/// Default two-sided interval width, 80%.
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// First day of the forecasted period.
    pub time: NaiveDate,
    pub price: i64,
    pub lowest_price: i64,
    pub highest_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastSettings {
    interval_width: f64,
}

impl ForecastSettings {
    pub fn new(interval_width: f64) -> Result<Self, ForecastError> {
        if !(interval_width > 0.0 && interval_width < 1.0) {
            return Err(ForecastError::InvalidSettings(format!(
                "interval width must be between 0 and 1, got {interval_width}"
            )));
        }
        Ok(Self { interval_width })
    }

    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }
}

/// Forecasts `horizon` periods after the end of `series` with default settings.
pub fn forecast(
    series: &AggregatedSeries,
    horizon: usize,
    granularity: Granularity,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    forecast_with(series, horizon, granularity, &ForecastSettings::default())
}

/// Fits a trend + seasonality model to `series` and returns exactly `horizon`
/// future points, starting with the period right after the last observed one.
/// Prices and bounds are rounded to whole currency units.
///
/// `granularity` must be the one `series` was aggregated at.
pub fn forecast_with(
    series: &AggregatedSeries,
    horizon: usize,
    granularity: Granularity,
    settings: &ForecastSettings,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    if granularity != series.granularity {
        return Err(ForecastError::InvalidSettings(format!(
            "cannot forecast a {} series at {} granularity",
            series.granularity, granularity
        )));
    }
    if horizon == 0 {
        return Err(ForecastError::InsufficientData(
            "the horizon must be at least one period".into(),
        ));
    }
    let last_period = match series.last_period() {
        Some(last) if series.len() >= 2 => last,
        _ => {
            return Err(ForecastError::InsufficientData(format!(
                "at least 2 periods of sales are needed, got {}",
                series.len()
            )))
        }
    };

    let predictions = predict(
        &series.prices(),
        granularity.seasonal_period(),
        horizon,
        settings.interval_width(),
    )?;

    let mut points = Vec::with_capacity(horizon);
    let mut time = granularity.period_start(last_period);
    for prediction in predictions {
        time = granularity.next_period(time).ok_or_else(|| {
            ForecastError::InsufficientData(format!("horizon runs past the calendar at {time}"))
        })?;
        points.push(ForecastPoint {
            time,
            price: round_price(prediction.mean) as i64,
            lowest_price: round_price(prediction.lower) as i64,
            highest_price: round_price(prediction.upper) as i64,
        });
    }

    Ok(points)
}
