// src/forecast/model.rs
//
// Extends an aggregated price series with augurs.
//
// - Series covering at least two seasonal cycles: MSTL decomposition with an
//   AutoETS trend model.
// - Other series with enough observations: non-seasonal AutoETS.
// - Series too short for ETS, or whose period-to-period change never varies
//   (flat or perfectly linear): drift from the last observation. A series with
//   constant steps has no residual spread, so its bounds collapse onto the mean.

use crate::forecast::errors::ForecastError;
use augurs::{ets::AutoETS, forecaster::Forecaster, mstl::MSTLModel, Forecast};
use statrs::distribution::{ContinuousCDF, Normal};

/// Fewest observations handed to AutoETS.
pub const MIN_ETS_OBSERVATIONS: usize = 7;

/// One predicted step with its interval bounds, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelKind {
    Drift,
    Ets,
    SeasonalEts(usize),
}

/// Picks the model for equally spaced `values`. `season` is the cycle length in
/// observations, if the granularity has one.
pub(crate) fn choose_model(values: &[f64], season: Option<usize>) -> ModelKind {
    if values.len() < MIN_ETS_OBSERVATIONS || has_constant_steps(values) {
        return ModelKind::Drift;
    }
    match season {
        Some(period) if period >= 2 && values.len() >= period * 2 => ModelKind::SeasonalEts(period),
        _ => ModelKind::Ets,
    }
}

/// Predicts the `steps` observations following `values`, with a two-sided
/// interval of the given width (e.g. 0.8 for 80%).
pub fn predict(
    values: &[f64],
    season: Option<usize>,
    steps: usize,
    interval_width: f64,
) -> Result<Vec<Prediction>, ForecastError> {
    if values.len() < 2 {
        return Err(ForecastError::InsufficientData(format!(
            "a trend needs at least 2 observations, got {}",
            values.len()
        )));
    }
    validate_width(interval_width)?;

    let forecast = match choose_model(values, season) {
        ModelKind::Drift => return drift(values, steps, interval_width),
        ModelKind::Ets => forecast_with_ets(values, steps, interval_width)?,
        ModelKind::SeasonalEts(period) => forecast_with_mstl(values, period, steps, interval_width)?,
    };
    predictions_from(forecast, steps)
}

fn forecast_with_mstl(values: &[f64], period: usize, steps: usize, level: f64) -> Result<Forecast, ForecastError> {
    let trend = AutoETS::non_seasonal().into_trend_model();
    let mut forecaster = Forecaster::new(MSTLModel::new(vec![period], trend));

    forecaster
        .fit(values)
        .map_err(|e| ForecastError::Model(format!("MSTL fit failed: {e}")))?;
    forecaster
        .predict(steps, level)
        .map_err(|e| ForecastError::Model(format!("MSTL predict failed: {e}")))
}

fn forecast_with_ets(values: &[f64], steps: usize, level: f64) -> Result<Forecast, ForecastError> {
    let mut forecaster = Forecaster::new(AutoETS::non_seasonal());

    forecaster
        .fit(values)
        .map_err(|e| ForecastError::Model(format!("ETS fit failed: {e}")))?;
    forecaster
        .predict(steps, level)
        .map_err(|e| ForecastError::Model(format!("ETS predict failed: {e}")))
}

fn predictions_from(forecast: Forecast, steps: usize) -> Result<Vec<Prediction>, ForecastError> {
    let intervals = forecast
        .intervals
        .ok_or_else(|| ForecastError::Model("model returned no prediction intervals".into()))?;

    if forecast.point.len() != steps || intervals.lower.len() != steps || intervals.upper.len() != steps {
        return Err(ForecastError::Model(format!(
            "model returned {} points for a horizon of {steps}",
            forecast.point.len()
        )));
    }

    forecast
        .point
        .iter()
        .zip(intervals.lower.iter().zip(&intervals.upper))
        .map(|(&mean, (&lower, &upper))| {
            if !(mean.is_finite() && lower.is_finite() && upper.is_finite()) {
                return Err(ForecastError::Model("model produced a non-finite price".into()));
            }
            Ok(Prediction { mean, lower, upper })
        })
        .collect()
}

/// Random walk with drift: the last value plus the mean step, with the step
/// spread widened by the square root of the step ahead.
fn drift(values: &[f64], steps: usize, interval_width: f64) -> Result<Vec<Prediction>, ForecastError> {
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let mean_change = changes.iter().sum::<f64>() / changes.len() as f64;
    let spread = if has_constant_steps(values) {
        0.0
    } else {
        population_std(&changes)
    };
    let z = normal_quantile(interval_width)?;
    let last = values[values.len() - 1];

    Ok((1..=steps)
        .map(|h| {
            let mean = last + mean_change * h as f64;
            let half_width = z * spread * (h as f64).sqrt();
            Prediction {
                mean,
                lower: mean - half_width,
                upper: mean + half_width,
            }
        })
        .collect())
}

fn has_constant_steps(values: &[f64]) -> bool {
    let mut changes = values.windows(2).map(|w| w[1] - w[0]);
    match changes.next() {
        Some(first) => changes.all(|c| c == first),
        None => true,
    }
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn validate_width(width: f64) -> Result<(), ForecastError> {
    if width > 0.0 && width < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidSettings(format!(
            "interval width must be between 0 and 1, got {width}"
        )))
    }
}

/// z such that a standard normal falls within ±z with probability `width`.
fn normal_quantile(width: f64) -> Result<f64, ForecastError> {
    validate_width(width)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::InvalidSettings(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}
