//! Price series preparation and forecasting: raw sales are aggregated into a
//! regular series, extrapolated, and reduced to a buy/sell decision.

pub mod aggregate;
pub mod decision;
pub mod errors;
pub mod forecaster;
pub mod granularity;
pub mod model;

pub use aggregate::{aggregate, AggregatedSeries, SeriesPoint};
pub use decision::{format_price, horizon_to_year_end, summarize, Action, DecisionSummary};
pub use errors::ForecastError;
pub use forecaster::{forecast, forecast_with, ForecastPoint, ForecastSettings, DEFAULT_INTERVAL_WIDTH};
pub use granularity::Granularity;
