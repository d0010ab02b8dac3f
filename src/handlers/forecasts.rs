// src/handlers/forecasts.rs
//
// Read side of the pipeline: ledger -> aggregated series -> forecast -> decision,
// each stage memoized in the query cache.

use crate::cache::ForecastKey;
use crate::db::sales::load_all_sales;
use crate::domain::sale::SaleRecord;
use crate::errors::ServerError;
use crate::forecast::{
    aggregate, forecast_with, horizon_to_year_end, summarize, AggregatedSeries, ForecastError,
    ForecastPoint,
};
use crate::handlers::params::{DecisionQuery, QueryParams, SeriesQuery};
use crate::responses::{html_response, json_response, ResultResp};
use crate::spreadsheets::export_forecast_xlsx;
use crate::state::AppState;
use crate::templates::pages::{home_page, DecisionView};
use chrono::Datelike;
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_HORIZON: usize = 12;
pub const MAX_HORIZON: usize = 10_000;
/// Furthest target year accepted, counted from the last observed sale.
pub const MAX_YEARS_AHEAD: i32 = 20;

pub fn load_sales(state: &AppState) -> Result<Arc<Vec<SaleRecord>>, ServerError> {
    state
        .cache
        .sales_or_load(|| state.db.with_conn(|conn| load_all_sales(conn)))
}

pub fn load_series(state: &AppState, query: &SeriesQuery) -> Result<Arc<AggregatedSeries>, ServerError> {
    state.cache.series_or_compute(&query.cache_key(), || {
        let sales = load_sales(state)?;
        Ok(aggregate(
            &sales,
            query.granularity,
            query.property_types.as_ref(),
            query.bedrooms.as_ref(),
        ))
    })
}

fn load_forecast(
    state: &AppState,
    query: &SeriesQuery,
    horizon: usize,
) -> Result<(Arc<AggregatedSeries>, Arc<Vec<ForecastPoint>>), ServerError> {
    if horizon > MAX_HORIZON {
        return Err(ServerError::BadRequest(format!(
            "horizon must be at most {MAX_HORIZON} periods"
        )));
    }

    let key = ForecastKey {
        series: query.cache_key(),
        horizon,
    };
    state.cache.forecast_or_compute(
        &key,
        || load_series(state, query),
        |series| forecast_with(series, horizon, query.granularity, &state.forecast).map_err(ServerError::from),
    )
}

/// Best and worst period of the requested year.
pub fn decide(state: &AppState, query: &DecisionQuery) -> Result<DecisionView, ServerError> {
    let granularity = query.series.granularity;
    let series = load_series(state, &query.series)?;
    let last = series
        .last_period()
        .ok_or_else(|| ServerError::Unprocessable("No sales match the selected filters".into()))?;

    let year = query.year.unwrap_or(last.year() + 1);
    if year > last.year() + MAX_YEARS_AHEAD {
        return Err(ServerError::BadRequest(format!(
            "year must be at most {}",
            last.year() + MAX_YEARS_AHEAD
        )));
    }

    let horizon = horizon_to_year_end(last, year, granularity);
    if horizon == 0 {
        return Err(ForecastError::NoForecastForYear(year).into());
    }

    let (_, points) = load_forecast(state, &query.series, horizon)?;
    let decision = summarize(&points, granularity, year, query.action)?;
    let forecast = points
        .iter()
        .filter(|p| p.time.year() == year)
        .copied()
        .collect();

    Ok(DecisionView {
        headline: decision.headline(),
        decision,
        forecast,
    })
}

/// `GET /series`
pub fn series(params: &QueryParams, state: &AppState) -> ResultResp {
    let query = SeriesQuery::from_params(params)?;
    let series = load_series(state, &query)?;
    json_response(series.as_ref())
}

/// `GET /forecast`
pub fn forecast(params: &QueryParams, state: &AppState) -> ResultResp {
    let query = SeriesQuery::from_params(params)?;
    let horizon = params.get_or("horizon", DEFAULT_HORIZON)?;
    let (_, points) = load_forecast(state, &query, horizon)?;

    json_response(&json!({
        "granularity": query.granularity,
        "horizon": horizon,
        "interval_width": state.forecast.interval_width(),
        "points": points.as_ref(),
    }))
}

/// `GET /decision`
pub fn decision(params: &QueryParams, state: &AppState) -> ResultResp {
    let query = DecisionQuery::from_params(params)?;
    let view = decide(state, &query)?;
    json_response(&view)
}

/// `GET /forecast.xlsx`
pub fn forecast_xlsx(params: &QueryParams, state: &AppState) -> ResultResp {
    let query = SeriesQuery::from_params(params)?;
    let horizon = params.get_or("horizon", DEFAULT_HORIZON)?;
    let (series, points) = load_forecast(state, &query, horizon)?;
    export_forecast_xlsx(&series, &points)
}

/// `GET /` renders the decision page. Requests the data cannot answer are
/// shown on the page instead of an error page.
pub fn home(params: &QueryParams, state: &AppState) -> ResultResp {
    let query = DecisionQuery::from_params(params)?;
    match decide(state, &query) {
        Ok(view) => html_response(home_page(&query, Ok(&view))),
        Err(err @ (ServerError::Unprocessable(_) | ServerError::BadRequest(_))) => {
            log::debug!("decision page without forecast: {err}");
            html_response(home_page(&query, Err(err.to_string())))
        }
        Err(err) => Err(err),
    }
}
