use crate::errors::ServerError;
use crate::handlers::params::QueryParams;
use crate::handlers::{forecasts, sales, users};
use crate::responses::{error_response, json_response, ResultResp};
use crate::state::AppState;
use astra::{Request, Response};
use serde_json::json;
use std::time::Instant;

/// Entry point for the server: dispatches, renders errors, logs the outcome.
pub fn serve(req: Request, state: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    // Browser pages get HTML error pages; everything else gets JSON.
    let as_html = method == "GET" && matches!(path.as_str(), "/" | "/stats");

    match handle(req, state) {
        Ok(resp) => {
            log::info!("{method} {path} -> {} in {:?}", resp.status().as_u16(), started.elapsed());
            resp
        }
        Err(err) => {
            let status = err.status();
            if status >= 500 {
                log::error!("{method} {path} -> {status}: {err}");
            } else {
                log::warn!("{method} {path} -> {status}: {err}");
            }
            error_response(&err, as_html)
        }
    }
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let params = QueryParams::from_request(&req);

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => forecasts::home(&params, state),
        ("GET", "/health") => {
            let (series, forecasts) = state.cache.entry_counts();
            json_response(&json!({
                "status": "ok",
                "cache": state.cache.stats(),
                "cached_series": series,
                "cached_forecasts": forecasts,
            }))
        }

        ("POST", "/users") => users::register(req, state),
        ("GET", "/users") => users::list(state),
        ("PUT", "/users/role") => users::update_role(req, state),

        ("POST", "/sales") => sales::create(req, state),
        ("DELETE", "/sales") => sales::delete(req, state),
        ("GET", "/sales/filter") => sales::filter(&params, state),
        ("GET", "/sales/stats") => sales::stats(state),
        ("GET", "/stats") => sales::stats_html(state),
        ("GET", p) if p.starts_with("/sales/user/") => {
            let email = &p["/sales/user/".len()..];
            if email.is_empty() || email.contains('/') {
                return Err(ServerError::NotFound);
            }
            sales::for_user(email, state)
        }

        ("GET", "/series") => forecasts::series(&params, state),
        ("GET", "/forecast") => forecasts::forecast(&params, state),
        ("GET", "/decision") => forecasts::decision(&params, state),
        ("GET", "/forecast.xlsx") => forecasts::forecast_xlsx(&params, state),

        _ => Err(ServerError::NotFound),
    }
}
