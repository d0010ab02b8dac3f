use crate::cache::DEFAULT_CAPACITY;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_json, get, seed_rising_houses, send_json, test_state};
use astra::Response;
use http::Method;
use serde_json::json;
use std::io::Read;

#[test]
fn series_is_monthly_and_gap_free() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp = handle(get("/series?granularity=month"), &state).expect("Handler failed");
    let series = body_json(resp);
    let points = series["points"].as_array().unwrap();

    assert_eq!(series["granularity"], "Month");
    assert_eq!(points.len(), 24);
    assert_eq!(points[0]["time"], "2019-01-01");
    assert_eq!(points[23]["time"], "2020-12-01");
    assert_eq!(points[23]["price"], 530000.0);
}

#[test]
fn forecast_returns_the_requested_horizon() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp = handle(get("/forecast?granularity=month&horizon=6"), &state).expect("Handler failed");
    let body = body_json(resp);
    let points = body["points"].as_array().unwrap();

    assert_eq!(points.len(), 6);
    assert_eq!(points[0]["time"], "2021-01-01");
    assert_eq!(points[5]["time"], "2021-06-01");
    for p in points {
        let price = p["price"].as_i64().unwrap();
        assert!(p["lowest_price"].as_i64().unwrap() <= price);
        assert!(price <= p["highest_price"].as_i64().unwrap());
    }
    assert!(points[5]["price"].as_i64() > points[0]["price"].as_i64());
}

#[test]
fn forecast_without_matching_sales_is_unprocessable() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let units = handle(get("/forecast?property_type=unit"), &state);
    assert!(matches!(units, Err(ServerError::Unprocessable(_))));

    let five_beds = handle(get("/decision?bedrooms=5"), &state);
    assert!(matches!(five_beds, Err(ServerError::Unprocessable(_))));

    let zero = handle(get("/forecast?horizon=0"), &state);
    assert!(matches!(zero, Err(ServerError::Unprocessable(_))));

    let huge = handle(get("/forecast?horizon=1000000"), &state);
    assert!(matches!(huge, Err(ServerError::BadRequest(_))));
}

#[test]
fn decision_picks_cheapest_and_dearest_months() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp = handle(get("/decision?year=2021&action=buy"), &state).expect("Handler failed");
    let buy = body_json(resp);
    assert_eq!(buy["decision"]["best_period"], "January");
    assert_eq!(buy["decision"]["worst_period"], "December");
    assert_eq!(buy["forecast"].as_array().unwrap().len(), 12);

    let resp = handle(get("/decision?year=2021&action=sell"), &state).expect("Handler failed");
    let sell = body_json(resp);
    assert_eq!(sell["decision"]["best_period"], "December");
    assert_eq!(sell["decision"]["worst_period"], "January");
    assert_eq!(sell["decision"]["differential"], buy["decision"]["differential"]);
    assert!(buy["decision"]["differential"].as_i64().unwrap() > 0);
}

#[test]
fn decision_defaults_to_the_next_year() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp = handle(get("/decision"), &state).expect("Handler failed");
    let body = body_json(resp);
    assert_eq!(body["decision"]["year"], 2021);
    assert_eq!(body["decision"]["action"], "buy");
}

#[test]
fn unreachable_years_are_rejected() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let past = handle(get("/decision?year=2019"), &state);
    assert!(matches!(past, Err(ServerError::Unprocessable(msg)) if msg.contains("2019")));

    let far = handle(get("/decision?year=2090"), &state);
    assert!(matches!(far, Err(ServerError::BadRequest(_))));
}

#[test]
fn quarterly_decision_uses_quarter_labels() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 48);

    let resp = handle(get("/decision?year=2023&granularity=quarter"), &state).expect("Handler failed");
    let body = body_json(resp);
    assert_eq!(body["decision"]["best_period"], "Q1");
    assert_eq!(body["decision"]["worst_period"], "Q4");
    assert_eq!(body["forecast"].as_array().unwrap().len(), 4);
}

#[test]
fn writes_invalidate_cached_series() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 12);

    let before = body_json(handle(get("/series"), &state).expect("Handler failed"));
    assert_eq!(before["points"].as_array().unwrap().len(), 12);
    handle(get("/series"), &state).expect("Handler failed");
    assert!(state.cache.stats().hits >= 1);

    handle(send_json(Method::POST, "/users", json!({ "email": "ada@example.com" })), &state)
        .expect("Handler failed");
    handle(
        send_json(
            Method::POST,
            "/sales",
            json!({
                "user_email": "ada@example.com",
                "date_sold": "2020-03-10",
                "price": 450000.0,
                "postcode": "2600",
                "property_type": "house",
                "bedrooms": 3
            }),
        ),
        &state,
    )
    .expect("Handler failed");

    let after = body_json(handle(get("/series"), &state).expect("Handler failed"));
    let points = after["points"].as_array().unwrap();
    assert_eq!(points.len(), 15);
    assert_eq!(points[14]["time"], "2020-03-01");
}

#[test]
fn forecast_workbook_download() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp: Response = handle(get("/forecast.xlsx?horizon=3"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["Content-Type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(resp.headers()["Content-Disposition"]
        .to_str()
        .unwrap()
        .contains("forecast_month.xlsx"));

    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn forecast_follows_a_sale_written_after_the_series_was_cached() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    handle(get("/series"), &state).expect("Handler failed");
    let before = body_json(handle(get("/forecast?horizon=2"), &state).expect("Handler failed"));
    assert_eq!(before["points"][0]["time"], "2021-01-01");

    handle(send_json(Method::POST, "/users", json!({ "email": "ada@example.com" })), &state)
        .expect("Handler failed");
    handle(
        send_json(
            Method::POST,
            "/sales",
            json!({
                "user_email": "ada@example.com",
                "date_sold": "2021-02-01",
                "price": 560000.0,
                "postcode": "2600",
                "property_type": "house",
                "bedrooms": 3
            }),
        ),
        &state,
    )
    .expect("Handler failed");

    let after = body_json(handle(get("/forecast?horizon=2"), &state).expect("Handler failed"));
    assert_eq!(after["points"][0]["time"], "2021-03-01");
}

#[test]
fn walking_horizons_keeps_the_cache_bounded() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    for horizon in 1..=100 {
        handle(get(&format!("/forecast?horizon={horizon}")), &state).expect("Handler failed");
    }

    let (_, forecasts) = state.cache.entry_counts();
    assert_eq!(forecasts, DEFAULT_CAPACITY);
    assert_eq!(state.cache.stats().evictions, (100 - DEFAULT_CAPACITY) as u64);
}
