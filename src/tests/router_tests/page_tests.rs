use crate::router::{handle, serve};
use crate::tests::utils::{body_json, body_string, get, seed_rising_houses, test_state};

#[test]
fn home_page_shows_the_decision() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);

    let resp = handle(get("/?year=2021&action=buy"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Best period to buy"));
    assert!(body.contains("Buying in January would be $"));
    assert!(body.contains("cheaper compared to buying in December."));
    assert!(body.contains("2021-12-01"));
}

#[test]
fn home_page_explains_missing_data() {
    let (_dir, state) = test_state();

    let resp = handle(get("/"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("No sales match the selected filters"));
}

#[test]
fn stats_page_renders() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 3);

    let body = body_string(handle(get("/stats"), &state).expect("Handler failed"));
    assert!(body.contains("Sale counts"));
    assert!(body.contains("house"));
}

#[test]
fn errors_render_as_json_for_api_routes() {
    let (_dir, state) = test_state();

    let resp = serve(get("/nowhere"), &state);
    assert_eq!(resp.status(), 404);
    let body = body_json(resp);
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "Not Found");

    let resp = serve(get("/forecast?granularity=fortnight"), &state);
    assert_eq!(resp.status(), 400);
}

#[test]
fn errors_render_as_html_for_pages() {
    let (_dir, state) = test_state();

    let resp = serve(get("/?granularity=fortnight"), &state);
    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("<h1>Error 400</h1>"));
    assert!(body.contains("fortnight"));
}

#[test]
fn health_reports_cache_counters() {
    let (_dir, state) = test_state();
    let body = body_json(handle(get("/health"), &state).expect("Handler failed"));
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"]["hits"], 0);
}

#[test]
fn health_reports_cached_entries() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 24);
    handle(get("/forecast?horizon=3"), &state).expect("Handler failed");

    let body = body_json(handle(get("/health"), &state).expect("Handler failed"));
    assert_eq!(body["cached_series"], 1);
    assert_eq!(body["cached_forecasts"], 1);
    assert_eq!(body["cache"]["evictions"], 0);
}
