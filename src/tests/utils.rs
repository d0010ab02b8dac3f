use crate::db::connection::{init_db, Database};
use crate::db::sales::insert_sale;
use crate::domain::sale::{NewSale, PropertyType};
use crate::forecast::ForecastSettings;
use crate::state::AppState;
use astra::{Body, Request, Response};
use chrono::{Months, NaiveDate};
use http::Method;
use std::io::Read;
use tempfile::TempDir;

/// Fresh state over an empty database in a temporary directory.
/// Keep the `TempDir` alive for the duration of the test.
pub fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::new(dir.path().join("test.sqlite3").to_string_lossy());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, AppState::new(db, ForecastSettings::default()))
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Unowned house sales on the first of each month from January 2019, rising
/// by 10k a month from 300k, for `months` months.
pub fn seed_rising_houses(state: &AppState, months: u32) {
    state
        .db
        .with_conn(|conn| {
            for i in 0..months {
                let sale = NewSale {
                    user_email: String::new(),
                    date_sold: d(2019, 1, 1) + Months::new(i),
                    price: 300_000.0 + 10_000.0 * f64::from(i),
                    postcode: "2600".into(),
                    property_type: PropertyType::House,
                    bedrooms: 3,
                };
                insert_sale(conn, &sale, None)?;
            }
            Ok(())
        })
        .expect("Failed to seed sales");
}

pub fn get(uri: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn send_json(method: Method, uri: &str, body: serde_json::Value) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).expect("response is not JSON")
}
