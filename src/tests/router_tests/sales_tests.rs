use crate::errors::ServerError;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_json, get, seed_rising_houses, send_json, test_state};
use http::Method;
use serde_json::json;

fn register(state: &AppState, email: &str, role: &str) {
    handle(
        send_json(Method::POST, "/users", json!({ "email": email, "role": role })),
        state,
    )
    .expect("Failed to register user");
}

fn sale_body(email: &str, date: &str, price: f64) -> serde_json::Value {
    json!({
        "user_email": email,
        "date_sold": date,
        "price": price,
        "postcode": "2615",
        "property_type": "unit",
        "bedrooms": 2
    })
}

#[test]
fn create_and_list_user_sales() {
    let (_dir, state) = test_state();
    register(&state, "ada@example.com", "user");

    for (date, price) in [("2020-01-05", 400_000.0), ("2021-03-01", 420_000.0)] {
        let resp = handle(
            send_json(Method::POST, "/sales", sale_body("ada@example.com", date, price)),
            &state,
        )
        .expect("Handler failed");
        assert_eq!(resp.status(), 201);
    }

    let resp = handle(get("/sales/user/ada%40example.com"), &state).expect("Handler failed");
    let sales = body_json(resp);
    let sales = sales.as_array().unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0]["date"], "2021-03-01");
    assert_eq!(sales[0]["property_type"], "unit");
}

#[test]
fn sales_need_a_known_user_and_valid_fields() {
    let (_dir, state) = test_state();

    let unknown = handle(
        send_json(Method::POST, "/sales", sale_body("ghost@example.com", "2020-01-01", 1.0)),
        &state,
    );
    assert!(matches!(unknown, Err(ServerError::NotFound)));

    register(&state, "ada@example.com", "user");
    let negative = handle(
        send_json(Method::POST, "/sales", sale_body("ada@example.com", "2020-01-01", -1.0)),
        &state,
    );
    assert!(matches!(negative, Err(ServerError::BadRequest(_))));

    let bad_date = handle(
        send_json(Method::POST, "/sales", sale_body("ada@example.com", "01/02/2020", 1.0)),
        &state,
    );
    assert!(matches!(bad_date, Err(ServerError::BadRequest(_))));

    let missing = handle(get("/sales/user/ghost%40example.com"), &state);
    assert!(matches!(missing, Err(ServerError::NotFound)));
}

#[test]
fn owners_delete_their_own_sales() {
    let (_dir, state) = test_state();
    register(&state, "ada@example.com", "user");
    handle(
        send_json(Method::POST, "/sales", sale_body("ada@example.com", "2020-01-05", 400_000.0)),
        &state,
    )
    .expect("Handler failed");

    let delete = json!({ "user_email": "ada@example.com", "date_sold": "2020-01-05", "price": 400000.0 });
    let resp = handle(send_json(Method::DELETE, "/sales", delete.clone()), &state).expect("Handler failed");
    assert_eq!(body_json(resp)["deleted"], 1);

    let again = handle(send_json(Method::DELETE, "/sales", delete), &state);
    assert!(matches!(again, Err(ServerError::NotFound)));
}

#[test]
fn only_admins_delete_for_others() {
    let (_dir, state) = test_state();
    register(&state, "ada@example.com", "user");
    register(&state, "bob@example.com", "user");
    register(&state, "root@example.com", "admin");
    handle(
        send_json(Method::POST, "/sales", sale_body("ada@example.com", "2020-01-05", 400_000.0)),
        &state,
    )
    .expect("Handler failed");

    let by_bob = handle(
        send_json(
            Method::DELETE,
            "/sales",
            json!({ "user_email": "ada@example.com", "date_sold": "2020-01-05", "price": 400000.0, "requested_by": "bob@example.com" }),
        ),
        &state,
    );
    assert!(matches!(by_bob, Err(ServerError::Forbidden(_))));

    let by_admin = handle(
        send_json(
            Method::DELETE,
            "/sales",
            json!({ "user_email": "ada@example.com", "date_sold": "2020-01-05", "price": 400000.0, "requested_by": "root@example.com" }),
        ),
        &state,
    )
    .expect("Handler failed");
    assert_eq!(by_admin.status(), 200);
}

#[test]
fn seed_rows_need_an_admin() {
    let (_dir, state) = test_state();
    register(&state, "ada@example.com", "user");
    register(&state, "root@example.com", "admin");
    seed_rising_houses(&state, 2);

    let as_user = handle(
        send_json(
            Method::DELETE,
            "/sales",
            json!({ "user_email": "ada@example.com", "date_sold": "2019-01-01", "price": 300000.0, "any_owner": true }),
        ),
        &state,
    );
    assert!(matches!(as_user, Err(ServerError::Forbidden(_))));

    let as_admin = handle(
        send_json(
            Method::DELETE,
            "/sales",
            json!({ "user_email": "root@example.com", "date_sold": "2019-01-01", "price": 300000.0, "any_owner": true }),
        ),
        &state,
    )
    .expect("Handler failed");
    assert_eq!(body_json(as_admin)["deleted"], 1);
}

#[test]
fn filter_and_stats() {
    let (_dir, state) = test_state();
    seed_rising_houses(&state, 6);

    let resp = handle(get("/sales/filter?min_price=320000&max_price=340000"), &state).expect("Handler failed");
    let found = body_json(resp);
    assert_eq!(found.as_array().unwrap().len(), 3);

    let resp = handle(get("/sales/filter?property_type=unit"), &state).expect("Handler failed");
    assert!(body_json(resp).as_array().unwrap().is_empty());

    let bad = handle(get("/sales/filter?min_price=cheap"), &state);
    assert!(matches!(bad, Err(ServerError::BadRequest(_))));

    let resp = handle(get("/sales/stats"), &state).expect("Handler failed");
    let stats = body_json(resp);
    assert_eq!(stats["counts"][0]["property_type"], "house");
    assert_eq!(stats["counts"][0]["count"], 6);
    // One bedroom count only, so no ANOVA.
    assert!(stats["anova"].as_object().unwrap().is_empty());
}
