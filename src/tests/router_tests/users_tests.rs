use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_json, get, send_json, test_state};
use http::Method;
use serde_json::json;

#[test]
fn register_and_list_users() {
    let (_dir, state) = test_state();

    let req = send_json(
        Method::POST,
        "/users",
        json!({ "email": "Ada@Example.com", "extra": { "name": "Ada" } }),
    );
    let resp = handle(req, &state).expect("Handler failed");
    assert_eq!(resp.status(), 201);
    assert!(body_json(resp)["id"].as_i64().is_some());

    let resp = handle(get("/users"), &state).expect("Handler failed");
    let users = body_json(resp);
    assert_eq!(users[0]["email"], "ada@example.com");
    assert_eq!(users[0]["role"], "user");
    assert_eq!(users[0]["extra"]["name"], "Ada");
}

#[test]
fn duplicate_registration_conflicts() {
    let (_dir, state) = test_state();
    let body = json!({ "email": "ada@example.com" });

    handle(send_json(Method::POST, "/users", body.clone()), &state).expect("Handler failed");
    let again = handle(send_json(Method::POST, "/users", body), &state);

    assert!(matches!(again, Err(ServerError::Conflict(_))));
}

#[test]
fn malformed_bodies_are_bad_requests() {
    let (_dir, state) = test_state();

    let missing_email = handle(send_json(Method::POST, "/users", json!({ "role": "admin" })), &state);
    assert!(matches!(missing_email, Err(ServerError::BadRequest(_))));

    let bad_role = handle(
        send_json(Method::POST, "/users", json!({ "email": "a@b.io", "role": "root" })),
        &state,
    );
    assert!(matches!(bad_role, Err(ServerError::BadRequest(_))));
}

#[test]
fn role_update() {
    let (_dir, state) = test_state();
    handle(send_json(Method::POST, "/users", json!({ "email": "ada@example.com" })), &state)
        .expect("Handler failed");

    let resp = handle(
        send_json(Method::PUT, "/users/role", json!({ "email": "ada@example.com", "new_role": "admin" })),
        &state,
    )
    .expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let users = body_json(handle(get("/users"), &state).expect("Handler failed"));
    assert_eq!(users[0]["role"], "admin");

    let unknown = handle(
        send_json(Method::PUT, "/users/role", json!({ "email": "bob@example.com", "new_role": "admin" })),
        &state,
    );
    assert!(matches!(unknown, Err(ServerError::NotFound)));
}
