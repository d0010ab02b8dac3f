// src/handlers/users.rs
use crate::db::users::{create_user, list_users, set_user_role};
use crate::domain::user::{NewUser, Role};
use crate::errors::ServerError;
use crate::handlers::params::read_json;
use crate::responses::{json_created, json_response, ResultResp};
use crate::state::AppState;
use astra::Request;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub email: String,
    pub new_role: Role,
}

/// `POST /users`
pub fn register(req: Request, state: &AppState) -> ResultResp {
    let new_user: NewUser = read_json(req)?;

    let id = state
        .db
        .with_conn(|conn| create_user(conn, &new_user.email, new_user.role, &new_user.extra))?;
    state.cache.invalidate();

    log::info!("registered user {id} as {}", new_user.role);
    json_created(&json!({ "id": id, "message": "User registered successfully" }))
}

/// `GET /users`
pub fn list(state: &AppState) -> ResultResp {
    let users = state.db.with_conn(|conn| list_users(conn))?;
    json_response(&users)
}

/// `PUT /users/role`
pub fn update_role(req: Request, state: &AppState) -> ResultResp {
    let update: RoleUpdate = read_json(req)?;

    let found = state
        .db
        .with_conn(|conn| set_user_role(conn, &update.email, update.new_role))?;
    if !found {
        return Err(ServerError::NotFound);
    }
    state.cache.invalidate();

    json_response(&json!({ "message": format!("Role updated to {}", update.new_role) }))
}
