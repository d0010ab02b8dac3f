use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use serde::Serialize;

fn json_with_status<T: Serialize + ?Sized>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|e| {
        log::error!("failed to serialize response: {e}");
        ServerError::InternalError
    })?;

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

pub fn json_response<T: Serialize + ?Sized>(value: &T) -> ResultResp {
    json_with_status(200, value)
}

/// 201 with the created resource (or its id) as the body.
pub fn json_created<T: Serialize + ?Sized>(value: &T) -> ResultResp {
    json_with_status(201, value)
}
