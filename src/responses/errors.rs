use crate::errors::ServerError;
use crate::templates::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;

pub type ResultResp = Result<Response, ServerError>;

/// Renders a failed request. Browser pages get HTML, API routes get
/// `{"error": "...", "status": n}`.
pub fn error_response(err: &ServerError, as_html: bool) -> Response {
    let status = err.status();
    let (content_type, body) = if as_html {
        ("text/html; charset=utf-8", error_page(status, &err.to_string()).into_string())
    } else {
        let payload = json!({ "error": err.to_string(), "status": status });
        ("application/json", payload.to_string())
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
