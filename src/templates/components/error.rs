use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Full error page for browser routes.
pub fn error_page(status: u16, message: &str) -> Markup {
    desktop_layout(
        &format!("Error {status}"),
        html! {
            h1 { "Error " (status) }
            p { (message) }
            p { a href="/" { "← Back to the forecast" } }
        },
    )
}
