use maud::{html, Markup};

pub mod error;

pub use error::error_page;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Labelled headline number.
pub fn metric(label: &str, value: &str) -> Markup {
    html! {
        div class="metric" {
            div class="metric-label" { (label) }
            div class="metric-value" { (value) }
        }
    }
}
