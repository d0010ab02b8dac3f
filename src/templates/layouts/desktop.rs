use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (STYLE) }
            }
            body {
                header class="site-header" {
                    h3 { "Property price forecast" }
                    nav {
                        ul {
                            li { a href="/" { "Decision" } }
                            li { a href="/forecast.xlsx" { "Download forecast" } }
                            li { a href="/stats" { "Sales stats" } }
                        }
                    }
                }
                main { (content) }
            }
        }
    }
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 0 1rem; color: #222; }
.site-header { display: flex; align-items: center; justify-content: space-between; border-bottom: 1px solid #ddd; }
.site-header ul { display: flex; gap: 1rem; list-style: none; }
.metrics { display: flex; gap: 1.5rem; flex-wrap: wrap; }
.metric { border: 1px solid #e5e5e5; border-radius: 6px; padding: 0.75rem 1rem; min-width: 12rem; }
.metric-label { color: #666; font-size: 0.9rem; }
.metric-value { font-size: 1.5rem; font-weight: 600; }
.card { margin: 1.5rem 0; }
table { border-collapse: collapse; width: 100%; }
td, th { text-align: right; padding: 0.25rem 0.5rem; border-bottom: 1px solid #eee; }
td:first-child, th:first-child { text-align: left; }
";
