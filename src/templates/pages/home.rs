// templates/pages/home.rs

use crate::domain::sale::PropertyType;
use crate::forecast::{format_price, Action, DecisionSummary, ForecastPoint, Granularity};
use crate::handlers::params::DecisionQuery;
use crate::templates::{card, desktop_layout, metric};
use maud::{html, Markup};
use serde::Serialize;

/// A decision together with the forecast points of its year.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    pub decision: DecisionSummary,
    pub headline: String,
    pub forecast: Vec<ForecastPoint>,
}

pub fn home_page(query: &DecisionQuery, outcome: Result<&DecisionView, String>) -> Markup {
    desktop_layout(
        "Best time to buy or sell",
        html! {
            h1 { "Find out the best time to buy or sell a property" }

            (decision_form(query))

            @match outcome {
                Ok(view) => (decision_card(view)),
                Err(message) => (card("No forecast", html! { p class="notice" { (message) } })),
            }
        },
    )
}

fn decision_form(query: &DecisionQuery) -> Markup {
    let year = query.year.map(|y| y.to_string()).unwrap_or_default();
    let selected_types = |t: PropertyType| {
        query
            .series
            .property_types
            .as_ref()
            .map_or(false, |types| types.contains(&t))
    };
    let bedrooms = query
        .series
        .bedrooms
        .as_ref()
        .map(|beds| {
            let mut beds: Vec<u32> = beds.iter().copied().collect();
            beds.sort_unstable();
            beds.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
        })
        .unwrap_or_default();

    html! {
        form method="get" action="/" class="decision-form" {
            label { "Action "
                select name="action" {
                    @for action in [Action::Buy, Action::Sell] {
                        option value=(action.as_str()) selected[query.action == action] { (action.as_str()) }
                    }
                }
            }
            label { " Year " input type="number" name="year" value=(year); }
            label { " Granularity "
                select name="granularity" {
                    @for g in Granularity::ALL {
                        option value=(g.as_str()) selected[query.series.granularity == g] { (g.as_str()) }
                    }
                }
            }
            label { " Property type "
                select name="property_type" {
                    option value="" { "any" }
                    @for t in PropertyType::ALL {
                        option value=(t.as_str()) selected[selected_types(t)] { (t.as_str()) }
                    }
                }
            }
            label { " Bedrooms " input type="text" name="bedrooms" placeholder="e.g. 2,3" value=(bedrooms); }
            " "
            button type="submit" { "Forecast" }
        }
    }
}

fn decision_card(view: &DecisionView) -> Markup {
    let d = &view.decision;
    let verb = match d.action {
        Action::Buy => "buy",
        Action::Sell => "sell",
    };

    card(
        &format!("Forecast for {}", d.year),
        html! {
            div class="metrics" {
                (metric(&format!("Best period to {verb}"), &d.best_period))
                (metric("Estimated price", &format_price(d.best_price)))
                (metric(&format!("Worst period to {verb}"), &d.worst_period))
                (metric("Estimated price", &format_price(d.worst_price)))
            }
            p class="headline" { (view.headline) }
            table {
                thead {
                    tr { th { "Period" } th { "Price" } th { "Lowest" } th { "Highest" } }
                }
                tbody {
                    @for p in &view.forecast {
                        tr {
                            td { (p.time.to_string()) }
                            td { (format_price(p.price)) }
                            td { (format_price(p.lowest_price)) }
                            td { (format_price(p.highest_price)) }
                        }
                    }
                }
            }
        },
    )
}
