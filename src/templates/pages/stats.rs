use crate::analysis::{AnovaResult, SaleCount};
use crate::domain::sale::PropertyType;
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};
use std::collections::BTreeMap;

pub fn stats_page(counts: &[SaleCount], anova: &BTreeMap<PropertyType, AnovaResult>) -> Markup {
    desktop_layout(
        "Sales stats",
        html! {
            h1 { "Sales by property type and bedrooms" }

            (card("Sale counts", html! {
                table {
                    thead {
                        tr { th { "Type" } th { "Bedrooms" } th { "Sales" } th { "Mean price" } }
                    }
                    tbody {
                        @for c in counts {
                            tr {
                                td { (c.property_type.as_str()) }
                                td { (c.bedrooms) }
                                td { (c.count) }
                                td { (format!("{:.0}", c.mean_price)) }
                            }
                        }
                    }
                }
            }))

            (card("Price by bedroom count (one-way ANOVA)", html! {
                @if anova.is_empty() {
                    p { "Not enough sales to compare bedroom counts." }
                } @else {
                    table {
                        thead {
                            tr { th { "Type" } th { "F" } th { "p-value" } th { "df" } }
                        }
                        tbody {
                            @for (property_type, result) in anova {
                                tr {
                                    td { (property_type.as_str()) }
                                    td { (format!("{:.2}", result.f_statistic)) }
                                    td { (format!("{:.4}", result.p_value)) }
                                    td { (result.df_between) ", " (result.df_within) }
                                }
                            }
                        }
                    }
                }
            }))
        },
    )
}
