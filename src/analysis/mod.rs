//! Descriptive statistics over the sales ledger, shown on the stats endpoint.

pub mod anova;

use crate::domain::sale::{PropertyType, SaleRecord};
use serde::Serialize;
use std::collections::BTreeMap;

pub use anova::{anova_by_bedrooms, one_way_anova, AnovaResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleCount {
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub count: usize,
    pub mean_price: f64,
}

/// Number of sales and mean price per (property type, bedrooms), ordered by
/// type then bedroom count.
pub fn sale_counts(records: &[SaleRecord]) -> Vec<SaleCount> {
    let mut groups: BTreeMap<(PropertyType, u32), (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.property_type, record.bedrooms))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.price;
    }

    groups
        .into_iter()
        .map(|((property_type, bedrooms), (count, total))| SaleCount {
            property_type,
            bedrooms,
            count,
            mean_price: total / count as f64,
        })
        .collect()
}
