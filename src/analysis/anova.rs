// src/analysis/anova.rs
//
// One-way analysis of variance: does the mean price differ between bedroom
// counts within one property type?

use crate::domain::sale::{PropertyType, SaleRecord};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
}

/// Classic one-way ANOVA over `groups`. Empty groups are ignored.
///
/// `None` when fewer than two non-empty groups remain, when there are no
/// degrees of freedom left within groups, or when every group is constant.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaResult> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &groups {
        let mean = group.iter().sum::<f64>() / group.len() as f64;
        ss_between += group.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }
    if ss_within <= 0.0 {
        return None;
    }

    let df_between = k - 1;
    let df_within = n - k;
    let f_statistic = (ss_between / df_between as f64) / (ss_within / df_within as f64);

    let dist = FisherSnedecor::new(df_between as f64, df_within as f64).ok()?;
    let p_value = 1.0 - dist.cdf(f_statistic);

    Some(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// ANOVA of price by bedroom count, run separately for each property type.
/// Types without enough data are left out.
pub fn anova_by_bedrooms(records: &[SaleRecord]) -> BTreeMap<PropertyType, AnovaResult> {
    PropertyType::ALL
        .iter()
        .filter_map(|&property_type| {
            let mut by_bedrooms: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
            for record in records.iter().filter(|r| r.property_type == property_type) {
                by_bedrooms.entry(record.bedrooms).or_default().push(record.price);
            }
            let groups: Vec<Vec<f64>> = by_bedrooms.into_values().collect();
            one_way_anova(&groups).map(|result| (property_type, result))
        })
        .collect()
}
