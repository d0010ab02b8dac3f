// src/forecast/aggregate.rs

use crate::domain::sale::{PropertyType, SaleRecord};
use crate::forecast::granularity::Granularity;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One period of an aggregated price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// First day of the period.
    pub time: NaiveDate,
    pub price: f64,
}

/// A regular, gap-free price series: one point per period from the first to the
/// last observed sale, strictly increasing in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub granularity: Granularity,
    pub points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_period(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.time)
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

/// Turns raw sale rows into a regular series at `granularity`.
///
/// Records are filtered by property type and bedroom count (a `None` filter keeps
/// everything), averaged per calendar day, gap-filled day by day with linear
/// interpolation, then averaged per period and rounded to whole currency units.
///
/// An empty filter result yields an empty series; it is up to the caller to treat
/// that as "no data".
pub fn aggregate(
    records: &[SaleRecord],
    granularity: Granularity,
    property_types: Option<&HashSet<PropertyType>>,
    bedroom_counts: Option<&HashSet<u32>>,
) -> AggregatedSeries {
    let kept = records.iter().filter(|r| {
        property_types.map_or(true, |types| types.contains(&r.property_type))
            && bedroom_counts.map_or(true, |beds| beds.contains(&r.bedrooms))
    });

    let observed = daily_means(kept);
    if observed.is_empty() {
        return AggregatedSeries::empty(granularity);
    }

    let daily = fill_daily_gaps(&observed);

    // BTreeMap keeps buckets in chronological order regardless of input order.
    let mut buckets: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for (date, price) in daily {
        let entry = buckets
            .entry(granularity.period_start(date))
            .or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let points = buckets
        .into_iter()
        .map(|(time, (sum, count))| SeriesPoint {
            time,
            price: round_price(sum / f64::from(count)),
        })
        .collect();

    AggregatedSeries {
        granularity,
        points,
    }
}

/// Mean sale price per calendar day, in date order.
fn daily_means<'a>(records: impl Iterator<Item = &'a SaleRecord>) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for record in records {
        let entry = by_day.entry(record.date).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (sum, count))| (date, sum / f64::from(count)))
        .collect()
}

/// Expands sorted daily observations to every calendar day between the first and
/// last one. A missing day `d` between known `(d1, p1)` and `(d2, p2)` gets
/// `p1 + (p2 - p1) * (d - d1) / (d2 - d1)`.
fn fill_daily_gaps(observed: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut daily = Vec::with_capacity(observed.len());

    for pair in observed.windows(2) {
        let (d1, p1) = pair[0];
        let (d2, p2) = pair[1];
        let span = (d2 - d1).num_days();

        daily.push((d1, p1));
        let mut day = d1;
        for step in 1..span {
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
            let price = p1 + (p2 - p1) * step as f64 / span as f64;
            daily.push((day, price));
        }
    }

    if let Some(&last) = observed.last() {
        daily.push(last);
    }

    daily
}

/// Rounds to a whole currency unit, halves to even.
pub(crate) fn round_price(value: f64) -> f64 {
    value.round_ties_even()
}
