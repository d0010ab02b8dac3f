// src/domain/sale.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a textual enum value (property type, role, action...) is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Unit,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::House, PropertyType::Unit];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Unit => "unit",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(PropertyType::House),
            "unit" => Ok(PropertyType::Unit),
            _ => Err(ParseEnumError::new("property type", s)),
        }
    }
}

/// One observed transaction from the sales ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub postcode: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    /// `None` for seed data imported without an owner.
    pub owner_id: Option<i64>,
}

/// Payload of the "record a sale" form / endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub user_email: String,
    pub date_sold: NaiveDate,
    pub price: f64,
    pub postcode: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
}

impl NewSale {
    /// Checks the same constraints the entry form enforced.
    pub fn validate(&self) -> Result<(), String> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("price must be a positive amount".into());
        }
        let postcode = self.postcode.trim();
        if postcode.is_empty() || postcode.len() > 5 || !postcode.chars().all(|c| c.is_ascii_digit()) {
            return Err("postcode must be 1 to 5 digits".into());
        }
        if self.bedrooms == 0 {
            return Err("bedrooms must be at least 1".into());
        }
        Ok(())
    }
}

/// Optional predicates for browsing the ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFilter {
    pub postcode: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
