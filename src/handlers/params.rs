// src/handlers/params.rs
//
// Query string and JSON body decoding shared by the handlers.

use crate::cache::SeriesKey;
use crate::domain::sale::PropertyType;
use crate::errors::ServerError;
use crate::forecast::{Action, Granularity};
use astra::Request;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::str::FromStr;

/// Decoded query string. Repeated keys keep the last value.
#[derive(Debug, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn from_request(req: &Request) -> Self {
        Self::parse(req.uri().query().unwrap_or(""))
    }

    pub fn parse(query: &str) -> Self {
        Self(url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    /// Raw value, `None` when missing or blank.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn get<T>(&self, key: &str) -> Result<Option<T>, ServerError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.raw(key)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|e| ServerError::BadRequest(format!("invalid {key} '{v}': {e}")))
            })
            .transpose()
    }

    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T, ServerError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Comma-separated set, e.g. `bedrooms=2,3`. `None` when absent.
    pub fn set<T>(&self, key: &str) -> Result<Option<HashSet<T>>, ServerError>
    where
        T: FromStr + Eq + std::hash::Hash,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<T>()
                    .map_err(|e| ServerError::BadRequest(format!("invalid {key} '{v}': {e}")))
            })
            .collect::<Result<HashSet<T>, _>>()
            .map(Some)
    }
}

/// Which slice of the ledger to aggregate, and at what granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub property_types: Option<HashSet<PropertyType>>,
    pub bedrooms: Option<HashSet<u32>>,
    pub granularity: Granularity,
}

impl SeriesQuery {
    pub fn from_params(params: &QueryParams) -> Result<Self, ServerError> {
        Ok(Self {
            property_types: params.set("property_type")?,
            bedrooms: params.set("bedrooms")?,
            granularity: params.get_or("granularity", Granularity::Month)?,
        })
    }

    pub fn cache_key(&self) -> SeriesKey {
        SeriesKey::new(self.property_types.as_ref(), self.bedrooms.as_ref(), self.granularity)
    }
}

/// Parameters of the decision page and `/decision`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionQuery {
    pub series: SeriesQuery,
    /// Defaults to the year after the last observed sale.
    pub year: Option<i32>,
    pub action: Action,
}

impl DecisionQuery {
    pub fn from_params(params: &QueryParams) -> Result<Self, ServerError> {
        Ok(Self {
            series: SeriesQuery::from_params(params)?,
            year: params.get("year")?,
            action: params.get_or("action", Action::Buy)?,
        })
    }
}

/// Percent-decodes one path segment, e.g. an email in `/sales/user/{email}`.
/// A literal `+` stays a plus.
pub fn decode_path_segment(raw: &str) -> String {
    let escaped = raw.replace('+', "%2B");
    url::form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(segment, _)| segment.into_owned())
        .unwrap_or_default()
}

/// Reads and decodes a JSON request body.
pub fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ServerError> {
    let mut body = req.into_body();
    let mut raw = Vec::new();
    body.reader()
        .read_to_end(&mut raw)
        .map_err(|e| ServerError::BadRequest(format!("Failed to read request body: {e}")))?;
    if raw.is_empty() {
        return Err(ServerError::BadRequest("Request body is empty".into()));
    }
    Ok(serde_json::from_slice(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lists_and_defaults() {
        let params = QueryParams::parse("property_type=house,Unit&bedrooms=2%2C3&granularity=quarter");
        let query = SeriesQuery::from_params(&params).unwrap();

        assert_eq!(query.granularity, Granularity::Quarter);
        assert_eq!(query.property_types.unwrap().len(), 2);
        let beds = query.bedrooms.unwrap();
        assert!(beds.contains(&2) && beds.contains(&3));

        let empty = SeriesQuery::from_params(&QueryParams::parse("")).unwrap();
        assert_eq!(empty.granularity, Granularity::Month);
        assert!(empty.property_types.is_none());
        assert!(empty.bedrooms.is_none());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let params = QueryParams::parse("year=&action=+&bedrooms=");
        let query = DecisionQuery::from_params(&params).unwrap();
        assert_eq!(query.year, None);
        assert_eq!(query.action, Action::Buy);
        assert!(query.series.bedrooms.is_none());
    }

    #[test]
    fn bad_values_are_bad_requests() {
        for query in ["granularity=fortnight", "bedrooms=two", "property_type=villa", "year=soon", "action=hold"] {
            let result = DecisionQuery::from_params(&QueryParams::parse(query));
            assert!(matches!(result, Err(ServerError::BadRequest(_))), "{query}");
        }
    }

    #[test]
    fn path_segments_are_decoded() {
        assert_eq!(decode_path_segment("ada%40example.com"), "ada@example.com");
        assert_eq!(decode_path_segment("ada+tag@example.com"), "ada+tag@example.com");
        assert_eq!(decode_path_segment(""), "");
    }

    #[test]
    fn decision_params() {
        let params = QueryParams::parse("year=2021&action=sell");
        let query = DecisionQuery::from_params(&params).unwrap();
        assert_eq!(query.year, Some(2021));
        assert_eq!(query.action, Action::Sell);
    }
}
