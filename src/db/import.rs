// src/db/import.rs
//
// Seed data loader for the historical sales CSV
// (`datesold,postcode,price,propertyType,bedrooms`).

use crate::db::sales::insert_sale;
use crate::domain::sale::{NewSale, PropertyType};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse CSV: {0}")]
    CsvError(String),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Database error: {0}")]
    DbError(String),
}

struct Columns {
    date: usize,
    postcode: usize,
    price: usize,
    property_type: usize,
    bedrooms: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |name: &'static str, aliases: &[&str]| {
            headers
                .iter()
                .position(|h| {
                    let h = h.trim();
                    h.eq_ignore_ascii_case(name) || aliases.iter().any(|a| h.eq_ignore_ascii_case(a))
                })
                .ok_or(ImportError::MissingColumn(name))
        };

        Ok(Self {
            date: find("datesold", &["date_sold"])?,
            postcode: find("postcode", &[])?,
            price: find("price", &[])?,
            property_type: find("propertyType", &["property_type"])?,
            bedrooms: find("bedrooms", &[])?,
        })
    }
}

/// Loads every row as an unowned sale inside one transaction. Any bad row
/// aborts the whole import. Returns the number of rows inserted.
pub fn import_sales_csv<R: Read>(conn: &mut Connection, input: R) -> Result<usize, ImportError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| ImportError::CsvError(e.to_string()))?
        .clone();
    let columns = Columns::locate(&headers)?;

    let tx = conn
        .transaction()
        .map_err(|e| ImportError::DbError(e.to_string()))?;

    let mut inserted = 0;
    for (index, result) in reader.records().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let record = result.map_err(|e| ImportError::CsvError(e.to_string()))?;
        let sale = parse_row(&record, &columns).map_err(|message| ImportError::InvalidRow { row, message })?;

        insert_sale(&tx, &sale, None).map_err(|e| ImportError::InvalidRow {
            row,
            message: e.to_string(),
        })?;
        inserted += 1;
    }

    tx.commit().map_err(|e| ImportError::DbError(e.to_string()))?;
    Ok(inserted)
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<NewSale, String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("empty {name}"))
    };

    // Timestamps like "2007-02-07 00:00:00" keep only the date part.
    let raw_date = field(columns.date, "date")?;
    let date_part = raw_date.get(..10).unwrap_or(raw_date);
    let date_sold = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("bad date '{raw_date}': {e}"))?;

    let raw_price = field(columns.price, "price")?;
    let price = raw_price
        .parse::<f64>()
        .map_err(|_| format!("bad price '{raw_price}'"))?;

    let property_type = field(columns.property_type, "property type")?
        .parse::<PropertyType>()
        .map_err(|e| e.to_string())?;

    let raw_bedrooms = field(columns.bedrooms, "bedrooms")?;
    let bedrooms = raw_bedrooms
        .parse::<u32>()
        .map_err(|_| format!("bad bedrooms '{raw_bedrooms}'"))?;

    Ok(NewSale {
        user_email: String::new(),
        date_sold,
        price,
        postcode: field(columns.postcode, "postcode")?.to_string(),
        property_type,
        bedrooms,
    })
}
