// src/db/sales.rs
use crate::domain::sale::{NewSale, PropertyType, SaleFilter, SaleRecord};
use crate::errors::ServerError;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};

impl ToSql for PropertyType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PropertyType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

const SALE_COLUMNS: &str = "datesold, price, postcode, property_type, bedrooms, user_id";

fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<SaleRecord> {
    Ok(SaleRecord {
        date: row.get(0)?,
        price: row.get(1)?,
        postcode: row.get(2)?,
        property_type: row.get(3)?,
        bedrooms: row.get(4)?,
        owner_id: row.get(5)?,
    })
}

/// Every sale in the ledger, oldest first.
pub fn load_all_sales(conn: &Connection) -> Result<Vec<SaleRecord>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SALE_COLUMNS} FROM property_sales ORDER BY datesold, id"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], sale_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Sales recorded by one user, newest first.
pub fn load_sales_for_user(conn: &Connection, user_id: i64) -> Result<Vec<SaleRecord>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SALE_COLUMNS} FROM property_sales WHERE user_id = ?1 ORDER BY datesold DESC, id DESC"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([user_id], sale_from_row)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Inserts a validated sale and returns its row id. `owner_id` is `None` for seed data.
pub fn insert_sale(conn: &Connection, sale: &NewSale, owner_id: Option<i64>) -> Result<i64, ServerError> {
    sale.validate().map_err(ServerError::BadRequest)?;

    conn.execute(
        "INSERT INTO property_sales (datesold, price, postcode, property_type, bedrooms, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sale.date_sold,
            sale.price,
            sale.postcode.trim(),
            sale.property_type,
            sale.bedrooms,
            owner_id
        ],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// Deletes the owner's sales matching date and price. Returns the number of rows removed.
pub fn delete_sale(
    conn: &Connection,
    date: NaiveDate,
    price: f64,
    owner_id: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        "DELETE FROM property_sales WHERE datesold = ?1 AND price = ?2 AND user_id = ?3",
        params![date, price, owner_id],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Deletes matching sales regardless of owner, including unowned seed rows.
pub fn delete_sale_any_owner(conn: &Connection, date: NaiveDate, price: f64) -> Result<usize, ServerError> {
    conn.execute(
        "DELETE FROM property_sales WHERE datesold = ?1 AND price = ?2",
        params![date, price],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Sales matching every provided predicate, oldest first.
pub fn filter_sales(conn: &Connection, filter: &SaleFilter) -> Result<Vec<SaleRecord>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SALE_COLUMNS} FROM property_sales
             WHERE (?1 IS NULL OR postcode = ?1)
               AND (?2 IS NULL OR property_type = ?2)
               AND (?3 IS NULL OR price >= ?3)
               AND (?4 IS NULL OR price <= ?4)
             ORDER BY datesold, id"
        ))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let postcode = filter.postcode.as_deref().map(str::trim);
    let rows = stmt
        .query_map(
            params![postcode, filter.property_type, filter.min_price, filter.max_price],
            sale_from_row,
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(e.to_string()))
}
