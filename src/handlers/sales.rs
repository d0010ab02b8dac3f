// src/handlers/sales.rs
use crate::analysis::{anova_by_bedrooms, sale_counts};
use crate::db::sales::{delete_sale, delete_sale_any_owner, filter_sales, insert_sale, load_sales_for_user};
use crate::db::users::find_user_by_email;
use crate::domain::sale::{NewSale, SaleFilter};
use crate::errors::ServerError;
use crate::handlers::forecasts::load_sales;
use crate::handlers::params::{decode_path_segment, read_json, QueryParams};
use crate::responses::{html_response, json_created, json_response, ResultResp};
use crate::state::AppState;
use crate::templates::pages::stats_page;
use astra::Request;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SaleDelete {
    pub user_email: String,
    pub date_sold: NaiveDate,
    pub price: f64,
    /// Who asks for the deletion; the owner when absent.
    #[serde(default)]
    pub requested_by: Option<String>,
    /// Match rows of any owner, including unowned seed rows. Admins only.
    #[serde(default)]
    pub any_owner: bool,
}

/// `POST /sales`
pub fn create(req: Request, state: &AppState) -> ResultResp {
    let sale: NewSale = read_json(req)?;
    sale.validate().map_err(ServerError::BadRequest)?;

    let id = state.db.with_conn(|conn| {
        let owner = find_user_by_email(conn, &sale.user_email)?.ok_or(ServerError::NotFound)?;
        insert_sale(conn, &sale, Some(owner.id))
    })?;
    state.cache.invalidate();

    log::info!("recorded sale {id} on {}", sale.date_sold);
    json_created(&json!({ "id": id, "message": "Sale inserted successfully" }))
}

/// `GET /sales/user/{email}`
pub fn for_user(raw_email: &str, state: &AppState) -> ResultResp {
    let email = decode_path_segment(raw_email);
    let sales = state.db.with_conn(|conn| {
        let user = find_user_by_email(conn, &email)?.ok_or(ServerError::NotFound)?;
        load_sales_for_user(conn, user.id)
    })?;
    json_response(&sales)
}

/// `GET /sales/filter`
pub fn filter(params: &QueryParams, state: &AppState) -> ResultResp {
    let filter = SaleFilter {
        postcode: params.raw("postcode").map(str::to_string),
        property_type: params.get("property_type")?,
        min_price: params.get("min_price")?,
        max_price: params.get("max_price")?,
    };
    let sales = state.db.with_conn(|conn| filter_sales(conn, &filter))?;
    json_response(&sales)
}

/// `DELETE /sales`
pub fn delete(req: Request, state: &AppState) -> ResultResp {
    let request: SaleDelete = read_json(req)?;

    let removed = state.db.with_conn(|conn| {
        let owner = find_user_by_email(conn, &request.user_email)?.ok_or(ServerError::NotFound)?;
        let requester = match &request.requested_by {
            Some(email) => find_user_by_email(conn, email)?.ok_or(ServerError::NotFound)?,
            None => owner.clone(),
        };

        if (requester.id != owner.id || request.any_owner) && !requester.is_admin() {
            return Err(ServerError::Forbidden(
                "only an administrator can delete sales of other users".into(),
            ));
        }

        if request.any_owner {
            delete_sale_any_owner(conn, request.date_sold, request.price)
        } else {
            delete_sale(conn, request.date_sold, request.price, owner.id)
        }
    })?;

    if removed == 0 {
        return Err(ServerError::NotFound);
    }
    state.cache.invalidate();

    log::info!("deleted {removed} sale(s) on {}", request.date_sold);
    json_response(&json!({ "deleted": removed, "message": "Sale deleted successfully" }))
}

/// `GET /sales/stats`
pub fn stats(state: &AppState) -> ResultResp {
    let sales = load_sales(state)?;
    json_response(&json!({
        "counts": sale_counts(&sales),
        "anova": anova_by_bedrooms(&sales),
    }))
}

/// `GET /stats`
pub fn stats_html(state: &AppState) -> ResultResp {
    let sales = load_sales(state)?;
    html_response(stats_page(&sale_counts(&sales), &anova_by_bedrooms(&sales)))
}
