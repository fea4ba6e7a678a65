//! API endpoints for scheduled deal prices.
//!
//! Prices are scheduled ahead of time and promoted by the activation sweep,
//! which an external scheduler invokes periodically. Nothing in the server
//! self-schedules.

use chrono::Utc;
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{ActivationSummary, DealPrice, DealPriceInput};
use crate::orm::DbConn;
use crate::orm::deal_price::{activate_due_prices, list_deal_prices, schedule_deal_price};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Schedule Deal Price endpoint.
///
/// - **URL:** `/api/1/deal-prices`
/// - **Method:** `POST`
/// - **Purpose:** Schedules a price for activation at `effective_from`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// # Request Format
///
/// ```json
/// {
///   "station_id": 1,
///   "product_id": 2,
///   "customer_id": null,
///   "price": 26500,
///   "effective_from": "2025-08-01T00:00:00"
/// }
/// ```
#[post("/1/deal-prices", data = "<input>")]
pub async fn create_deal_price(
    db: DbConn,
    input: LoggedJson<DealPriceInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<DealPrice>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to schedule prices".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let input = input.into_inner();
    if input.price <= 0 {
        let err = Json(ErrorResponse {
            error: "price must be positive".to_string(),
        });
        return Err(response::status::Custom(Status::UnprocessableEntity, err));
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        schedule_deal_price(conn, input, Some(acting_id))
            .map(|price| status::Created::new("/").body(Json(price)))
            .map_err(|e| {
                error!("Error scheduling deal price: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while scheduling deal price".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// Activate Due Prices endpoint.
///
/// - **URL:** `/api/1/deal-prices/activate`
/// - **Method:** `POST`
/// - **Purpose:** Promotes every scheduled price whose effective date has
///   arrived, expiring the previously active price for the same scope
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// This is the endpoint an external cron job calls; it is idempotent, so
/// overlapping invocations are harmless.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "activated": 3, "expired": 2 }
/// ```
#[post("/1/deal-prices/activate")]
pub async fn activate_deal_prices(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<ActivationSummary>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        activate_due_prices(conn, Utc::now().naive_utc(), Some(acting_id))
            .map(Json)
            .map_err(|e| {
                error!("Error activating deal prices: {:?}", e);
                Status::InternalServerError
            })
    })
    .await
}

/// List Deal Prices endpoint.
///
/// - **URL:** `/api/1/deal-prices?status=<s>&station_id=<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/deal-prices?<status>&<station_id>")]
pub async fn list_deal_prices_endpoint(
    db: DbConn,
    status: Option<String>,
    station_id: Option<i32>,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<DealPrice>>, Status> {
    db.run(move |conn| {
        list_deal_prices(conn, status, station_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![create_deal_price, activate_deal_prices, list_deal_prices_endpoint]
}
