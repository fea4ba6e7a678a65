//! API endpoints for station stock levels, manual adjustments and the
//! filling-history ledger.
//!
//! # Authorization Rules
//! - Reading stock and history requires access to the station
//! - Manual adjustments are restricted to `admin`

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{FillingHistory, StationStock, StockAdjustmentInput};
use crate::orm::DbConn;
use crate::orm::station::get_station_by_id;
use crate::orm::stock::{adjust_stock, get_station_history, get_station_stocks};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// List Station Stocks endpoint.
///
/// - **URL:** `/api/1/stations/<station_id>/stocks`
/// - **Method:** `GET`
/// - **Purpose:** Current per-product stock levels at a station
/// - **Authentication:** Required
/// - **Authorization:** station access
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// [
///   { "id": 4, "station_id": 1, "product_id": 2, "stock": 3150.0 }
/// ]
/// ```
#[get("/1/stations/<station_id>/stocks")]
pub async fn list_station_stocks(
    db: DbConn,
    station_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<StationStock>>, Status> {
    if !auth_user.can_access_station(station_id) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        if get_station_by_id(conn, station_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }
        get_station_stocks(conn, station_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Adjust Station Stock endpoint.
///
/// - **URL:** `/api/1/stations/<station_id>/stocks/adjust`
/// - **Method:** `POST`
/// - **Purpose:** Manual correction (dip readings, spillage, opening stock)
/// - **Authentication:** Required
/// - **Authorization:** `admin`
///
/// # Request Format
///
/// ```json
/// { "product_id": 2, "quantity": -35.0, "reason": "dip variance" }
/// ```
///
/// **Failure (HTTP 409 Conflict):** a negative adjustment would take the
/// stock below zero.
#[post("/1/stations/<station_id>/stocks/adjust", data = "<input>")]
pub async fn adjust_station_stock(
    db: DbConn,
    station_id: i32,
    input: LoggedJson<StockAdjustmentInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<FillingHistory>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_role("admin") {
        let err = Json(ErrorResponse {
            error: "Forbidden: only admin can adjust stock".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = input.into_inner();

    db.run(move |conn| {
        if get_station_by_id(conn, station_id).ok().flatten().is_none() {
            let err = Json(ErrorResponse {
                error: "No such station".to_string(),
            });
            return Err(response::status::Custom(Status::NotFound, err));
        }

        match adjust_stock(
            conn,
            station_id,
            input.product_id,
            input.quantity,
            input.reason,
            Some(acting_id),
        ) {
            Ok(Some(history)) => Ok(status::Created::new("/").body(Json(history))),
            Ok(None) => {
                let err = Json(ErrorResponse {
                    error: "Adjustment would take stock below zero".to_string(),
                });
                Err(response::status::Custom(Status::Conflict, err))
            }
            Err(e) => {
                error!("Error adjusting stock: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while adjusting stock".to_string(),
                });
                Err(response::status::Custom(Status::InternalServerError, err))
            }
        }
    })
    .await
}

/// Station Filling History endpoint.
///
/// - **URL:** `/api/1/stations/<station_id>/history?product_id=<id>`
/// - **Method:** `GET`
/// - **Purpose:** The append-only stock-movement ledger, newest first
/// - **Authentication:** Required
/// - **Authorization:** station access
#[get("/1/stations/<station_id>/history?<product_id>")]
pub async fn station_history(
    db: DbConn,
    station_id: i32,
    product_id: Option<i32>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<FillingHistory>>, Status> {
    if !auth_user.can_access_station(station_id) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        if get_station_by_id(conn, station_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }
        get_station_history(conn, station_id, product_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_station_stocks, adjust_station_stock, station_history]
}
