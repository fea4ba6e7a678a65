//! API endpoints for inter-station stock transfers.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{StockTransfer, StockTransferInput};
use crate::orm::DbConn;
use crate::orm::stock_transfer::{TransferError, list_transfers, transfer_stock};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Stock Transfer endpoint.
///
/// - **URL:** `/api/1/stock-transfers`
/// - **Method:** `POST`
/// - **Purpose:** Moves stock between stations in one transaction
/// - **Authentication:** Required
/// - **Authorization:** `admin`, `accounts`, or a `station-manager` with
///   access to both stations
///
/// # Request Format
///
/// ```json
/// {
///   "from_station_id": 1,
///   "to_station_id": 2,
///   "product_id": 2,
///   "quantity": 500.0,
///   "note": "rebalancing before weekend"
/// }
/// ```
///
/// **Failure (HTTP 409 Conflict):** the source station does not hold enough
/// stock; nothing is persisted.
#[post("/1/stock-transfers", data = "<input>")]
pub async fn create_transfer(
    db: DbConn,
    input: LoggedJson<StockTransferInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<StockTransfer>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = input.into_inner();

    let allowed = auth_user.has_any_role(&["admin", "accounts"])
        || (auth_user.has_role("station-manager")
            && auth_user.can_access_station(input.from_station_id)
            && auth_user.can_access_station(input.to_station_id));
    if !allowed {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions for this transfer".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        match transfer_stock(conn, input, Some(acting_id)) {
            Ok(transfer) => Ok(status::Created::new("/").body(Json(transfer))),
            Err(TransferError::SameStation) => Err(response::status::Custom(
                Status::UnprocessableEntity,
                Json(ErrorResponse {
                    error: "Source and destination station must differ".to_string(),
                }),
            )),
            Err(TransferError::InvalidQuantity) => Err(response::status::Custom(
                Status::UnprocessableEntity,
                Json(ErrorResponse {
                    error: "Quantity must be positive".to_string(),
                }),
            )),
            Err(TransferError::InsufficientStock) => Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse {
                    error: "Insufficient stock at source station".to_string(),
                }),
            )),
            Err(TransferError::Db(e)) => {
                error!("Error transferring stock: {:?}", e);
                Err(response::status::Custom(
                    Status::InternalServerError,
                    Json(ErrorResponse {
                        error: "Database error during stock transfer".to_string(),
                    }),
                ))
            }
        }
    })
    .await
}

/// List Stock Transfers endpoint.
///
/// - **URL:** `/api/1/stock-transfers?station_id=<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** station access when a station filter is given,
///   `admin`/`accounts` otherwise
#[get("/1/stock-transfers?<station_id>")]
pub async fn list_transfers_endpoint(
    db: DbConn,
    station_id: Option<i32>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<StockTransfer>>, Status> {
    match station_id {
        Some(sid) => {
            if !auth_user.can_access_station(sid) {
                return Err(Status::Forbidden);
            }
        }
        None => {
            if !auth_user.has_any_role(&["admin", "accounts"]) {
                return Err(Status::Forbidden);
            }
        }
    }

    db.run(move |conn| {
        list_transfers(conn, station_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![create_transfer, list_transfers_endpoint]
}
