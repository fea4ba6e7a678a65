//! API endpoints for accounting vouchers.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{Voucher, VoucherInput, VoucherWithItems};
use crate::orm::DbConn;
use crate::orm::voucher::{VoucherError, create_voucher, get_voucher_with_items, list_vouchers};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn voucher_error_response(e: VoucherError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match e {
        VoucherError::TooFewItems => (
            Status::UnprocessableEntity,
            "A voucher needs at least two line items".to_string(),
        ),
        VoucherError::InvalidItem => (
            Status::UnprocessableEntity,
            "Each line item must carry a non-negative amount on exactly one side".to_string(),
        ),
        VoucherError::Unbalanced => (
            Status::UnprocessableEntity,
            "Debit total must equal credit total".to_string(),
        ),
        VoucherError::Db(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => (Status::Conflict, "Voucher number already exists".to_string()),
        VoucherError::Db(e) => {
            error!("Database error in voucher flow: {:?}", e);
            (
                Status::InternalServerError,
                "Database error during voucher processing".to_string(),
            )
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// Create Voucher endpoint.
///
/// - **URL:** `/api/1/vouchers`
/// - **Method:** `POST`
/// - **Purpose:** Creates a voucher with its line items in one transaction
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// # Request Format
///
/// ```json
/// {
///   "voucher_no": "JV-2025-014",
///   "voucher_type": "journal",
///   "voucher_date": "2025-07-31",
///   "narration": "July freight accruals",
///   "items": [
///     { "account": "freight-expense", "debit": 25000, "credit": 0 },
///     { "account": "payables:transporter", "debit": 0, "credit": 25000 }
///   ]
/// }
/// ```
///
/// **Failure (HTTP 422 Unprocessable Entity):** fewer than two items, an
/// item with both sides set, or unbalanced totals.
#[post("/1/vouchers", data = "<input>")]
pub async fn create_voucher_endpoint(
    db: DbConn,
    input: LoggedJson<VoucherInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<VoucherWithItems>>, response::status::Custom<Json<ErrorResponse>>>
{
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to create vouchers".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = input.into_inner();

    db.run(move |conn| {
        create_voucher(conn, input, Some(acting_id))
            .map(|voucher| status::Created::new("/").body(Json(voucher)))
            .map_err(voucher_error_response)
    })
    .await
}

/// List Vouchers endpoint.
///
/// - **URL:** `/api/1/vouchers?voucher_type=<t>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[get("/1/vouchers?<voucher_type>")]
pub async fn list_vouchers_endpoint(
    db: DbConn,
    voucher_type: Option<String>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Voucher>>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        list_vouchers(conn, voucher_type)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Voucher endpoint.
///
/// - **URL:** `/api/1/vouchers/<voucher_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[get("/1/vouchers/<voucher_id>")]
pub async fn get_voucher_endpoint(
    db: DbConn,
    voucher_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<VoucherWithItems>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| match get_voucher_with_items(conn, voucher_id) {
        Ok(Some(voucher)) => Ok(Json(voucher)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_voucher_endpoint,
        list_vouchers_endpoint,
        get_voucher_endpoint
    ]
}
