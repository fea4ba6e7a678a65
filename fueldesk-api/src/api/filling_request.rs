//! API endpoints for the OTP-gated filling-request flow.
//!
//! A request moves `Pending` -> `Processing` -> `Completed`, with
//! `Cancelled` reachable from the first two states. The Pending ->
//! Processing transition is gated by a one-time code and reserves the
//! request's hold amount against the customer's credit limit; every
//! multi-write step runs in a single database transaction.
//!
//! # Authorization Rules
//! - All endpoints require access to the request's station
//! - `admin` and `accounts` can act on any station's requests

use chrono::Utc;
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{FillingRequest, FillingRequestInput, ProcessRequestInput};
use crate::orm::DbConn;
use crate::orm::filling_request::{
    RequestFlowError, cancel_request, complete_request, create_request, generate_otp, get_request,
    list_requests, process_request,
};
use crate::session_guards::AuthenticatedUser;

/// Error response structure for request-flow failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response carrying a freshly generated OTP.
///
/// In the original deployment the code is texted to the customer; here it
/// is returned to the operator who relays it.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct OtpResponse {
    pub otp: String,
}

fn flow_error_response(e: RequestFlowError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match e {
        RequestFlowError::NotFound => (Status::NotFound, "No such filling request".to_string()),
        RequestFlowError::InvalidQuantity => {
            (Status::UnprocessableEntity, "Quantity must be positive".to_string())
        }
        RequestFlowError::NoActivePrice => (
            Status::UnprocessableEntity,
            "No active deal price for this customer, station and product".to_string(),
        ),
        RequestFlowError::InvalidStatus(actual) => (
            Status::Conflict,
            format!("Request status '{}' does not allow this operation", actual),
        ),
        RequestFlowError::RateLimited => (
            Status::TooManyRequests,
            "OTP generation limit reached, try again later".to_string(),
        ),
        RequestFlowError::OtpMismatch => {
            (Status::BadRequest, "Submitted OTP does not match".to_string())
        }
        RequestFlowError::OtpExpired => (Status::BadRequest, "OTP has expired".to_string()),
        RequestFlowError::InsufficientCredit => (
            Status::Conflict,
            "Insufficient available credit for this request".to_string(),
        ),
        RequestFlowError::InsufficientStock => (
            Status::Conflict,
            "Insufficient stock at the station".to_string(),
        ),
        RequestFlowError::Db(e) => {
            error!("Database error in request flow: {:?}", e);
            (
                Status::InternalServerError,
                "Database error during request processing".to_string(),
            )
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// Create Filling Request endpoint.
///
/// - **URL:** `/api/1/filling-requests`
/// - **Method:** `POST`
/// - **Purpose:** Creates a `Pending` request priced from the active deal price
/// - **Authentication:** Required
/// - **Authorization:** station access
///
/// # Request Format
///
/// ```json
/// {
///   "customer_id": 7,
///   "station_id": 1,
///   "product_id": 2,
///   "quantity": 400.0
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 201 Created):** the request row, including the computed
/// `unit_price` and `hold_amount`.
///
/// **Failure (HTTP 422 Unprocessable Entity):** no active deal price covers
/// this customer, station and product.
#[post("/1/filling-requests", data = "<input>")]
pub async fn create_filling_request(
    db: DbConn,
    input: LoggedJson<FillingRequestInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<FillingRequest>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = input.into_inner();

    if !auth_user.can_access_station(input.station_id) {
        let err = Json(ErrorResponse {
            error: "Forbidden: no access to this station".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        create_request(conn, input, Some(acting_id))
            .map(|request| status::Created::new("/").body(Json(request)))
            .map_err(flow_error_response)
    })
    .await
}

/// List Filling Requests endpoint.
///
/// - **URL:** `/api/1/filling-requests?status=<s>&customer_id=<id>&station_id=<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin`/`accounts` see everything; other employees
///   must name one of their stations in `station_id`
#[get("/1/filling-requests?<status>&<customer_id>&<station_id>")]
pub async fn list_filling_requests(
    db: DbConn,
    status: Option<String>,
    customer_id: Option<i32>,
    station_id: Option<i32>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<FillingRequest>>, Status> {
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
        list_requests(conn, status, customer_id, station_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Filling Request endpoint.
///
/// - **URL:** `/api/1/filling-requests/<request_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** station access
#[get("/1/filling-requests/<request_id>")]
pub async fn get_filling_request(
    db: DbConn,
    request_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingRequest>, Status> {
    let request = db
        .run(move |conn| get_request(conn, request_id))
        .await
        .map_err(|_| Status::InternalServerError)?
        .ok_or(Status::NotFound)?;

    if !auth_user.can_access_station(request.station_id) {
        return Err(Status::Forbidden);
    }

    Ok(Json(request))
}

/// Generate OTP endpoint.
///
/// - **URL:** `/api/1/filling-requests/<request_id>/otp`
/// - **Method:** `POST`
/// - **Purpose:** Issues a fresh 6-digit code for a `Pending` request
/// - **Authentication:** Required
/// - **Authorization:** station access
///
/// Each (request, employee) pair may generate at most 5 codes per 10
/// minutes; a fresh code replaces the previous one and is valid for 10
/// minutes.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "otp": "031574" }
/// ```
///
/// **Failure (HTTP 429 Too Many Requests):** issuance limit reached.
#[post("/1/filling-requests/<request_id>/otp")]
pub async fn generate_request_otp(
    db: DbConn,
    request_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<OtpResponse>, response::status::Custom<Json<ErrorResponse>>> {
    authorize_for_request(&db, request_id, &auth_user).await?;

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        generate_otp(conn, request_id, acting_id, Utc::now().naive_utc())
            .map(|otp| Json(OtpResponse { otp }))
            .map_err(flow_error_response)
    })
    .await
}

/// Process Filling Request endpoint.
///
/// - **URL:** `/api/1/filling-requests/<request_id>/process`
/// - **Method:** `POST`
/// - **Purpose:** Verifies the OTP and moves the request to `Processing`,
///   reserving the hold amount against the customer's credit
/// - **Authentication:** Required
/// - **Authorization:** station access
///
/// # Request Format
///
/// ```json
/// { "otp": "031574" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):** the request row, now `Processing`.
///
/// **Failure (HTTP 400 Bad Request):** the code does not match or has
/// expired.
///
/// **Failure (HTTP 409 Conflict):** `credit_limit - hold_balance` is
/// smaller than the hold amount (the conditional balance update affected
/// zero rows), or the request is not `Pending`.
#[post("/1/filling-requests/<request_id>/process", data = "<input>")]
pub async fn process_filling_request(
    db: DbConn,
    request_id: i32,
    input: LoggedJson<ProcessRequestInput>,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingRequest>, response::status::Custom<Json<ErrorResponse>>> {
    authorize_for_request(&db, request_id, &auth_user).await?;

    let acting_id = auth_user.employee.id;
    let submitted = input.into_inner().otp;

    db.run(move |conn| {
        process_request(conn, request_id, &submitted, acting_id, Utc::now().naive_utc())
            .map(Json)
            .map_err(flow_error_response)
    })
    .await
}

/// Complete Filling Request endpoint.
///
/// - **URL:** `/api/1/filling-requests/<request_id>/complete`
/// - **Method:** `POST`
/// - **Purpose:** Debits station stock (with a `filling` history row),
///   releases the credit hold and marks the request `Completed`
/// - **Authentication:** Required
/// - **Authorization:** station access
///
/// **Failure (HTTP 409 Conflict):** the station does not hold enough
/// stock, or the request is not `Processing`.
#[post("/1/filling-requests/<request_id>/complete")]
pub async fn complete_filling_request(
    db: DbConn,
    request_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingRequest>, response::status::Custom<Json<ErrorResponse>>> {
    authorize_for_request(&db, request_id, &auth_user).await?;

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        complete_request(conn, request_id, acting_id)
            .map(Json)
            .map_err(flow_error_response)
    })
    .await
}

/// Cancel Filling Request endpoint.
///
/// - **URL:** `/api/1/filling-requests/<request_id>/cancel`
/// - **Method:** `POST`
/// - **Purpose:** Cancels a `Pending` or `Processing` request, releasing
///   any reserved hold
/// - **Authentication:** Required
/// - **Authorization:** station access
#[post("/1/filling-requests/<request_id>/cancel")]
pub async fn cancel_filling_request(
    db: DbConn,
    request_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingRequest>, response::status::Custom<Json<ErrorResponse>>> {
    authorize_for_request(&db, request_id, &auth_user).await?;

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        cancel_request(conn, request_id, acting_id)
            .map(Json)
            .map_err(flow_error_response)
    })
    .await
}

/// Loads the request and checks the caller may act on its station.
async fn authorize_for_request(
    db: &DbConn,
    request_id: i32,
    auth_user: &AuthenticatedUser,
) -> Result<(), response::status::Custom<Json<ErrorResponse>>> {
    let request = db
        .run(move |conn| get_request(conn, request_id))
        .await
        .map_err(|e| flow_error_response(RequestFlowError::Db(e)))?
        .ok_or_else(|| flow_error_response(RequestFlowError::NotFound))?;

    if !auth_user.can_access_station(request.station_id) {
        return Err(response::status::Custom(
            Status::Forbidden,
            Json(ErrorResponse {
                error: "Forbidden: no access to this station".to_string(),
            }),
        ));
    }

    Ok(())
}

pub fn routes() -> Vec<Route> {
    routes![
        create_filling_request,
        list_filling_requests,
        get_filling_request,
        generate_request_otp,
        process_filling_request,
        complete_filling_request,
        cancel_filling_request
    ]
}
