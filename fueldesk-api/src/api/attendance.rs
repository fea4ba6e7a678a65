//! API endpoints for attendance.
//!
//! One record per employee per day; check-in stamps it, check-out closes
//! it.

use chrono::{NaiveDate, Utc};
use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{Attendance, CheckInInput};
use crate::orm::DbConn;
use crate::orm::attendance::{AttendanceError, check_in, check_out, list_attendance};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn attendance_error_response(e: AttendanceError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match e {
        AttendanceError::AlreadyCheckedIn => (
            Status::Conflict,
            "Already checked in for today".to_string(),
        ),
        AttendanceError::NotCheckedIn => {
            (Status::NotFound, "No check-in recorded for today".to_string())
        }
        AttendanceError::AlreadyCheckedOut => {
            (Status::Conflict, "Already checked out for today".to_string())
        }
        AttendanceError::Db(e) => {
            error!("Database error in attendance flow: {:?}", e);
            (
                Status::InternalServerError,
                "Database error during attendance processing".to_string(),
            )
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

/// Check-In endpoint.
///
/// - **URL:** `/api/1/attendance/check-in`
/// - **Method:** `POST`
/// - **Purpose:** Records today's check-in for the calling employee
/// - **Authentication:** Required
/// - **Authorization:** when a station is given, the employee must have
///   access to it
///
/// # Request Format
///
/// ```json
/// { "station_id": 1, "note": "late - transport strike" }
/// ```
///
/// **Failure (HTTP 409 Conflict):** already checked in today.
#[post("/1/attendance/check-in", data = "<input>")]
pub async fn attendance_check_in(
    db: DbConn,
    input: LoggedJson<CheckInInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<Attendance>>, response::status::Custom<Json<ErrorResponse>>> {
    let input = input.into_inner();

    if let Some(sid) = input.station_id {
        if !auth_user.can_access_station(sid) {
            let err = Json(ErrorResponse {
                error: "Forbidden: no access to this station".to_string(),
            });
            return Err(response::status::Custom(Status::Forbidden, err));
        }
    }

    let employee_id = auth_user.employee.id;

    db.run(move |conn| {
        check_in(
            conn,
            employee_id,
            input.station_id,
            input.note,
            Utc::now().naive_utc(),
        )
        .map(|record| status::Created::new("/").body(Json(record)))
        .map_err(attendance_error_response)
    })
    .await
}

/// Check-Out endpoint.
///
/// - **URL:** `/api/1/attendance/check-out`
/// - **Method:** `POST`
/// - **Purpose:** Stamps today's check-out for the calling employee
/// - **Authentication:** Required
#[post("/1/attendance/check-out")]
pub async fn attendance_check_out(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Attendance>, response::status::Custom<Json<ErrorResponse>>> {
    let employee_id = auth_user.employee.id;

    db.run(move |conn| {
        check_out(conn, employee_id, Utc::now().naive_utc())
            .map(Json)
            .map_err(attendance_error_response)
    })
    .await
}

/// List Attendance endpoint.
///
/// - **URL:** `/api/1/attendance?employee_id=<id>&from=<date>&to=<date>`
/// - **Method:** `GET`
/// - **Purpose:** Lists attendance records, newest day first
/// - **Authentication:** Required
/// - **Authorization:** `admin`/`accounts` can query anyone; everyone else
///   only themselves
///
/// Dates use ISO `YYYY-MM-DD` format.
#[get("/1/attendance?<employee_id>&<from>&<to>")]
pub async fn list_attendance_endpoint(
    db: DbConn,
    employee_id: Option<i32>,
    from: Option<String>,
    to: Option<String>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Attendance>>, Status> {
    let is_admin = auth_user.has_any_role(&["admin", "accounts"]);

    // Non-admins may only look at their own records
    let effective_employee = match employee_id {
        Some(eid) if is_admin || eid == auth_user.employee.id => Some(eid),
        Some(_) => return Err(Status::Forbidden),
        None if is_admin => None,
        None => Some(auth_user.employee.id),
    };

    let from_date = parse_date_param(from)?;
    let to_date = parse_date_param(to)?;

    db.run(move |conn| {
        list_attendance(conn, effective_employee, from_date, to_date)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

fn parse_date_param(param: Option<String>) -> Result<Option<NaiveDate>, Status> {
    match param {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Status::BadRequest),
        None => Ok(None),
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        attendance_check_in,
        attendance_check_out,
        list_attendance_endpoint
    ]
}
