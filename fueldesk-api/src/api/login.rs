//! API endpoints for employee login and authentication.
//!
//! This module provides HTTP endpoints for authentication and session
//! management. It handles login requests, generates session tokens, and
//! provides an authenticated identity-echo endpoint.

use rocket::response;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Route, http::CookieJar, serde::json::Json};
use ts_rs::TS;

use crate::DbConn;
use crate::orm::login::process_login;
use crate::session_guards::AuthenticatedUser;

/// Error response structure for authentication failures.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Login success response structure containing employee information.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub employee_id: i32,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<String>,
    pub station_ids: Vec<i32>,
}

/// Creates a standardized identity response for the login and hello
/// endpoints.
///
/// Both endpoints return exactly the same structure for a given employee:
/// id, email, full name, role names and assigned station ids.
async fn build_identity_response(
    db: &DbConn,
    employee: crate::models::Employee,
) -> LoginSuccessResponse {
    let employee_id = employee.id;
    let (roles, station_ids) = db
        .run(move |conn| {
            let roles = crate::orm::employee::get_employee_roles(conn, employee_id)
                .map(|roles| roles.into_iter().map(|r| r.name).collect())
                .unwrap_or_else(|_| vec![]);
            let station_ids = crate::orm::employee::get_employee_station_ids(conn, employee_id)
                .unwrap_or_else(|_| vec![]);
            (roles, station_ids)
        })
        .await;

    LoginSuccessResponse {
        employee_id: employee.id,
        email: employee.email,
        full_name: employee.full_name,
        roles,
        station_ids,
    }
}

/// Login request structure containing employee credentials.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login endpoint that authenticates employees and creates sessions.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates an employee by email and password, and sets a secure session cookie
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "email": "admin@fueldesk.example",
///   "password": "admin"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "employee_id": 1,
///   "email": "admin@fueldesk.example",
///   "full_name": "Default Admin",
///   "roles": ["admin"],
///   "station_ids": []
/// }
/// ```
/// Sets session cookie named `session` (HTTP-only, secure, SameSite=Lax).
///
/// **Failure (HTTP 401 Unauthorized):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
///
/// # Security
/// - Passwords are verified using Argon2 hashing
/// - Invalid credentials return generic error messages to prevent
///   enumeration
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    match process_login(&db, cookies, &login).await {
        Ok((_status, employee)) => Ok(Json(build_identity_response(&db, employee).await)),
        Err(status) => {
            let err_json = Json(ErrorResponse {
                error: "Invalid credentials".to_string(),
            });
            Err(response::status::Custom(status, err_json))
        }
    }
}

/// Hello (Authentication Check) endpoint.
///
/// - **URL:** `/api/1/hello`
/// - **Method:** `GET`
/// - **Purpose:** Returns the authenticated employee's identity; useful for checking authentication status
/// - **Authentication:** Required
#[get("/1/hello")]
pub async fn secure_hello(
    auth_user: AuthenticatedUser,
    db: DbConn,
) -> Json<LoginSuccessResponse> {
    Json(build_identity_response(&db, auth_user.employee).await)
}

/// Returns all login-related API routes.
pub fn routes() -> Vec<Route> {
    routes![login, secure_hello]
}
