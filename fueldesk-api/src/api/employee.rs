//! API endpoints for employee management.
//!
//! # Authorization Rules
//! - Only `admin` can create, update or deactivate employees
//! - `admin` and `accounts` can list employees; everyone can fetch
//!   themselves

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{EmployeeInput, EmployeeWithRoles, UpdateEmployeeRequest};
use crate::orm::DbConn;
use crate::orm::employee::{
    get_employee_by_email, get_employee_with_roles, insert_employee, list_all_employees_with_roles,
    set_employee_active, update_employee,
};
use crate::session_guards::AuthenticatedUser;

/// Error response structure for employee API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Employee endpoint.
///
/// - **URL:** `/api/1/employees`
/// - **Method:** `POST`
/// - **Purpose:** Creates an employee with roles and station assignments
/// - **Authentication:** Required
/// - **Authorization:** `admin`
///
/// # Request Format
///
/// ```json
/// {
///   "email": "manager@fueldesk.example",
///   "password": "changeme",
///   "full_name": "Site Manager",
///   "phone": "0300-1234567",
///   "role_names": ["station-manager"],
///   "station_ids": [1, 2]
/// }
/// ```
#[post("/1/employees", data = "<new_employee>")]
pub async fn create_employee(
    db: DbConn,
    new_employee: LoggedJson<EmployeeInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<EmployeeWithRoles>>, response::status::Custom<Json<ErrorResponse>>>
{
    if !auth_user.has_role("admin") {
        let err = Json(ErrorResponse {
            error: "Forbidden: only admin can create employees".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = new_employee.into_inner();

    db.run(move |conn| {
        // Reject duplicate emails with a conflict rather than a bare 500
        match get_employee_by_email(conn, &input.email) {
            Ok(Some(_)) => {
                let err = Json(ErrorResponse {
                    error: format!("Employee with email '{}' already exists", input.email),
                });
                return Err(response::status::Custom(Status::Conflict, err));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error checking for existing employee: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while checking for existing employee".to_string(),
                });
                return Err(response::status::Custom(Status::InternalServerError, err));
            }
        }

        match insert_employee(conn, input, Some(acting_id)) {
            Ok(employee) => match get_employee_with_roles(conn, employee.id) {
                Ok(Some(with_roles)) => Ok(status::Created::new("/").body(Json(with_roles))),
                _ => {
                    let err = Json(ErrorResponse {
                        error: "Employee created but could not be reloaded".to_string(),
                    });
                    Err(response::status::Custom(Status::InternalServerError, err))
                }
            },
            Err(diesel::result::Error::NotFound) => {
                let err = Json(ErrorResponse {
                    error: "Unknown role name in role_names".to_string(),
                });
                Err(response::status::Custom(Status::UnprocessableEntity, err))
            }
            Err(e) => {
                error!("Error creating employee: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating employee".to_string(),
                });
                Err(response::status::Custom(Status::InternalServerError, err))
            }
        }
    })
    .await
}

/// List Employees endpoint.
///
/// - **URL:** `/api/1/employees`
/// - **Method:** `GET`
/// - **Purpose:** Retrieves all employees with their roles and stations
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[get("/1/employees")]
pub async fn list_employees(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<EmployeeWithRoles>>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(|conn| {
        list_all_employees_with_roles(conn)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Employee endpoint.
///
/// - **URL:** `/api/1/employees/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin`/`accounts`, or the employee themselves
#[get("/1/employees/<employee_id>")]
pub async fn get_employee_endpoint(
    db: DbConn,
    employee_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<EmployeeWithRoles>, Status> {
    let is_self = auth_user.employee.id == employee_id;
    if !is_self && !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| match get_employee_with_roles(conn, employee_id) {
        Ok(Some(employee)) => Ok(Json(employee)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Update Employee endpoint.
///
/// - **URL:** `/api/1/employees/<employee_id>`
/// - **Method:** `PUT`
/// - **Purpose:** Partial update; role/station lists replace wholesale
/// - **Authentication:** Required
/// - **Authorization:** `admin`
#[put("/1/employees/<employee_id>", data = "<update>")]
pub async fn update_employee_endpoint(
    db: DbConn,
    employee_id: i32,
    update: LoggedJson<UpdateEmployeeRequest>,
    auth_user: AuthenticatedUser,
) -> Result<Json<EmployeeWithRoles>, Status> {
    if !auth_user.has_role("admin") {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;
    let update = update.into_inner();

    db.run(move |conn| {
        if get_employee_with_roles(conn, employee_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }

        update_employee(conn, employee_id, update, Some(acting_id))
            .map_err(|_| Status::InternalServerError)?;

        match get_employee_with_roles(conn, employee_id) {
            Ok(Some(employee)) => Ok(Json(employee)),
            _ => Err(Status::InternalServerError),
        }
    })
    .await
}

/// Deactivate Employee endpoint.
///
/// - **URL:** `/api/1/employees/<employee_id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Soft delete; the row stays for history, logins stop working
/// - **Authentication:** Required
/// - **Authorization:** `admin`
#[delete("/1/employees/<employee_id>")]
pub async fn deactivate_employee_endpoint(
    db: DbConn,
    employee_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Status, Status> {
    if !auth_user.has_role("admin") {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        set_employee_active(conn, employee_id, false)
            .map(|found| if found { Status::NoContent } else { Status::NotFound })
            .map_err(|e| {
                error!("Error deactivating employee: {:?}", e);
                Status::InternalServerError
            })
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_employee,
        list_employees,
        get_employee_endpoint,
        update_employee_endpoint,
        deactivate_employee_endpoint
    ]
}
