//! API endpoints for customer management.
//!
//! Creating a customer also creates its credit-balance row; the two are
//! inseparable. The credit-limit endpoint refuses changes that would leave
//! the limit below the amount currently on hold.
//!
//! # Authorization Rules
//! - `admin` and `accounts` manage customers and credit limits
//! - Any authenticated employee can list and read customers and balances

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{BalanceView, CreditLimitInput, Customer, CustomerInput, UpdateCustomerRequest};
use crate::orm::DbConn;
use crate::orm::customer::{
    get_all_customers, get_customer_by_id, insert_customer, set_credit_limit, update_customer,
};
use crate::orm::ledger::get_balance;
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Customer endpoint.
///
/// - **URL:** `/api/1/customers`
/// - **Method:** `POST`
/// - **Purpose:** Creates a customer together with its balance row
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// # Request Format
///
/// ```json
/// {
///   "name": "Frontier Logistics",
///   "contact_person": "Mr. Daud",
///   "phone": "051-1234567",
///   "agent_id": 3,
///   "credit_limit": 250000
/// }
/// ```
#[post("/1/customers", data = "<new_customer>")]
pub async fn create_customer(
    db: DbConn,
    new_customer: LoggedJson<CustomerInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<Customer>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to create customers".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let input = new_customer.into_inner();
    if input.credit_limit < 0 {
        let err = Json(ErrorResponse {
            error: "credit_limit must not be negative".to_string(),
        });
        return Err(response::status::Custom(Status::UnprocessableEntity, err));
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        insert_customer(conn, input, Some(acting_id))
            .map(|customer| status::Created::new("/").body(Json(customer)))
            .map_err(|e| {
                error!("Error creating customer: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating customer".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// List Customers endpoint.
///
/// - **URL:** `/api/1/customers`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/customers")]
pub async fn list_customers(
    db: DbConn,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Customer>>, Status> {
    db.run(|conn| {
        get_all_customers(conn)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Customer endpoint.
///
/// - **URL:** `/api/1/customers/<customer_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/customers/<customer_id>")]
pub async fn get_customer_endpoint(
    db: DbConn,
    customer_id: i32,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Customer>, Status> {
    db.run(move |conn| match get_customer_by_id(conn, customer_id) {
        Ok(Some(customer)) => Ok(Json(customer)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Update Customer endpoint.
///
/// - **URL:** `/api/1/customers/<customer_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[put("/1/customers/<customer_id>", data = "<update>")]
pub async fn update_customer_endpoint(
    db: DbConn,
    customer_id: i32,
    update: LoggedJson<UpdateCustomerRequest>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Customer>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;
    let update = update.into_inner();

    db.run(move |conn| {
        if get_customer_by_id(conn, customer_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }

        update_customer(conn, customer_id, update, Some(acting_id))
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Customer Balance endpoint.
///
/// - **URL:** `/api/1/customers/<customer_id>/balance`
/// - **Method:** `GET`
/// - **Purpose:** Returns limit, hold and the derived available headroom
/// - **Authentication:** Required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "customer_id": 7,
///   "credit_limit": 250000,
///   "hold_balance": 40000,
///   "available": 210000
/// }
/// ```
#[get("/1/customers/<customer_id>/balance")]
pub async fn get_customer_balance(
    db: DbConn,
    customer_id: i32,
    _auth_user: AuthenticatedUser,
) -> Result<Json<BalanceView>, Status> {
    db.run(move |conn| match get_balance(conn, customer_id) {
        Ok(Some(balance)) => Ok(Json(BalanceView {
            customer_id: balance.customer_id,
            credit_limit: balance.credit_limit,
            hold_balance: balance.hold_balance,
            available: balance.credit_limit - balance.hold_balance,
        })),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Set Credit Limit endpoint.
///
/// - **URL:** `/api/1/customers/<customer_id>/credit-limit`
/// - **Method:** `PUT`
/// - **Purpose:** Adjusts the customer's credit limit
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// **Failure (HTTP 409 Conflict):** the new limit is below the amount
/// currently on hold.
#[put("/1/customers/<customer_id>/credit-limit", data = "<input>")]
pub async fn set_credit_limit_endpoint(
    db: DbConn,
    customer_id: i32,
    input: LoggedJson<CreditLimitInput>,
    auth_user: AuthenticatedUser,
) -> Result<Json<BalanceView>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to set credit limits".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let new_limit = input.credit_limit;
    if new_limit < 0 {
        let err = Json(ErrorResponse {
            error: "credit_limit must not be negative".to_string(),
        });
        return Err(response::status::Custom(Status::UnprocessableEntity, err));
    }

    let acting_id = auth_user.employee.id;

    db.run(move |conn| {
        let balance = get_balance(conn, customer_id).map_err(|_| {
            response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse {
                    error: "Database error while reading balance".to_string(),
                }),
            )
        })?;
        if balance.is_none() {
            return Err(response::status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "No such customer".to_string(),
                }),
            ));
        }

        let changed = set_credit_limit(conn, customer_id, new_limit, Some(acting_id))
            .map_err(|_| {
                response::status::Custom(
                    Status::InternalServerError,
                    Json(ErrorResponse {
                        error: "Database error while setting credit limit".to_string(),
                    }),
                )
            })?;

        if !changed {
            return Err(response::status::Custom(
                Status::Conflict,
                Json(ErrorResponse {
                    error: "New credit limit is below the current hold balance".to_string(),
                }),
            ));
        }

        match get_balance(conn, customer_id) {
            Ok(Some(balance)) => Ok(Json(BalanceView {
                customer_id: balance.customer_id,
                credit_limit: balance.credit_limit,
                hold_balance: balance.hold_balance,
                available: balance.credit_limit - balance.hold_balance,
            })),
            _ => Err(response::status::Custom(
                Status::InternalServerError,
                Json(ErrorResponse {
                    error: "Balance updated but could not be reloaded".to_string(),
                }),
            )),
        }
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_customer,
        list_customers,
        get_customer_endpoint,
        update_customer_endpoint,
        get_customer_balance,
        set_credit_limit_endpoint
    ]
}
