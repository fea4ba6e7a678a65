//! API endpoints for product management.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{Product, ProductInput, UpdateProductRequest};
use crate::orm::DbConn;
use crate::orm::product::{
    get_all_products, get_product_by_code, get_product_by_id, insert_product, update_product,
};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Product endpoint.
///
/// - **URL:** `/api/1/products`
/// - **Method:** `POST`
/// - **Authentication:** Required
/// - **Authorization:** `admin`
///
/// **Failure (HTTP 409 Conflict):** a product with the same code exists.
#[post("/1/products", data = "<new_product>")]
pub async fn create_product(
    db: DbConn,
    new_product: LoggedJson<ProductInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<Product>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_role("admin") {
        let err = Json(ErrorResponse {
            error: "Forbidden: only admin can create products".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = new_product.into_inner();

    db.run(move |conn| {
        match get_product_by_code(conn, &input.code) {
            Ok(Some(_existing)) => {
                let err = Json(ErrorResponse {
                    error: format!("Product with code '{}' already exists", input.code),
                });
                return Err(response::status::Custom(Status::Conflict, err));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error checking for existing product: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while checking for existing product".to_string(),
                });
                return Err(response::status::Custom(Status::InternalServerError, err));
            }
        }

        insert_product(conn, input, Some(acting_id))
            .map(|product| status::Created::new("/").body(Json(product)))
            .map_err(|e| {
                error!("Error creating product: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating product".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// List Products endpoint.
///
/// - **URL:** `/api/1/products`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/products")]
pub async fn list_products(
    db: DbConn,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Product>>, Status> {
    db.run(|conn| {
        get_all_products(conn)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Product endpoint.
///
/// - **URL:** `/api/1/products/<product_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/products/<product_id>")]
pub async fn get_product_endpoint(
    db: DbConn,
    product_id: i32,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Product>, Status> {
    db.run(move |conn| match get_product_by_id(conn, product_id) {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Update Product endpoint.
///
/// - **URL:** `/api/1/products/<product_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Required
/// - **Authorization:** `admin`
#[put("/1/products/<product_id>", data = "<update>")]
pub async fn update_product_endpoint(
    db: DbConn,
    product_id: i32,
    update: LoggedJson<UpdateProductRequest>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Product>, Status> {
    if !auth_user.has_role("admin") {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;
    let update = update.into_inner();

    db.run(move |conn| {
        if get_product_by_id(conn, product_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }

        update_product(conn, product_id, update, Some(acting_id))
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_product,
        list_products,
        get_product_endpoint,
        update_product_endpoint
    ]
}
