//! API endpoint for listing roles.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;

use crate::models::Role;
use crate::orm::DbConn;
use crate::orm::role::list_all_roles;
use crate::session_guards::AuthenticatedUser;

/// List Roles endpoint.
///
/// - **URL:** `/api/1/roles`
/// - **Method:** `GET`
/// - **Purpose:** Retrieves all roles known to the system
/// - **Authentication:** Required
#[get("/1/roles")]
pub async fn list_roles(
    db: DbConn,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Role>>, Status> {
    db.run(|conn| {
        list_all_roles(conn)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![list_roles]
}
