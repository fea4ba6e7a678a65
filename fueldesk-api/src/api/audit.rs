//! API endpoint for reading the audit trail.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;

use crate::models::EntityActivity;
use crate::orm::DbConn;
use crate::orm::audit::get_activity_history;
use crate::session_guards::AuthenticatedUser;

/// Entity Audit History endpoint.
///
/// - **URL:** `/api/1/audit/<table>/<entity_id>`
/// - **Method:** `GET`
/// - **Purpose:** Returns the recorded operations for one entity, oldest
///   first
/// - **Authentication:** Required
/// - **Authorization:** `admin`
#[get("/1/audit/<table>/<entity_id>")]
pub async fn entity_audit_history(
    db: DbConn,
    table: String,
    entity_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<EntityActivity>>, Status> {
    if !auth_user.has_role("admin") {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        get_activity_history(conn, &table, entity_id)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![entity_audit_history]
}
