//! API endpoint for logout and session revocation.

use rocket::http::{CookieJar, Status};
use rocket::{Route, serde::json::Json};
use serde::Serialize;

use crate::DbConn;
use crate::orm::logout::revoke_session;

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Logout endpoint.
///
/// - **URL:** `/api/1/logout`
/// - **Method:** `POST`
/// - **Purpose:** Revokes the current session and clears the cookie
/// - **Authentication:** Not enforced; logging out without a session is a
///   no-op that still returns 200
///
/// The session row is marked revoked rather than deleted, preserving the
/// session history for auditing.
#[post("/1/logout")]
pub async fn logout(
    db: DbConn,
    cookies: &CookieJar<'_>,
) -> Result<Json<LogoutResponse>, Status> {
    if let Some(cookie) = cookies.get("session") {
        let session_id = cookie.value().to_string();
        revoke_session(&db, &session_id)
            .await
            .map_err(|_| Status::InternalServerError)?;
        cookies.remove("session");
    }

    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
