//! Request guards for authenticated routes.
//!
//! `AuthenticatedUser` validates the session cookie against the database
//! and carries the employee row plus role names and station assignments, so
//! route handlers can make authorization decisions without further queries.

use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};

use crate::models::{Employee, Session};
use crate::orm::DbConn;
use crate::orm::employee::{get_employee_roles, get_employee_station_ids};
use crate::orm::login::DbRunner;
use crate::schema::{employees, sessions};

/// A guard for routes that require an authenticated employee.
///
/// Automatically checks the session cookie and validates it against the
/// database; routes using this guard answer 401 when validation fails.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub employee: Employee,
    pub roles: Vec<String>,
    pub station_ids: Vec<i32>,
}

impl AuthenticatedUser {
    /// True if the employee holds the named role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True if the employee holds any of the named roles.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    /// True if the employee may act on the given station.
    ///
    /// `admin` and `accounts` see every station; everyone else only the
    /// stations they are assigned to.
    pub fn can_access_station(&self, station_id: i32) -> bool {
        if self.has_any_role(&["admin", "accounts"]) {
            return true;
        }
        self.station_ids.contains(&station_id)
    }

    /// Resolves the session cookie to an employee, if the session is valid.
    pub async fn from_cookies_and_db<D: DbRunner>(
        cookies: &CookieJar<'_>,
        db: &D,
    ) -> Option<AuthenticatedUser> {
        let session_cookie = cookies.get("session")?;
        let session_id = session_cookie.value().to_string();

        // Query the sessions table for a valid session
        let session_result = db
            .run(move |conn| {
                sessions::table
                    .filter(sessions::id.eq(&session_id))
                    .filter(sessions::revoked.eq(false))
                    .filter(
                        sessions::expires_at
                            .is_null()
                            .or(sessions::expires_at.gt(Utc::now().naive_utc())),
                    )
                    .first::<Session>(conn)
                    .optional()
            })
            .await;

        let session = match session_result {
            Ok(Some(sess)) => sess,
            _ => return None,
        };

        // Load the employee plus the role/station context used for
        // authorization checks
        let employee_result = db
            .run(move |conn| {
                let employee = employees::table
                    .filter(employees::id.eq(session.employee_id))
                    .filter(employees::is_active.eq(true))
                    .first::<Employee>(conn)
                    .optional()?;

                match employee {
                    Some(employee) => {
                        let roles = get_employee_roles(conn, employee.id)?
                            .into_iter()
                            .map(|r| r.name)
                            .collect();
                        let station_ids = get_employee_station_ids(conn, employee.id)?;
                        Ok::<_, diesel::result::Error>(Some(AuthenticatedUser {
                            employee,
                            roles,
                            station_ids,
                        }))
                    }
                    None => Ok(None),
                }
            })
            .await;

        match employee_result {
            Ok(Some(user)) => Some(user),
            _ => None,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db = match req.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        match AuthenticatedUser::from_cookies_and_db(req.cookies(), &db).await {
            Some(user) => Outcome::Success(user),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
