//! Database operations for employee authentication and session management.
//!
//! This module provides database layer functions for login, session creation,
//! password verification, and session storage. It abstracts database
//! operations to support both production and testing environments.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use uuid::Uuid;

use crate::DbConn;
use crate::models::{Employee, NewSession};
use crate::orm::testing::FakeDbConn;
use crate::schema::{employees, sessions};

/// Trait for abstracting database operations to support both production and
/// testing.
///
/// This trait allows the same functions to work with both `DbConn`
/// (production) and `FakeDbConn` (testing) by providing a unified interface
/// for database operations.
pub trait DbRunner {
    /// Executes a database operation with a connection.
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Generates a new UUID-based session token.
fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Finds an active employee by their email address.
///
/// Deactivated employees are treated as absent so their credentials stop
/// working the moment they are disabled.
///
/// # Arguments
/// * `db` - Database connection implementing the `DbRunner` trait
/// * `email` - Email address to search for
///
/// # Returns
/// * `Ok(Some(Employee))` - Active employee found with matching email
/// * `Ok(None)` - No active employee with that email
/// * `Err(Status::InternalServerError)` - Database query failed
pub async fn find_employee_by_email<D: DbRunner>(
    db: &D,
    email: &str,
) -> Result<Option<Employee>, Status> {
    let email = email.to_owned();
    db.run(move |conn| {
        employees::table
            .filter(employees::email.eq(email))
            .filter(employees::is_active.eq(true))
            .first::<Employee>(conn)
            .optional()
    })
    .await
    .map_err(|_| Status::InternalServerError)
}

/// Verifies a password against a stored Argon2 hash.
///
/// Returns `false` for invalid hash formats rather than panicking, so a
/// corrupt database row cannot take down the login route.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Creates a new session and stores it in the database.
///
/// # Arguments
/// * `db` - Database connection implementing the `DbRunner` trait
/// * `employee_id` - ID of the employee to create the session for
///
/// # Returns
/// * `Ok(String)` - Session token that was created and stored
/// * `Err(Status::InternalServerError)` - Database insertion failed
pub async fn create_and_store_session<D: DbRunner>(
    db: &D,
    employee_id: i32,
) -> Result<String, Status> {
    let session_token = generate_session_token();
    let now = Utc::now().naive_utc();

    let new_session = NewSession {
        id: session_token.clone(),
        employee_id,
        created_at: now,
        expires_at: None,
        revoked: false,
    };

    db.run(move |conn| {
        diesel::insert_into(sessions::table)
            .values(&new_session)
            .execute(conn)
    })
    .await
    .map_err(|_| Status::InternalServerError)?;

    Ok(session_token)
}

/// Sets a secure session cookie in the response.
///
/// HTTP-only, secure outside of tests, SameSite=Lax, valid for all paths.
fn set_session_cookie(cookies: &CookieJar<'_>, session_token: &str) {
    let secure_flag = !cfg!(test);
    let cookie = Cookie::build(("session", session_token.to_string()))
        .http_only(true)
        .secure(secure_flag)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookies.add(cookie);
}

/// Processes a complete login workflow including validation and session
/// creation.
///
/// # Arguments
/// * `db` - Database connection implementing the `DbRunner` trait
/// * `cookies` - Cookie jar for setting the session cookie
/// * `login` - Login request containing email and password
///
/// # Returns
/// * `Ok((Status::Ok, Employee))` - Login successful, session cookie set
/// * `Err(Status::BadRequest)` - Empty email or password provided
/// * `Err(Status::Unauthorized)` - Invalid credentials or unknown employee
/// * `Err(Status::InternalServerError)` - Database operation failed
///
/// # Security Notes
/// - Returns generic "Unauthorized" for both unknown emails and wrong
///   passwords to prevent account enumeration
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    login: &crate::api::login::LoginRequest,
) -> Result<(Status, Employee), Status> {
    // Check for empty fields
    if login.email.trim().is_empty() || login.password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let employee = match find_employee_by_email(db, &login.email).await? {
        Some(employee) => employee,
        None => return Err(Status::Unauthorized),
    };

    if !verify_password(&login.password, &employee.password_hash) {
        return Err(Status::Unauthorized);
    }

    let session_token = create_and_store_session(db, employee.id).await?;
    set_session_cookie(cookies, &session_token);

    Ok((Status::Ok, employee))
}

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Hashing should succeed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeInput;
    use crate::orm::employee::insert_employee;
    use crate::orm::testing::{setup_test_db, setup_test_dbconn};

    #[test]
    fn test_verify_password() {
        let password = "correct_password";
        let wrong_password = "wrong_password";
        let hash = hash_password(password);

        // Correct password should verify
        assert!(verify_password(password, &hash));

        // Wrong password should fail
        assert!(!verify_password(wrong_password, &hash));

        // Garbage hash must not panic
        assert!(!verify_password(password, "not-a-hash"));
    }

    /// Inserts a dummy employee, returning it.
    fn insert_dummy_employee(conn: &mut diesel::SqliteConnection) -> Employee {
        let input = EmployeeInput {
            email: "karim@fueldesk.example".to_string(),
            password: "dummy password".to_string(),
            full_name: "Karim Aziz".to_string(),
            phone: None,
            role_names: vec![],
            station_ids: vec![],
        };
        insert_employee(conn, input, None).expect("insert dummy employee")
    }

    #[tokio::test]
    async fn test_find_employee_by_email() {
        let mut conn = setup_test_db();
        let inserted = insert_dummy_employee(&mut conn);
        let fake_db = setup_test_dbconn(&mut conn);

        let found = find_employee_by_email(&fake_db, "karim@fueldesk.example")
            .await
            .expect("db query should succeed");

        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.email, inserted.email);
        assert_eq!(found.password_hash, inserted.password_hash);
    }

    #[tokio::test]
    async fn test_deactivated_employee_is_not_found() {
        let mut conn = setup_test_db();
        let inserted = insert_dummy_employee(&mut conn);
        crate::orm::employee::set_employee_active(&mut conn, inserted.id, false)
            .expect("deactivate");
        let fake_db = setup_test_dbconn(&mut conn);

        let found = find_employee_by_email(&fake_db, "karim@fueldesk.example")
            .await
            .expect("db query should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_and_store_session() {
        let mut conn = setup_test_db();
        let inserted = insert_dummy_employee(&mut conn);
        let fake_db = setup_test_dbconn(&mut conn);

        let session_token = create_and_store_session(&fake_db, inserted.id)
            .await
            .expect("session creation should succeed");

        let token_clone = session_token.clone();
        let stored_session = fake_db
            .run(move |conn| {
                sessions::table
                    .filter(sessions::id.eq(&token_clone))
                    .first::<crate::models::Session>(conn)
                    .optional()
            })
            .await
            .expect("db query should succeed");

        assert!(stored_session.is_some());
        let session = stored_session.unwrap();
        assert_eq!(session.id, session_token);
        assert_eq!(session.employee_id, inserted.id);
        assert!(!session.revoked);
        assert!(session.expires_at.is_none());
    }
}
