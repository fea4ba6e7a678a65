use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::Rocket;
use rocket::fairing::AdHoc;

use crate::models::EmployeeInput;
use crate::orm::DbConn;
use crate::orm::employee::{get_employee_by_email, insert_employee};
use crate::orm::role::ensure_role_exists;

/// Baseline roles and the default admin employee, created on first launch.
///
/// Override the admin credentials with the FUELDESK_DEFAULT_EMAIL and
/// FUELDESK_DEFAULT_PASSWORD environment variables.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin Employee Initialization", |rocket| async {
        dotenv().ok();

        let conn = match get_db_connection(&rocket).await {
            Some(conn) => conn,
            None => return Err(rocket),
        };

        let result = conn
            .run(|c| {
                ensure_baseline_roles(c)?;
                create_admin_employee_if_needed(c)
            })
            .await;

        match result {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: Admin initialization failed: {:?}", e);
                Err(rocket)
            }
        }
    })
}

async fn get_db_connection(rocket: &Rocket<rocket::Build>) -> Option<DbConn> {
    match DbConn::get_one(rocket).await {
        Some(conn) => Some(conn),
        None => {
            error!("[admin-init] ERROR: Could not get DB connection.");
            None
        }
    }
}

/// Ensures the roles every deployment relies on exist.
pub fn ensure_baseline_roles(c: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    ensure_role_exists(c, "admin", "Back-office administrator")?;
    ensure_role_exists(c, "accounts", "Accounts desk")?;
    ensure_role_exists(c, "station-manager", "Runs one or more stations")?;
    ensure_role_exists(c, "attendant", "Station attendant")?;
    Ok(())
}

fn get_admin_email() -> String {
    std::env::var("FUELDESK_DEFAULT_EMAIL")
        .unwrap_or_else(|_| "admin@fueldesk.example".to_string())
}

fn get_admin_password() -> String {
    std::env::var("FUELDESK_DEFAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string())
}

fn create_admin_employee_if_needed(
    c: &mut SqliteConnection,
) -> Result<(), diesel::result::Error> {
    let admin_email = get_admin_email();

    if get_employee_by_email(c, &admin_email)?.is_some() {
        info!("[admin-init] Admin employee '{}' already exists", admin_email);
        return Ok(());
    }

    let input = EmployeeInput {
        email: admin_email.clone(),
        password: get_admin_password(),
        full_name: "Default Admin".to_string(),
        phone: None,
        role_names: vec!["admin".to_string()],
        station_ids: vec![],
    };

    insert_employee(c, input, None)?;
    info!("[admin-init] Created admin employee: '{}'", admin_email);

    Ok(())
}
