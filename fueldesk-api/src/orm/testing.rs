//! Test scaffolding: in-memory databases, a fake async connection wrapper
//! and a fully seeded Rocket instance for integration tests.

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::admin_init_fairing::admin_init_fairing;
use crate::models::{AgentInput, CustomerInput, DealPriceInput, EmployeeInput, ProductInput, StationInput};
use crate::orm::agent::insert_agent;
use crate::orm::customer::insert_customer;
use crate::orm::deal_price::{activate_due_prices, schedule_deal_price};
use crate::orm::employee::{get_employee_by_email, insert_employee};
use crate::orm::product::{get_product_by_code, insert_product};
use crate::orm::station::{get_station_by_name_case_insensitive, insert_station};

/// Configures SQLite with performance-optimized settings for testing.
///
/// These settings make SQLite faster but less durable - only use for
/// testing.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for migration");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates a Rocket fairing that initializes standard test data.
///
/// This fairing creates a consistent set of stations, products, customers
/// and employees that all integration tests can rely on.
fn test_data_init_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Data Initialization", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test data initialization");

        conn.run(|c| {
            if let Err(e) = create_test_data(c) {
                eprintln!("[test-data-init] ERROR: Failed to create test data: {:?}", e);
            }
        })
        .await;

        rocket
    })
}

/// Creates standard test data for all tests to use.
fn create_test_data(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    let station1 = find_or_create_station(conn, "Test Station 1", "1 Test Road")?;
    let _station2 = find_or_create_station(conn, "Test Station 2", "2 Test Road")?;

    let hsd = find_or_create_product(conn, "Hi-Speed Diesel", "HSD", "fuel")?;
    let _pmg = find_or_create_product(conn, "Premium Petrol", "PMG", "fuel")?;

    let agent = insert_agent(
        conn,
        AgentInput {
            name: "Test Agent".to_string(),
            phone: None,
            commission_rate_bps: Some(50),
        },
        None,
    )?;

    insert_customer(
        conn,
        CustomerInput {
            name: "Test Customer 1".to_string(),
            contact_person: Some("Contact One".to_string()),
            phone: None,
            agent_id: Some(agent.id),
            credit_limit: 1_000_000,
        },
        None,
    )?;
    insert_customer(
        conn,
        CustomerInput {
            name: "Test Customer 2".to_string(),
            contact_person: None,
            phone: None,
            agent_id: None,
            credit_limit: 0,
        },
        None,
    )?;

    // A live station-wide price so request tests can price themselves
    let now = Utc::now().naive_utc();
    schedule_deal_price(
        conn,
        DealPriceInput {
            station_id: station1.id,
            product_id: hsd.id,
            customer_id: None,
            price: 250,
            effective_from: now - chrono::Duration::hours(1),
        },
        None,
    )?;
    activate_due_prices(conn, now, None)?;

    create_test_employee(conn, "accounts@fueldesk.example", "accounts", "accounts", vec![])?;
    create_test_employee(
        conn,
        "manager@station1.example",
        "manager",
        "station-manager",
        vec![station1.id],
    )?;
    create_test_employee(
        conn,
        "attendant@station1.example",
        "attendant",
        "attendant",
        vec![station1.id],
    )?;

    Ok(())
}

fn find_or_create_station(
    conn: &mut SqliteConnection,
    name: &str,
    address: &str,
) -> Result<crate::models::FillingStation, diesel::result::Error> {
    match get_station_by_name_case_insensitive(conn, name)? {
        Some(station) => Ok(station),
        None => insert_station(
            conn,
            StationInput {
                name: name.to_string(),
                address: address.to_string(),
            },
            None,
        ),
    }
}

fn find_or_create_product(
    conn: &mut SqliteConnection,
    name: &str,
    code: &str,
    category: &str,
) -> Result<crate::models::Product, diesel::result::Error> {
    match get_product_by_code(conn, code)? {
        Some(product) => Ok(product),
        None => insert_product(
            conn,
            ProductInput {
                name: name.to_string(),
                code: code.to_string(),
                category: category.to_string(),
                unit: "litre".to_string(),
            },
            None,
        ),
    }
}

/// Creates a test employee with the given role and station assignments.
fn create_test_employee(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    role_name: &str,
    station_ids: Vec<i32>,
) -> Result<(), diesel::result::Error> {
    if get_employee_by_email(conn, email)?.is_some() {
        return Ok(());
    }

    insert_employee(
        conn,
        EmployeeInput {
            email: email.to_string(),
            password: password.to_string(),
            full_name: email.split('@').next().unwrap_or(email).to_string(),
            phone: None,
            role_names: vec![role_name.to_string()],
            station_ids,
        },
        None,
    )?;

    Ok(())
}

/// Creates and configures a Rocket instance for testing with an in-memory
/// SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique in-memory SQLite database configured
/// - Foreign keys enabled and testing pragmas set
/// - All migrations run
/// - Admin initialization completed
/// - Standard test data seeded
/// - All API routes mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Generate a unique database name for this test instance
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    // Configure the in-memory SQLite database
    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),  // Unique shared in-memory DB per test
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let databases = map!["sqlite_db" => db_config];

    // Merge DB config into Rocket's figment
    let figment = rocket::Config::figment().merge(("databases", databases));

    // Build the Rocket instance with the DB fairing attached
    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing());

    crate::mount_api_routes(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit
/// tests.
///
/// Runs all embedded Diesel migrations, enables foreign key support and
/// seeds the baseline roles. Each call returns a new, independent in-memory
/// database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    crate::admin_init_fairing::ensure_baseline_roles(&mut conn)
        .expect("Failed to seed baseline roles");
    conn
}

/// A minimal async-compatible wrapper for a synchronous SQLite connection
/// for unit testing.
///
/// This helper allows using a test database with code that expects a
/// Rocket-style async `.run()` interface (such as functions that take a
/// `DbConn` via the `DbRunner` trait).
pub struct FakeDbConn<'a>(pub &'a mut diesel::SqliteConnection);

impl<'a> FakeDbConn<'a> {
    /// Executes a closure with a mutable reference to the underlying SQLite
    /// connection.
    ///
    /// # Safety
    /// This uses unsafe code to convert an immutable reference to mutable,
    /// which is safe in this controlled test environment where we know we
    /// have exclusive access.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        unsafe {
            let conn_ptr =
                self.0 as *const diesel::SqliteConnection as *mut diesel::SqliteConnection;
            f(&mut *conn_ptr)
        }
    }
}

/// Creates a `FakeDbConn` for async-style testing with the given SQLite
/// connection.
pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(conn)
}
