use diesel::{Connection, sqlite::SqliteConnection};
use dotenvy::dotenv;

use fueldesk_api::admin_init_fairing::ensure_baseline_roles;
use fueldesk_api::orm::db::run_pending_migrations;

/// Opens the database named by DATABASE_URL, running any pending
/// migrations and seeding the baseline roles so the CLI works against a
/// fresh file too.
pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut conn = SqliteConnection::establish(&database_url)?;
    run_pending_migrations(&mut conn);
    ensure_baseline_roles(&mut conn)?;
    Ok(conn)
}

/// Prompts for a password on the terminal when one was not passed as a
/// flag.
pub fn password_or_prompt(password: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match password {
        Some(p) => Ok(p),
        None => {
            eprint!("Password: ");
            let typed = rpassword::read_password()?;
            if typed.trim().is_empty() {
                return Err("Password must not be empty".into());
            }
            Ok(typed)
        }
    }
}

/// Builds a matcher from a search term: regex by default, literal when
/// `fixed_string` is set.
pub fn build_matcher(
    search_term: &str,
    fixed_string: bool,
) -> Result<regex::Regex, Box<dyn std::error::Error>> {
    let pattern = if fixed_string {
        regex::escape(search_term)
    } else {
        search_term.to_string()
    };
    Ok(regex::Regex::new(&pattern)?)
}
