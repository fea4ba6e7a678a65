use clap::Subcommand;

use fueldesk_api::models::{EmployeeInput, UpdateEmployeeRequest};
use fueldesk_api::orm::employee::{
    get_employee_by_email, insert_employee, list_all_employees_with_roles, set_employee_active,
    update_employee,
};

use super::utils::{build_matcher, establish_connection, password_or_prompt};

#[derive(Subcommand)]
pub enum EmployeeAction {
    #[command(about = "Add a new employee")]
    Add {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(short, long, help = "Full name")]
        full_name: String,
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(short, long, help = "Comma-separated role names")]
        roles: Option<String>,
        #[arg(short, long, help = "Comma-separated station IDs")]
        stations: Option<String>,
    },
    #[command(about = "Change an employee's password")]
    ChangePassword {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List employees, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string")]
        fixed_string: bool,
    },
    #[command(about = "Set all roles for an employee (replaces existing roles)")]
    SetRoles {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Comma-separated role names")]
        roles: String,
    },
    #[command(about = "Set station assignments for an employee (replaces existing)")]
    SetStations {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Comma-separated station IDs")]
        stations: String,
    },
    #[command(about = "Deactivate an employee (soft delete)")]
    Deactivate {
        #[arg(short, long, help = "Email address")]
        email: String,
    },
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_station_ids(raw: &str) -> Result<Vec<i32>, Box<dyn std::error::Error>> {
    split_list(raw)
        .into_iter()
        .map(|s| s.parse::<i32>().map_err(|_| format!("Invalid station ID: '{}'", s).into()))
        .collect()
}

pub fn handle_employee_command(action: EmployeeAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;

    match action {
        EmployeeAction::Add {
            email,
            password,
            full_name,
            phone,
            roles,
            stations,
        } => {
            let password = password_or_prompt(password)?;
            let role_names = roles.as_deref().map(split_list).unwrap_or_default();
            let station_ids = match stations {
                Some(raw) => parse_station_ids(&raw)?,
                None => vec![],
            };

            let employee = insert_employee(
                &mut conn,
                EmployeeInput {
                    email,
                    password,
                    full_name,
                    phone,
                    role_names,
                    station_ids,
                },
                None,
            )?;
            println!("Created employee '{}' (ID: {})", employee.email, employee.id);
        }
        EmployeeAction::ChangePassword { email, password } => {
            let employee = get_employee_by_email(&mut conn, &email)?
                .ok_or_else(|| format!("No employee with email '{}'", email))?;
            let password = password_or_prompt(password)?;

            update_employee(
                &mut conn,
                employee.id,
                UpdateEmployeeRequest {
                    email: None,
                    password: Some(password),
                    full_name: None,
                    phone: None,
                    is_active: None,
                    role_names: None,
                    station_ids: None,
                },
                None,
            )?;
            println!("Password changed for '{}'", email);
        }
        EmployeeAction::Ls {
            search_term,
            fixed_string,
        } => {
            let employees = list_all_employees_with_roles(&mut conn)?;
            let matcher = match search_term {
                Some(term) => Some(build_matcher(&term, fixed_string)?),
                None => None,
            };

            for employee in employees {
                if let Some(matcher) = &matcher {
                    if !matcher.is_match(&employee.email) && !matcher.is_match(&employee.full_name)
                    {
                        continue;
                    }
                }
                let roles: Vec<&str> = employee.roles.iter().map(|r| r.name.as_str()).collect();
                println!(
                    "{}\t{}\t{}\t[{}]\tstations: {:?}\t{}",
                    employee.id,
                    employee.email,
                    employee.full_name,
                    roles.join(","),
                    employee.station_ids,
                    if employee.is_active { "active" } else { "inactive" },
                );
            }
        }
        EmployeeAction::SetRoles { email, roles } => {
            let employee = get_employee_by_email(&mut conn, &email)?
                .ok_or_else(|| format!("No employee with email '{}'", email))?;

            update_employee(
                &mut conn,
                employee.id,
                UpdateEmployeeRequest {
                    email: None,
                    password: None,
                    full_name: None,
                    phone: None,
                    is_active: None,
                    role_names: Some(split_list(&roles)),
                    station_ids: None,
                },
                None,
            )?;
            println!("Roles set for '{}'", email);
        }
        EmployeeAction::SetStations { email, stations } => {
            let employee = get_employee_by_email(&mut conn, &email)?
                .ok_or_else(|| format!("No employee with email '{}'", email))?;

            update_employee(
                &mut conn,
                employee.id,
                UpdateEmployeeRequest {
                    email: None,
                    password: None,
                    full_name: None,
                    phone: None,
                    is_active: None,
                    role_names: None,
                    station_ids: Some(parse_station_ids(&stations)?),
                },
                None,
            )?;
            println!("Station assignments set for '{}'", email);
        }
        EmployeeAction::Deactivate { email } => {
            let employee = get_employee_by_email(&mut conn, &email)?
                .ok_or_else(|| format!("No employee with email '{}'", email))?;
            set_employee_active(&mut conn, employee.id, false)?;
            println!("Deactivated '{}'", email);
        }
    }

    Ok(())
}
