use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{
    Employee, EmployeeInput, EmployeeWithRoles, NewEmployee, NewEmployeeRole, NewEmployeeStation,
    Role, UpdateEmployeeRequest,
};
use crate::orm::audit::log_activity_best_effort;
use crate::orm::login::hash_password;
use crate::orm::role::get_role_by_name;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new employee with role and station assignments.
///
/// The plain-text password from the input is hashed here; roles are resolved
/// by name (an unknown role name fails the whole insert with `NotFound`).
/// Everything runs in one transaction.
pub fn insert_employee(
    conn: &mut SqliteConnection,
    input: EmployeeInput,
    acting_employee_id: Option<i32>,
) -> Result<Employee, diesel::result::Error> {
    use crate::schema::employees::dsl::*;

    conn.transaction(|conn| {
        let new_employee = NewEmployee {
            email: input.email,
            password_hash: hash_password(&input.password),
            full_name: input.full_name,
            phone: input.phone,
            is_active: true,
        };

        diesel::insert_into(employees)
            .values(&new_employee)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let employee = employees
            .filter(id.eq(last_id as i32))
            .first::<Employee>(conn)?;

        set_employee_roles(conn, employee.id, &input.role_names)?;
        set_employee_stations(conn, employee.id, &input.station_ids)?;

        log_activity_best_effort(conn, "employees", employee.id, "create", acting_employee_id);

        Ok(employee)
    })
}

/// Gets a single employee by ID.
pub fn get_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> Result<Option<Employee>, diesel::result::Error> {
    use crate::schema::employees::dsl::*;
    employees
        .filter(id.eq(employee_id))
        .first::<Employee>(conn)
        .optional()
}

/// Gets a single employee by email (case-insensitive).
pub fn get_employee_by_email(
    conn: &mut SqliteConnection,
    employee_email: &str,
) -> Result<Option<Employee>, diesel::result::Error> {
    diesel::sql_query("SELECT * FROM employees WHERE LOWER(email) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(employee_email)
        .get_result::<Employee>(conn)
        .optional()
}

/// Returns all employees in ascending order by id.
pub fn list_all_employees(
    conn: &mut SqliteConnection,
) -> Result<Vec<Employee>, diesel::result::Error> {
    use crate::schema::employees::dsl::*;
    employees.order(id.asc()).load::<Employee>(conn)
}

/// Returns the roles assigned to an employee.
pub fn get_employee_roles(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
) -> Result<Vec<Role>, diesel::result::Error> {
    use crate::schema::{employee_roles, roles};

    employee_roles::table
        .inner_join(roles::table)
        .filter(employee_roles::employee_id.eq(target_employee_id))
        .select((roles::id, roles::name, roles::description))
        .order(roles::id.asc())
        .load::<Role>(conn)
}

/// Returns the station ids an employee is assigned to.
pub fn get_employee_station_ids(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
) -> Result<Vec<i32>, diesel::result::Error> {
    use crate::schema::employee_stations::dsl::*;

    employee_stations
        .filter(employee_id.eq(target_employee_id))
        .select(station_id)
        .order(station_id.asc())
        .load::<i32>(conn)
}

/// Builds the roles-and-stations view of one employee.
pub fn get_employee_with_roles(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> Result<Option<EmployeeWithRoles>, diesel::result::Error> {
    let employee = match get_employee(conn, employee_id)? {
        Some(e) => e,
        None => return Ok(None),
    };
    let roles = get_employee_roles(conn, employee_id)?;
    let station_ids = get_employee_station_ids(conn, employee_id)?;

    Ok(Some(EmployeeWithRoles {
        id: employee.id,
        email: employee.email,
        full_name: employee.full_name,
        phone: employee.phone,
        is_active: employee.is_active,
        roles,
        station_ids,
    }))
}

/// Returns all employees with their roles and station assignments.
pub fn list_all_employees_with_roles(
    conn: &mut SqliteConnection,
) -> Result<Vec<EmployeeWithRoles>, diesel::result::Error> {
    let all = list_all_employees(conn)?;
    let mut result = Vec::with_capacity(all.len());
    for employee in all {
        let roles = get_employee_roles(conn, employee.id)?;
        let station_ids = get_employee_station_ids(conn, employee.id)?;
        result.push(EmployeeWithRoles {
            id: employee.id,
            email: employee.email,
            full_name: employee.full_name,
            phone: employee.phone,
            is_active: employee.is_active,
            roles,
            station_ids,
        });
    }
    Ok(result)
}

/// Replaces an employee's role set with the named roles.
pub fn set_employee_roles(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
    role_names: &[String],
) -> Result<(), diesel::result::Error> {
    use crate::schema::employee_roles::dsl::*;

    diesel::delete(employee_roles.filter(employee_id.eq(target_employee_id))).execute(conn)?;

    for role_name in role_names {
        let role = get_role_by_name(conn, role_name)?
            .ok_or(diesel::result::Error::NotFound)?;
        diesel::insert_into(employee_roles)
            .values(&NewEmployeeRole {
                employee_id: target_employee_id,
                role_id: role.id,
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Replaces an employee's station assignments.
pub fn set_employee_stations(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
    station_ids: &[i32],
) -> Result<(), diesel::result::Error> {
    use crate::schema::employee_stations::dsl::*;

    diesel::delete(employee_stations.filter(employee_id.eq(target_employee_id))).execute(conn)?;

    for target_station_id in station_ids {
        diesel::insert_into(employee_stations)
            .values(&NewEmployeeStation {
                employee_id: target_employee_id,
                station_id: *target_station_id,
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Updates an employee's fields. All fields are optional - only provided
/// fields are touched. Role and station lists, when present, replace the
/// existing assignments wholesale.
pub fn update_employee(
    conn: &mut SqliteConnection,
    employee_id_val: i32,
    update: UpdateEmployeeRequest,
    acting_employee_id: Option<i32>,
) -> Result<Employee, diesel::result::Error> {
    use crate::schema::employees::dsl::*;

    conn.transaction(|conn| {
        if let Some(email_val) = update.email {
            diesel::update(employees.filter(id.eq(employee_id_val)))
                .set(email.eq(email_val))
                .execute(conn)?;
        }

        if let Some(password_val) = update.password {
            diesel::update(employees.filter(id.eq(employee_id_val)))
                .set(password_hash.eq(hash_password(&password_val)))
                .execute(conn)?;
        }

        if let Some(name_val) = update.full_name {
            diesel::update(employees.filter(id.eq(employee_id_val)))
                .set(full_name.eq(name_val))
                .execute(conn)?;
        }

        if let Some(phone_val) = update.phone {
            diesel::update(employees.filter(id.eq(employee_id_val)))
                .set(phone.eq(phone_val))
                .execute(conn)?;
        }

        if let Some(active_val) = update.is_active {
            diesel::update(employees.filter(id.eq(employee_id_val)))
                .set(is_active.eq(active_val))
                .execute(conn)?;
        }

        if let Some(role_names) = update.role_names {
            set_employee_roles(conn, employee_id_val, &role_names)?;
        }

        if let Some(station_ids) = update.station_ids {
            set_employee_stations(conn, employee_id_val, &station_ids)?;
        }

        log_activity_best_effort(conn, "employees", employee_id_val, "update", acting_employee_id);

        employees
            .filter(id.eq(employee_id_val))
            .first::<Employee>(conn)
    })
}

/// Flips the active flag on an employee (soft delete / restore).
pub fn set_employee_active(
    conn: &mut SqliteConnection,
    employee_id_val: i32,
    active: bool,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::employees::dsl::*;

    let affected = diesel::update(employees.filter(id.eq(employee_id_val)))
        .set(is_active.eq(active))
        .execute(conn)?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationInput;
    use crate::orm::role::ensure_role_exists;
    use crate::orm::station::insert_station;
    use crate::orm::testing::setup_test_db;

    fn sample_input(email: &str) -> EmployeeInput {
        EmployeeInput {
            email: email.to_string(),
            password: "secret".to_string(),
            full_name: "Test Employee".to_string(),
            phone: Some("0300-0000000".to_string()),
            role_names: vec![],
            station_ids: vec![],
        }
    }

    #[test]
    fn test_insert_employee_with_roles_and_stations() {
        let mut conn = setup_test_db();
        ensure_role_exists(&mut conn, "station-manager", "Runs one or more stations").unwrap();
        let station = insert_station(
            &mut conn,
            StationInput {
                name: "Depot North".to_string(),
                address: "Plot 4, Ring Road".to_string(),
            },
            None,
        )
        .unwrap();

        let mut input = sample_input("manager@fueldesk.example");
        input.role_names = vec!["station-manager".to_string()];
        input.station_ids = vec![station.id];

        let employee = insert_employee(&mut conn, input, None).expect("insert employee");
        let with_roles = get_employee_with_roles(&mut conn, employee.id)
            .unwrap()
            .unwrap();

        assert_eq!(with_roles.roles.len(), 1);
        assert_eq!(with_roles.roles[0].name, "station-manager");
        assert_eq!(with_roles.station_ids, vec![station.id]);
    }

    #[test]
    fn test_insert_employee_unknown_role_fails() {
        let mut conn = setup_test_db();
        let mut input = sample_input("nobody@fueldesk.example");
        input.role_names = vec!["no-such-role".to_string()];

        let result = insert_employee(&mut conn, input, None);
        assert!(matches!(result, Err(diesel::result::Error::NotFound)));

        // The transaction must have rolled back the employee row too
        let found = get_employee_by_email(&mut conn, "nobody@fueldesk.example").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_update_employee_replaces_roles() {
        let mut conn = setup_test_db();
        ensure_role_exists(&mut conn, "attendant", "Station attendant").unwrap();
        ensure_role_exists(&mut conn, "accounts", "Accounts desk").unwrap();

        let mut input = sample_input("switch@fueldesk.example");
        input.role_names = vec!["attendant".to_string()];
        let employee = insert_employee(&mut conn, input, None).unwrap();

        let update = UpdateEmployeeRequest {
            email: None,
            password: None,
            full_name: None,
            phone: None,
            is_active: None,
            role_names: Some(vec!["accounts".to_string()]),
            station_ids: None,
        };
        update_employee(&mut conn, employee.id, update, None).unwrap();

        let roles = get_employee_roles(&mut conn, employee.id).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "accounts");
    }
}
