use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewRole, Role};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new role.
pub fn insert_role(
    conn: &mut SqliteConnection,
    new_role: NewRole,
) -> Result<Role, diesel::result::Error> {
    use crate::schema::roles::dsl::*;

    diesel::insert_into(roles).values(&new_role).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    roles.filter(id.eq(last_id as i32)).first::<Role>(conn)
}

/// Gets a role by name.
pub fn get_role_by_name(
    conn: &mut SqliteConnection,
    role_name: &str,
) -> Result<Option<Role>, diesel::result::Error> {
    use crate::schema::roles::dsl::*;
    roles
        .filter(name.eq(role_name))
        .first::<Role>(conn)
        .optional()
}

/// Returns all roles in ascending order by id.
pub fn list_all_roles(conn: &mut SqliteConnection) -> Result<Vec<Role>, diesel::result::Error> {
    use crate::schema::roles::dsl::*;
    roles.order(id.asc()).load::<Role>(conn)
}

/// Ensures a role exists, creating it if necessary.
pub fn ensure_role_exists(
    conn: &mut SqliteConnection,
    role_name: &str,
    role_description: &str,
) -> Result<Role, diesel::result::Error> {
    match get_role_by_name(conn, role_name)? {
        Some(role) => Ok(role),
        None => insert_role(
            conn,
            NewRole {
                name: role_name.to_string(),
                description: Some(role_description.to_string()),
            },
        ),
    }
}
