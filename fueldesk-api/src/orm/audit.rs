use diesel::prelude::*;

use crate::models::{EntityActivity, NewEntityActivity};

/// Log an activity for an entity
pub fn log_activity(
    conn: &mut SqliteConnection,
    table_name_val: &str,
    entity_id_val: i32,
    operation_type_val: &str,
    employee_id_val: Option<i32>,
) -> Result<EntityActivity, diesel::result::Error> {
    use crate::schema::entity_activity::dsl::*;

    let new_activity = NewEntityActivity {
        table_name: table_name_val.to_string(),
        entity_id: entity_id_val,
        operation_type: operation_type_val.to_string(),
        timestamp: None, // Use database default (CURRENT_TIMESTAMP)
        employee_id: employee_id_val,
    };

    diesel::insert_into(entity_activity)
        .values(&new_activity)
        .execute(conn)?;

    // Get the inserted record
    entity_activity
        .order(id.desc())
        .first::<EntityActivity>(conn)
}

/// Log an activity, swallowing failures.
///
/// Audit writes must never fail the mutation they describe, so errors are
/// logged and discarded.
pub fn log_activity_best_effort(
    conn: &mut SqliteConnection,
    table_name_val: &str,
    entity_id_val: i32,
    operation_type_val: &str,
    employee_id_val: Option<i32>,
) {
    if let Err(e) = log_activity(
        conn,
        table_name_val,
        entity_id_val,
        operation_type_val,
        employee_id_val,
    ) {
        error!(
            "audit write failed for {}/{} ({}): {:?}",
            table_name_val,
            entity_id_val,
            operation_type_val,
            e
        );
    }
}

/// Get full activity history for an entity
pub fn get_activity_history(
    conn: &mut SqliteConnection,
    table_name_val: &str,
    entity_id_val: i32,
) -> Result<Vec<EntityActivity>, diesel::result::Error> {
    use crate::schema::entity_activity::dsl::*;

    entity_activity
        .filter(table_name.eq(table_name_val))
        .filter(entity_id.eq(entity_id_val))
        .order(timestamp.asc())
        .load::<EntityActivity>(conn)
}

/// Get all activities of a specific type
pub fn get_activities_by_operation(
    conn: &mut SqliteConnection,
    operation_type_val: &str,
) -> Result<Vec<EntityActivity>, diesel::result::Error> {
    use crate::schema::entity_activity::dsl::*;

    entity_activity
        .filter(operation_type.eq(operation_type_val))
        .order(timestamp.desc())
        .load::<EntityActivity>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_log_activity() {
        let mut conn = setup_test_db();

        let result = log_activity(&mut conn, "customers", 1, "create", None);
        assert!(result.is_ok());

        let activity = result.unwrap();
        assert_eq!(activity.table_name, "customers");
        assert_eq!(activity.entity_id, 1);
        assert_eq!(activity.operation_type, "create");
        assert_eq!(activity.employee_id, None);
    }

    #[test]
    fn test_get_activity_history() {
        let mut conn = setup_test_db();

        log_activity(&mut conn, "customers", 1, "create", None).unwrap();
        log_activity(&mut conn, "customers", 1, "update", None).unwrap();
        log_activity(&mut conn, "customers", 1, "update", None).unwrap();

        let history = get_activity_history(&mut conn, "customers", 1).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].operation_type, "create");
        assert_eq!(history[1].operation_type, "update");
        assert_eq!(history[2].operation_type, "update");
    }

    #[test]
    fn test_best_effort_logging_never_panics() {
        let mut conn = setup_test_db();

        // employee_id 9999 violates the foreign key; the helper must swallow it
        log_activity_best_effort(&mut conn, "customers", 1, "update", Some(9999));

        let history = get_activity_history(&mut conn, "customers", 1).unwrap();
        assert!(history.is_empty());
    }
}
