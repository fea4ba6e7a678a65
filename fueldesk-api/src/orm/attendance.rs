use chrono::NaiveDateTime;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Attendance, NewAttendance};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Failure modes of attendance operations.
#[derive(Debug)]
pub enum AttendanceError {
    Db(diesel::result::Error),
    /// A record for this employee and day already exists.
    AlreadyCheckedIn,
    /// No record for this employee and day.
    NotCheckedIn,
    /// The record for this day already has a check-out stamp.
    AlreadyCheckedOut,
}

impl From<diesel::result::Error> for AttendanceError {
    fn from(e: diesel::result::Error) -> Self {
        AttendanceError::Db(e)
    }
}

/// Checks an employee in for the day of `now`.
///
/// The UNIQUE(employee_id, work_date) constraint enforces one record per
/// employee per day; a second check-in surfaces as `AlreadyCheckedIn`.
pub fn check_in(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
    target_station_id: Option<i32>,
    note_val: Option<String>,
    now: NaiveDateTime,
) -> Result<Attendance, AttendanceError> {
    use crate::schema::attendance::dsl::*;

    let new_record = NewAttendance {
        employee_id: target_employee_id,
        station_id: target_station_id,
        work_date: now.date(),
        check_in: now,
        check_out: None,
        note: note_val,
    };

    let inserted = diesel::insert_into(attendance)
        .values(&new_record)
        .execute(conn);

    match inserted {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => return Err(AttendanceError::AlreadyCheckedIn),
        Err(e) => return Err(AttendanceError::Db(e)),
    }

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let record = attendance
        .filter(id.eq(last_id as i32))
        .first::<Attendance>(conn)?;

    log_activity_best_effort(conn, "attendance", record.id, "create", Some(target_employee_id));

    Ok(record)
}

/// Stamps the check-out time on today's record.
pub fn check_out(
    conn: &mut SqliteConnection,
    target_employee_id: i32,
    now: NaiveDateTime,
) -> Result<Attendance, AttendanceError> {
    use crate::schema::attendance::dsl::*;

    let record = attendance
        .filter(employee_id.eq(target_employee_id))
        .filter(work_date.eq(now.date()))
        .first::<Attendance>(conn)
        .optional()?
        .ok_or(AttendanceError::NotCheckedIn)?;

    if record.check_out.is_some() {
        return Err(AttendanceError::AlreadyCheckedOut);
    }

    diesel::update(attendance.filter(id.eq(record.id)))
        .set(check_out.eq(Some(now)))
        .execute(conn)?;

    log_activity_best_effort(conn, "attendance", record.id, "update", Some(target_employee_id));

    attendance
        .filter(id.eq(record.id))
        .first::<Attendance>(conn)
        .map_err(AttendanceError::Db)
}

/// Lists attendance records, newest day first, with optional employee and
/// date-range filters.
pub fn list_attendance(
    conn: &mut SqliteConnection,
    employee_filter: Option<i32>,
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> Result<Vec<Attendance>, diesel::result::Error> {
    use crate::schema::attendance::dsl::*;

    let mut query = attendance.into_boxed();

    if let Some(eid) = employee_filter {
        query = query.filter(employee_id.eq(eid));
    }
    if let Some(from_date) = from {
        query = query.filter(work_date.ge(from_date));
    }
    if let Some(to_date) = to {
        query = query.filter(work_date.le(to_date));
    }

    query
        .order((work_date.desc(), employee_id.asc()))
        .load::<Attendance>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::models::EmployeeInput;
    use crate::orm::employee::insert_employee;
    use crate::orm::testing::setup_test_db;

    fn employee(conn: &mut SqliteConnection, email: &str) -> i32 {
        insert_employee(
            conn,
            EmployeeInput {
                email: email.to_string(),
                password: "pw".to_string(),
                full_name: "Attendance Tester".to_string(),
                phone: None,
                role_names: vec![],
                station_ids: vec![],
            },
            None,
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_check_in_once_per_day() {
        let mut conn = setup_test_db();
        let eid = employee(&mut conn, "attend@fueldesk.example");
        let now = Utc::now().naive_utc();

        let record = check_in(&mut conn, eid, None, None, now).expect("first check-in");
        assert_eq!(record.work_date, now.date());
        assert!(record.check_out.is_none());

        let second = check_in(&mut conn, eid, None, None, now + Duration::hours(1));
        assert!(matches!(second, Err(AttendanceError::AlreadyCheckedIn)));
    }

    #[test]
    fn test_check_out_flow() {
        let mut conn = setup_test_db();
        let eid = employee(&mut conn, "inout@fueldesk.example");
        let now = Utc::now().naive_utc();

        // Checking out before checking in
        let early = check_out(&mut conn, eid, now);
        assert!(matches!(early, Err(AttendanceError::NotCheckedIn)));

        check_in(&mut conn, eid, None, None, now).unwrap();
        let out = check_out(&mut conn, eid, now + Duration::hours(8)).expect("check-out");
        assert!(out.check_out.is_some());

        let twice = check_out(&mut conn, eid, now + Duration::hours(9));
        assert!(matches!(twice, Err(AttendanceError::AlreadyCheckedOut)));
    }

    #[test]
    fn test_list_attendance_by_range() {
        let mut conn = setup_test_db();
        let eid = employee(&mut conn, "range@fueldesk.example");
        let now = Utc::now().naive_utc();

        check_in(&mut conn, eid, None, None, now).unwrap();

        let records =
            list_attendance(&mut conn, Some(eid), Some(now.date()), Some(now.date())).unwrap();
        assert_eq!(records.len(), 1);

        let none = list_attendance(
            &mut conn,
            Some(eid),
            Some(now.date() + Duration::days(1)),
            None,
        )
        .unwrap();
        assert!(none.is_empty());
    }
}
