use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::attendance;

/// One attendance record per employee per day.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = attendance)]
#[ts(export)]
pub struct Attendance {
    pub id: i32,
    pub employee_id: i32,
    pub station_id: Option<i32>,
    #[ts(type = "string")]
    pub work_date: NaiveDate,
    #[ts(type = "string")]
    pub check_in: NaiveDateTime,
    #[ts(type = "string | null")]
    pub check_out: Option<NaiveDateTime>,
    pub note: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = attendance)]
pub struct NewAttendance {
    pub employee_id: i32,
    pub station_id: Option<i32>,
    pub work_date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub note: Option<String>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CheckInInput {
    pub station_id: Option<i32>,
    pub note: Option<String>,
}
