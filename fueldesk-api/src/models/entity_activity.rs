use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::entity_activity;

/// Audit trail row. Written after every mutating operation; failures to
/// write are logged and swallowed so they never fail the primary operation.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = entity_activity)]
#[ts(export)]
pub struct EntityActivity {
    pub id: i32,
    pub table_name: String,
    pub entity_id: i32,
    pub operation_type: String,
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
    pub employee_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = entity_activity)]
pub struct NewEntityActivity {
    pub table_name: String,
    pub entity_id: i32,
    pub operation_type: String,
    pub timestamp: Option<NaiveDateTime>, // None = database CURRENT_TIMESTAMP
    pub employee_id: Option<i32>,
}
