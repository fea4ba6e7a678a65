use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::filling_history;

/// One row per stock movement, append-only. `current_stock` is the level
/// before the movement, `available_stock` the level after.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = filling_history)]
#[ts(export)]
pub struct FillingHistory {
    pub id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub trans_type: String, // purchase | transfer-in | transfer-out | filling | adjustment
    pub current_stock: f64,
    pub quantity: f64,
    pub available_stock: f64,
    pub reference: Option<String>,
    pub employee_id: Option<i32>,
    #[ts(type = "string")]
    pub recorded_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = filling_history)]
pub struct NewFillingHistory {
    pub station_id: i32,
    pub product_id: i32,
    pub trans_type: String,
    pub current_stock: f64,
    pub quantity: f64,
    pub available_stock: f64,
    pub reference: Option<String>,
    pub employee_id: Option<i32>,
    pub recorded_at: Option<NaiveDateTime>, // None = database CURRENT_TIMESTAMP
}
