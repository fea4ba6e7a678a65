use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::stock_transfers;

#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = stock_transfers)]
#[ts(export)]
pub struct StockTransfer {
    pub id: i32,
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub note: Option<String>,
    pub transferred_by: Option<i32>,
    #[ts(type = "string")]
    pub transferred_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = stock_transfers)]
pub struct NewStockTransfer {
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub note: Option<String>,
    pub transferred_by: Option<i32>,
    pub transferred_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct StockTransferInput {
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub note: Option<String>,
}
