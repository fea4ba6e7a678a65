use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::station_stocks;

/// Current stock level for one product at one station. One row per
/// (station, product) pair; rows are created lazily on first receipt.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = station_stocks)]
#[ts(export)]
pub struct StationStock {
    pub id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub stock: f64, // litres
}

#[derive(Insertable)]
#[diesel(table_name = station_stocks)]
pub struct NewStationStock {
    pub station_id: i32,
    pub product_id: i32,
    pub stock: f64,
}

/// Manual stock adjustment payload. Positive quantities add stock,
/// negative ones remove it.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct StockAdjustmentInput {
    pub product_id: i32,
    pub quantity: f64,
    pub reason: Option<String>,
}
