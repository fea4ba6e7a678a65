use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::deal_prices;

/// A negotiated price for a product at a station, optionally scoped to a
/// single customer. Rows start `scheduled` and are flipped to `active` by
/// the activation sweep once `effective_from` arrives; the previously
/// active row for the same scope is marked `expired`.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = deal_prices)]
#[ts(export)]
pub struct DealPrice {
    pub id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub customer_id: Option<i32>,
    pub price: i64, // cents per unit
    pub status: String, // scheduled | active | expired
    #[ts(type = "string")]
    pub effective_from: NaiveDateTime,
    #[ts(type = "string | null")]
    pub activated_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = deal_prices)]
pub struct NewDealPrice {
    pub station_id: i32,
    pub product_id: i32,
    pub customer_id: Option<i32>,
    pub price: i64,
    pub status: String,
    pub effective_from: NaiveDateTime,
    pub activated_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct DealPriceInput {
    pub station_id: i32,
    pub product_id: i32,
    pub customer_id: Option<i32>,
    pub price: i64,
    #[ts(type = "string")]
    pub effective_from: NaiveDateTime,
}

/// Result of an activation sweep.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ActivationSummary {
    pub activated: usize,
    pub expired: usize,
}
