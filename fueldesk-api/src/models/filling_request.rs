use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{filling_requests, otp_generations};

/// A customer request for fuel at a station.
///
/// Status lifecycle: `Pending` -> `Processing` -> `Completed`, with
/// `Cancelled` reachable from `Pending` and `Processing`. The transition to
/// `Processing` is OTP-gated and reserves `hold_amount` against the
/// customer's credit limit.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = filling_requests)]
#[ts(export)]
pub struct FillingRequest {
    pub id: i32,
    pub customer_id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub unit_price: i64, // cents per unit
    pub status: String,
    #[serde(skip_serializing, default)]
    pub otp: Option<String>,
    #[ts(type = "string | null")]
    #[serde(skip_serializing, default)]
    pub otp_expires_at: Option<NaiveDateTime>,
    pub hold_amount: i64,
    pub created_by: Option<i32>,
    pub processed_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = filling_requests)]
pub struct NewFillingRequest {
    pub customer_id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub unit_price: i64,
    pub status: String,
    pub hold_amount: i64,
    pub created_by: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct FillingRequestInput {
    pub customer_id: i32,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
}

/// OTP submitted when moving a request from Pending to Processing.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ProcessRequestInput {
    pub otp: String,
}

#[derive(Queryable, Identifiable, Debug)]
#[diesel(table_name = otp_generations)]
pub struct OtpGeneration {
    pub id: i32,
    pub request_id: i32,
    pub employee_id: i32,
    pub generated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = otp_generations)]
pub struct NewOtpGeneration {
    pub request_id: i32,
    pub employee_id: i32,
    pub generated_at: NaiveDateTime,
}
