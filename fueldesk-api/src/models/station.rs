use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::filling_stations;

#[derive(
    Queryable,
    Identifiable,
    QueryableByName,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    TS,
)]
#[diesel(table_name = filling_stations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct FillingStation {
    pub id: i32,
    pub name: String, // Will be unique
    pub address: String,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = filling_stations)]
pub struct NewFillingStation {
    pub name: String,
    pub address: String,
    pub is_active: bool,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct StationInput {
    pub name: String,
    pub address: String,
}

/// Request payload for updating a station (all fields optional)
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateStationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}
