use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::products;

#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = products)]
#[ts(export)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub code: String, // Will be unique
    pub category: String, // "fuel" or "lubricant"
    pub unit: String, // e.g. "litre"
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub code: String,
    pub category: String,
    pub unit: String,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub code: String,
    pub category: String,
    pub unit: String,
}

/// Request payload for updating a product (all fields optional)
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
}
