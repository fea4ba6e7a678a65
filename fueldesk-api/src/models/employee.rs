use diesel::{Identifiable, Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Role;
use crate::schema::employees;

#[derive(Deserialize, Queryable, Identifiable, QueryableByName, Debug, Clone, Serialize, TS)]
#[diesel(table_name = employees)]
#[ts(export)]
pub struct Employee {
    pub id: i32,
    pub email: String, // Will be unique
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = employees)]
pub struct NewEmployee {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

/// Payload for creating an employee through the API. The plain-text password
/// is hashed before it touches the database; roles and station assignments
/// are applied in the same transaction as the insert.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct EmployeeInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_names: Vec<String>,
    pub station_ids: Vec<i32>,
}

/// Request payload for updating an employee (all fields optional)
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateEmployeeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub role_names: Option<Vec<String>>,
    pub station_ids: Option<Vec<i32>>,
}

#[derive(Deserialize, Debug, Serialize, TS)]
#[ts(export)]
pub struct EmployeeWithRoles {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub roles: Vec<Role>,
    pub station_ids: Vec<i32>,
}
