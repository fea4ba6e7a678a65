use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{customer_balances, customers};

#[derive(
    Queryable,
    Identifiable,
    Associations,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    TS,
)]
#[diesel(belongs_to(crate::models::agent::Agent))]
#[diesel(table_name = customers)]
#[ts(export)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub agent_id: Option<i32>, // Foreign key to Agent
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub agent_id: Option<i32>,
    pub is_active: bool,
}

/// Payload for creating a customer. The balance row is created in the same
/// transaction with the given credit limit and a zero hold.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub agent_id: Option<i32>,
    pub credit_limit: i64, // cents
}

/// Request payload for updating a customer (all fields optional)
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub agent_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Queryable, Insertable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = customer_balances)]
#[ts(export)]
pub struct CustomerBalance {
    pub customer_id: i32,
    pub credit_limit: i64,
    pub hold_balance: i64,
}

/// Balance view returned by the API: limit, hold and the derived headroom.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct BalanceView {
    pub customer_id: i32,
    pub credit_limit: i64,
    pub hold_balance: i64,
    pub available: i64,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CreditLimitInput {
    pub credit_limit: i64,
}
