use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::agents;

/// A commission agent who brings customers to the distributor.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = agents)]
#[ts(export)]
pub struct Agent {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub commission_rate_bps: i32, // basis points, 100 = 1%
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = agents)]
pub struct NewAgent {
    pub name: String,
    pub phone: Option<String>,
    pub commission_rate_bps: i32,
    pub is_active: bool,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct AgentInput {
    pub name: String,
    pub phone: Option<String>,
    pub commission_rate_bps: Option<i32>,
}

/// Request payload for updating an agent (all fields optional)
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub commission_rate_bps: Option<i32>,
    pub is_active: Option<bool>,
}
