use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Agent, AgentInput, NewAgent, UpdateAgentRequest};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new agent.
pub fn insert_agent(
    conn: &mut SqliteConnection,
    input: AgentInput,
    acting_employee_id: Option<i32>,
) -> Result<Agent, diesel::result::Error> {
    use crate::schema::agents::dsl::*;

    let new_agent = NewAgent {
        name: input.name,
        phone: input.phone,
        commission_rate_bps: input.commission_rate_bps.unwrap_or(0),
        is_active: true,
    };

    diesel::insert_into(agents).values(&new_agent).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let agent = agents.filter(id.eq(last_id as i32)).first::<Agent>(conn)?;

    log_activity_best_effort(conn, "agents", agent.id, "create", acting_employee_id);

    Ok(agent)
}

/// Gets a single agent by ID.
pub fn get_agent_by_id(
    conn: &mut SqliteConnection,
    agent_id: i32,
) -> Result<Option<Agent>, diesel::result::Error> {
    use crate::schema::agents::dsl::*;
    agents.filter(id.eq(agent_id)).first::<Agent>(conn).optional()
}

/// Returns all agents in ascending order by id.
pub fn get_all_agents(conn: &mut SqliteConnection) -> Result<Vec<Agent>, diesel::result::Error> {
    use crate::schema::agents::dsl::*;
    agents.order(id.asc()).load::<Agent>(conn)
}

/// Updates an agent's fields. Only provided fields are touched.
pub fn update_agent(
    conn: &mut SqliteConnection,
    agent_id: i32,
    update: UpdateAgentRequest,
    acting_employee_id: Option<i32>,
) -> Result<Agent, diesel::result::Error> {
    use crate::schema::agents::dsl::*;

    if let Some(name_val) = update.name {
        diesel::update(agents.filter(id.eq(agent_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(phone_val) = update.phone {
        diesel::update(agents.filter(id.eq(agent_id)))
            .set(phone.eq(phone_val))
            .execute(conn)?;
    }

    if let Some(rate_val) = update.commission_rate_bps {
        diesel::update(agents.filter(id.eq(agent_id)))
            .set(commission_rate_bps.eq(rate_val))
            .execute(conn)?;
    }

    if let Some(active_val) = update.is_active {
        diesel::update(agents.filter(id.eq(agent_id)))
            .set(is_active.eq(active_val))
            .execute(conn)?;
    }

    log_activity_best_effort(conn, "agents", agent_id, "update", acting_employee_id);

    agents.filter(id.eq(agent_id)).first::<Agent>(conn)
}
