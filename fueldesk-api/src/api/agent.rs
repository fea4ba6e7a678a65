//! API endpoints for commission agent management.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{Agent, AgentInput, UpdateAgentRequest};
use crate::orm::DbConn;
use crate::orm::agent::{get_agent_by_id, get_all_agents, insert_agent, update_agent};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Agent endpoint.
///
/// - **URL:** `/api/1/agents`
/// - **Method:** `POST`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[post("/1/agents", data = "<new_agent>")]
pub async fn create_agent(
    db: DbConn,
    new_agent: LoggedJson<AgentInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<Agent>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to create agents".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = new_agent.into_inner();

    db.run(move |conn| {
        insert_agent(conn, input, Some(acting_id))
            .map(|agent| status::Created::new("/").body(Json(agent)))
            .map_err(|e| {
                error!("Error creating agent: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating agent".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// List Agents endpoint.
///
/// - **URL:** `/api/1/agents`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/agents")]
pub async fn list_agents(
    db: DbConn,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Agent>>, Status> {
    db.run(|conn| {
        get_all_agents(conn)
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Agent endpoint.
///
/// - **URL:** `/api/1/agents/<agent_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/agents/<agent_id>")]
pub async fn get_agent_endpoint(
    db: DbConn,
    agent_id: i32,
    _auth_user: AuthenticatedUser,
) -> Result<Json<Agent>, Status> {
    db.run(move |conn| match get_agent_by_id(conn, agent_id) {
        Ok(Some(agent)) => Ok(Json(agent)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Update Agent endpoint.
///
/// - **URL:** `/api/1/agents/<agent_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[put("/1/agents/<agent_id>", data = "<update>")]
pub async fn update_agent_endpoint(
    db: DbConn,
    agent_id: i32,
    update: LoggedJson<UpdateAgentRequest>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Agent>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;
    let update = update.into_inner();

    db.run(move |conn| {
        if get_agent_by_id(conn, agent_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }

        update_agent(conn, agent_id, update, Some(acting_id))
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![create_agent, list_agents, get_agent_endpoint, update_agent_endpoint]
}
