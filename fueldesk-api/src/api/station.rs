//! API endpoints for filling station management.
//!
//! # Authorization Rules
//! - `admin` creates and updates stations
//! - `admin` and `accounts` see every station; other employees only the
//!   stations they are assigned to

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{FillingStation, StationInput, UpdateStationRequest};
use crate::orm::DbConn;
use crate::orm::station::{
    get_all_stations, get_station_by_id, get_station_by_name_case_insensitive,
    get_stations_by_ids, insert_station, update_station,
};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create Station endpoint.
///
/// - **URL:** `/api/1/stations`
/// - **Method:** `POST`
/// - **Authentication:** Required
/// - **Authorization:** `admin`
///
/// **Failure (HTTP 409 Conflict):** a station with the same name exists.
#[post("/1/stations", data = "<new_station>")]
pub async fn create_station(
    db: DbConn,
    new_station: LoggedJson<StationInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<FillingStation>>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_role("admin") {
        let err = Json(ErrorResponse {
            error: "Forbidden: only admin can create stations".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = new_station.into_inner();

    db.run(move |conn| {
        match get_station_by_name_case_insensitive(conn, &input.name) {
            Ok(Some(_existing)) => {
                let err = Json(ErrorResponse {
                    error: format!("Station with name '{}' already exists", input.name),
                });
                return Err(response::status::Custom(Status::Conflict, err));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error checking for existing station: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while checking for existing station".to_string(),
                });
                return Err(response::status::Custom(Status::InternalServerError, err));
            }
        }

        insert_station(conn, input, Some(acting_id))
            .map(|station| status::Created::new("/").body(Json(station)))
            .map_err(|e| {
                error!("Error creating station: {:?}", e);
                let err = Json(ErrorResponse {
                    error: "Database error while creating station".to_string(),
                });
                response::status::Custom(Status::InternalServerError, err)
            })
    })
    .await
}

/// List Stations endpoint.
///
/// - **URL:** `/api/1/stations`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin`/`accounts` see all stations, everyone else
///   their assigned ones
#[get("/1/stations")]
pub async fn list_stations(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<FillingStation>>, Status> {
    let sees_all = auth_user.has_any_role(&["admin", "accounts"]);
    let assigned = auth_user.station_ids.clone();

    db.run(move |conn| {
        let stations = if sees_all {
            get_all_stations(conn)
        } else {
            get_stations_by_ids(conn, &assigned)
        };
        stations.map(Json).map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Station endpoint.
///
/// - **URL:** `/api/1/stations/<station_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** station access (assignment or `admin`/`accounts`)
#[get("/1/stations/<station_id>")]
pub async fn get_station_endpoint(
    db: DbConn,
    station_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingStation>, Status> {
    if !auth_user.can_access_station(station_id) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| match get_station_by_id(conn, station_id) {
        Ok(Some(station)) => Ok(Json(station)),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Update Station endpoint.
///
/// - **URL:** `/api/1/stations/<station_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Required
/// - **Authorization:** `admin`
#[put("/1/stations/<station_id>", data = "<update>")]
pub async fn update_station_endpoint(
    db: DbConn,
    station_id: i32,
    update: LoggedJson<UpdateStationRequest>,
    auth_user: AuthenticatedUser,
) -> Result<Json<FillingStation>, Status> {
    if !auth_user.has_role("admin") {
        return Err(Status::Forbidden);
    }

    let acting_id = auth_user.employee.id;
    let update = update.into_inner();

    db.run(move |conn| {
        if get_station_by_id(conn, station_id)
            .map_err(|_| Status::InternalServerError)?
            .is_none()
        {
            return Err(Status::NotFound);
        }

        update_station(conn, station_id, update, Some(acting_id))
            .map(Json)
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_station,
        list_stations,
        get_station_endpoint,
        update_station_endpoint
    ]
}
