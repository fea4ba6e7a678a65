use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{FillingStation, NewFillingStation, StationInput, UpdateStationRequest};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new filling station.
pub fn insert_station(
    conn: &mut SqliteConnection,
    input: StationInput,
    acting_employee_id: Option<i32>,
) -> Result<FillingStation, diesel::result::Error> {
    use crate::schema::filling_stations::dsl::*;

    let new_station = NewFillingStation {
        name: input.name,
        address: input.address,
        is_active: true,
    };

    diesel::insert_into(filling_stations)
        .values(&new_station)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let station = filling_stations
        .filter(id.eq(last_id as i32))
        .first::<FillingStation>(conn)?;

    log_activity_best_effort(conn, "filling_stations", station.id, "create", acting_employee_id);

    Ok(station)
}

/// Try to find a station by name (case-insensitive).
pub fn get_station_by_name_case_insensitive(
    conn: &mut SqliteConnection,
    station_name: &str,
) -> Result<Option<FillingStation>, diesel::result::Error> {
    diesel::sql_query("SELECT * FROM filling_stations WHERE LOWER(name) = LOWER(?)")
        .bind::<diesel::sql_types::Text, _>(station_name)
        .get_result::<FillingStation>(conn)
        .optional()
}

/// Gets a single station by ID.
pub fn get_station_by_id(
    conn: &mut SqliteConnection,
    station_id: i32,
) -> Result<Option<FillingStation>, diesel::result::Error> {
    use crate::schema::filling_stations::dsl::*;
    filling_stations
        .filter(id.eq(station_id))
        .first::<FillingStation>(conn)
        .optional()
}

/// Returns all stations in ascending order by id.
pub fn get_all_stations(
    conn: &mut SqliteConnection,
) -> Result<Vec<FillingStation>, diesel::result::Error> {
    use crate::schema::filling_stations::dsl::*;
    filling_stations.order(id.asc()).load::<FillingStation>(conn)
}

/// Returns the stations with the given ids, ordered by id.
pub fn get_stations_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> Result<Vec<FillingStation>, diesel::result::Error> {
    use crate::schema::filling_stations::dsl::*;
    filling_stations
        .filter(id.eq_any(ids))
        .order(id.asc())
        .load::<FillingStation>(conn)
}

/// Updates a station's fields. Only provided fields are touched.
pub fn update_station(
    conn: &mut SqliteConnection,
    station_id: i32,
    update: UpdateStationRequest,
    acting_employee_id: Option<i32>,
) -> Result<FillingStation, diesel::result::Error> {
    use crate::schema::filling_stations::dsl::*;

    if let Some(name_val) = update.name {
        diesel::update(filling_stations.filter(id.eq(station_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(address_val) = update.address {
        diesel::update(filling_stations.filter(id.eq(station_id)))
            .set(address.eq(address_val))
            .execute(conn)?;
    }

    if let Some(active_val) = update.is_active {
        diesel::update(filling_stations.filter(id.eq(station_id)))
            .set(is_active.eq(active_val))
            .execute(conn)?;
    }

    log_activity_best_effort(conn, "filling_stations", station_id, "update", acting_employee_id);

    filling_stations
        .filter(id.eq(station_id))
        .first::<FillingStation>(conn)
}
