//! Station stock levels and the filling-history ledger.
//!
//! Every stock mutation in the system funnels through `add_stock` or
//! `deduct_stock` so that each change appends exactly one history row whose
//! `current_stock`/`available_stock` bracket it. History quantities are
//! signed deltas: `available_stock = current_stock + quantity` always holds.

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{FillingHistory, NewFillingHistory, NewStationStock, StationStock};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Returns the stock rows for a station, ordered by product.
pub fn get_station_stocks(
    conn: &mut SqliteConnection,
    target_station_id: i32,
) -> Result<Vec<StationStock>, diesel::result::Error> {
    use crate::schema::station_stocks::dsl::*;
    station_stocks
        .filter(station_id.eq(target_station_id))
        .order(product_id.asc())
        .load::<StationStock>(conn)
}

/// Current stock level for one product at one station; absent row reads as 0.
pub fn get_stock_level(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
) -> Result<f64, diesel::result::Error> {
    use crate::schema::station_stocks::dsl::*;
    let row = station_stocks
        .filter(station_id.eq(target_station_id))
        .filter(product_id.eq(target_product_id))
        .first::<StationStock>(conn)
        .optional()?;
    Ok(row.map(|r| r.stock).unwrap_or(0.0))
}

fn append_history(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
    trans_type_val: &str,
    before: f64,
    delta: f64,
    reference_val: Option<String>,
    employee_id_val: Option<i32>,
) -> Result<FillingHistory, diesel::result::Error> {
    use crate::schema::filling_history::dsl::*;

    let row = NewFillingHistory {
        station_id: target_station_id,
        product_id: target_product_id,
        trans_type: trans_type_val.to_string(),
        current_stock: before,
        quantity: delta,
        available_stock: before + delta,
        reference: reference_val,
        employee_id: employee_id_val,
        recorded_at: None, // Use database default (CURRENT_TIMESTAMP)
    };

    diesel::insert_into(filling_history)
        .values(&row)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    filling_history
        .filter(id.eq(last_id as i32))
        .first::<FillingHistory>(conn)
}

/// Adds stock at a station, creating the stock row on first receipt, and
/// appends the matching history row.
///
/// The quantity must be positive; callers choose the `trans_type`
/// (`purchase`, `transfer-in`, `adjustment`).
pub fn add_stock(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
    qty: f64,
    trans_type_val: &str,
    reference_val: Option<String>,
    employee_id_val: Option<i32>,
) -> Result<FillingHistory, diesel::result::Error> {
    use crate::schema::station_stocks::dsl::*;

    let before = get_stock_level(conn, target_station_id, target_product_id)?;

    let affected = diesel::update(
        station_stocks
            .filter(station_id.eq(target_station_id))
            .filter(product_id.eq(target_product_id)),
    )
    .set(stock.eq(stock + qty))
    .execute(conn)?;

    if affected == 0 {
        diesel::insert_into(station_stocks)
            .values(&NewStationStock {
                station_id: target_station_id,
                product_id: target_product_id,
                stock: qty,
            })
            .execute(conn)?;
    }

    append_history(
        conn,
        target_station_id,
        target_product_id,
        trans_type_val,
        before,
        qty,
        reference_val,
        employee_id_val,
    )
}

/// Deducts stock at a station, appending the matching history row.
///
/// The deduction is a single conditional `UPDATE` guarded by `stock >= qty`;
/// `Ok(None)` means insufficient stock and nothing was written.
pub fn deduct_stock(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
    qty: f64,
    trans_type_val: &str,
    reference_val: Option<String>,
    employee_id_val: Option<i32>,
) -> Result<Option<FillingHistory>, diesel::result::Error> {
    use crate::schema::station_stocks::dsl::*;

    let before = get_stock_level(conn, target_station_id, target_product_id)?;

    let affected = diesel::update(
        station_stocks
            .filter(station_id.eq(target_station_id))
            .filter(product_id.eq(target_product_id))
            .filter(stock.ge(qty)),
    )
    .set(stock.eq(stock - qty))
    .execute(conn)?;

    if affected == 0 {
        return Ok(None);
    }

    append_history(
        conn,
        target_station_id,
        target_product_id,
        trans_type_val,
        before,
        -qty,
        reference_val,
        employee_id_val,
    )
    .map(Some)
}

/// Manual stock adjustment. Positive quantities add, negative ones remove
/// (guarded against going below zero).
pub fn adjust_stock(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
    qty: f64,
    reference_val: Option<String>,
    employee_id_val: Option<i32>,
) -> Result<Option<FillingHistory>, diesel::result::Error> {
    if qty >= 0.0 {
        add_stock(
            conn,
            target_station_id,
            target_product_id,
            qty,
            "adjustment",
            reference_val,
            employee_id_val,
        )
        .map(Some)
    } else {
        deduct_stock(
            conn,
            target_station_id,
            target_product_id,
            -qty,
            "adjustment",
            reference_val,
            employee_id_val,
        )
    }
}

/// Filling history for a station, newest first, optionally narrowed to one
/// product.
pub fn get_station_history(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    product_filter: Option<i32>,
) -> Result<Vec<FillingHistory>, diesel::result::Error> {
    use crate::schema::filling_history::dsl::*;

    let mut query = filling_history
        .filter(station_id.eq(target_station_id))
        .into_boxed();

    if let Some(pid) = product_filter {
        query = query.filter(product_id.eq(pid));
    }

    query
        .order(id.desc())
        .load::<FillingHistory>(conn)
}
