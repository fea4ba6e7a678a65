use chrono::NaiveDateTime;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{ActivationSummary, DealPrice, DealPriceInput, NewDealPrice};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Schedules a deal price. The row stays `scheduled` until the activation
/// sweep promotes it.
pub fn schedule_deal_price(
    conn: &mut SqliteConnection,
    input: DealPriceInput,
    acting_employee_id: Option<i32>,
) -> Result<DealPrice, diesel::result::Error> {
    use crate::schema::deal_prices::dsl::*;

    let new_price = NewDealPrice {
        station_id: input.station_id,
        product_id: input.product_id,
        customer_id: input.customer_id,
        price: input.price,
        status: "scheduled".to_string(),
        effective_from: input.effective_from,
        activated_at: None,
    };

    diesel::insert_into(deal_prices)
        .values(&new_price)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let price_row = deal_prices
        .filter(id.eq(last_id as i32))
        .first::<DealPrice>(conn)?;

    log_activity_best_effort(conn, "deal_prices", price_row.id, "create", acting_employee_id);

    Ok(price_row)
}

/// Activates every scheduled price whose effective date has arrived.
///
/// For each due row (oldest effective date first) the currently active row
/// for the same (station, product, customer) scope is expired and the due
/// row becomes active. One transaction for the whole sweep, so an external
/// scheduler can re-invoke it safely.
pub fn activate_due_prices(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
    acting_employee_id: Option<i32>,
) -> Result<ActivationSummary, diesel::result::Error> {
    use crate::schema::deal_prices::dsl::*;

    conn.transaction(|conn| {
        let due: Vec<DealPrice> = deal_prices
            .filter(status.eq("scheduled"))
            .filter(effective_from.le(now))
            .order(effective_from.asc())
            .load::<DealPrice>(conn)?;

        let mut activated = 0usize;
        let mut expired = 0usize;

        for row in due {
            // Expire whatever is currently active for the same scope
            expired += match row.customer_id {
                Some(cid) => diesel::update(
                    deal_prices
                        .filter(status.eq("active"))
                        .filter(station_id.eq(row.station_id))
                        .filter(product_id.eq(row.product_id))
                        .filter(customer_id.eq(cid)),
                )
                .set(status.eq("expired"))
                .execute(conn)?,
                None => diesel::update(
                    deal_prices
                        .filter(status.eq("active"))
                        .filter(station_id.eq(row.station_id))
                        .filter(product_id.eq(row.product_id))
                        .filter(customer_id.is_null()),
                )
                .set(status.eq("expired"))
                .execute(conn)?,
            };

            diesel::update(deal_prices.filter(id.eq(row.id)))
                .set((status.eq("active"), activated_at.eq(Some(now))))
                .execute(conn)?;
            activated += 1;

            log_activity_best_effort(conn, "deal_prices", row.id, "activate", acting_employee_id);
        }

        Ok(ActivationSummary { activated, expired })
    })
}

/// Resolves the unit price for a customer at a station.
///
/// A customer-specific active price wins over a station-wide one; within a
/// scope the most recently effective row wins.
pub fn resolve_active_price(
    conn: &mut SqliteConnection,
    target_station_id: i32,
    target_product_id: i32,
    target_customer_id: i32,
) -> Result<Option<i64>, diesel::result::Error> {
    use crate::schema::deal_prices::dsl::*;

    let customer_specific = deal_prices
        .filter(status.eq("active"))
        .filter(station_id.eq(target_station_id))
        .filter(product_id.eq(target_product_id))
        .filter(customer_id.eq(target_customer_id))
        .order(effective_from.desc())
        .first::<DealPrice>(conn)
        .optional()?;

    if let Some(row) = customer_specific {
        return Ok(Some(row.price));
    }

    let station_wide = deal_prices
        .filter(status.eq("active"))
        .filter(station_id.eq(target_station_id))
        .filter(product_id.eq(target_product_id))
        .filter(customer_id.is_null())
        .order(effective_from.desc())
        .first::<DealPrice>(conn)
        .optional()?;

    Ok(station_wide.map(|row| row.price))
}

/// Lists deal prices, newest first, with optional status/station filters.
pub fn list_deal_prices(
    conn: &mut SqliteConnection,
    status_filter: Option<String>,
    station_filter: Option<i32>,
) -> Result<Vec<DealPrice>, diesel::result::Error> {
    use crate::schema::deal_prices::dsl::*;

    let mut query = deal_prices.into_boxed();

    if let Some(status_val) = status_filter {
        query = query.filter(status.eq(status_val));
    }
    if let Some(sid) = station_filter {
        query = query.filter(station_id.eq(sid));
    }

    query.order(id.desc()).load::<DealPrice>(conn)
}
