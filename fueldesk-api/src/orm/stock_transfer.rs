use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewStockTransfer, StockTransfer, StockTransferInput};
use crate::orm::audit::log_activity_best_effort;
use crate::orm::stock::{add_stock, deduct_stock};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Failure modes of a stock transfer.
#[derive(Debug)]
pub enum TransferError {
    Db(diesel::result::Error),
    /// Source and destination station are the same.
    SameStation,
    /// Quantity is zero or negative.
    InvalidQuantity,
    /// The source station does not hold enough stock.
    InsufficientStock,
}

impl From<diesel::result::Error> for TransferError {
    fn from(e: diesel::result::Error) -> Self {
        TransferError::Db(e)
    }
}

/// Moves stock between two stations.
///
/// Runs as one transaction: a guarded deduction at the source, a credit at
/// the destination, paired `transfer-out`/`transfer-in` history rows and the
/// transfer record itself. On any failure nothing is persisted.
pub fn transfer_stock(
    conn: &mut SqliteConnection,
    input: StockTransferInput,
    acting_employee_id: Option<i32>,
) -> Result<StockTransfer, TransferError> {
    use crate::schema::stock_transfers::dsl::*;

    if input.from_station_id == input.to_station_id {
        return Err(TransferError::SameStation);
    }
    if input.quantity <= 0.0 {
        return Err(TransferError::InvalidQuantity);
    }

    conn.transaction(|conn| {
        let new_transfer = NewStockTransfer {
            from_station_id: input.from_station_id,
            to_station_id: input.to_station_id,
            product_id: input.product_id,
            quantity: input.quantity,
            note: input.note.clone(),
            transferred_by: acting_employee_id,
            transferred_at: None,
        };

        diesel::insert_into(stock_transfers)
            .values(&new_transfer)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let transfer = stock_transfers
            .filter(id.eq(last_id as i32))
            .first::<StockTransfer>(conn)?;

        let reference = format!("transfer:{}", transfer.id);

        let deducted = deduct_stock(
            conn,
            input.from_station_id,
            input.product_id,
            input.quantity,
            "transfer-out",
            Some(reference.clone()),
            acting_employee_id,
        )?;
        if deducted.is_none() {
            return Err(TransferError::InsufficientStock);
        }

        add_stock(
            conn,
            input.to_station_id,
            input.product_id,
            input.quantity,
            "transfer-in",
            Some(reference),
            acting_employee_id,
        )?;

        log_activity_best_effort(
            conn,
            "stock_transfers",
            transfer.id,
            "create",
            acting_employee_id,
        );

        Ok(transfer)
    })
}

/// Lists transfers, newest first, optionally restricted to transfers that
/// touch one station (as source or destination).
pub fn list_transfers(
    conn: &mut SqliteConnection,
    station_filter: Option<i32>,
) -> Result<Vec<StockTransfer>, diesel::result::Error> {
    use crate::schema::stock_transfers::dsl::*;

    let mut query = stock_transfers.into_boxed();

    if let Some(sid) = station_filter {
        query = query.filter(from_station_id.eq(sid).or(to_station_id.eq(sid)));
    }

    query.order(id.desc()).load::<StockTransfer>(conn)
}
