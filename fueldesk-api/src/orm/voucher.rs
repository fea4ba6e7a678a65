use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{
    NewVoucher, NewVoucherItem, Voucher, VoucherInput, VoucherItem, VoucherWithItems,
};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Failure modes of voucher creation.
#[derive(Debug)]
pub enum VoucherError {
    Db(diesel::result::Error),
    /// Fewer than two line items.
    TooFewItems,
    /// An item has a negative amount, or not exactly one non-zero side.
    InvalidItem,
    /// The debit total does not equal the credit total.
    Unbalanced,
}

impl From<diesel::result::Error> for VoucherError {
    fn from(e: diesel::result::Error) -> Self {
        VoucherError::Db(e)
    }
}

/// Validates the double-entry rules for a set of line items.
fn validate_items(items: &[crate::models::VoucherItemInput]) -> Result<(), VoucherError> {
    if items.len() < 2 {
        return Err(VoucherError::TooFewItems);
    }

    for item in items {
        if item.debit < 0 || item.credit < 0 {
            return Err(VoucherError::InvalidItem);
        }
        // Exactly one side of each line carries an amount
        if (item.debit == 0) == (item.credit == 0) {
            return Err(VoucherError::InvalidItem);
        }
    }

    let debit_total: i64 = items.iter().map(|i| i.debit).sum();
    let credit_total: i64 = items.iter().map(|i| i.credit).sum();
    if debit_total != credit_total {
        return Err(VoucherError::Unbalanced);
    }

    Ok(())
}

/// Creates a voucher with its line items in one transaction.
pub fn create_voucher(
    conn: &mut SqliteConnection,
    input: VoucherInput,
    acting_employee_id: Option<i32>,
) -> Result<VoucherWithItems, VoucherError> {
    use crate::schema::{voucher_items, vouchers::dsl::*};

    validate_items(&input.items)?;

    conn.transaction(|conn| {
        let new_voucher = NewVoucher {
            voucher_no: input.voucher_no,
            voucher_type: input.voucher_type,
            voucher_date: input.voucher_date,
            narration: input.narration,
            created_by: acting_employee_id,
            created_at: None,
        };

        diesel::insert_into(vouchers)
            .values(&new_voucher)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let voucher = vouchers
            .filter(id.eq(last_id as i32))
            .first::<Voucher>(conn)?;

        for item in &input.items {
            diesel::insert_into(voucher_items::table)
                .values(&NewVoucherItem {
                    voucher_id: voucher.id,
                    account: item.account.clone(),
                    debit: item.debit,
                    credit: item.credit,
                })
                .execute(conn)?;
        }

        log_activity_best_effort(conn, "vouchers", voucher.id, "create", acting_employee_id);

        let items = load_items(conn, voucher.id)?;
        Ok(VoucherWithItems { voucher, items })
    })
}

fn load_items(
    conn: &mut SqliteConnection,
    target_voucher_id: i32,
) -> Result<Vec<VoucherItem>, diesel::result::Error> {
    use crate::schema::voucher_items::dsl::*;
    voucher_items
        .filter(voucher_id.eq(target_voucher_id))
        .order(id.asc())
        .load::<VoucherItem>(conn)
}

/// Gets a voucher with its items.
pub fn get_voucher_with_items(
    conn: &mut SqliteConnection,
    target_voucher_id: i32,
) -> Result<Option<VoucherWithItems>, diesel::result::Error> {
    use crate::schema::vouchers::dsl::*;

    let voucher = vouchers
        .filter(id.eq(target_voucher_id))
        .first::<Voucher>(conn)
        .optional()?;

    match voucher {
        Some(voucher) => {
            let items = load_items(conn, voucher.id)?;
            Ok(Some(VoucherWithItems { voucher, items }))
        }
        None => Ok(None),
    }
}

/// Lists vouchers, newest first, optionally filtered by type.
pub fn list_vouchers(
    conn: &mut SqliteConnection,
    type_filter: Option<String>,
) -> Result<Vec<Voucher>, diesel::result::Error> {
    use crate::schema::vouchers::dsl::*;

    let mut query = vouchers.into_boxed();
    if let Some(type_val) = type_filter {
        query = query.filter(voucher_type.eq(type_val));
    }
    query.order(id.desc()).load::<Voucher>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::VoucherItemInput;
    use crate::orm::testing::setup_test_db;

    fn item(account: &str, debit: i64, credit: i64) -> VoucherItemInput {
        VoucherItemInput {
            account: account.to_string(),
            debit,
            credit,
        }
    }

    fn input(no: &str, items: Vec<VoucherItemInput>) -> VoucherInput {
        VoucherInput {
            voucher_no: no.to_string(),
            voucher_type: "journal".to_string(),
            voucher_date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            narration: Some("July adjustments".to_string()),
            items,
        }
    }

    #[test]
    fn test_balanced_voucher_is_created_with_items() {
        let mut conn = setup_test_db();

        let voucher = create_voucher(
            &mut conn,
            input(
                "JV-001",
                vec![
                    item("freight-expense", 12_000, 0),
                    item("payables:transporter", 0, 12_000),
                ],
            ),
            None,
        )
        .expect("create voucher");

        assert_eq!(voucher.items.len(), 2);
        let reloaded = get_voucher_with_items(&mut conn, voucher.voucher.id)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.items.len(), 2);
    }

    #[test]
    fn test_unbalanced_voucher_is_rejected() {
        let mut conn = setup_test_db();

        let result = create_voucher(
            &mut conn,
            input(
                "JV-002",
                vec![
                    item("freight-expense", 12_000, 0),
                    item("payables:transporter", 0, 11_000),
                ],
            ),
            None,
        );
        assert!(matches!(result, Err(VoucherError::Unbalanced)));
        assert!(list_vouchers(&mut conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_item_with_both_sides_is_rejected() {
        let mut conn = setup_test_db();

        let result = create_voucher(
            &mut conn,
            input(
                "JV-003",
                vec![
                    item("freight-expense", 12_000, 12_000),
                    item("payables:transporter", 0, 0),
                ],
            ),
            None,
        );
        assert!(matches!(result, Err(VoucherError::InvalidItem)));
    }

    #[test]
    fn test_single_item_is_rejected() {
        let mut conn = setup_test_db();

        let result = create_voucher(
            &mut conn,
            input("JV-004", vec![item("freight-expense", 12_000, 0)]),
            None,
        );
        assert!(matches!(result, Err(VoucherError::TooFewItems)));
    }
}
