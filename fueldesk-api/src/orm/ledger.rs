//! Customer credit ledger operations.
//!
//! The hold balance is the portion of a customer's credit limit reserved
//! against in-flight filling requests. Both mutations here are single
//! conditional `UPDATE` statements: the affected-row count is the success
//! signal, and the database's row-level atomicity makes the check-then-act
//! safe under concurrent requests.

use diesel::prelude::*;

use crate::models::CustomerBalance;
use crate::schema::customer_balances::dsl::*;

/// Reserves `amount` cents of the customer's credit.
///
/// Succeeds only while `credit_limit - hold_balance >= amount`; otherwise no
/// row is updated and `Ok(false)` is returned.
pub fn reserve_hold(
    conn: &mut SqliteConnection,
    target_customer_id: i32,
    amount: i64,
) -> Result<bool, diesel::result::Error> {
    let affected = diesel::update(
        customer_balances
            .filter(customer_id.eq(target_customer_id))
            .filter((credit_limit - hold_balance).ge(amount)),
    )
    .set(hold_balance.eq(hold_balance + amount))
    .execute(conn)?;

    Ok(affected == 1)
}

/// Releases a previously reserved hold.
///
/// Guarded so the hold can never go negative; releasing more than is held
/// returns `Ok(false)` and changes nothing.
pub fn release_hold(
    conn: &mut SqliteConnection,
    target_customer_id: i32,
    amount: i64,
) -> Result<bool, diesel::result::Error> {
    let affected = diesel::update(
        customer_balances
            .filter(customer_id.eq(target_customer_id))
            .filter(hold_balance.ge(amount)),
    )
    .set(hold_balance.eq(hold_balance - amount))
    .execute(conn)?;

    Ok(affected == 1)
}

/// Fetches the balance row for a customer.
pub fn get_balance(
    conn: &mut SqliteConnection,
    target_customer_id: i32,
) -> Result<Option<CustomerBalance>, diesel::result::Error> {
    customer_balances
        .filter(customer_id.eq(target_customer_id))
        .first::<CustomerBalance>(conn)
        .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerInput;
    use crate::orm::customer::insert_customer;
    use crate::orm::testing::setup_test_db;

    fn customer_with_limit(conn: &mut SqliteConnection, limit: i64) -> i32 {
        insert_customer(
            conn,
            CustomerInput {
                name: "Ledger Test Co".to_string(),
                contact_person: None,
                phone: None,
                agent_id: None,
                credit_limit: limit,
            },
            None,
        )
        .expect("insert customer")
        .id
    }

    #[test]
    fn test_reserve_within_limit() {
        let mut conn = setup_test_db();
        let cid = customer_with_limit(&mut conn, 100_000);

        assert!(reserve_hold(&mut conn, cid, 60_000).unwrap());
        let balance = get_balance(&mut conn, cid).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 60_000);
        assert_eq!(balance.credit_limit, 100_000);
    }

    #[test]
    fn test_reserve_beyond_available_fails() {
        let mut conn = setup_test_db();
        let cid = customer_with_limit(&mut conn, 100_000);

        assert!(reserve_hold(&mut conn, cid, 60_000).unwrap());
        // 40_000 available, 50_000 requested: zero rows affected
        assert!(!reserve_hold(&mut conn, cid, 50_000).unwrap());

        let balance = get_balance(&mut conn, cid).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 60_000);
    }

    #[test]
    fn test_reserve_exactly_available_succeeds() {
        let mut conn = setup_test_db();
        let cid = customer_with_limit(&mut conn, 100_000);

        assert!(reserve_hold(&mut conn, cid, 100_000).unwrap());
        let balance = get_balance(&mut conn, cid).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 100_000);
    }

    #[test]
    fn test_release_never_goes_negative() {
        let mut conn = setup_test_db();
        let cid = customer_with_limit(&mut conn, 100_000);

        reserve_hold(&mut conn, cid, 30_000).unwrap();
        assert!(!release_hold(&mut conn, cid, 40_000).unwrap());
        assert!(release_hold(&mut conn, cid, 30_000).unwrap());

        let balance = get_balance(&mut conn, cid).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 0);
    }

    #[test]
    fn test_unknown_customer_reserve_is_noop() {
        let mut conn = setup_test_db();
        assert!(!reserve_hold(&mut conn, 424242, 1).unwrap());
    }
}
