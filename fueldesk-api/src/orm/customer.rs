use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{Customer, CustomerBalance, CustomerInput, NewCustomer, UpdateCustomerRequest};
use crate::orm::audit::log_activity_best_effort;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new customer together with its balance row.
///
/// The balance starts with the requested credit limit and a zero hold. Both
/// inserts run in one transaction so a customer can never exist without a
/// balance row.
pub fn insert_customer(
    conn: &mut SqliteConnection,
    input: CustomerInput,
    acting_employee_id: Option<i32>,
) -> Result<Customer, diesel::result::Error> {
    use crate::schema::{customer_balances, customers::dsl::*};

    conn.transaction(|conn| {
        let new_customer = NewCustomer {
            name: input.name,
            contact_person: input.contact_person,
            phone: input.phone,
            agent_id: input.agent_id,
            is_active: true,
        };

        diesel::insert_into(customers)
            .values(&new_customer)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let customer = customers
            .filter(id.eq(last_id as i32))
            .first::<Customer>(conn)?;

        diesel::insert_into(customer_balances::table)
            .values(&CustomerBalance {
                customer_id: customer.id,
                credit_limit: input.credit_limit,
                hold_balance: 0,
            })
            .execute(conn)?;

        log_activity_best_effort(conn, "customers", customer.id, "create", acting_employee_id);

        Ok(customer)
    })
}

/// Gets a single customer by ID.
pub fn get_customer_by_id(
    conn: &mut SqliteConnection,
    customer_id: i32,
) -> Result<Option<Customer>, diesel::result::Error> {
    use crate::schema::customers::dsl::*;
    customers
        .filter(id.eq(customer_id))
        .first::<Customer>(conn)
        .optional()
}

/// Returns all customers in ascending order by id.
pub fn get_all_customers(
    conn: &mut SqliteConnection,
) -> Result<Vec<Customer>, diesel::result::Error> {
    use crate::schema::customers::dsl::*;
    customers.order(id.asc()).load::<Customer>(conn)
}

/// Returns customers brought in by a specific agent.
pub fn get_customers_by_agent(
    conn: &mut SqliteConnection,
    target_agent_id: i32,
) -> Result<Vec<Customer>, diesel::result::Error> {
    use crate::schema::customers::dsl::*;
    customers
        .filter(agent_id.eq(target_agent_id))
        .order(id.asc())
        .load::<Customer>(conn)
}

/// Updates a customer's fields. Only provided fields are touched.
pub fn update_customer(
    conn: &mut SqliteConnection,
    customer_id: i32,
    update: UpdateCustomerRequest,
    acting_employee_id: Option<i32>,
) -> Result<Customer, diesel::result::Error> {
    use crate::schema::customers::dsl::*;

    if let Some(name_val) = update.name {
        diesel::update(customers.filter(id.eq(customer_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(contact_val) = update.contact_person {
        diesel::update(customers.filter(id.eq(customer_id)))
            .set(contact_person.eq(contact_val))
            .execute(conn)?;
    }

    if let Some(phone_val) = update.phone {
        diesel::update(customers.filter(id.eq(customer_id)))
            .set(phone.eq(phone_val))
            .execute(conn)?;
    }

    if let Some(agent_val) = update.agent_id {
        diesel::update(customers.filter(id.eq(customer_id)))
            .set(agent_id.eq(agent_val))
            .execute(conn)?;
    }

    if let Some(active_val) = update.is_active {
        diesel::update(customers.filter(id.eq(customer_id)))
            .set(is_active.eq(active_val))
            .execute(conn)?;
    }

    log_activity_best_effort(conn, "customers", customer_id, "update", acting_employee_id);

    customers
        .filter(id.eq(customer_id))
        .first::<Customer>(conn)
}

/// Sets a customer's credit limit.
///
/// The new limit may not undercut the amount currently on hold; the guard is
/// part of the `UPDATE` itself, so a concurrent reservation cannot slip the
/// limit below the hold. Returns `Ok(false)` when the guard rejects the
/// change or the customer has no balance row.
pub fn set_credit_limit(
    conn: &mut SqliteConnection,
    target_customer_id: i32,
    new_limit: i64,
    acting_employee_id: Option<i32>,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::customer_balances::dsl::*;

    let affected = diesel::update(
        customer_balances
            .filter(customer_id.eq(target_customer_id))
            .filter(hold_balance.le(new_limit)),
    )
    .set(credit_limit.eq(new_limit))
    .execute(conn)?;

    if affected == 1 {
        log_activity_best_effort(
            conn,
            "customer_balances",
            target_customer_id,
            "update",
            acting_employee_id,
        );
    }

    Ok(affected == 1)
}
