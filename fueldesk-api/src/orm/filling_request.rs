//! The filling-request lifecycle, including the OTP gate.
//!
//! A request is created `Pending` with a credit hold amount computed from
//! the active deal price. Moving it to `Processing` requires a one-time
//! code: an employee generates an OTP (rate limited), the customer reads it
//! back, and on a successful match the hold is reserved against the
//! customer's credit limit in the same transaction that flips the status.
//! Completion debits station stock and releases the hold; cancellation
//! releases the hold without touching stock.

use chrono::{Duration, NaiveDateTime};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use rand::Rng;

use crate::models::{FillingRequest, FillingRequestInput, NewFillingRequest, NewOtpGeneration};
use crate::orm::audit::log_activity_best_effort;
use crate::orm::deal_price::resolve_active_price;
use crate::orm::ledger::{release_hold, reserve_hold};
use crate::orm::stock::deduct_stock;

/// Codes are valid this long, and the issuance window is the same length.
const OTP_TTL_MINUTES: i64 = 10;
/// Maximum codes issued per (request, employee) pair within the window.
const OTP_MAX_PER_WINDOW: i64 = 5;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Failure modes of the request flow, mapped to HTTP statuses at the API
/// layer.
#[derive(Debug)]
pub enum RequestFlowError {
    Db(diesel::result::Error),
    NotFound,
    /// Quantity is zero or negative.
    InvalidQuantity,
    /// No active deal price covers this customer/station/product.
    NoActivePrice,
    /// The request is not in a status that allows the attempted operation.
    InvalidStatus(String),
    /// OTP issuance limit reached for this request and employee.
    RateLimited,
    /// No OTP outstanding, or the submitted code does not match.
    OtpMismatch,
    /// The stored OTP has expired.
    OtpExpired,
    /// `credit_limit - hold_balance` is smaller than the hold amount.
    InsufficientCredit,
    /// The station does not hold enough stock to complete the request.
    InsufficientStock,
}

impl From<diesel::result::Error> for RequestFlowError {
    fn from(e: diesel::result::Error) -> Self {
        RequestFlowError::Db(e)
    }
}

/// Creates a `Pending` request, pricing it from the active deal price.
pub fn create_request(
    conn: &mut SqliteConnection,
    input: FillingRequestInput,
    acting_employee_id: Option<i32>,
) -> Result<FillingRequest, RequestFlowError> {
    use crate::schema::filling_requests::dsl::*;

    if input.quantity <= 0.0 {
        return Err(RequestFlowError::InvalidQuantity);
    }

    conn.transaction(|conn| {
        let price = resolve_active_price(conn, input.station_id, input.product_id, input.customer_id)?
            .ok_or(RequestFlowError::NoActivePrice)?;

        let hold = (input.quantity * price as f64).round() as i64;

        let new_request = NewFillingRequest {
            customer_id: input.customer_id,
            station_id: input.station_id,
            product_id: input.product_id,
            quantity: input.quantity,
            unit_price: price,
            status: "Pending".to_string(),
            hold_amount: hold,
            created_by: acting_employee_id,
            created_at: None,
        };

        diesel::insert_into(filling_requests)
            .values(&new_request)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let request = filling_requests
            .filter(id.eq(last_id as i32))
            .first::<FillingRequest>(conn)?;

        log_activity_best_effort(conn, "filling_requests", request.id, "create", acting_employee_id);

        Ok(request)
    })
}

/// Gets a single request by ID.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i32,
) -> Result<Option<FillingRequest>, diesel::result::Error> {
    use crate::schema::filling_requests::dsl::*;
    filling_requests
        .filter(id.eq(request_id))
        .first::<FillingRequest>(conn)
        .optional()
}

/// Lists requests, newest first, with optional filters.
pub fn list_requests(
    conn: &mut SqliteConnection,
    status_filter: Option<String>,
    customer_filter: Option<i32>,
    station_filter: Option<i32>,
) -> Result<Vec<FillingRequest>, diesel::result::Error> {
    use crate::schema::filling_requests::dsl::*;

    let mut query = filling_requests.into_boxed();

    if let Some(status_val) = status_filter {
        query = query.filter(status.eq(status_val));
    }
    if let Some(cid) = customer_filter {
        query = query.filter(customer_id.eq(cid));
    }
    if let Some(sid) = station_filter {
        query = query.filter(station_id.eq(sid));
    }

    query.order(id.desc()).load::<FillingRequest>(conn)
}

/// Counts OTP issuances for a (request, employee) pair since `cutoff`.
fn count_recent_generations(
    conn: &mut SqliteConnection,
    target_request_id: i32,
    target_employee_id: i32,
    cutoff: NaiveDateTime,
) -> Result<i64, diesel::result::Error> {
    use crate::schema::otp_generations::dsl::*;

    otp_generations
        .filter(request_id.eq(target_request_id))
        .filter(employee_id.eq(target_employee_id))
        .filter(generated_at.gt(cutoff))
        .count()
        .get_result::<i64>(conn)
}

/// Generates a fresh 6-digit OTP for a `Pending` request.
///
/// Issuance is limited to 5 codes per 10 minutes per (request, employee)
/// pair; each successful generation replaces the stored code and pushes the
/// expiry out to 10 minutes from `now`.
pub fn generate_otp(
    conn: &mut SqliteConnection,
    target_request_id: i32,
    target_employee_id: i32,
    now: NaiveDateTime,
) -> Result<String, RequestFlowError> {
    use crate::schema::filling_requests::dsl::*;

    conn.transaction(|conn| {
        let request = get_request(conn, target_request_id)?
            .ok_or(RequestFlowError::NotFound)?;

        if request.status != "Pending" {
            return Err(RequestFlowError::InvalidStatus(request.status));
        }

        let cutoff = now - Duration::minutes(OTP_TTL_MINUTES);
        let recent = count_recent_generations(conn, target_request_id, target_employee_id, cutoff)?;
        if recent >= OTP_MAX_PER_WINDOW {
            return Err(RequestFlowError::RateLimited);
        }

        let code = format!("{:06}", rand::rng().random_range(0..=999_999u32));
        let expires = now + Duration::minutes(OTP_TTL_MINUTES);

        diesel::update(filling_requests.filter(id.eq(target_request_id)))
            .set((otp.eq(Some(code.clone())), otp_expires_at.eq(Some(expires))))
            .execute(conn)?;

        diesel::insert_into(crate::schema::otp_generations::table)
            .values(&NewOtpGeneration {
                request_id: target_request_id,
                employee_id: target_employee_id,
                generated_at: now,
            })
            .execute(conn)?;

        log_activity_best_effort(
            conn,
            "filling_requests",
            target_request_id,
            "otp",
            Some(target_employee_id),
        );

        Ok(code)
    })
}

/// Verifies the submitted OTP and moves the request to `Processing`.
///
/// On a match, one conditional `UPDATE` reserves the hold amount against
/// the customer's credit (`credit_limit - hold_balance >= hold_amount`);
/// zero affected rows means insufficient credit and the transaction rolls
/// back with nothing written.
pub fn process_request(
    conn: &mut SqliteConnection,
    target_request_id: i32,
    submitted_otp: &str,
    target_employee_id: i32,
    now: NaiveDateTime,
) -> Result<FillingRequest, RequestFlowError> {
    use crate::schema::filling_requests::dsl::*;

    conn.transaction(|conn| {
        let request = get_request(conn, target_request_id)?
            .ok_or(RequestFlowError::NotFound)?;

        if request.status != "Pending" {
            return Err(RequestFlowError::InvalidStatus(request.status));
        }

        let stored = request.otp.as_deref().ok_or(RequestFlowError::OtpMismatch)?;
        if stored != submitted_otp {
            return Err(RequestFlowError::OtpMismatch);
        }
        match request.otp_expires_at {
            Some(expiry) if expiry > now => {}
            _ => return Err(RequestFlowError::OtpExpired),
        }

        if !reserve_hold(conn, request.customer_id, request.hold_amount)? {
            return Err(RequestFlowError::InsufficientCredit);
        }

        diesel::update(filling_requests.filter(id.eq(target_request_id)))
            .set((
                status.eq("Processing"),
                otp.eq(None::<String>),
                otp_expires_at.eq(None::<NaiveDateTime>),
                processed_by.eq(Some(target_employee_id)),
            ))
            .execute(conn)?;

        log_activity_best_effort(
            conn,
            "filling_requests",
            target_request_id,
            "process",
            Some(target_employee_id),
        );

        get_request(conn, target_request_id)?.ok_or(RequestFlowError::NotFound)
    })
}

/// Completes a `Processing` request: debits station stock with a `filling`
/// history row and releases the credit hold.
pub fn complete_request(
    conn: &mut SqliteConnection,
    target_request_id: i32,
    target_employee_id: i32,
) -> Result<FillingRequest, RequestFlowError> {
    use crate::schema::filling_requests::dsl::*;

    conn.transaction(|conn| {
        let request = get_request(conn, target_request_id)?
            .ok_or(RequestFlowError::NotFound)?;

        if request.status != "Processing" {
            return Err(RequestFlowError::InvalidStatus(request.status));
        }

        let deducted = deduct_stock(
            conn,
            request.station_id,
            request.product_id,
            request.quantity,
            "filling",
            Some(format!("request:{}", request.id)),
            Some(target_employee_id),
        )?;
        if deducted.is_none() {
            return Err(RequestFlowError::InsufficientStock);
        }

        release_hold(conn, request.customer_id, request.hold_amount)?;

        diesel::update(filling_requests.filter(id.eq(target_request_id)))
            .set(status.eq("Completed"))
            .execute(conn)?;

        log_activity_best_effort(
            conn,
            "filling_requests",
            target_request_id,
            "complete",
            Some(target_employee_id),
        );

        get_request(conn, target_request_id)?.ok_or(RequestFlowError::NotFound)
    })
}

/// Cancels a `Pending` or `Processing` request, releasing any hold.
pub fn cancel_request(
    conn: &mut SqliteConnection,
    target_request_id: i32,
    target_employee_id: i32,
) -> Result<FillingRequest, RequestFlowError> {
    use crate::schema::filling_requests::dsl::*;

    conn.transaction(|conn| {
        let request = get_request(conn, target_request_id)?
            .ok_or(RequestFlowError::NotFound)?;

        match request.status.as_str() {
            "Pending" => {}
            "Processing" => {
                release_hold(conn, request.customer_id, request.hold_amount)?;
            }
            _ => return Err(RequestFlowError::InvalidStatus(request.status)),
        }

        diesel::update(filling_requests.filter(id.eq(target_request_id)))
            .set((
                status.eq("Cancelled"),
                otp.eq(None::<String>),
                otp_expires_at.eq(None::<NaiveDateTime>),
            ))
            .execute(conn)?;

        log_activity_best_effort(
            conn,
            "filling_requests",
            target_request_id,
            "cancel",
            Some(target_employee_id),
        );

        get_request(conn, target_request_id)?.ok_or(RequestFlowError::NotFound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{CustomerInput, DealPriceInput, ProductInput, StationInput};
    use crate::orm::customer::insert_customer;
    use crate::orm::deal_price::{activate_due_prices, schedule_deal_price};
    use crate::orm::employee::insert_employee;
    use crate::orm::ledger::get_balance;
    use crate::orm::product::insert_product;
    use crate::orm::station::insert_station;
    use crate::orm::stock::{add_stock, get_stock_level};
    use crate::orm::testing::setup_test_db;

    struct Fixture {
        station_id: i32,
        product_id: i32,
        customer_id: i32,
        employee_id: i32,
    }

    /// Station + product + customer (limit 1,000,000) + an active deal price
    /// of 200 cents/litre + an employee.
    fn fixture(conn: &mut SqliteConnection) -> Fixture {
        let station = insert_station(
            conn,
            StationInput {
                name: "Flow Test Station".to_string(),
                address: "GT Road".to_string(),
            },
            None,
        )
        .unwrap();
        let product = insert_product(
            conn,
            ProductInput {
                name: "Hi-Speed Diesel".to_string(),
                code: "HSD".to_string(),
                category: "fuel".to_string(),
                unit: "litre".to_string(),
            },
            None,
        )
        .unwrap();
        let customer = insert_customer(
            conn,
            CustomerInput {
                name: "Flow Test Co".to_string(),
                contact_person: None,
                phone: None,
                agent_id: None,
                credit_limit: 1_000_000,
            },
            None,
        )
        .unwrap();
        let employee = insert_employee(
            conn,
            crate::models::EmployeeInput {
                email: "flow@fueldesk.example".to_string(),
                password: "pw".to_string(),
                full_name: "Flow Tester".to_string(),
                phone: None,
                role_names: vec![],
                station_ids: vec![],
            },
            None,
        )
        .unwrap();

        let now = Utc::now().naive_utc();
        schedule_deal_price(
            conn,
            DealPriceInput {
                station_id: station.id,
                product_id: product.id,
                customer_id: None,
                price: 200,
                effective_from: now - Duration::hours(1),
            },
            None,
        )
        .unwrap();
        activate_due_prices(conn, now, None).unwrap();

        Fixture {
            station_id: station.id,
            product_id: product.id,
            customer_id: customer.id,
            employee_id: employee.id,
        }
    }

    fn make_request(conn: &mut SqliteConnection, f: &Fixture, qty: f64) -> FillingRequest {
        create_request(
            conn,
            FillingRequestInput {
                customer_id: f.customer_id,
                station_id: f.station_id,
                product_id: f.product_id,
                quantity: qty,
            },
            Some(f.employee_id),
        )
        .expect("create request")
    }

    #[test]
    fn test_create_request_prices_from_active_deal() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);

        let request = make_request(&mut conn, &f, 100.0);
        assert_eq!(request.status, "Pending");
        assert_eq!(request.unit_price, 200);
        assert_eq!(request.hold_amount, 20_000);
    }

    #[test]
    fn test_create_request_without_price_fails() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);

        // A second product with no deal price
        let bare = insert_product(
            &mut conn,
            ProductInput {
                name: "2T Oil".to_string(),
                code: "2T".to_string(),
                category: "lubricant".to_string(),
                unit: "litre".to_string(),
            },
            None,
        )
        .unwrap();

        let result = create_request(
            &mut conn,
            FillingRequestInput {
                customer_id: f.customer_id,
                station_id: f.station_id,
                product_id: bare.id,
                quantity: 10.0,
            },
            None,
        );
        assert!(matches!(result, Err(RequestFlowError::NoActivePrice)));
    }

    #[test]
    fn test_otp_rate_limit() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let request = make_request(&mut conn, &f, 10.0);
        let now = Utc::now().naive_utc();

        for _ in 0..5 {
            generate_otp(&mut conn, request.id, f.employee_id, now).expect("within limit");
        }
        let sixth = generate_otp(&mut conn, request.id, f.employee_id, now);
        assert!(matches!(sixth, Err(RequestFlowError::RateLimited)));

        // A different employee has their own window
        let other = insert_employee(
            &mut conn,
            crate::models::EmployeeInput {
                email: "other@fueldesk.example".to_string(),
                password: "pw".to_string(),
                full_name: "Other".to_string(),
                phone: None,
                role_names: vec![],
                station_ids: vec![],
            },
            None,
        )
        .unwrap();
        assert!(generate_otp(&mut conn, request.id, other.id, now).is_ok());

        // And the window slides: eleven minutes later the limit resets
        let later = now + Duration::minutes(11);
        assert!(generate_otp(&mut conn, request.id, f.employee_id, later).is_ok());
    }

    #[test]
    fn test_process_with_wrong_otp_fails() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let request = make_request(&mut conn, &f, 10.0);
        let now = Utc::now().naive_utc();

        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let result = process_request(&mut conn, request.id, wrong, f.employee_id, now);
        assert!(matches!(result, Err(RequestFlowError::OtpMismatch)));

        // No hold was reserved
        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 0);
    }

    #[test]
    fn test_process_with_expired_otp_fails() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let request = make_request(&mut conn, &f, 10.0);
        let now = Utc::now().naive_utc();

        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        let too_late = now + Duration::minutes(OTP_TTL_MINUTES + 1);

        let result = process_request(&mut conn, request.id, &code, f.employee_id, too_late);
        assert!(matches!(result, Err(RequestFlowError::OtpExpired)));
    }

    #[test]
    fn test_process_reserves_hold_and_flips_status() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let request = make_request(&mut conn, &f, 100.0);
        let now = Utc::now().naive_utc();

        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        let processed = process_request(&mut conn, request.id, &code, f.employee_id, now)
            .expect("processing should succeed");

        assert_eq!(processed.status, "Processing");
        assert_eq!(processed.processed_by, Some(f.employee_id));
        assert!(processed.otp.is_none());

        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 20_000);

        // Replays of the same OTP are refused now that the status moved on
        let replay = process_request(&mut conn, request.id, &code, f.employee_id, now);
        assert!(matches!(replay, Err(RequestFlowError::InvalidStatus(_))));
    }

    #[test]
    fn test_process_with_insufficient_credit_fails_atomically() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        // 6000 litres at 200 cents = 1,200,000 > the 1,000,000 limit
        let request = make_request(&mut conn, &f, 6_000.0);
        let now = Utc::now().naive_utc();

        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        let result = process_request(&mut conn, request.id, &code, f.employee_id, now);
        assert!(matches!(result, Err(RequestFlowError::InsufficientCredit)));

        // Status unchanged, hold untouched
        let reloaded = get_request(&mut conn, request.id).unwrap().unwrap();
        assert_eq!(reloaded.status, "Pending");
        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 0);
    }

    #[test]
    fn test_complete_debits_stock_and_releases_hold() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        add_stock(&mut conn, f.station_id, f.product_id, 500.0, "purchase", None, None).unwrap();

        let request = make_request(&mut conn, &f, 100.0);
        let now = Utc::now().naive_utc();
        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        process_request(&mut conn, request.id, &code, f.employee_id, now).unwrap();

        let completed = complete_request(&mut conn, request.id, f.employee_id).unwrap();
        assert_eq!(completed.status, "Completed");

        assert_eq!(
            get_stock_level(&mut conn, f.station_id, f.product_id).unwrap(),
            400.0
        );
        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 0);
    }

    #[test]
    fn test_complete_without_stock_rolls_back() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        // Only 50 litres on hand for a 100-litre request
        add_stock(&mut conn, f.station_id, f.product_id, 50.0, "purchase", None, None).unwrap();

        let request = make_request(&mut conn, &f, 100.0);
        let now = Utc::now().naive_utc();
        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        process_request(&mut conn, request.id, &code, f.employee_id, now).unwrap();

        let result = complete_request(&mut conn, request.id, f.employee_id);
        assert!(matches!(result, Err(RequestFlowError::InsufficientStock)));

        // Still Processing, hold still reserved, stock untouched
        let reloaded = get_request(&mut conn, request.id).unwrap().unwrap();
        assert_eq!(reloaded.status, "Processing");
        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 20_000);
        assert_eq!(
            get_stock_level(&mut conn, f.station_id, f.product_id).unwrap(),
            50.0
        );
    }

    #[test]
    fn test_cancel_processing_releases_hold() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let request = make_request(&mut conn, &f, 100.0);
        let now = Utc::now().naive_utc();
        let code = generate_otp(&mut conn, request.id, f.employee_id, now).unwrap();
        process_request(&mut conn, request.id, &code, f.employee_id, now).unwrap();

        let cancelled = cancel_request(&mut conn, request.id, f.employee_id).unwrap();
        assert_eq!(cancelled.status, "Cancelled");

        let balance = get_balance(&mut conn, f.customer_id).unwrap().unwrap();
        assert_eq!(balance.hold_balance, 0);

        // A cancelled request is terminal
        let again = cancel_request(&mut conn, request.id, f.employee_id);
        assert!(matches!(again, Err(RequestFlowError::InvalidStatus(_))));
    }
}
