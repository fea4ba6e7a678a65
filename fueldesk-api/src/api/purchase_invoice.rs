//! API endpoints for supplier/transporter purchase invoices.
//!
//! Recording an invoice also receives its quantity into the destination
//! station's stock (one transaction). Payments and DNCN adjustments are
//! guarded so the books cannot go inconsistent:
//! cumulative payments never exceed the net payable, and adjustments never
//! push the net payable below what was already paid.

use rocket::Route;
use rocket::http::Status;
use rocket::response::{self, status};
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::logged_json::LoggedJson;
use crate::models::{
    DncnInput, PaymentInput, PurchaseInvoice, PurchaseInvoiceInput, PurchaseInvoiceView,
};
use crate::orm::DbConn;
use crate::orm::purchase_invoice::{
    InvoiceError, apply_dncn, create_invoice, get_invoice, list_invoices, record_payment,
};
use crate::session_guards::AuthenticatedUser;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

fn invoice_error_response(e: InvoiceError) -> response::status::Custom<Json<ErrorResponse>> {
    let (status, message) = match e {
        InvoiceError::NotFound => (Status::NotFound, "No such invoice".to_string()),
        InvoiceError::InvalidAmount => {
            (Status::UnprocessableEntity, "Invalid amount".to_string())
        }
        InvoiceError::Overpayment => (
            Status::Conflict,
            "Payment would exceed the outstanding payable".to_string(),
        ),
        InvoiceError::AdjustmentBelowPaid => (
            Status::Conflict,
            "Adjustment would push the net payable below the amount already paid".to_string(),
        ),
        InvoiceError::Db(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => (Status::Conflict, "Invoice number already exists".to_string()),
        InvoiceError::Db(e) => {
            error!("Database error in invoice flow: {:?}", e);
            (
                Status::InternalServerError,
                "Database error during invoice processing".to_string(),
            )
        }
    };
    response::status::Custom(status, Json(ErrorResponse { error: message }))
}

fn view(invoice: PurchaseInvoice) -> PurchaseInvoiceView {
    let outstanding = invoice.outstanding();
    PurchaseInvoiceView {
        invoice,
        outstanding,
    }
}

/// Create Purchase Invoice endpoint.
///
/// - **URL:** `/api/1/purchase-invoices`
/// - **Method:** `POST`
/// - **Purpose:** Records the invoice and receives the quantity into the
///   station's stock with a `purchase` history row
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// # Request Format
///
/// ```json
/// {
///   "invoice_no": "NR-2025-0042",
///   "supplier_name": "National Refinery",
///   "transporter_name": "Bedford Carriers",
///   "station_id": 1,
///   "product_id": 2,
///   "quantity": 12000.0,
///   "unit_rate": 150,
///   "freight_amount": 25000,
///   "invoice_date": "2025-07-20"
/// }
/// ```
///
/// **Failure (HTTP 409 Conflict):** duplicate invoice number.
#[post("/1/purchase-invoices", data = "<input>")]
pub async fn create_purchase_invoice(
    db: DbConn,
    input: LoggedJson<PurchaseInvoiceInput>,
    auth_user: AuthenticatedUser,
) -> Result<status::Created<Json<PurchaseInvoiceView>>, response::status::Custom<Json<ErrorResponse>>>
{
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to record invoices".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let input = input.into_inner();

    db.run(move |conn| {
        create_invoice(conn, input, Some(acting_id))
            .map(|invoice| status::Created::new("/").body(Json(view(invoice))))
            .map_err(invoice_error_response)
    })
    .await
}

/// List Purchase Invoices endpoint.
///
/// - **URL:** `/api/1/purchase-invoices?supplier=<name>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[get("/1/purchase-invoices?<supplier>")]
pub async fn list_purchase_invoices(
    db: DbConn,
    supplier: Option<String>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<PurchaseInvoiceView>>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| {
        list_invoices(conn, supplier)
            .map(|invoices| Json(invoices.into_iter().map(view).collect()))
            .map_err(|_| Status::InternalServerError)
    })
    .await
}

/// Get Purchase Invoice endpoint.
///
/// - **URL:** `/api/1/purchase-invoices/<invoice_id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[get("/1/purchase-invoices/<invoice_id>")]
pub async fn get_purchase_invoice(
    db: DbConn,
    invoice_id: i32,
    auth_user: AuthenticatedUser,
) -> Result<Json<PurchaseInvoiceView>, Status> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        return Err(Status::Forbidden);
    }

    db.run(move |conn| match get_invoice(conn, invoice_id) {
        Ok(Some(invoice)) => Ok(Json(view(invoice))),
        Ok(None) => Err(Status::NotFound),
        Err(_) => Err(Status::InternalServerError),
    })
    .await
}

/// Record Payment endpoint.
///
/// - **URL:** `/api/1/purchase-invoices/<invoice_id>/payments`
/// - **Method:** `POST`
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
///
/// **Failure (HTTP 409 Conflict):** the payment would exceed the
/// outstanding payable.
#[post("/1/purchase-invoices/<invoice_id>/payments", data = "<input>")]
pub async fn record_invoice_payment(
    db: DbConn,
    invoice_id: i32,
    input: LoggedJson<PaymentInput>,
    auth_user: AuthenticatedUser,
) -> Result<Json<PurchaseInvoiceView>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to record payments".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let amount = input.amount;

    db.run(move |conn| {
        record_payment(conn, invoice_id, amount, Some(acting_id))
            .map(|invoice| Json(view(invoice)))
            .map_err(invoice_error_response)
    })
    .await
}

/// Apply DNCN Adjustment endpoint.
///
/// - **URL:** `/api/1/purchase-invoices/<invoice_id>/dncn`
/// - **Method:** `POST`
/// - **Purpose:** Applies a signed debit-note/credit-note adjustment to the
///   payable (positive = credit note, negative = debit note)
/// - **Authentication:** Required
/// - **Authorization:** `admin` or `accounts`
#[post("/1/purchase-invoices/<invoice_id>/dncn", data = "<input>")]
pub async fn apply_invoice_dncn(
    db: DbConn,
    invoice_id: i32,
    input: LoggedJson<DncnInput>,
    auth_user: AuthenticatedUser,
) -> Result<Json<PurchaseInvoiceView>, response::status::Custom<Json<ErrorResponse>>> {
    if !auth_user.has_any_role(&["admin", "accounts"]) {
        let err = Json(ErrorResponse {
            error: "Forbidden: insufficient permissions to apply adjustments".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let acting_id = auth_user.employee.id;
    let amount = input.amount;

    db.run(move |conn| {
        apply_dncn(conn, invoice_id, amount, Some(acting_id))
            .map(|invoice| Json(view(invoice)))
            .map_err(invoice_error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_purchase_invoice,
        list_purchase_invoices,
        get_purchase_invoice,
        record_invoice_payment,
        apply_invoice_dncn
    ]
}
