use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewPurchaseInvoice, PurchaseInvoice, PurchaseInvoiceInput};
use crate::orm::audit::log_activity_best_effort;
use crate::orm::stock::add_stock;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Failure modes of invoice mutations.
#[derive(Debug)]
pub enum InvoiceError {
    Db(diesel::result::Error),
    NotFound,
    /// Payment or adjustment amount fails basic validation.
    InvalidAmount,
    /// Cumulative payments would exceed the net payable.
    Overpayment,
    /// The adjustment would push the net payable below what was already paid.
    AdjustmentBelowPaid,
}

impl From<diesel::result::Error> for InvoiceError {
    fn from(e: diesel::result::Error) -> Self {
        InvoiceError::Db(e)
    }
}

/// Records a supplier invoice and receives its quantity into the station's
/// stock, all in one transaction. The payable is quantity x rate + freight.
pub fn create_invoice(
    conn: &mut SqliteConnection,
    input: PurchaseInvoiceInput,
    acting_employee_id: Option<i32>,
) -> Result<PurchaseInvoice, InvoiceError> {
    use crate::schema::purchase_invoices::dsl::*;

    if input.quantity <= 0.0 || input.unit_rate < 0 {
        return Err(InvoiceError::InvalidAmount);
    }

    conn.transaction(|conn| {
        let freight = input.freight_amount.unwrap_or(0);
        let payable = (input.quantity * input.unit_rate as f64).round() as i64 + freight;

        let new_invoice = NewPurchaseInvoice {
            invoice_no: input.invoice_no.clone(),
            supplier_name: input.supplier_name,
            transporter_name: input.transporter_name,
            station_id: input.station_id,
            product_id: input.product_id,
            quantity: input.quantity,
            unit_rate: input.unit_rate,
            freight_amount: freight,
            payable_amount: payable,
            dncn_amount: 0,
            paid_amount: 0,
            invoice_date: input.invoice_date,
            created_at: None,
        };

        diesel::insert_into(purchase_invoices)
            .values(&new_invoice)
            .execute(conn)?;

        let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
            .get_result::<LastInsertRowId>(conn)?
            .last_insert_rowid;

        let invoice = purchase_invoices
            .filter(id.eq(last_id as i32))
            .first::<PurchaseInvoice>(conn)?;

        add_stock(
            conn,
            invoice.station_id,
            invoice.product_id,
            invoice.quantity,
            "purchase",
            Some(format!("invoice:{}", invoice.invoice_no)),
            acting_employee_id,
        )?;

        log_activity_best_effort(conn, "purchase_invoices", invoice.id, "create", acting_employee_id);

        Ok(invoice)
    })
}

/// Gets a single invoice by ID.
pub fn get_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i32,
) -> Result<Option<PurchaseInvoice>, diesel::result::Error> {
    use crate::schema::purchase_invoices::dsl::*;
    purchase_invoices
        .filter(id.eq(invoice_id))
        .first::<PurchaseInvoice>(conn)
        .optional()
}

/// Lists invoices, newest first, optionally filtered by supplier name.
pub fn list_invoices(
    conn: &mut SqliteConnection,
    supplier_filter: Option<String>,
) -> Result<Vec<PurchaseInvoice>, diesel::result::Error> {
    use crate::schema::purchase_invoices::dsl::*;

    let mut query = purchase_invoices.into_boxed();
    if let Some(supplier) = supplier_filter {
        query = query.filter(supplier_name.eq(supplier));
    }
    query.order(id.desc()).load::<PurchaseInvoice>(conn)
}

/// Records a payment against an invoice.
///
/// The guard `payable - dncn - paid >= amount` is part of the `UPDATE`, so
/// concurrent payments cannot jointly overpay.
pub fn record_payment(
    conn: &mut SqliteConnection,
    invoice_id: i32,
    amount: i64,
    acting_employee_id: Option<i32>,
) -> Result<PurchaseInvoice, InvoiceError> {
    use crate::schema::purchase_invoices::dsl::*;

    if amount <= 0 {
        return Err(InvoiceError::InvalidAmount);
    }

    conn.transaction(|conn| {
        if get_invoice(conn, invoice_id)?.is_none() {
            return Err(InvoiceError::NotFound);
        }

        // payable - dncn - paid >= amount, rearranged for the query builder
        let affected = diesel::update(
            purchase_invoices
                .filter(id.eq(invoice_id))
                .filter((payable_amount - dncn_amount).ge(paid_amount + amount)),
        )
        .set(paid_amount.eq(paid_amount + amount))
        .execute(conn)?;

        if affected == 0 {
            return Err(InvoiceError::Overpayment);
        }

        log_activity_best_effort(conn, "purchase_invoices", invoice_id, "payment", acting_employee_id);

        get_invoice(conn, invoice_id)?.ok_or(InvoiceError::NotFound)
    })
}

/// Applies a signed debit/credit-note adjustment to an invoice.
///
/// Positive amounts reduce the net payable (credit note), negative amounts
/// increase it (debit note). The net payable may not drop below the amount
/// already paid.
pub fn apply_dncn(
    conn: &mut SqliteConnection,
    invoice_id: i32,
    amount: i64,
    acting_employee_id: Option<i32>,
) -> Result<PurchaseInvoice, InvoiceError> {
    use crate::schema::purchase_invoices::dsl::*;

    if amount == 0 {
        return Err(InvoiceError::InvalidAmount);
    }

    conn.transaction(|conn| {
        if get_invoice(conn, invoice_id)?.is_none() {
            return Err(InvoiceError::NotFound);
        }

        // payable - (dncn + amount) >= paid, rearranged for the query builder
        let affected = diesel::update(
            purchase_invoices
                .filter(id.eq(invoice_id))
                .filter((payable_amount - dncn_amount).ge(paid_amount + amount)),
        )
        .set(dncn_amount.eq(dncn_amount + amount))
        .execute(conn)?;

        if affected == 0 {
            return Err(InvoiceError::AdjustmentBelowPaid);
        }

        log_activity_best_effort(conn, "purchase_invoices", invoice_id, "dncn", acting_employee_id);

        get_invoice(conn, invoice_id)?.ok_or(InvoiceError::NotFound)
    })
}
