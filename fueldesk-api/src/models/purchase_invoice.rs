use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::purchase_invoices;

/// A supplier/transporter purchase invoice. Recording one also receives the
/// quantity into the destination station's stock. `dncn_amount` is a signed
/// debit-note/credit-note adjustment against the payable; `paid_amount`
/// accumulates payments.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = purchase_invoices)]
#[ts(export)]
pub struct PurchaseInvoice {
    pub id: i32,
    pub invoice_no: String, // Will be unique
    pub supplier_name: String,
    pub transporter_name: Option<String>,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub unit_rate: i64,
    pub freight_amount: i64,
    pub payable_amount: i64,
    pub dncn_amount: i64,
    pub paid_amount: i64,
    #[ts(type = "string")]
    pub invoice_date: NaiveDate,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl PurchaseInvoice {
    /// Net amount still owed: payable minus note adjustments minus payments.
    pub fn outstanding(&self) -> i64 {
        self.payable_amount - self.dncn_amount - self.paid_amount
    }
}

#[derive(Insertable)]
#[diesel(table_name = purchase_invoices)]
pub struct NewPurchaseInvoice {
    pub invoice_no: String,
    pub supplier_name: String,
    pub transporter_name: Option<String>,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub unit_rate: i64,
    pub freight_amount: i64,
    pub payable_amount: i64,
    pub dncn_amount: i64,
    pub paid_amount: i64,
    pub invoice_date: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct PurchaseInvoiceInput {
    pub invoice_no: String,
    pub supplier_name: String,
    pub transporter_name: Option<String>,
    pub station_id: i32,
    pub product_id: i32,
    pub quantity: f64,
    pub unit_rate: i64,
    pub freight_amount: Option<i64>,
    #[ts(type = "string")]
    pub invoice_date: NaiveDate,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    pub amount: i64,
}

/// Signed debit/credit-note adjustment. Positive reduces the payable
/// (credit note), negative increases it (debit note).
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct DncnInput {
    pub amount: i64,
}

/// Invoice plus the derived outstanding amount, as returned by the API.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct PurchaseInvoiceView {
    #[serde(flatten)]
    pub invoice: PurchaseInvoice,
    pub outstanding: i64,
}
